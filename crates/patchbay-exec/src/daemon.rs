use std::fs;
use std::path::PathBuf;

use crate::contracts::DaemonOperation;
use crate::contracts::DaemonReport;
use crate::runner::CommandRunner;

pub const DAEMON_LABEL: &str = "com.patchbay.ryzenadj";

pub const DEFAULT_FETCH_URL: &str =
    "https://github.com/FlyGoat/RyzenAdj/releases/latest/download/ryzenadj";

/// Well-known install locations for the daemon binary and its launchd
/// descriptor. The descriptor and binary together define "installed";
/// `enabled` probes both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonPaths {
    pub install_dir: PathBuf,
    pub binary_path: PathBuf,
    pub descriptor_path: PathBuf,
}

impl DaemonPaths {
    pub fn standard() -> Self {
        Self {
            install_dir: PathBuf::from("/usr/local/bin"),
            binary_path: PathBuf::from("/usr/local/bin/ryzenadj"),
            descriptor_path: PathBuf::from(format!("/Library/LaunchDaemons/{DAEMON_LABEL}.plist")),
        }
    }
}

impl Default for DaemonPaths {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lifecycle manager for the persistent power-limit daemon.
///
/// Switching presets is always remove-then-install; the descriptor is never
/// edited in place, so its argument list can only ever come from a single
/// preset. There is no rollback: a failure mid-install leaves the host
/// partially installed and the report says so.
#[derive(Debug)]
pub struct DaemonManager<R> {
    runner: R,
    paths: DaemonPaths,
    fetch_url: String,
}

impl<R: CommandRunner> DaemonManager<R> {
    pub fn new(runner: R, paths: DaemonPaths, fetch_url: impl Into<String>) -> Self {
        Self {
            runner,
            paths,
            fetch_url: fetch_url.into(),
        }
    }

    /// Best-effort liveness probe: either artifact on disk counts as
    /// installed. Says nothing about whether the daemon is actually running.
    pub fn enabled(&self) -> bool {
        self.paths.binary_path.exists() || self.paths.descriptor_path.exists()
    }

    pub fn apply(&self, preset_key: &str, args: &[&str]) -> DaemonReport {
        if self.enabled() {
            // Presets are never layered.
            self.remove();
        }
        match self.install(args) {
            Ok(()) => DaemonReport::succeeded(DaemonOperation::Install, Some(preset_key)),
            Err(detail) => {
                DaemonReport::failed(DaemonOperation::Install, Some(preset_key), detail)
            }
        }
    }

    fn install(&self, args: &[&str]) -> Result<(), String> {
        fs::create_dir_all(self.paths.install_dir.as_path())
            .map_err(|err| format!("create {}: {err}", self.paths.install_dir.display()))?;

        let binary = self.paths.binary_path.to_string_lossy().into_owned();
        self.must(
            "curl",
            &["-sL", self.fetch_url.as_str(), "-o", binary.as_str()],
            "fetch daemon binary",
        )?;
        self.must("xattr", &["-c", binary.as_str()], "clear quarantine attributes")?;
        self.must("chmod", &["755", binary.as_str()], "set executable permission")?;
        self.must("chown", &["0:0", binary.as_str()], "set binary ownership")?;

        let descriptor = render_descriptor(binary.as_str(), args);
        fs::write(self.paths.descriptor_path.as_path(), descriptor)
            .map_err(|err| format!("write {}: {err}", self.paths.descriptor_path.display()))?;

        let descriptor_path = self.paths.descriptor_path.to_string_lossy().into_owned();
        self.must(
            "xattr",
            &["-c", descriptor_path.as_str()],
            "clear descriptor attributes",
        )?;
        self.must(
            "chmod",
            &["644", descriptor_path.as_str()],
            "set descriptor permissions",
        )?;
        self.must(
            "chown",
            &["0:0", descriptor_path.as_str()],
            "set descriptor ownership",
        )?;
        self.must(
            "launchctl",
            &["load", descriptor_path.as_str()],
            "register with launchd",
        )?;
        Ok(())
    }

    /// Unregisters and deletes both artifacts. Idempotent: each deletion
    /// failure is tolerated individually, so one missing file never keeps
    /// the other from being removed.
    pub fn remove(&self) -> DaemonReport {
        let descriptor_path = self.paths.descriptor_path.to_string_lossy().into_owned();
        let _ = self
            .runner
            .run("launchctl", &["unload", descriptor_path.as_str()]);
        let _ = fs::remove_file(self.paths.binary_path.as_path());
        let _ = fs::remove_file(self.paths.descriptor_path.as_path());
        DaemonReport::succeeded(DaemonOperation::Remove, None)
    }

    fn must(&self, program: &str, args: &[&str], step: &str) -> Result<(), String> {
        match self.runner.run(program, args) {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => Err(format!(
                "{step}: {program} exited with status {}: {}",
                output
                    .exit_code
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                output.stderr.trim(),
            )),
            Err(err) => Err(format!("{step}: {err}")),
        }
    }
}

/// Renders the launchd descriptor. Arguments appear one per line in catalog
/// order, directly after the program path.
pub fn render_descriptor(program: &str, args: &[&str]) -> String {
    let rendered_args: String = args
        .iter()
        .map(|arg| format!("\t\t<string>{arg}</string>\n"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>EnablePressuredExit</key>
	<true/>
	<key>KeepAlive</key>
	<false/>
	<key>Label</key>
	<string>{DAEMON_LABEL}</string>
	<key>OnDemand</key>
	<false/>
	<key>ProcessType</key>
	<string>App</string>
	<key>ProgramArguments</key>
	<array>
		<string>{program}</string>
{rendered_args}	</array>
	<key>RunAtLoad</key>
	<true/>
	<key>StandardErrorPath</key>
	<string>/tmp/{DAEMON_LABEL}.err.log</string>
	<key>StandardOutPath</key>
	<string>/tmp/{DAEMON_LABEL}.out.log</string>
	<key>ThrottleInterval</key>
	<integer>1</integer>
	<key>UserName</key>
	<string>root</string>
</dict>
</plist>
"#
    )
}
