use serde::Deserialize;

use crate::runner::CommandRunner;
use crate::runner::RunOutput;

pub const RELEASE_API_URL: &str =
    "https://api.github.com/repos/patchbay-tools/patchbay/releases/latest";

pub const INSTALL_SCRIPT_URL: &str =
    "https://github.com/patchbay-tools/patchbay/releases/latest/download/patchbay-installer.sh";

#[derive(Debug, Clone, Deserialize)]
struct ReleaseInfo {
    tag_name: String,
}

/// Latest published version, without any leading `v`. None when the check
/// fails; update checks are never fatal to a session.
pub fn latest_version<R: CommandRunner>(runner: &R) -> Option<String> {
    let output = runner.run("curl", &["-sL", RELEASE_API_URL]).ok()?;
    if !output.success() {
        return None;
    }
    let info: ReleaseInfo = serde_json::from_str(output.stdout.as_str()).ok()?;
    Some(info.tag_name.trim_start_matches('v').to_string())
}

pub fn is_newer(latest: &str, current: &str) -> bool {
    match (parse_triple(latest), parse_triple(current)) {
        (Some(latest), Some(current)) => latest > current,
        _ => false,
    }
}

fn parse_triple(raw: &str) -> Option<(u64, u64, u64)> {
    let mut parts = raw.trim().trim_start_matches('v').splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().unwrap_or("0").parse().ok()?;
    let patch = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor, patch))
}

/// Pipes the published install script through the shell. Replaces the
/// running binary; the caller exits afterwards instead of re-entering the
/// session.
pub fn run_installer<R: CommandRunner>(runner: &R) -> std::io::Result<RunOutput> {
    let line = format!("curl -fsSL {INSTALL_SCRIPT_URL} | sh");
    runner.run("sh", &["-c", line.as_str()])
}
