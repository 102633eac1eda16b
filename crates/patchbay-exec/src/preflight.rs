use regex::Regex;

use crate::runner::CommandRunner;

/// CPU brand string as the kernel reports it.
pub fn cpu_brand<R: CommandRunner>(runner: &R) -> std::io::Result<String> {
    runner
        .run("sysctl", &["-n", "machdep.cpu.brand_string"])
        .map(|output| output.stdout.trim().to_string())
}

pub fn is_amd_cpu(brand: &str) -> bool {
    brand.contains("AMD")
}

pub fn is_root<R: CommandRunner>(runner: &R) -> bool {
    runner
        .run("id", &["-u"])
        .map(|output| output.stdout.trim() == "0")
        .unwrap_or(false)
}

/// Host OS version as (major, minor); None when the probe fails.
pub fn macos_version<R: CommandRunner>(runner: &R) -> Option<(u32, u32)> {
    let output = runner.run("sw_vers", &["-productVersion"]).ok()?;
    parse_version(output.stdout.as_str())
}

pub fn parse_version(raw: &str) -> Option<(u32, u32)> {
    let pattern = Regex::new(r"^(\d+)(?:\.(\d+))?").ok()?;
    let captures = pattern.captures(raw.trim())?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some((major, minor))
}

/// Hosts on 14.4 or newer may need a restart before the batch finisher
/// takes effect.
pub fn needs_relaunch_warning(version: (u32, u32)) -> bool {
    version >= (14, 4)
}
