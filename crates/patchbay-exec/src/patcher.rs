use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::contracts::PatchOutcome;

/// Marker format version the patcher writes. Bundles carrying an older
/// version classify as stale and are offered a re-patch.
pub const PATCH_FORMAT_VERSION: u32 = 2;

const PATCH_MARKER: &str = "Contents/Resources/.compat_patch";
const BATCH_FLAGS: &str = "Contents/Resources/.compat_flags";
const INFO_PLIST: &str = "Contents/Info.plist";
const MACOS_DIR: &str = "Contents/MacOS";
const FRAMEWORKS_DIR: &str = "Contents/Frameworks";

/// On-disk patch state of one bundle, as the patch collaborator sees it.
/// Session-level overlays (batch selection) are layered on elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleState {
    Unpatched,
    Patched,
    Stale,
    Experimental,
}

/// The two mutually exclusive flag sets the batch patch can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchVariant {
    GpuRasterization,
    BlendFuncExtended,
}

impl BatchVariant {
    pub fn flag(self) -> &'static str {
        match self {
            Self::GpuRasterization => "--disable-gpu-rasterization",
            Self::BlendFuncExtended => "--disable-blend-func-extended",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GpuRasterization => "disable-gpu-rasterization",
            Self::BlendFuncExtended => "disable-blend-func-extended",
        }
    }

    pub fn from_gpu_toggle(gpu_variant: bool) -> Self {
        if gpu_variant {
            Self::BlendFuncExtended
        } else {
            Self::GpuRasterization
        }
    }
}

/// Patch collaborator boundary: read-only inspection plus the per-bundle
/// mutations the session dispatches. Implementations report per-item
/// outcomes; they never abort a batch by returning early.
pub trait AppPatcher {
    fn supported(&self, bundle: &Path) -> bool;
    fn inspect(&self, bundle: &Path) -> BundleState;
    fn patch(&self, bundle: &Path) -> PatchOutcome;
    fn write_batch_flags(&self, bundle: &Path, variant: BatchVariant) -> PatchOutcome;
    fn remove_batch_flags(&self, bundle: &Path) -> PatchOutcome;
}

/// Runtime patcher over the marker files the patch algorithm leaves in a
/// bundle.
#[derive(Debug, Clone, Copy)]
pub struct MarkerPatcher {
    pub patch_version: u32,
}

impl Default for MarkerPatcher {
    fn default() -> Self {
        Self {
            patch_version: PATCH_FORMAT_VERSION,
        }
    }
}

impl AppPatcher for MarkerPatcher {
    fn supported(&self, bundle: &Path) -> bool {
        bundle.join(INFO_PLIST).is_file() && bundle.join(MACOS_DIR).is_dir()
    }

    fn inspect(&self, bundle: &Path) -> BundleState {
        if bundle.join(BATCH_FLAGS).is_file() {
            return BundleState::Patched;
        }
        match fs::read_to_string(bundle.join(PATCH_MARKER)) {
            Ok(contents) => {
                let version = contents
                    .lines()
                    .next()
                    .and_then(|line| line.trim().parse::<u32>().ok());
                match version {
                    Some(version) if version == self.patch_version => BundleState::Patched,
                    _ => BundleState::Stale,
                }
            }
            Err(_) => {
                if has_engine_frameworks(bundle) {
                    BundleState::Experimental
                } else {
                    BundleState::Unpatched
                }
            }
        }
    }

    fn patch(&self, bundle: &Path) -> PatchOutcome {
        if !self.supported(bundle) {
            return PatchOutcome::skipped(bundle, "bundle is not patchable");
        }
        match write_bundle_file(bundle, PATCH_MARKER, &format!("{}\n", self.patch_version)) {
            Ok(()) => PatchOutcome::succeeded(bundle),
            Err(err) => PatchOutcome::failed(bundle, format!("write patch marker: {err}")),
        }
    }

    fn write_batch_flags(&self, bundle: &Path, variant: BatchVariant) -> PatchOutcome {
        if !self.supported(bundle) {
            return PatchOutcome::skipped(bundle, "bundle is not patchable");
        }
        match write_bundle_file(bundle, BATCH_FLAGS, &format!("{}\n", variant.flag())) {
            Ok(()) => PatchOutcome::succeeded(bundle),
            Err(err) => PatchOutcome::failed(bundle, format!("write launch flags: {err}")),
        }
    }

    fn remove_batch_flags(&self, bundle: &Path) -> PatchOutcome {
        match fs::remove_file(bundle.join(BATCH_FLAGS)) {
            Ok(()) => PatchOutcome::succeeded(bundle),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                PatchOutcome::skipped(bundle, "no batch patch present")
            }
            Err(err) => PatchOutcome::failed(bundle, format!("remove launch flags: {err}")),
        }
    }
}

fn write_bundle_file(bundle: &Path, relative: &str, contents: &str) -> io::Result<()> {
    let path = bundle.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Engine-embedding bundles (a `*Framework.framework` under
/// Contents/Frameworks) take the batch patch path and classify as
/// experimental until patched.
fn has_engine_frameworks(bundle: &Path) -> bool {
    let Ok(entries) = fs::read_dir(bundle.join(FRAMEWORKS_DIR)) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry
            .file_name()
            .to_string_lossy()
            .ends_with("Framework.framework")
    })
}

/// Writes the relaunch script the detached finisher runs after a batch
/// patch: each patched bundle is reopened in selection order once the
/// session has moved on.
pub fn write_finisher_script(path: &Path, targets: &[PathBuf]) -> io::Result<()> {
    let mut script = String::from("#!/bin/bash\nsleep 2\n");
    for target in targets {
        script.push_str(&format!("open \"{}\"\n", target.display()));
    }
    fs::write(path, script)
}
