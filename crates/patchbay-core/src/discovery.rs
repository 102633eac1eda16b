use std::fs;
use std::path::Path;

use super::state::AppRecord;
use super::state::PatchStatus;

/// Directory extension that marks an application bundle. A bundle is a leaf:
/// discovery never descends into it.
pub const BUNDLE_EXTENSION: &str = "app";

/// Read-only inspection of one bundle, owned by the patch collaborator. The
/// runtime implementation lives in the exec crate; tests substitute fakes.
pub trait BundleInspector {
    /// Whether the patch algorithm can handle this bundle at all.
    fn supported(&self, bundle: &Path) -> bool;
    /// Disk truth only; the selection overlay is applied by the menu
    /// projection, never here.
    fn classify(&self, bundle: &Path) -> PatchStatus;
}

/// Walks `root` depth-first and returns every supported bundle, classified
/// and sorted by name ascending (case-insensitive).
///
/// Errors on individual entries (permission denied, broken symlink, deletion
/// race) skip that entry only; a single unreadable entry never aborts the
/// scan. The walk is read-only and idempotent; it re-runs before every menu
/// render.
pub fn discover(root: &Path, inspector: &dyn BundleInspector) -> Vec<AppRecord> {
    let mut apps = Vec::new();
    walk(root, inspector, &mut apps);
    apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    apps
}

fn walk(dir: &Path, inspector: &dyn BundleInspector, out: &mut Vec<AppRecord>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }

        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext == BUNDLE_EXTENSION)
        {
            if !inspector.supported(path.as_path()) {
                continue;
            }
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let status = inspector.classify(path.as_path());
            out.push(AppRecord {
                name,
                bundle_path: path,
                status,
            });
        } else {
            walk(path.as_path(), inspector, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    /// Supported unless the bundle name starts with "Skip"; patched when the
    /// bundle contains a `patched` marker file.
    struct FakeInspector;

    impl BundleInspector for FakeInspector {
        fn supported(&self, bundle: &Path) -> bool {
            !bundle
                .file_stem()
                .map(|stem| stem.to_string_lossy().starts_with("Skip"))
                .unwrap_or(false)
        }

        fn classify(&self, bundle: &Path) -> PatchStatus {
            if bundle.join("patched").exists() {
                PatchStatus::Patched
            } else {
                PatchStatus::Unpatched
            }
        }
    }

    fn make_bundle(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(&path).expect("create bundle");
        path
    }

    #[test]
    fn finds_supported_bundles_sorted_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_bundle(dir.path(), "zeta.app");
        make_bundle(dir.path(), "Alpha.app");
        make_bundle(dir.path(), "Utilities/midway.app");
        make_bundle(dir.path(), "Skipped Tool.app");
        fs::write(dir.path().join("notes.txt"), "plain file").expect("write file");

        let apps = discover(dir.path(), &FakeInspector);

        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "midway", "zeta"]);
        assert!(apps.iter().all(|app| app.status == PatchStatus::Unpatched));
    }

    #[test]
    fn bundles_are_leaves_and_never_descended_into() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outer = make_bundle(dir.path(), "Outer.app");
        make_bundle(outer.as_path(), "Contents/Inner.app");

        let apps = discover(dir.path(), &FakeInspector);

        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Outer"]);
    }

    #[test]
    fn classification_reflects_disk_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let done = make_bundle(dir.path(), "Done.app");
        make_bundle(dir.path(), "Pending.app");
        fs::write(done.join("patched"), "2").expect("write marker");

        let apps = discover(dir.path(), &FakeInspector);

        assert_eq!(apps[0].name, "Done");
        assert_eq!(apps[0].status, PatchStatus::Patched);
        assert_eq!(apps[1].status, PatchStatus::Unpatched);
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlinks_are_skipped_without_aborting() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_bundle(dir.path(), "Real.app");
        std::os::unix::fs::symlink(
            dir.path().join("gone"),
            dir.path().join("dangling"),
        )
        .expect("symlink");

        let apps = discover(dir.path(), &FakeInspector);
        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Real"]);
    }

    #[test]
    fn rescans_are_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_bundle(dir.path(), "One.app");
        make_bundle(dir.path(), "Two.app");

        let first = discover(dir.path(), &FakeInspector);
        let second = discover(dir.path(), &FakeInspector);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_root_yields_empty_sequence() {
        let dir = TempDir::new().expect("tempdir");
        assert!(discover(dir.path(), &FakeInspector).is_empty());

        let missing = dir.path().join("does-not-exist");
        assert!(discover(missing.as_path(), &FakeInspector).is_empty());
    }
}
