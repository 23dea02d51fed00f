//! Locating fixture files and scratch directories for tests.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or(manifest_dir)
}

/// `crates/<crate_name>/testdata` under the workspace root.
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Find a STAC fixture by file name.
///
/// `TEST_DATA_DIR` is searched first when set, then the `stac-odc` crate's
/// testdata directory.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let from_env = std::env::var_os("TEST_DATA_DIR").map(|dir| PathBuf::from(dir).join(name));

    from_env
        .into_iter()
        .chain(std::iter::once(crate_testdata_dir("stac-odc").join(name)))
        .find(|path| path.is_file())
}

/// Scratch directory removed when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Scratch directory whose name starts with `prefix`.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
