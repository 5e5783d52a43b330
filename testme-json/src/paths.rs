use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Store file and backups directory.
///
/// An explicit file keeps its backups in a sibling `<name>.backups` directory;
/// otherwise both live under the platform data dir (or `.` when there is none).
pub fn store_paths(file: Option<&Path>) -> (PathBuf, PathBuf) {
    if let Some(file) = file {
        return (file.to_path_buf(), file.with_extension("backups"));
    }
    let root = ProjectDirs::from("com", "testme", "TestMe")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    (root.join("testme.json"), root.join("backups"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_keeps_backups_beside_it() {
        let (file, backups) = store_paths(Some(Path::new("/tmp/deck/spanish.json")));
        assert_eq!(file, PathBuf::from("/tmp/deck/spanish.json"));
        assert_eq!(backups, PathBuf::from("/tmp/deck/spanish.backups"));
    }

    #[test]
    fn default_location_shares_one_root() {
        let (file, backups) = store_paths(None);
        assert_eq!(file.file_name().and_then(|n| n.to_str()), Some("testme.json"));
        assert_eq!(file.parent(), backups.parent());
    }
}
