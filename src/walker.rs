//! Directory traversal yielding classified, supported files.

use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::mime::{self, DocumentKind};
use crate::models::FileRecord;

/// Walk the configured root and collect every supported regular file.
///
/// Depth-first and single-threaded. Depth counting starts at 0 for the
/// root's immediate children; a directory is not descended into when that
/// would exceed `max_depth`. Hidden entries are pruned entirely (not
/// descended into, not reported) unless `include_hidden` is set; the root
/// itself is exempt from the hidden check. Unreadable directories
/// contribute zero records without aborting sibling traversal.
///
/// Stateless: re-invocation re-walks from scratch.
pub fn walk(config: &ScanConfig) -> Vec<FileRecord> {
    let mut walker = WalkDir::new(&config.root).follow_links(false);
    if let Some(max_depth) = config.max_depth {
        // walkdir counts the root as depth 0 and its children as 1.
        walker = walker.max_depth(max_depth.saturating_add(1));
    }

    let include_hidden = config.include_hidden;
    let mut records = Vec::new();

    let entries = walker.into_iter().filter_entry(move |entry| {
        entry.depth() == 0
            || include_hidden
            || !mime::is_hidden(&entry.file_name().to_string_lossy(), entry.path())
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // Permission-denied subtrees are silently skipped.
                tracing::debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let content_type = mime::classify(entry.path());
        if let Some(kind) = DocumentKind::from_mime(&content_type) {
            records.push(FileRecord {
                path: entry.into_path(),
                content_type,
                kind,
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "contact me at a@b.com").unwrap();
        fs::write(root.join("b.txt"), "no sensitive data").unwrap();
        fs::write(root.join(".c.txt"), "hidden email x@y.com").unwrap();
        fs::write(root.join("blob.bin"), [0u8, 1, 2, 0xff, 0x00]).unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("d.txt"), "nested text").unwrap();
        fs::create_dir(root.join(".hidden")).unwrap();
        fs::write(root.join(".hidden").join("e.txt"), "inside hidden dir").unwrap();
        dir
    }

    fn names(records: &[FileRecord]) -> Vec<String> {
        let mut names: Vec<String> = records
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_depth_zero_limits_to_immediate_children() {
        let dir = fixture_tree();
        let config = ScanConfig::new(dir.path(), Some(0), false).unwrap();
        assert_eq!(names(&walk(&config)), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_unlimited_depth_reaches_nested_files() {
        let dir = fixture_tree();
        let config = ScanConfig::new(dir.path(), None, false).unwrap();
        assert_eq!(names(&walk(&config)), vec!["a.txt", "b.txt", "d.txt"]);
    }

    #[test]
    fn test_include_hidden_is_monotonic() {
        let dir = fixture_tree();
        let without = walk(&ScanConfig::new(dir.path(), None, false).unwrap());
        let with = walk(&ScanConfig::new(dir.path(), None, true).unwrap());
        assert!(with.len() >= without.len());
        assert_eq!(
            names(&with),
            vec![".c.txt", "a.txt", "b.txt", "d.txt", "e.txt"]
        );
    }

    #[test]
    fn test_hidden_directories_not_descended() {
        let dir = fixture_tree();
        let records = walk(&ScanConfig::new(dir.path(), None, false).unwrap());
        let found = names(&records);
        assert!(!found.contains(&".c.txt".to_string()));
        assert!(!found.contains(&"e.txt".to_string()));
    }

    #[test]
    fn test_unsupported_types_filtered() {
        let dir = fixture_tree();
        let records = walk(&ScanConfig::new(dir.path(), None, true).unwrap());
        assert!(!names(&records).contains(&"blob.bin".to_string()));
    }

    #[test]
    fn test_walk_is_restartable() {
        let dir = fixture_tree();
        let config = ScanConfig::new(dir.path(), None, false).unwrap();
        assert_eq!(names(&walk(&config)), names(&walk(&config)));
    }
}
