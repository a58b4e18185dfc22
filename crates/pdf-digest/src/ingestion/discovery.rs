//! Input folder scanning

use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::error::{Error, Result};

/// List the files to process, sorted by path.
///
/// A file matches when its name ends with `config.extension` (case-sensitive).
/// A missing or unreadable folder is a configuration error.
pub fn discover_files(config: &InputConfig) -> Result<Vec<PathBuf>> {
    let folder = &config.folder;

    let metadata = std::fs::metadata(folder).map_err(|e| {
        Error::config(format!("Input folder {} is not accessible: {}", folder.display(), e))
    })?;
    if !metadata.is_dir() {
        return Err(Error::config(format!(
            "Input path {} is not a folder",
            folder.display()
        )));
    }
    // Surface permission problems before any worker starts
    std::fs::read_dir(folder).map_err(|e| {
        Error::config(format!("Input folder {} is not readable: {}", folder.display(), e))
    })?;

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", folder.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if entry
            .file_name()
            .to_string_lossy()
            .ends_with(config.extension.as_str())
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::info!(
        "Discovered {} '{}' files in {}",
        files.len(),
        config.extension,
        folder.display()
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn input(folder: PathBuf, recursive: bool) -> InputConfig {
        InputConfig {
            folder,
            extension: ".pdf".to_string(),
            recursive,
        }
    }

    #[test]
    fn test_filters_by_case_sensitive_suffix_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "upper.PDF", "notes.txt", "pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let files = discover_files(&input(dir.path().to_path_buf(), false)).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_recursive_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.pdf"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.pdf"), b"x").unwrap();

        let flat = discover_files(&input(dir.path().to_path_buf(), false)).unwrap();
        assert_eq!(flat.len(), 1);

        let all = discover_files(&input(dir.path().to_path_buf(), true)).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_missing_folder_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_files(&input(dir.path().join("absent"), false)).unwrap_err();
        assert!(err.is_fatal());

        let file = dir.path().join("plain.pdf");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            discover_files(&input(file, false)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_files(&input(dir.path().to_path_buf(), false))
            .unwrap()
            .is_empty());
    }
}
