use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Regular files directly inside `dir`. Subdirectories are not descended into
/// and symlinks are not followed. The whole listing is collected up front so
/// artifacts written while processing are never picked up by the same crawl.
pub fn list_top_level_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // The root itself failing means there is nothing to crawl.
                if err.depth() == 0 {
                    return Err(err.into_io_error().unwrap_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::Other,
                            format!("Error reading directory {}", dir.display()),
                        )
                    }));
                }
                warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        } else {
            debug!("Not a regular file, ignoring {}", entry.path().display());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_lists_only_top_level_files() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("b.log"), "b").unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("c.txt"), "c").unwrap();

        let mut names: Vec<String> = list_top_level_files(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "b.log".to_string()]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let tmp = tempdir().unwrap();
        assert!(list_top_level_files(&tmp.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_listed() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real.txt"), tmp.path().join("link.txt"))
            .unwrap();

        let files = list_top_level_files(tmp.path()).unwrap();
        assert_eq!(files, vec![tmp.path().join("real.txt")]);
    }
}
