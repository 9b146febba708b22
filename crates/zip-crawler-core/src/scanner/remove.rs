use std::fs;
use std::io;
use std::path::Path;

/// Deletes a file the crawl has decided to drop, either an original that was
/// replaced by its artifact or an artifact that was not worth keeping.
pub trait FileRemover {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_remover_deletes_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("f.txt");
        fs::write(&path, "x").unwrap();
        FsRemover.remove(&path).unwrap();
        assert!(!path.exists());
    }
}
