use std::fs;
use std::io;
use std::path::Path;

/// Measures the byte length of a file.
pub trait SizeProbe {
    fn size_of(&self, path: &Path) -> io::Result<u64>;
}

/// Stats the file on disk.
pub struct FsProbe;

impl SizeProbe for FsProbe {
    fn size_of(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_probe_reports_length() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("f.txt");
        fs::write(&path, vec![b'x'; 1234]).unwrap();
        assert_eq!(FsProbe.size_of(&path).unwrap(), 1234);
    }

    #[test]
    fn test_fs_probe_missing_file() {
        let tmp = tempdir().unwrap();
        let err = FsProbe.size_of(&tmp.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
