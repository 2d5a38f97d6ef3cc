//! # Inspector Module
//!
//! Reads OS-level attributes of a file: size, timestamps and inode.
//! All timestamps are converted to local wall-clock time, the same frame
//! EXIF capture times are written in.

use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Filesystem attributes of one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FsAttributes {
    pub size: u64,
    pub modified: Option<NaiveDateTime>,
    /// Inode change time on Unix, creation time elsewhere
    pub changed: Option<NaiveDateTime>,
    /// True creation time, when the OS exposes one
    pub birth: Option<NaiveDateTime>,
    pub inode: Option<u64>,
}

/// Stat a file
pub fn inspect(path: &Path) -> io::Result<FsAttributes> {
    let metadata = fs::metadata(path)?;

    Ok(FsAttributes {
        size: metadata.len(),
        modified: metadata.modified().ok().map(to_local),
        changed: changed_time(&metadata),
        birth: metadata.created().ok().map(to_local),
        inode: inode(&metadata),
    })
}

fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

#[cfg(unix)]
fn changed_time(metadata: &fs::Metadata) -> Option<NaiveDateTime> {
    use std::os::unix::fs::MetadataExt;

    DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
        .map(|utc| utc.with_timezone(&Local).naive_local())
}

#[cfg(not(unix))]
fn changed_time(metadata: &fs::Metadata) -> Option<NaiveDateTime> {
    metadata.created().ok().map(to_local)
}

#[cfg(unix)]
fn inode(metadata: &fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn inode(_metadata: &fs::Metadata) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn reads_size_and_times() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();
        drop(file);

        let attributes = inspect(&path).unwrap();
        assert_eq!(attributes.size, 5);
        assert!(attributes.modified.is_some());
        assert!(attributes.changed.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn reports_inode_on_unix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        fs::write(&path, [0u8; 4]).unwrap();

        assert!(inspect(&path).unwrap().inode.is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(inspect(Path::new("/nonexistent/file.jpg")).is_err());
    }
}
