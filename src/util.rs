use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// Whole seconds since the Unix epoch, flooring times before 1970.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => {
            let before = e.duration();
            let secs = before.as_secs() as i64;
            if before.subsec_nanos() > 0 {
                -secs - 1
            } else {
                -secs
            }
        }
    }
}

/// Nanoseconds since the Unix epoch, negative before 1970.
pub fn unix_nanos(time: SystemTime) -> i128 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_nanos() as i128,
        Err(e) => -(e.duration().as_nanos() as i128),
    }
}

pub fn modified_seconds(path: &Path) -> io::Result<i64> {
    let metadata = fs::metadata(path)?;
    Ok(unix_seconds(metadata.modified()?))
}

/// Copy a file and carry its modification time over to the copy.
pub fn copy_preserving_mtime(from: &Path, to: &Path) -> io::Result<u64> {
    let bytes = fs::copy(from, to).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Error copying {} to {}: {}", from.display(), to.display(), err),
        )
    })?;
    let modified = fs::metadata(from)?.modified()?;
    let dest = OpenOptions::new().write(true).open(to)?;
    dest.set_modified(modified)?;
    Ok(bytes)
}

/// Recursively copy a directory tree, creating `to` if needed.
pub fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            copy_preserving_mtime(entry.path(), &target)?;
        }
    }
    Ok(())
}
