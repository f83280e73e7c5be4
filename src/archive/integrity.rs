use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, BufReader, Read};
use std::path::Path;
use twox_hash::XxHash64;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// XxHash64 of a file's full content, streamed.
pub fn content_hash(file: &Path) -> io::Result<u64> {
    let f = File::open(file).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Error opening {} for hashing: {}", file.display(), err),
        )
    })?;
    let mut reader = BufReader::new(f);
    let mut hasher = XxHash64::with_seed(0);
    let mut buffer = vec![0; READ_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.write(&buffer[..bytes_read]);
    }
    Ok(hasher.finish())
}

pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    let len_a = a.metadata()?.len();
    let len_b = b.metadata()?.len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(content_hash(a)? == content_hash(b)?)
}
