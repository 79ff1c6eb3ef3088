//! Fast line counting
//!
//! Counts newline bytes through a fixed buffer instead of materializing
//! lines; the production corpus runs to hundreds of millions of records and
//! this pass exists purely to size them.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

const BUFFER_SIZE: usize = 64 * 1024;

/// Count the lines of `path` by scanning for `\n` bytes.
///
/// An empty file counts 0 lines; a non-empty file without a trailing
/// newline still counts its final line.
pub fn line_count<P: AsRef<Path>>(path: P) -> crate::Result<usize> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut buffer = [0u8; BUFFER_SIZE];
    let mut count = 0usize;
    let mut last_byte = b'\n';

    loop {
        let read = file
            .read(&mut buffer)
            .with_context(|| format!("read error in {}", path.display()))?;
        if read == 0 {
            break;
        }
        count += buffer[..read].iter().filter(|&&b| b == b'\n').count();
        last_byte = buffer[read - 1];
    }

    if last_byte != b'\n' {
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_counts_zero() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty");
        std::fs::write(&path, "")?;
        assert_eq!(line_count(&path)?, 0);
        Ok(())
    }

    #[test]
    fn test_trailing_newline() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("three");
        std::fs::write(&path, "a\nb\nc\n")?;
        assert_eq!(line_count(&path)?, 3);
        Ok(())
    }

    #[test]
    fn test_missing_trailing_newline_counts_final_line() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("three");
        std::fs::write(&path, "a\nb\nc")?;
        assert_eq!(line_count(&path)?, 3);
        Ok(())
    }

    #[test]
    fn test_spans_buffer_boundary() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("big");
        // One line of ~100 KiB forces at least two buffer fills.
        let mut data = "x".repeat(100 * 1024);
        data.push('\n');
        data.push_str("tail\n");
        std::fs::write(&path, data)?;
        assert_eq!(line_count(&path)?, 2);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(line_count("/nonexistent/nope").is_err());
    }
}
