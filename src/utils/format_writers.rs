//! Line-oriented result writers
//!
//! Serializes the analysis outputs (degree distribution, component sizes)
//! into human-readable `key:value` text artifacts, one entry per line with a
//! header, plus a JSON dump of the full report.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

/// Write `entries` as `key:value` lines under a `# header` line.
pub fn write_map_report<K, V, P>(
    entries: impl IntoIterator<Item = (K, V)>,
    output_path: P,
    header: &str,
) -> crate::Result<()>
where
    K: Display,
    V: Display,
    P: AsRef<Path>,
{
    let path = output_path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# {header}")?;
    let mut count = 0usize;
    for (key, value) in entries {
        writeln!(writer, "{key}:{value}")?;
        count += 1;
    }
    writer.flush()?;
    info!(entries = count, path = %path.display(), "report written");
    Ok(())
}

/// Write a sequence of values, one per line, under a `# header` line.
pub fn write_sizes_report<V, P>(
    sizes: impl IntoIterator<Item = V>,
    output_path: P,
    header: &str,
) -> crate::Result<()>
where
    V: Display,
    P: AsRef<Path>,
{
    let path = output_path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# {header}")?;
    for value in sizes {
        writeln!(writer, "{value}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Serialize a report struct as pretty JSON.
pub fn write_json_report<T: Serialize, P: AsRef<Path>>(
    report: &T,
    output_path: P,
) -> crate::Result<()> {
    let path = output_path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("failed to serialize report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_report_format() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("degrees.txt");
        write_map_report(vec![(2usize, 7usize), (5, 1)], &path, "degree:count")?;

        let text = std::fs::read_to_string(&path)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("# degree:count"));
        let mut rest: Vec<&str> = lines.collect();
        rest.sort_unstable();
        assert_eq!(rest, vec!["2:7", "5:1"]);
        Ok(())
    }

    #[test]
    fn test_sizes_report_preserves_order() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("components.txt");
        write_sizes_report(vec![3usize, 2, 1], &path, "component sizes")?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text, "# component sizes\n3\n2\n1\n");
        Ok(())
    }
}
