use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};
use log::debug;

pub const MEMINFO: &str = "/proc/meminfo";
pub const COMMITTED_KEY: &str = "Committed_AS:";

/// Scan a line-oriented `key: value` report for the first line starting with
/// `key`, returned verbatim (without the newline).
pub fn find_metric<R: BufRead>(reader: R, key: &str) -> Result<Option<String>> {
    for line in reader.lines() {
        let line = line.context("read meminfo line")?;
        if line.starts_with(key) {
            return Ok(Some(line));
        }
    }
    Ok(None)
}

/// Print the Committed_AS line from /proc/meminfo, tagged with a checkpoint
/// label. The file being unopenable is fatal; the key being absent is not,
/// and prints nothing (some kernels omit entries from the report).
pub fn report_committed(label: &str) -> Result<()> {
    let file = File::open(MEMINFO).with_context(|| format!("open {}", MEMINFO))?;
    match find_metric(BufReader::new(file), COMMITTED_KEY)? {
        Some(line) => println!("{}    ({})", line, label),
        None => debug!("{} has no {} line", MEMINFO, COMMITTED_KEY),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
MemTotal:       32518164 kB
MemFree:         1423900 kB
CommitLimit:    16259080 kB
Committed_AS:   21234716 kB
VmallocTotal:   34359738367 kB
";

    #[test]
    fn finds_committed_line_verbatim() {
        let line = find_metric(Cursor::new(SAMPLE), COMMITTED_KEY).unwrap();
        assert_eq!(line.as_deref(), Some("Committed_AS:   21234716 kB"));
    }

    #[test]
    fn missing_key_yields_none() {
        let report = "MemTotal: 1 kB\nMemFree: 1 kB\n";
        assert_eq!(find_metric(Cursor::new(report), COMMITTED_KEY).unwrap(), None);
    }

    #[test]
    fn key_must_start_the_line() {
        let report = "X Committed_AS: 1 kB\n";
        assert_eq!(find_metric(Cursor::new(report), COMMITTED_KEY).unwrap(), None);
    }
}
