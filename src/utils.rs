use crate::error::InputError;
use crate::process::Time;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// Process list format: one process per line, `<arrival> <burst>`.
// Lines starting with '#' and blank lines are ignored. Bursts must be positive.
pub fn read_input_file(filename: &Path) -> Result<Vec<(Time, Time)>, InputError> {
    let file = File::open(filename).map_err(|source| InputError::Io {
        path: filename.to_path_buf(),
        source,
    })?;
    parse_processes(filename, BufReader::new(file))
}

pub fn parse_processes<R: BufRead>(
    filename: &Path,
    reader: R,
) -> Result<Vec<(Time, Time)>, InputError> {
    let malformed = |line: usize, reason: &str| InputError::Malformed {
        path: filename.to_path_buf(),
        line,
        reason: reason.to_owned(),
    };

    let mut processes = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| InputError::Io {
            path: filename.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut iter = line.split_whitespace();
        let arrival: Time = iter
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed(idx + 1, "failed to parse arrival time"))?;
        let burst: Time = iter
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed(idx + 1, "failed to parse burst time"))?;
        if burst == 0 {
            return Err(malformed(idx + 1, "burst time must be positive"));
        }
        if iter.next().is_some() {
            return Err(malformed(idx + 1, "expected exactly two numbers"));
        }
        processes.push((arrival, burst));
    }

    Ok(processes)
}
