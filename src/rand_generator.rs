use crate::error::InputError;
use std::fs;
use std::path::{Path, PathBuf};

/// Replays numbers from a random file so generated workloads are
/// reproducible. The first line holds the count, the numbers follow.
/// Wraps back to the start once exhausted.
#[derive(Debug, Clone)]
pub struct RandGenerator {
    pub filename: PathBuf,
    values: Vec<u64>,
    ofs: usize,
}

impl RandGenerator {
    pub fn new(filename: &Path) -> Result<Self, InputError> {
        let contents = fs::read_to_string(filename).map_err(|source| InputError::Io {
            path: filename.to_path_buf(),
            source,
        })?;
        let values = parse_random_numbers(filename, &contents)?;
        Ok(RandGenerator {
            filename: filename.to_path_buf(),
            values,
            ofs: 0,
        })
    }

    /// In-memory generator, mostly for tests. `None` for an empty list.
    pub fn from_values(values: Vec<u64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(RandGenerator {
            filename: PathBuf::from("<memory>"),
            values,
            ofs: 0,
        })
    }

    pub fn get_rand(&mut self) -> u64 {
        let value = self.values[self.ofs];
        self.ofs = (self.ofs + 1) % self.values.len();
        value
    }

    /// Uniform-ish draw from `lo..=hi`.
    pub fn next_in(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.get_rand() % (hi - lo + 1)
    }
}

fn parse_random_numbers(path: &Path, contents: &str) -> Result<Vec<u64>, InputError> {
    let malformed = |line: usize, reason: String| InputError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut lines = contents.lines().enumerate();
    let count: usize = match lines.next() {
        Some((_, first)) => first
            .trim()
            .parse()
            .map_err(|e| malformed(1, format!("bad count: {}", e)))?,
        None => return Err(InputError::EmptyRandomFile(path.to_path_buf())),
    };

    let mut values = Vec::with_capacity(count);
    'outer: for (idx, line) in lines {
        for word in line.split_whitespace() {
            if values.len() == count {
                break 'outer;
            }
            let value = word
                .parse()
                .map_err(|e| malformed(idx + 1, format!("bad number `{}`: {}", word, e)))?;
            values.push(value);
        }
    }

    if values.is_empty() {
        return Err(InputError::EmptyRandomFile(path.to_path_buf()));
    }
    Ok(values)
}
