use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A configuration value outside the range the simulator front ends accept.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("number of queues must be between 2 and 5, got {0}")]
    NumQueues(usize),
    #[error("base quantum must be between 2 and 10, got {0}")]
    BaseQuantum(u64),
    #[error("quantum multiplier must be between 1.0 and 5.0, got {0}")]
    Multiplier(f64),
    #[error("boost interval must be 0 (disabled) or between 20 and 500, got {0}")]
    BoostInterval(u64),
    #[error("throughput sampling interval must be at least 1")]
    ThroughputInterval,
    #[error("number of processes must be between 1 and 20, got {0}")]
    NumProcesses(usize),
    #[error("max arrival time must be between 0 and 100, got {0}")]
    MaxArrival(u64),
    #[error("burst range must satisfy 1 <= min <= max <= 100, got {min}..={max}")]
    BurstRange { min: u64, max: u64 },
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config file {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure while reading a process list or a random-number file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to open {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("random file {0} holds no numbers")]
    EmptyRandomFile(PathBuf),
}
