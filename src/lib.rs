pub mod config;
pub mod error;
pub mod process;
pub mod queue;
pub mod rand_generator;
pub mod report;
pub mod scheduler;
pub mod schedulers;
pub mod utils;
pub mod workload;

pub use config::{GeneratorConfig, Preset, SchedulerConfig};
pub use error::{ConfigError, InputError};
pub use process::{Pid, Process, ProcessState, Time};
pub use queue::LevelQueue;
pub use scheduler::{ExecutionRecord, Scheduler, SchedulerStats, ThroughputSample};
pub use schedulers::LastLevelStrategy;
