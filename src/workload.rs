use crate::config::GeneratorConfig;
use crate::process::Time;
use crate::rand_generator::RandGenerator;
use crate::scheduler::Scheduler;

/// `(arrival, burst)` pairs in creation order.
pub type Workload = Vec<(Time, Time)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExampleSet {
    /// Five processes with staggered arrivals.
    #[default]
    Standard,
    /// Three long-running processes.
    CpuIntensive,
    /// Five short processes.
    IoIntensive,
}

impl ExampleSet {
    pub const ALL: [ExampleSet; 3] = [
        ExampleSet::Standard,
        ExampleSet::CpuIntensive,
        ExampleSet::IoIntensive,
    ];

    /// Unknown names map to the standard set.
    pub fn from_name_or_default(name: &str) -> ExampleSet {
        match name.trim().to_ascii_lowercase().as_str() {
            "2" | "cpu" => ExampleSet::CpuIntensive,
            "3" | "io" => ExampleSet::IoIntensive,
            _ => ExampleSet::Standard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExampleSet::Standard => "standard",
            ExampleSet::CpuIntensive => "cpu",
            ExampleSet::IoIntensive => "io",
        }
    }

    pub fn processes(&self) -> &'static [(Time, Time)] {
        match self {
            ExampleSet::Standard => &[(0, 20), (5, 12), (10, 8), (15, 16), (20, 5)],
            ExampleSet::CpuIntensive => &[(0, 30), (5, 25), (10, 20)],
            ExampleSet::IoIntensive => &[(0, 3), (2, 2), (4, 4), (6, 3), (8, 2)],
        }
    }

    pub fn workload(&self) -> Workload {
        self.processes().to_vec()
    }
}

/// Draws `num_processes` arrivals in `0..=max_arrival` and bursts in
/// `min_burst..=max_burst`.
pub fn random_workload(config: &GeneratorConfig, rng: &mut RandGenerator) -> Workload {
    (0..config.num_processes)
        .map(|_| {
            let arrival = rng.next_in(0, config.max_arrival);
            let burst = rng.next_in(config.min_burst, config.max_burst);
            (arrival, burst)
        })
        .collect()
}

pub fn load(scheduler: &mut Scheduler, workload: &[(Time, Time)]) {
    for &(arrival, burst) in workload {
        scheduler.add_process(arrival, burst);
    }
}
