use crate::error::ConfigError;
use crate::process::Time;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub num_queues: usize,
    pub base_quantum: Time,
    pub quantum_multiplier: f64,
    /// Ticks between priority boosts. 0 disables boosting.
    pub boost_interval: Time,
    /// Ticks between throughput samples. 0 disables sampling.
    pub throughput_interval: Time,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            num_queues: 3,
            base_quantum: 4,
            quantum_multiplier: 2.0,
            boost_interval: 100,
            throughput_interval: 10,
        }
    }
}

impl SchedulerConfig {
    /// `floor(base * multiplier^level)`, never below one tick.
    pub fn quantum_for_level(&self, level: usize) -> Time {
        let scaled = self.base_quantum as f64 * self.quantum_multiplier.powi(level as i32);
        (scaled.floor() as Time).max(1)
    }

    pub fn quanta(&self) -> Vec<Time> {
        (0..self.num_queues).map(|l| self.quantum_for_level(l)).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=5).contains(&self.num_queues) {
            return Err(ConfigError::NumQueues(self.num_queues));
        }
        if !(2..=10).contains(&self.base_quantum) {
            return Err(ConfigError::BaseQuantum(self.base_quantum));
        }
        if !(1.0..=5.0).contains(&self.quantum_multiplier) {
            return Err(ConfigError::Multiplier(self.quantum_multiplier));
        }
        if self.boost_interval != 0 && !(20..=500).contains(&self.boost_interval) {
            return Err(ConfigError::BoostInterval(self.boost_interval));
        }
        if self.throughput_interval == 0 {
            return Err(ConfigError::ThroughputInterval);
        }
        Ok(())
    }

    /// Reads a TOML file; keys that are absent keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<SchedulerConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Standard,
    FineGrained,
    CoarseGrained,
    AggressiveBoost,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Standard,
        Preset::FineGrained,
        Preset::CoarseGrained,
        Preset::AggressiveBoost,
    ];

    pub fn parse(name: &str) -> Result<Preset, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "1" | "standard" => Ok(Preset::Standard),
            "2" | "fine" => Ok(Preset::FineGrained),
            "3" | "coarse" => Ok(Preset::CoarseGrained),
            "4" | "aggressive" => Ok(Preset::AggressiveBoost),
            _ => Err(ConfigError::UnknownPreset(name.to_owned())),
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        let (num_queues, base_quantum, quantum_multiplier, boost_interval) = match self {
            Preset::Standard => (3, 4, 2.0, 100),
            Preset::FineGrained => (5, 2, 1.5, 50),
            Preset::CoarseGrained => (2, 8, 3.0, 200),
            Preset::AggressiveBoost => (3, 4, 2.0, 30),
        };
        SchedulerConfig {
            num_queues,
            base_quantum,
            quantum_multiplier,
            boost_interval,
            ..SchedulerConfig::default()
        }
    }
}

/// Bounds for randomly generated workloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub num_processes: usize,
    pub max_arrival: Time,
    pub min_burst: Time,
    pub max_burst: Time,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            num_processes: 5,
            max_arrival: 20,
            min_burst: 5,
            max_burst: 30,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=20).contains(&self.num_processes) {
            return Err(ConfigError::NumProcesses(self.num_processes));
        }
        if self.max_arrival > 100 {
            return Err(ConfigError::MaxArrival(self.max_arrival));
        }
        if self.min_burst < 1 || self.min_burst > self.max_burst || self.max_burst > 100 {
            return Err(ConfigError::BurstRange {
                min: self.min_burst,
                max: self.max_burst,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quanta_double() {
        assert_eq!(SchedulerConfig::default().quanta(), vec![4, 8, 16]);
    }

    #[test]
    fn fractional_multiplier_floors() {
        let config = Preset::FineGrained.config();
        assert_eq!(config.quanta(), vec![2, 3, 4, 6, 10]);
    }

    #[test]
    fn quantum_never_drops_to_zero() {
        let config = SchedulerConfig {
            base_quantum: 1,
            quantum_multiplier: 0.5,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.quantum_for_level(3), 1);
    }

    #[test]
    fn presets_are_valid() {
        for preset in Preset::ALL {
            preset.config().validate().unwrap();
        }
        assert!(matches!(
            Preset::parse("turbo"),
            Err(ConfigError::UnknownPreset(_))
        ));
        assert_eq!(Preset::parse("Coarse").unwrap(), Preset::CoarseGrained);
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let bad_queues = SchedulerConfig {
            num_queues: 7,
            ..SchedulerConfig::default()
        };
        assert!(matches!(bad_queues.validate(), Err(ConfigError::NumQueues(7))));

        let bad_boost = SchedulerConfig {
            boost_interval: 5,
            ..SchedulerConfig::default()
        };
        assert!(matches!(bad_boost.validate(), Err(ConfigError::BoostInterval(5))));

        let no_boost = SchedulerConfig {
            boost_interval: 0,
            ..SchedulerConfig::default()
        };
        assert!(no_boost.validate().is_ok());
    }

    #[test]
    fn toml_fills_missing_keys() {
        let config: SchedulerConfig = toml::from_str("num_queues = 4\nboost_interval = 0\n").unwrap();
        assert_eq!(config.num_queues, 4);
        assert_eq!(config.boost_interval, 0);
        assert_eq!(config.base_quantum, 4);
        assert_eq!(config.throughput_interval, 10);
    }

    #[test]
    fn generator_burst_range_checked() {
        let bad = GeneratorConfig {
            min_burst: 9,
            max_burst: 3,
            ..GeneratorConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::BurstRange { .. })));
        assert!(GeneratorConfig::default().validate().is_ok());
    }
}
