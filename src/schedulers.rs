use crate::process::{Process, Time};
use crate::queue::LevelQueue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastLevelStrategy {
    #[default]
    RoundRobin,
    ShortestRemaining,
    AgingPriority,
}

impl LastLevelStrategy {
    pub const ALL: [LastLevelStrategy; 3] = [
        LastLevelStrategy::RoundRobin,
        LastLevelStrategy::ShortestRemaining,
        LastLevelStrategy::AgingPriority,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LastLevelStrategy::RoundRobin => "Round Robin",
            LastLevelStrategy::ShortestRemaining => "Shortest Remaining Time",
            LastLevelStrategy::AgingPriority => "Aging Priority",
        }
    }

    /// Single-letter code used on the command line.
    pub fn code(&self) -> char {
        match self {
            LastLevelStrategy::RoundRobin => 'R',
            LastLevelStrategy::ShortestRemaining => 'S',
            LastLevelStrategy::AgingPriority => 'A',
        }
    }

    /// Accepts the one-letter code or a spelled-out name, case-insensitive.
    pub fn parse(value: &str) -> Option<LastLevelStrategy> {
        match value.trim().to_ascii_lowercase().as_str() {
            "r" | "rr" | "round_robin" | "round-robin" => Some(LastLevelStrategy::RoundRobin),
            "s" | "srt" | "sjf" | "shortest_remaining" | "shortest-remaining" => {
                Some(LastLevelStrategy::ShortestRemaining)
            }
            "a" | "p" | "aging" | "priority" | "aging_priority" | "aging-priority" => {
                Some(LastLevelStrategy::AgingPriority)
            }
            _ => None,
        }
    }

    /// Unknown names fall back to round robin.
    pub fn from_name_or_default(value: &str) -> LastLevelStrategy {
        LastLevelStrategy::parse(value).unwrap_or_default()
    }

    /// Position within `queue` of the process that should run next.
    ///
    /// Ties go to the entry closest to the head, so equal candidates are
    /// served in insertion order.
    pub fn select(&self, queue: &LevelQueue, procs: &[Process], now: Time) -> Option<usize> {
        if queue.is_empty() {
            return None;
        }
        match self {
            LastLevelStrategy::RoundRobin => Some(0),
            LastLevelStrategy::ShortestRemaining => queue
                .iter()
                .enumerate()
                .min_by_key(|&(_, slot)| procs[slot].remaining_time())
                .map(|(pos, _)| pos),
            LastLevelStrategy::AgingPriority => {
                let mut best: Option<(usize, f64)> = None;
                for (pos, slot) in queue.iter().enumerate() {
                    let score = aging_score(&procs[slot], now);
                    if best.map_or(true, |(_, top)| score > top) {
                        best = Some((pos, score));
                    }
                }
                best.map(|(pos, _)| pos)
            }
        }
    }

    /// Position at which a process demoted into the last level is placed.
    ///
    /// Shortest-remaining keeps the queue ascending by remaining time and
    /// aging keeps it descending by score, both behind their equals, so the
    /// head is what `select` would pick right after the insertion.
    pub fn insertion_point(
        &self,
        queue: &LevelQueue,
        procs: &[Process],
        candidate: &Process,
        now: Time,
    ) -> usize {
        match self {
            LastLevelStrategy::RoundRobin => queue.len(),
            LastLevelStrategy::ShortestRemaining => queue
                .iter()
                .position(|slot| procs[slot].remaining_time() > candidate.remaining_time())
                .unwrap_or(queue.len()),
            LastLevelStrategy::AgingPriority => {
                let score = aging_score(candidate, now);
                queue
                    .iter()
                    .rposition(|slot| aging_score(&procs[slot], now) >= score)
                    .map_or(0, |pos| pos + 1)
            }
        }
    }
}

impl fmt::Display for LastLevelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(now - enter)^2 / 10 + 100 / (1 + arrival)`. The quadratic wait term
/// outgrows the arrival term, so a waiting process eventually wins.
pub fn aging_score(process: &Process, now: Time) -> f64 {
    let waited = now.saturating_sub(process.queue_enter_time()) as f64;
    let aging = waited * waited / 10.0;
    let arrival = 100.0 / (1.0 + process.arrival_time() as f64);
    aging + arrival
}
