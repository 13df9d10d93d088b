use crate::config::SchedulerConfig;
use crate::process::{Pid, Process, ProcessState, Time};
use crate::queue::LevelQueue;
use crate::schedulers::LastLevelStrategy;
use log::{debug, trace};
use serde::Serialize;

/// One executed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionRecord {
    pub pid: Pid,
    pub start: Time,
    pub end: Time,
    pub level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThroughputSample {
    pub time: Time,
    pub throughput: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SchedulerStats {
    pub avg_wait_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// Percentage in `[0, 100]`.
    pub cpu_utilization: f64,
    /// Completed processes per tick since the first arrival.
    pub throughput: f64,
    pub total_processes: usize,
    pub completed_processes: usize,
    pub current_time: Time,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    strategy: LastLevelStrategy,
    queues: Vec<LevelQueue>,

    // queues, current and completed hold slots into this table
    processes: Vec<Process>,
    completed: Vec<usize>,
    current: Option<usize>,

    current_time: Time,
    boost_timer: Time,
    pid_counter: Pid,
    first_arrival: Option<Time>,

    execution_log: Vec<ExecutionRecord>,
    throughput_samples: Vec<ThroughputSample>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let queues = build_queues(&config);
        Scheduler {
            config,
            strategy: LastLevelStrategy::default(),
            queues,
            processes: Vec::new(),
            completed: Vec::new(),
            current: None,
            current_time: 0,
            boost_timer: 0,
            pid_counter: 1,
            first_arrival: None,
            execution_log: Vec::new(),
            throughput_samples: Vec::new(),
        }
    }

    /// Creates a process with the next pid. It stays `New` until the clock
    /// reaches its arrival time. A zero burst completes on admission without
    /// ever running.
    pub fn add_process(&mut self, arrival_time: Time, burst_time: Time) -> Pid {
        let pid = self.pid_counter;
        self.insert_process(Process::new(pid, arrival_time, burst_time));
        pid
    }

    /// Admits a copy of `process` as a fresh `New` record. Its pid and any
    /// progress are discarded; only arrival and burst carry over.
    pub fn add_process_value(&mut self, process: Process) -> Pid {
        self.add_process(process.arrival_time(), process.burst_time())
    }

    fn insert_process(&mut self, process: Process) {
        let arrival = process.arrival_time();
        self.first_arrival = Some(self.first_arrival.map_or(arrival, |t| t.min(arrival)));
        self.pid_counter += 1;
        debug!(
            "added P{} arrival={} burst={}",
            process.pid(),
            arrival,
            process.burst_time()
        );
        self.processes.push(process);
    }

    /// Moves every `New` process whose arrival time has passed into level 0,
    /// in creation order. Calling it twice in the same tick is harmless.
    pub fn check_new_arrivals(&mut self) {
        let now = self.current_time;
        for (slot, process) in self.processes.iter_mut().enumerate() {
            if process.state() == ProcessState::New && process.arrival_time() <= now {
                if process.burst_time() == 0 {
                    process.set_state(ProcessState::Terminated);
                    process.set_completion_time(now);
                    process.calculate_metrics(now);
                    self.completed.push(slot);
                    debug!("t={} P{} has no work", now, process.pid());
                    continue;
                }
                process.set_queue_enter_time(now);
                self.queues[0].enqueue(slot, process);
                debug!("t={} admit P{}", now, process.pid());
            }
        }
    }

    fn last_level(&self) -> usize {
        self.queues.len() - 1
    }

    fn select_next_process(&mut self) -> Option<usize> {
        let last = self.last_level();
        let level = self.queues.iter().position(|q| !q.is_empty())?;
        if level < last {
            return self.queues[level].dequeue();
        }
        let pos = self
            .strategy
            .select(&self.queues[last], &self.processes, self.current_time)?;
        self.queues[last].remove_at(pos)
    }

    /// Demotes a process one level after it used up its quantum.
    fn move_to_next_queue(&mut self, slot: usize) {
        let now = self.current_time;
        let last = self.last_level();
        let next = match self.processes.get_mut(slot) {
            Some(process) if !process.is_terminated() => {
                let next = (process.priority() + 1).min(last);
                process.set_priority(next);
                process.set_state(ProcessState::Ready);
                process.set_queue_enter_time(now);
                next
            }
            _ => return,
        };

        if next == last && self.strategy != LastLevelStrategy::RoundRobin {
            let pos = self.strategy.insertion_point(
                &self.queues[last],
                &self.processes,
                &self.processes[slot],
                now,
            );
            self.queues[last].insert(pos, slot, &mut self.processes[slot]);
        } else {
            self.queues[next].enqueue(slot, &mut self.processes[slot]);
        }
        debug!("t={} demote P{} to Q{}", now, self.processes[slot].pid(), next);
    }

    /// Drains every level below the top into level 0.
    fn boost_all_processes(&mut self) {
        let now = self.current_time;
        let (top, lower) = self.queues.split_at_mut(1);
        for queue in lower {
            while let Some(slot) = queue.dequeue() {
                let process = &mut self.processes[slot];
                if process.is_terminated() {
                    continue;
                }
                process.reset_to_highest_priority();
                process.set_queue_enter_time(now);
                top[0].enqueue(slot, process);
            }
        }
    }

    fn boost_enabled(&self) -> bool {
        self.config.boost_interval > 0
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        if !self.has_processes() {
            self.current_time += 1;
            return;
        }

        self.check_new_arrivals();

        let slot = match self.current {
            Some(slot) => slot,
            None => match self.select_next_process() {
                Some(slot) => {
                    self.processes[slot].set_queue_enter_time(self.current_time);
                    self.current = Some(slot);
                    slot
                }
                None => {
                    trace!("t={} idle", self.current_time);
                    self.current_time += 1;
                    if self.boost_enabled() {
                        self.boost_timer += 1;
                    }
                    return;
                }
            },
        };

        let start = self.current_time;
        let process = &mut self.processes[slot];
        let level = process.priority();
        let quantum = self.queues[level].quantum();
        process.execute(1, start);
        self.execution_log.push(ExecutionRecord {
            pid: process.pid(),
            start,
            end: start + 1,
            level,
        });
        trace!("t={} run P{} at Q{}", start, process.pid(), level);
        self.current_time += 1;

        let now = self.current_time;
        let time_in_level = now.saturating_sub(process.queue_enter_time());
        let quantum_expired = time_in_level >= quantum;
        let terminated = process.is_terminated();

        // a boost wins over demotion: the running process lands in level 0
        if self.boost_enabled() {
            self.boost_timer += 1;
            if self.boost_timer >= self.config.boost_interval {
                debug!("t={} priority boost", now);
                self.boost_all_processes();
                self.boost_timer = 0;
                if !terminated {
                    let process = &mut self.processes[slot];
                    process.reset_to_highest_priority();
                    process.set_queue_enter_time(now);
                    self.queues[0].enqueue(slot, process);
                    self.current = None;
                }
            }
        }

        if terminated {
            let process = &mut self.processes[slot];
            process.set_completion_time(now);
            process.calculate_metrics(now);
            debug!(
                "t={} P{} done turnaround={} wait={}",
                now,
                process.pid(),
                process.turnaround_time(),
                process.wait_time()
            );
            self.completed.push(slot);
            self.current = None;
        } else if quantum_expired && self.current.is_some() {
            self.move_to_next_queue(slot);
            self.current = None;
        }

        self.sample_throughput();
    }

    /// Steps until every process has completed or `max_ticks` ticks have
    /// elapsed. Returns the number of ticks taken.
    pub fn run(&mut self, max_ticks: Time) -> Time {
        let mut ticks = 0;
        while !self.is_complete() && ticks < max_ticks {
            self.step();
            ticks += 1;
        }
        ticks
    }

    fn effective_elapsed(&self) -> Time {
        match self.first_arrival {
            Some(first) if first < self.current_time => self.current_time - first,
            _ => self.current_time,
        }
    }

    fn current_throughput(&self) -> f64 {
        let elapsed = self.effective_elapsed();
        if self.completed.is_empty() || elapsed == 0 {
            return 0.0;
        }
        self.completed.len() as f64 / elapsed as f64
    }

    fn sample_throughput(&mut self) {
        let interval = self.config.throughput_interval;
        if interval == 0 || self.current_time == 0 || self.current_time % interval != 0 {
            return;
        }
        self.throughput_samples.push(ThroughputSample {
            time: self.current_time,
            throughput: self.current_throughput(),
        });
    }

    /// True while anything is queued, running, or still waiting to arrive.
    pub fn has_processes(&self) -> bool {
        self.current.is_some()
            || self.queues.iter().any(|q| !q.is_empty())
            || self.processes.iter().any(|p| p.state() == ProcessState::New)
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() == self.processes.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        let mut stats = SchedulerStats {
            total_processes: self.processes.len(),
            completed_processes: self.completed.len(),
            current_time: self.current_time,
            throughput: self.current_throughput(),
            ..SchedulerStats::default()
        };

        if !self.completed.is_empty() {
            let count = self.completed.len() as f64;
            let (wait, turnaround, response) =
                self.completed_processes()
                    .fold((0, 0, 0), |(w, t, r), p| {
                        (
                            w + p.wait_time(),
                            t + p.turnaround_time(),
                            r + p.response_time().unwrap_or(0),
                        )
                    });
            stats.avg_wait_time = wait as f64 / count;
            stats.avg_turnaround_time = turnaround as f64 / count;
            stats.avg_response_time = response as f64 / count;
        }

        if self.current_time > 0 {
            let mut busy: Time = self.completed_processes().map(|p| p.burst_time()).sum();
            if let Some(p) = self.current_process().filter(|p| !p.is_terminated()) {
                busy += p.burst_time() - p.remaining_time();
            }
            let utilization = busy as f64 / self.current_time as f64 * 100.0;
            stats.cpu_utilization = utilization.min(100.0);
        }

        stats
    }

    /// Drops every process and all history. Configuration and the
    /// last-level strategy are kept.
    pub fn reset(&mut self) {
        self.current_time = 0;
        self.boost_timer = 0;
        self.pid_counter = 1;
        self.current = None;
        self.first_arrival = None;
        self.processes.clear();
        self.completed.clear();
        self.execution_log.clear();
        self.throughput_samples.clear();
        for queue in &mut self.queues {
            queue.clear();
        }
        debug!("scheduler reset");
    }

    /// Resets and rebuilds the level queues. Existing processes are lost.
    pub fn update_config(&mut self, config: SchedulerConfig) {
        self.config = config;
        self.reset();
        self.queues = build_queues(&self.config);
        debug!("reconfigured quanta={:?}", self.config.quanta());
    }

    pub fn set_strategy(&mut self, strategy: LastLevelStrategy) {
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> LastLevelStrategy {
        self.strategy
    }

    pub fn set_boost_interval(&mut self, interval: Time) {
        self.config.boost_interval = interval;
    }

    pub fn set_throughput_interval(&mut self, interval: Time) {
        self.config.throughput_interval = interval;
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    pub fn current_process(&self) -> Option<&Process> {
        self.current.map(|slot| &self.processes[slot])
    }

    pub fn queues(&self) -> &[LevelQueue] {
        &self.queues
    }

    pub fn num_queues(&self) -> usize {
        self.queues.len()
    }

    /// Residents of `level` in queue order; empty for an unknown level.
    pub fn queue_processes(&self, level: usize) -> Vec<&Process> {
        self.queues
            .get(level)
            .map(|q| q.iter().map(|slot| &self.processes[slot]).collect())
            .unwrap_or_default()
    }

    /// Every admitted process, in creation order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid() == pid)
    }

    /// Completed processes in completion order.
    pub fn completed_processes(&self) -> impl Iterator<Item = &Process> + '_ {
        self.completed.iter().map(|&slot| &self.processes[slot])
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn execution_log(&self) -> &[ExecutionRecord] {
        &self.execution_log
    }

    pub fn throughput_samples(&self) -> &[ThroughputSample] {
        &self.throughput_samples
    }

    pub fn boost_timer(&self) -> Time {
        self.boost_timer
    }

    pub fn boost_interval(&self) -> Time {
        self.config.boost_interval
    }

    pub fn next_boost_in(&self) -> Time {
        self.config.boost_interval.saturating_sub(self.boost_timer)
    }
}

fn build_queues(config: &SchedulerConfig) -> Vec<LevelQueue> {
    (0..config.num_queues.max(1))
        .map(|level| LevelQueue::new(level, config.quantum_for_level(level)))
        .collect()
}
