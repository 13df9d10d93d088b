use serde::Serialize;
use std::fmt;

/// Virtual clock unit. One `Scheduler::step` advances the clock by exactly one.
pub type Time = u64;
pub type Pid = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::New => "NEW",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNG",
            ProcessState::Waiting => "WAIT",
            ProcessState::Terminated => "DONE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Process {
    pid: Pid,
    priority: usize,
    arrival_time: Time,
    burst_time: Time,

    remaining_time: Time,
    cpu_time_used: Time,
    last_run_time: Time,
    queue_enter_time: Time,

    // stats, filled in at termination (response at first run)
    wait_time: Time,
    turnaround_time: Time,
    response_time: Option<Time>,
    completion_time: Option<Time>,

    first_run: bool,
    state: ProcessState,
}

impl Process {
    pub fn new(pid: Pid, arrival_time: Time, burst_time: Time) -> Process {
        Process {
            pid,
            priority: 0,
            arrival_time,
            burst_time,
            remaining_time: burst_time,
            cpu_time_used: 0,
            last_run_time: 0,
            queue_enter_time: 0,
            wait_time: 0,
            turnaround_time: 0,
            response_time: None,
            completion_time: None,
            first_run: true,
            state: ProcessState::New,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Current queue level, 0 is the highest.
    pub fn priority(&self) -> usize {
        self.priority
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn burst_time(&self) -> Time {
        self.burst_time
    }

    pub fn remaining_time(&self) -> Time {
        self.remaining_time
    }

    pub fn cpu_time_used(&self) -> Time {
        self.cpu_time_used
    }

    pub fn last_run_time(&self) -> Time {
        self.last_run_time
    }

    pub fn queue_enter_time(&self) -> Time {
        self.queue_enter_time
    }

    pub fn wait_time(&self) -> Time {
        self.wait_time
    }

    pub fn turnaround_time(&self) -> Time {
        self.turnaround_time
    }

    /// `None` until the process has been executed once.
    pub fn response_time(&self) -> Option<Time> {
        self.response_time
    }

    pub fn completion_time(&self) -> Option<Time> {
        self.completion_time
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    pub(crate) fn set_priority(&mut self, priority: usize) {
        self.priority = priority;
    }

    pub(crate) fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    pub(crate) fn set_queue_enter_time(&mut self, time: Time) {
        self.queue_enter_time = time;
    }

    pub(crate) fn set_completion_time(&mut self, time: Time) {
        self.completion_time = Some(time);
    }

    /// Runs the process for up to `slice` units starting at `now`.
    ///
    /// The first call records the response time. When the remaining time
    /// reaches zero the process becomes `Terminated`; the completion time is
    /// stamped later by the scheduler once the clock has advanced.
    pub fn execute(&mut self, slice: Time, now: Time) {
        if self.first_run {
            self.response_time = Some(now.saturating_sub(self.arrival_time));
            self.first_run = false;
        }

        self.state = ProcessState::Running;
        self.last_run_time = now;

        let ran = slice.min(self.remaining_time);
        self.remaining_time -= ran;
        self.cpu_time_used += ran;

        if self.remaining_time == 0 {
            self.state = ProcessState::Terminated;
        }
    }

    /// Fills in turnaround and wait time. Does nothing unless terminated.
    pub fn calculate_metrics(&mut self, now: Time) {
        if self.state != ProcessState::Terminated {
            return;
        }
        let completion = *self.completion_time.get_or_insert(now);
        self.turnaround_time = completion.saturating_sub(self.arrival_time);
        self.wait_time = self.turnaround_time.saturating_sub(self.burst_time);
    }

    /// Moves the process back to level 0. Leaves `queue_enter_time` alone.
    pub fn reset_to_highest_priority(&mut self) {
        self.priority = 0;
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P{:02} [Queue:{} Arr:{:3} Burst:{:3} Rem:{:3} Wait:{:3}]",
            self.pid,
            self.priority,
            self.arrival_time,
            self.burst_time,
            self.remaining_time,
            self.wait_time
        )
    }
}
