use crate::config::SchedulerConfig;
use crate::process::{Pid, Process, Time};
use crate::scheduler::{ExecutionRecord, Scheduler, SchedulerStats, ThroughputSample};
use crate::schedulers::LastLevelStrategy;
use crate::workload;
use serde::Serialize;
use std::fmt::Write;

/// Consecutive ticks of one process at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GanttSpan {
    pub pid: Pid,
    pub level: usize,
    pub start: Time,
    pub end: Time,
}

pub fn gantt_spans(log: &[ExecutionRecord]) -> Vec<GanttSpan> {
    let mut spans: Vec<GanttSpan> = Vec::new();
    for rec in log {
        match spans.last_mut() {
            Some(span) if span.pid == rec.pid && span.level == rec.level && span.end == rec.start => {
                span.end = rec.end;
            }
            _ => spans.push(GanttSpan {
                pid: rec.pid,
                level: rec.level,
                start: rec.start,
                end: rec.end,
            }),
        }
    }
    spans
}

pub fn process_table(scheduler: &Scheduler) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5} {:>7} {:>5} {:>5} {:>10} {:>5} {:>5} {:>8}",
        "PID", "ARRIVE", "BURST", "DONE", "TURNAROUND", "WAIT", "RESP", "STATE"
    );
    for p in scheduler.processes() {
        let _ = writeln!(
            out,
            "{:>5} {:>7} {:>5} {:>5} {:>10} {:>5} {:>5} {:>8}",
            p.pid(),
            p.arrival_time(),
            p.burst_time(),
            opt(p.completion_time()),
            if p.is_terminated() { p.turnaround_time().to_string() } else { "-".into() },
            if p.is_terminated() { p.wait_time().to_string() } else { "-".into() },
            opt(p.response_time()),
            p.state().to_string(),
        );
    }
    out
}

fn opt(value: Option<Time>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

pub fn stats_summary(scheduler: &Scheduler) -> String {
    let stats = scheduler.stats();
    format!(
        "SUM: {} {}/{} {:.2} {:.2} {:.2} {:.2}% {:.4}\n",
        stats.current_time,
        stats.completed_processes,
        stats.total_processes,
        stats.avg_wait_time,
        stats.avg_turnaround_time,
        stats.avg_response_time,
        stats.cpu_utilization,
        stats.throughput
    )
}

pub fn gantt_chart(scheduler: &Scheduler) -> String {
    let mut out = String::new();
    for span in gantt_spans(scheduler.execution_log()) {
        let _ = writeln!(
            out,
            "{:5} -> {:5}  P{:02} Q{}",
            span.start, span.end, span.pid, span.level
        );
    }
    out
}

pub fn throughput_table(samples: &[ThroughputSample]) -> String {
    let mut out = String::new();
    for sample in samples {
        let _ = writeln!(out, "{:5}: {:.4}", sample.time, sample.throughput);
    }
    out
}

/// One line per level, e.g. `Q0(4): P01 P03`.
pub fn queue_line(scheduler: &Scheduler) -> String {
    let mut out = String::new();
    for queue in scheduler.queues() {
        let _ = write!(out, "Q{}({}):", queue.level(), queue.quantum());
        for p in scheduler.queue_processes(queue.level()) {
            let _ = write!(out, " P{:02}", p.pid());
        }
        out.push_str("  ");
    }
    out.trim_end().to_owned()
}

#[derive(Debug, Serialize)]
pub struct QueueView<'a> {
    pub level: usize,
    pub quantum: Time,
    pub processes: Vec<&'a Process>,
}

/// Point-in-time state for a status feed.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub current_time: Time,
    pub strategy: LastLevelStrategy,
    pub config: &'a SchedulerConfig,
    pub current: Option<&'a Process>,
    pub queues: Vec<QueueView<'a>>,
    pub completed: Vec<&'a Process>,
    pub stats: SchedulerStats,
    pub boost_timer: Time,
    pub next_boost_in: Time,
    pub throughput: &'a [ThroughputSample],
    pub gantt: Vec<GanttSpan>,
    pub complete: bool,
}

pub fn snapshot(scheduler: &Scheduler) -> Snapshot<'_> {
    Snapshot {
        current_time: scheduler.current_time(),
        strategy: scheduler.strategy(),
        config: scheduler.config(),
        current: scheduler.current_process(),
        queues: scheduler
            .queues()
            .iter()
            .map(|q| QueueView {
                level: q.level(),
                quantum: q.quantum(),
                processes: scheduler.queue_processes(q.level()),
            })
            .collect(),
        completed: scheduler.completed_processes().collect(),
        stats: scheduler.stats(),
        boost_timer: scheduler.boost_timer(),
        next_boost_in: scheduler.next_boost_in(),
        throughput: scheduler.throughput_samples(),
        gantt: gantt_spans(scheduler.execution_log()),
        complete: scheduler.is_complete(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub strategy: LastLevelStrategy,
    pub stats: SchedulerStats,
}

/// Runs `workload` once per last-level strategy on a fresh scheduler.
pub fn compare_strategies(
    config: &SchedulerConfig,
    workload: &[(Time, Time)],
    max_ticks: Time,
) -> Vec<ComparisonRow> {
    LastLevelStrategy::ALL
        .iter()
        .map(|&strategy| {
            let mut scheduler = Scheduler::new(config.clone());
            scheduler.set_strategy(strategy);
            workload::load(&mut scheduler, workload);
            scheduler.run(max_ticks);
            ComparisonRow {
                strategy,
                stats: scheduler.stats(),
            }
        })
        .collect()
}

pub fn comparison_table(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24}{:>10}{:>10}{:>10}{:>8}{:>9}",
        "Algorithm", "Avg Wait", "Avg TAT", "Avg Resp", "Time", "CPU%"
    );
    let _ = writeln!(out, "{}", "-".repeat(71));
    for row in rows {
        let s = &row.stats;
        let _ = writeln!(
            out,
            "{:<24}{:>10.2}{:>10.2}{:>10.2}{:>8}{:>8.2}%",
            row.strategy.name(),
            s.avg_wait_time,
            s.avg_turnaround_time,
            s.avg_response_time,
            s.current_time,
            s.cpu_utilization
        );
    }

    let best = |key: fn(&SchedulerStats) -> f64| {
        rows.iter()
            .min_by(|a, b| key(&a.stats).total_cmp(&key(&b.stats)))
    };
    if let Some(row) = best(|s| s.avg_wait_time) {
        let _ = writeln!(
            out,
            "Lowest Avg Wait: {} ({:.2})",
            row.strategy.name(),
            row.stats.avg_wait_time
        );
    }
    if let Some(row) = best(|s| s.avg_turnaround_time) {
        let _ = writeln!(
            out,
            "Lowest Avg TAT:  {} ({:.2})",
            row.strategy.name(),
            row.stats.avg_turnaround_time
        );
    }
    out
}
