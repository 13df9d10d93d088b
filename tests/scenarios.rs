use mlfq::schedulers::aging_score;
use mlfq::workload::{self, ExampleSet};
use mlfq::{LastLevelStrategy, Pid, ProcessState, Scheduler, SchedulerConfig, Time};

fn config(num_queues: usize, base_quantum: Time, boost_interval: Time) -> SchedulerConfig {
    SchedulerConfig {
        num_queues,
        base_quantum,
        quantum_multiplier: 2.0,
        boost_interval,
        throughput_interval: 10,
    }
}

fn pids_at(scheduler: &Scheduler, level: usize) -> Vec<Pid> {
    scheduler.queue_processes(level).iter().map(|p| p.pid()).collect()
}

#[test]
fn single_process_demotes_once() {
    let mut s = Scheduler::new(config(3, 4, 0));
    s.add_process(0, 10);
    s.run(1_000);

    let levels: Vec<(Time, usize)> = s.execution_log().iter().map(|r| (r.start, r.level)).collect();
    let expected: Vec<(Time, usize)> = (0..10).map(|t| (t, if t < 4 { 0 } else { 1 })).collect();
    assert_eq!(levels, expected);

    let p = s.process(1).unwrap();
    assert_eq!(p.completion_time(), Some(10));
    assert_eq!(p.turnaround_time(), 10);
    assert_eq!(p.wait_time(), 0);
    assert_eq!(p.response_time(), Some(0));
    assert_eq!(p.priority(), 1);
}

#[test]
fn short_jobs_finish_inside_first_quantum() {
    let mut s = Scheduler::default();
    s.add_process(0, 3);
    s.add_process(0, 3);
    s.run(1_000);

    let done: Vec<(Pid, Option<Time>)> = s
        .completed_processes()
        .map(|p| (p.pid(), p.completion_time()))
        .collect();
    assert_eq!(done, vec![(1, Some(3)), (2, Some(6))]);
    assert!(s.execution_log().iter().all(|r| r.level == 0));

    let stats = s.stats();
    assert_eq!(stats.completed_processes, 2);
    assert_eq!(stats.total_processes, 2);
    assert_eq!(stats.avg_wait_time, 1.5);
    assert_eq!(stats.avg_response_time, 1.5);
    assert_eq!(stats.cpu_utilization, 100.0);
}

// quanta 2/4; bursts 9, 4, 7 leave 7, 2 and 5 ticks when they reach the last level
fn demoted_trio(strategy: LastLevelStrategy) -> Scheduler {
    let mut s = Scheduler::new(config(2, 2, 0));
    s.set_strategy(strategy);
    s.add_process(0, 9);
    s.add_process(0, 4);
    s.add_process(0, 7);
    for _ in 0..6 {
        s.step();
    }
    s
}

#[test]
fn shortest_remaining_picks_the_two() {
    let mut s = demoted_trio(LastLevelStrategy::ShortestRemaining);
    let remaining: Vec<Time> = s.queue_processes(1).iter().map(|p| p.remaining_time()).collect();
    assert_eq!(remaining, vec![2, 5, 7]);

    s.step();
    let last = s.execution_log().last().unwrap();
    assert_eq!((last.pid, last.level), (2, 1));
}

#[test]
fn strategy_switch_after_demotion_still_agrees() {
    let mut s = demoted_trio(LastLevelStrategy::RoundRobin);
    assert_eq!(pids_at(&s, 1), vec![1, 2, 3]);

    s.set_strategy(LastLevelStrategy::ShortestRemaining);
    s.step();
    assert_eq!(s.current_process().map(|p| p.pid()), Some(2));
    assert_eq!(pids_at(&s, 1), vec![1, 3]);
}

#[test]
fn boost_sweeps_lower_levels() {
    let mut s = Scheduler::new(config(3, 3, 5));
    s.add_process(0, 10);
    s.add_process(0, 10);

    for _ in 0..3 {
        s.step();
    }
    assert_eq!(pids_at(&s, 1), vec![1]);

    s.step();
    assert_eq!(s.boost_timer(), 4);
    assert_eq!(s.next_boost_in(), 1);

    // the fifth tick fires the boost while P2 is mid-quantum at level 0
    s.step();
    assert_eq!(s.current_time(), 5);
    assert_eq!(s.boost_timer(), 0);
    assert!(s.current_process().is_none());
    assert_eq!(pids_at(&s, 0), vec![1, 2]);
    assert!(s.queues()[1..].iter().all(|q| q.is_empty()));

    let p1 = s.process(1).unwrap();
    assert_eq!(p1.priority(), 0);
    assert_eq!(p1.state(), ProcessState::Ready);
    assert_eq!(p1.queue_enter_time(), 5);
}

#[test]
fn boost_beats_demotion_in_the_same_tick() {
    // quantum 4 at level 0 expires at t=4, exactly when the boost fires
    let mut s = Scheduler::new(config(3, 4, 4));
    s.add_process(0, 20);
    for _ in 0..4 {
        s.step();
    }
    let p = s.process(1).unwrap();
    assert_eq!(p.priority(), 0);
    assert_eq!(pids_at(&s, 0), vec![1]);
    assert!(s.queues()[1].is_empty());
}

#[test]
fn no_ready_process_above_level_zero_after_boost() {
    let mut s = Scheduler::new(config(3, 2, 7));
    workload::load(&mut s, ExampleSet::Standard.processes());
    let mut boosts = 0;
    while !s.is_complete() {
        s.step();
        if s.boost_timer() == 0 {
            boosts += 1;
            for queue in &s.queues()[1..] {
                assert!(queue.is_empty(), "level {} not drained at t={}", queue.level(), s.current_time());
            }
        }
    }
    assert!(boosts > 0);
}

#[test]
fn terminated_processes_leave_the_queues() {
    for strategy in LastLevelStrategy::ALL {
        let mut s = Scheduler::new(config(3, 2, 30));
        s.set_strategy(strategy);
        workload::load(&mut s, ExampleSet::CpuIntensive.processes());

        let mut was_complete = false;
        for _ in 0..500 {
            s.step();
            for p in s.completed_processes() {
                assert_eq!(p.remaining_time(), 0);
                assert_eq!(p.state(), ProcessState::Terminated);
                for level in 0..s.num_queues() {
                    assert!(!pids_at(&s, level).contains(&p.pid()));
                }
                assert_ne!(s.current_process().map(|c| c.pid()), Some(p.pid()));
            }
            if was_complete {
                assert!(s.is_complete());
            }
            was_complete = s.is_complete();
        }
        assert!(was_complete);
    }
}

#[test]
fn metrics_identities_hold() {
    for strategy in LastLevelStrategy::ALL {
        let mut s = Scheduler::new(config(3, 4, 25));
        s.set_strategy(strategy);
        workload::load(&mut s, ExampleSet::Standard.processes());
        s.run(10_000);
        assert!(s.is_complete());

        for p in s.completed_processes() {
            let completion = p.completion_time().unwrap();
            assert_eq!(p.turnaround_time(), completion - p.arrival_time());
            assert_eq!(p.wait_time(), p.turnaround_time() - p.burst_time());
            assert_eq!(p.cpu_time_used(), p.burst_time());
        }
    }
}

#[test]
fn replay_after_reset_is_identical() {
    for strategy in LastLevelStrategy::ALL {
        let mut s = Scheduler::new(config(3, 2, 20));
        s.set_strategy(strategy);

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            s.reset();
            workload::load(&mut s, ExampleSet::Standard.processes());
            workload::load(&mut s, ExampleSet::IoIntensive.processes());
            s.run(10_000);
            let times: Vec<_> = s
                .completed_processes()
                .map(|p| {
                    (
                        p.pid(),
                        p.completion_time(),
                        p.turnaround_time(),
                        p.wait_time(),
                        p.response_time(),
                    )
                })
                .collect();
            outcomes.push(times);
        }
        assert_eq!(outcomes[0], outcomes[1], "{} is not deterministic", strategy);
    }
}

#[test]
fn throughput_samples_are_regular() {
    let mut s = Scheduler::new(SchedulerConfig {
        throughput_interval: 7,
        ..SchedulerConfig::default()
    });
    workload::load(&mut s, ExampleSet::Standard.processes());
    s.run(10_000);

    let samples = s.throughput_samples();
    assert!(!samples.is_empty());
    for pair in samples.windows(2) {
        assert!(pair[0].time < pair[1].time);
    }
    for sample in samples {
        assert_eq!(sample.time % 7, 0);
        assert!(sample.time <= s.current_time());
        assert!(sample.throughput >= 0.0);
    }
}

#[test]
fn aging_strategy_finishes_staggered_work() {
    // quantum 1 everywhere: every process reaches the aging-managed level at once
    let mut s = Scheduler::new(SchedulerConfig {
        num_queues: 2,
        base_quantum: 1,
        quantum_multiplier: 1.0,
        boost_interval: 0,
        throughput_interval: 10,
    });
    s.set_strategy(LastLevelStrategy::AgingPriority);
    s.add_process(0, 6);
    s.add_process(40, 6);
    s.add_process(40, 6);
    s.run(10_000);
    assert!(s.is_complete());
    assert_eq!(s.completed_count(), 3);
}

// quanta 2/2; arrivals 0, 1, 2 reach the last level at t=2, 4 and 6
fn aging_trio() -> Scheduler {
    let mut s = Scheduler::new(SchedulerConfig {
        num_queues: 2,
        base_quantum: 2,
        quantum_multiplier: 1.0,
        boost_interval: 0,
        throughput_interval: 10,
    });
    s.set_strategy(LastLevelStrategy::AgingPriority);
    s.add_process(0, 10);
    s.add_process(1, 10);
    s.add_process(2, 10);
    s
}

#[test]
fn aging_order_on_demotion_matches_the_next_pick() {
    let mut s = aging_trio();
    for _ in 0..6 {
        s.step();
    }
    assert_eq!(pids_at(&s, 1), vec![1, 2, 3]);
    let enter: Vec<Time> = s.queue_processes(1).iter().map(|p| p.queue_enter_time()).collect();
    assert_eq!(enter, vec![2, 4, 6]);

    // P1 runs its last-level quantum and is re-inserted ahead of the later arrivals
    s.step();
    s.step();
    assert_eq!(s.current_time(), 8);
    assert!(s.current_process().is_none());
    assert_eq!(pids_at(&s, 1), vec![1, 2, 3]);

    let now = s.current_time();
    let scores: Vec<f64> = s.queue_processes(1).iter().map(|p| aging_score(p, now)).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "{:?}", scores);
    assert!((scores[0] - 100.0).abs() < 1e-9);
    assert!((scores[1] - 51.6).abs() < 1e-9);

    s.step();
    let last = s.execution_log().last().unwrap();
    assert_eq!((last.pid, last.level, last.start), (1, 1, 8));
    assert_eq!(pids_at(&s, 1), vec![2, 3]);
}

#[test]
fn round_robin_rotates_the_same_trio() {
    let mut s = aging_trio();
    s.set_strategy(LastLevelStrategy::RoundRobin);
    for _ in 0..8 {
        s.step();
    }
    assert_eq!(pids_at(&s, 1), vec![2, 3, 1]);
}
