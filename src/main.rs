use anyhow::{bail, Context, Result};
use clap::{Arg, ArgMatches, Command};
use log::{info, warn};
use regex::Regex;
use std::cell::RefCell;
use std::path::Path;

use mlfq::config::{GeneratorConfig, Preset, SchedulerConfig};
use mlfq::process::Time;
use mlfq::rand_generator::RandGenerator;
use mlfq::report;
use mlfq::scheduler::Scheduler;
use mlfq::schedulers::LastLevelStrategy;
use mlfq::utils::read_input_file;
use mlfq::workload::{self, ExampleSet, Workload};

#[derive(Debug, Default)]
struct Flags {
    v_option: bool,
    q_option: bool,
}

thread_local!(static TFLAGS: RefCell<Flags> = RefCell::new(Flags::default()));

// prints every executed tick
macro_rules! v_trace {
    ($($arg:tt)*) => {{
        TFLAGS.with(|tflags| {
            if tflags.borrow().v_option {
                println!("{}", format_args!($($arg)*));
            }
        })
    }};
}

// prints the queues after every tick
macro_rules! q_trace {
    ($($arg:tt)*) => {{
        TFLAGS.with(|tflags| {
            if tflags.borrow().q_option {
                println!("{}", format_args!($($arg)*));
            }
        })
    }};
}

const LEVELS_PATTERN: &str = r"^(\d+):(\d+)(?::(\d+(?:\.\d+)?))?$";

struct Options {
    config: SchedulerConfig,
    strategy: LastLevelStrategy,
    workload: Workload,
    compare: bool,
    json: bool,
    max_ticks: Time,
}

fn valid_strategy(value: &str) -> Result<(), String> {
    let re = Regex::new(r"^[RSArsa]$").map_err(|e| e.to_string())?;
    if !re.is_match(value) {
        Err(format!(
            "Invalid strategy: {}. Must be one of R (round robin), S (shortest remaining) or A (aging priority)",
            value
        ))
    } else {
        Ok(())
    }
}

// <queues>:<base quantum>[:<multiplier>]
fn parse_levels(value: &str) -> Result<(usize, Time, Option<f64>), String> {
    let re = Regex::new(LEVELS_PATTERN).map_err(|e| e.to_string())?;
    let caps = re.captures(value).ok_or_else(|| {
        format!(
            "Invalid level specification: {}. Must look like <queues>:<quantum>[:<multiplier>]",
            value
        )
    })?;
    let queues = caps[1].parse().map_err(|_| "queue count too large".to_owned())?;
    let quantum = caps[2].parse().map_err(|_| "quantum too large".to_owned())?;
    let multiplier = match caps.get(3) {
        Some(m) => Some(m.as_str().parse().map_err(|_| "bad multiplier".to_owned())?),
        None => None,
    };
    Ok((queues, quantum, multiplier))
}

fn valid_levels(value: &str) -> Result<(), String> {
    parse_levels(value).map(|_| ())
}

fn valid_number(value: &str) -> Result<(), String> {
    value
        .parse::<u64>()
        .map(|_| ())
        .map_err(|_| format!("{} is not a non-negative integer", value))
}

fn valid_multiplier(value: &str) -> Result<(), String> {
    value
        .parse::<f64>()
        .map(|_| ())
        .map_err(|_| format!("{} is not a number", value))
}

fn build_cli() -> Command<'static> {
    Command::new("mlfq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multilevel feedback queue CPU scheduling simulator")
        .arg(
            Arg::new("strategy")
                .short('s')
                .long("strategy")
                .takes_value(true)
                .default_value("R")
                .validator(valid_strategy)
                .help("Last-level strategy (R, S or A)"),
        )
        .arg(
            Arg::new("levels")
                .long("levels")
                .takes_value(true)
                .validator(valid_levels)
                .help("Queue layout <queues>:<quantum>[:<multiplier>]"),
        )
        .arg(
            Arg::new("queues")
                .long("queues")
                .takes_value(true)
                .validator(valid_number)
                .help("Number of priority levels"),
        )
        .arg(
            Arg::new("quantum")
                .long("quantum")
                .takes_value(true)
                .validator(valid_number)
                .help("Quantum of the top level"),
        )
        .arg(
            Arg::new("multiplier")
                .long("multiplier")
                .takes_value(true)
                .validator(valid_multiplier)
                .help("Quantum growth factor per level"),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .takes_value(true)
                .conflicts_with("config")
                .help("standard, fine, coarse or aggressive"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .help("TOML file with scheduler parameters"),
        )
        .arg(
            Arg::new("boost")
                .long("boost")
                .takes_value(true)
                .validator(valid_number)
                .help("Priority boost interval, 0 disables boosting"),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .takes_value(true)
                .validator(valid_number)
                .help("Throughput sampling interval"),
        )
        .arg(
            Arg::new("inputfile")
                .long("inputfile")
                .takes_value(true)
                .conflicts_with_all(&["example", "random"])
                .help("Process list, one `arrival burst` pair per line"),
        )
        .arg(
            Arg::new("example")
                .long("example")
                .takes_value(true)
                .conflicts_with("random")
                .help("Built-in process set: standard, cpu or io"),
        )
        .arg(
            Arg::new("random")
                .long("random")
                .takes_value(true)
                .requires("rfile")
                .validator(valid_number)
                .help("Generate this many random processes"),
        )
        .arg(
            Arg::new("rfile")
                .long("rfile")
                .takes_value(true)
                .help("Random number file used by --random"),
        )
        .arg(
            Arg::new("compare")
                .long("compare")
                .help("Run the workload under every last-level strategy"),
        )
        .arg(Arg::new("json").long("json").help("Print the final state as JSON"))
        .arg(
            Arg::new("max_ticks")
                .long("max-ticks")
                .takes_value(true)
                .default_value("100000")
                .validator(valid_number)
                .help("Stop after this many ticks even if unfinished"),
        )
        .arg(Arg::new("v_flag").short('v').help("Trace every tick"))
        .arg(Arg::new("q_flag").short('q').help("Show the queues after every tick"))
}

fn scheduler_config(matches: &ArgMatches) -> Result<SchedulerConfig> {
    let mut config = if let Some(name) = matches.value_of("preset") {
        Preset::parse(name)?.config()
    } else if let Some(path) = matches.value_of("config") {
        SchedulerConfig::from_toml_file(Path::new(path))?
    } else {
        SchedulerConfig::default()
    };

    if let Some(spec) = matches.value_of("levels") {
        let (queues, quantum, multiplier) = parse_levels(spec).map_err(anyhow::Error::msg)?;
        config.num_queues = queues;
        config.base_quantum = quantum;
        if let Some(m) = multiplier {
            config.quantum_multiplier = m;
        }
    }
    if let Some(queues) = matches.value_of("queues") {
        config.num_queues = queues.parse().context("queue count")?;
    }
    if let Some(quantum) = matches.value_of("quantum") {
        config.base_quantum = quantum.parse().context("base quantum")?;
    }
    if let Some(multiplier) = matches.value_of("multiplier") {
        config.quantum_multiplier = multiplier.parse().context("quantum multiplier")?;
    }
    if let Some(boost) = matches.value_of("boost") {
        config.boost_interval = boost.parse().context("boost interval")?;
    }
    if let Some(sample) = matches.value_of("sample") {
        config.throughput_interval = sample.parse().context("sampling interval")?;
    }

    config.validate().context("invalid scheduler configuration")?;
    Ok(config)
}

fn load_workload(matches: &ArgMatches) -> Result<Workload> {
    if let Some(path) = matches.value_of("inputfile") {
        let workload = read_input_file(Path::new(path))?;
        if workload.is_empty() {
            bail!("{} holds no processes", path);
        }
        return Ok(workload);
    }

    if let Some(count) = matches.value_of("random") {
        let rfile = matches.value_of("rfile").context("--random needs --rfile")?;
        let generator = GeneratorConfig {
            num_processes: count.parse().context("process count")?,
            ..GeneratorConfig::default()
        };
        generator.validate().context("invalid workload parameters")?;
        let mut rng = RandGenerator::new(Path::new(rfile))?;
        return Ok(workload::random_workload(&generator, &mut rng));
    }

    let set = matches
        .value_of("example")
        .map(ExampleSet::from_name_or_default)
        .unwrap_or_default();
    info!("using example set {}", set.name());
    Ok(set.workload())
}

fn parse_args(actual_args: &[String]) -> Result<Options> {
    let matches = build_cli().get_matches_from(actual_args);

    TFLAGS.with(|tflags| {
        let mut tflags = tflags.borrow_mut();
        tflags.v_option = matches.is_present("v_flag");
        tflags.q_option = matches.is_present("q_flag");
    });

    let strategy = matches
        .value_of("strategy")
        .map(LastLevelStrategy::from_name_or_default)
        .unwrap_or_default();

    Ok(Options {
        config: scheduler_config(&matches)?,
        strategy,
        workload: load_workload(&matches)?,
        compare: matches.is_present("compare"),
        json: matches.is_present("json"),
        max_ticks: matches
            .value_of("max_ticks")
            .unwrap_or("100000")
            .parse()
            .context("max ticks")?,
    })
}

fn simulate(options: &Options) -> Result<Scheduler> {
    let mut scheduler = Scheduler::new(options.config.clone());
    scheduler.set_strategy(options.strategy);
    workload::load(&mut scheduler, &options.workload);

    v_trace!("TRACE quanta={:?} strategy={}", options.config.quanta(), options.strategy);
    let mut ticks = 0;
    while !scheduler.is_complete() && ticks < options.max_ticks {
        let logged = scheduler.execution_log().len();
        let done = scheduler.completed_count();
        scheduler.step();
        ticks += 1;

        match scheduler.execution_log().get(logged) {
            Some(rec) => {
                v_trace!("{}: P{:02} Q{}", rec.start, rec.pid, rec.level);
            }
            None => {
                v_trace!("{}: idle", scheduler.current_time() - 1);
            }
        }
        for p in scheduler.completed_processes().skip(done) {
            v_trace!(
                "{}: P{:02} done TAT={} WAIT={}",
                scheduler.current_time(),
                p.pid(),
                p.turnaround_time(),
                p.wait_time()
            );
        }
        q_trace!("\t{}", report::queue_line(&scheduler));
    }

    if !scheduler.is_complete() {
        warn!(
            "stopped after {} ticks with {}/{} processes complete",
            ticks,
            scheduler.completed_count(),
            scheduler.processes().len()
        );
    }
    Ok(scheduler)
}

fn run(options: Options) -> Result<()> {
    if options.compare {
        let rows = report::compare_strategies(&options.config, &options.workload, options.max_ticks);
        if options.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print!("{}", report::comparison_table(&rows));
        }
        return Ok(());
    }

    let scheduler = simulate(&options)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report::snapshot(&scheduler))?);
        return Ok(());
    }

    print!("{}", report::process_table(&scheduler));
    print!("{}", report::stats_summary(&scheduler));
    println!("GANTT");
    print!("{}", report::gantt_chart(&scheduler));
    if !scheduler.throughput_samples().is_empty() {
        println!("THROUGHPUT");
        print!("{}", report::throughput_table(scheduler.throughput_samples()));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = std::env::args().collect::<Vec<String>>();
    let options = parse_args(&args)?;
    run(options)
}
