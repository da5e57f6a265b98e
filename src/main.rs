use failure::{Error, Fail};
use serde::Serialize;
use std::env;
use std::path::Path;
use std::process;
use store_sim::config::{self, StoreConfig};
use store_sim::log::{ActivityLog, LogEntry};
use store_sim::simulation::event::{get_events, Event};
use store_sim::simulation::{Phase, Simulation};
use store_sim::store::Report;

#[derive(Debug, Fail)]
#[fail(display = "usage: store_sim <config-file> <events-file> [-json] [-color]")]
struct UsageError;

struct Options {
    config_path: String,
    events_path: String,
    json: bool,
    color: bool,
}

fn parse_args(args: &[String]) -> Result<Options, Error> {
    let mut paths = Vec::new();
    let mut json = false;
    let mut color = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-json" => json = true,
            "-color" => color = true,
            flag if flag.starts_with('-') => return Err(UsageError.into()),
            path => paths.push(path.to_string()),
        }
    }

    if paths.len() != 2 {
        return Err(UsageError.into());
    }

    let events_path = paths.pop().unwrap_or_default();
    let config_path = paths.pop().unwrap_or_default();

    Ok(Options {
        config_path,
        events_path,
        json,
        color,
    })
}

fn bootstrap_simulation(config: StoreConfig, events: Vec<Event>) -> Result<Simulation, Error> {
    config::validate_config(&config)?;

    Ok(Simulation::new(config, events))
}

#[derive(Serialize)]
struct RunResponse<'a> {
    phase: Phase,
    lines: Vec<String>,
    log: &'a ActivityLog,
    report: Report,
}

fn run_response(simulation: &mut Simulation) -> Result<RunResponse, Error> {
    simulation.run()?;

    Ok(RunResponse {
        phase: simulation.phase(),
        lines: simulation.log().lines(),
        log: simulation.log(),
        report: simulation.report(),
    })
}

fn print_entry(entry: &LogEntry) {
    println!("{}", entry.colored());
}

fn run_local(options: Options) -> Result<(), Error> {
    let config = config::get_config(Path::new(&options.config_path))?;
    let events = get_events(Path::new(&options.events_path))?;

    let mut simulation = bootstrap_simulation(config, events)?;

    if options.json {
        let resp = run_response(&mut simulation)?;

        println!("{}", serde_json::to_string_pretty(&resp)?);

        return Ok(());
    }

    colored::control::set_override(options.color);

    // Counters opened at setup are already in the log
    simulation.log().entries().iter().for_each(print_entry);

    while simulation.has_work() {
        simulation.tick()?.iter().for_each(print_entry);
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let result = parse_args(&args).and_then(run_local);

    if let Err(error) = result {
        eprintln!("error: {}", error);

        process::exit(1);
    }
}
