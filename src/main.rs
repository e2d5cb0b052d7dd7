//! hashsim CLI entry point

use anyhow::{Context, Result};
use hashsim::config::cli::Cli;
use hashsim::config::{toml::load_config, validator::validate_config, Config, OutputFormat};
use hashsim::coordinator::{RunController, RunObserver, RunRequest, RunState};
use hashsim::engine::{RunResult, Strategy};
use hashsim::error::EngineError;
use hashsim::output::{csv, json, text};
use log::{debug, info};
use std::io::Write;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    if cli.list_strategies {
        list_strategies();
        return Ok(());
    }

    cli.validate()?;
    let config = load_config(&cli)?;
    init_logging(config.runtime.debug);
    debug!("Effective configuration: {:?}", config);

    validate_config(&config).context("Configuration validation failed")?;

    if config.output.format == OutputFormat::Text {
        print_configuration(&config);
    }

    if config.runtime.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let observer = ConsoleObserver::new(config.output.live_progress);
    let mut controller = RunController::new(observer);

    let mut request = RunRequest::new(config.run.strategy, config.run.boxes, config.draws());
    request.seed = config.run.seed;
    controller.start(request).context("Failed to start simulation")?;

    match controller.wait() {
        RunState::Completed => {
            let result = controller
                .take_result()
                .context("Run completed without a result")?;
            report(&result, &config)
        }
        RunState::Cancelled => {
            println!("Run cancelled");
            Ok(())
        }
        RunState::Failed => {
            let error = controller.error().cloned().unwrap_or(EngineError::WorkerLost);
            Err(anyhow::Error::new(error).context("Simulation failed"))
        }
        state => anyhow::bail!("Run ended in unexpected state: {}", state),
    }
}

/// Install the logger; `RUST_LOG` still wins when set
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

fn list_strategies() {
    println!("Available strategies:");
    for (arg, strategy) in ["chaining", "double-choice", "linear", "quadratic"]
        .iter()
        .zip(Strategy::ALL)
    {
        println!("  {:<14} {}", arg, strategy);
    }
}

fn print_configuration(config: &Config) {
    println!("hashsim v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Configuration:");
    println!("  Strategy: {}", config.run.strategy);
    println!("  Boxes:    {}", config.run.boxes);
    println!("  Draws:    {}", config.draws());
    match config.run.seed {
        Some(seed) => println!("  Seed:     {}", seed),
        None => println!("  Seed:     random"),
    }
    if let Some(path) = &config.output.json_path {
        println!("  JSON:     {}", path.display());
    }
    if let Some(path) = &config.output.csv_path {
        println!("  CSV:      {}", path.display());
    }
    println!();
}

fn report(result: &RunResult, config: &Config) -> Result<()> {
    match config.output.format {
        OutputFormat::Text => text::print_results(result, &config.output),
        OutputFormat::Json => {
            let report = json::build_report(result, config.run.seed, config.output.show_bins);
            println!("{}", json::to_json_string(&report)?);
        }
    }

    if let Some(path) = &config.output.json_path {
        let report = json::build_report(result, config.run.seed, true);
        json::write_json_output(path, &report)?;
        info!("JSON report written to {}", path.display());
    }

    if let Some(path) = &config.output.csv_path {
        csv::write_bins_csv(path, result.bins())?;
        info!("Box dump written to {}", path.display());
    }

    Ok(())
}

/// Prints live progress to stderr
struct ConsoleObserver {
    live_progress: bool,
}

impl ConsoleObserver {
    fn new(live_progress: bool) -> Self {
        Self { live_progress }
    }
}

impl RunObserver for ConsoleObserver {
    fn on_progress(&mut self, percent: u8) {
        if self.live_progress {
            eprint!("\rProgress: {:>3}%", percent);
            if percent == 100 {
                eprintln!();
            }
            let _ = std::io::stderr().flush();
        }
    }

    fn on_cancelled(&mut self) {
        if self.live_progress {
            eprintln!();
        }
    }

    fn on_failed(&mut self, _error: &EngineError) {
        if self.live_progress {
            eprintln!();
        }
    }
}
