use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, trace};
use std::path::PathBuf;
use std::time::Instant;

use epidemic_engine::output::{save_batch_csv, save_snapshots, save_time_series_csv, OutputFormat};
use epidemic_engine::{BatchRunner, BatchSummary, Simulation, SimulationConfig};

/// Command-line arguments for the epidemic engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config.toml file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single simulation and save its time series
    Run {
        /// Number of steps (overrides run.steps)
        #[arg(long)]
        steps: Option<u32>,
        /// Random seed (overrides run.seed)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run independent trials and report how often the virus was defeated
    Batch {
        /// Number of trials (overrides batch.trials)
        #[arg(long)]
        trials: Option<u32>,
        /// Steps per trial (overrides batch.steps_per_trial)
        #[arg(long)]
        steps: Option<u32>,
        /// Seed of the first trial (overrides batch.base_seed)
        #[arg(long)]
        base_seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    // Initialize the logger, defaulting to info so run progress is visible
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // --- Load Configuration ---
    let config = SimulationConfig::load(&args.config)?;
    debug!("Configuration: {:#?}", config);
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    match args.command {
        Command::Run { steps, seed } => {
            let steps = steps.unwrap_or(config.run.steps);
            let seed = seed.unwrap_or(config.run.seed);
            run_single(&config, steps, seed)
        }
        Command::Batch { trials, steps, base_seed } => {
            let mut batch = config.batch.clone();
            batch.trials = trials.unwrap_or(batch.trials);
            batch.steps_per_trial = steps.unwrap_or(batch.steps_per_trial);
            batch.base_seed = base_seed.unwrap_or(batch.base_seed);
            run_batch(&config, BatchRunner::new(batch.trials, batch.steps_per_trial).with_base_seed(batch.base_seed))
        }
    }
}

fn run_single(config: &SimulationConfig, total_steps: u32, seed: u64) -> Result<()> {
    let params = config.get_sim_params(seed)?;
    let mut sim = Simulation::new(params)?;
    info!(
        "Simulation initialized with {} agents, {} initially infected.",
        sim.population(),
        sim.infected_count()
    );

    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let print_interval_steps = (total_steps / 10).max(1);

    for step in 0..total_steps {
        sim.step();
        let is_last_step = step + 1 == total_steps;
        if (step + 1) % print_interval_steps == 0 || is_last_step {
            info!(
                "Step [{}/{}] | Infected: {} | Immune: {} | Elapsed: {:.2} s",
                step + 1,
                total_steps,
                sim.infected_count(),
                sim.immune_count(),
                start_time.elapsed().as_secs_f64()
            );
        } else {
            trace!("Step [{}/{}] completed", step + 1, total_steps);
        }
    }

    info!("Simulation finished in {:.3} seconds.", start_time.elapsed().as_secs_f64());
    if !sim.running() {
        info!("The infection died out before the horizon.");
    }

    // --- Save Recorded Data ---
    let output = &config.output;
    let snapshots = sim.stats().series();
    if output.save_stats {
        let format = OutputFormat::from_config(output.format.as_deref());
        save_snapshots(&output.base_filename, format, snapshots)?;
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }
    if output.save_time_series {
        save_time_series_csv(format!("{}_time_series.csv", output.base_filename), snapshots)?;
    }

    info!("Simulation Complete.");
    Ok(())
}

fn run_batch(config: &SimulationConfig, runner: BatchRunner) -> Result<()> {
    let params = config.get_sim_params(runner.base_seed)?;

    let pb = ProgressBar::new(u64::from(runner.trials));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} trials {msg}")?
            .progress_chars("#>-"),
    );

    let start_time = Instant::now();
    let results = runner.run(&params, Some(&pb))?;
    pb.finish_with_message("done");
    info!("Batch finished in {:.3} seconds.", start_time.elapsed().as_secs_f64());

    let summary = BatchSummary::from_results(&results);
    debug!("Batch summary: {:?}", summary);
    info!(
        "Mean final infected: {:.2} | Mean final immune: {:.2}",
        summary.mean_final_infected, summary.mean_final_immune
    );
    info!("Percentage of times the virus was defeated: {}", summary.percent_defeated);

    if config.output.save_stats {
        save_batch_csv(format!("{}_batch.csv", config.output.base_filename), &results)?;
    }
    Ok(())
}
