use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use ptp_sim::{config::Config, observer, setup_logger, simulation::Simulation};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Configuration file describing the simulated network
    #[clap(short, long, default_value = "ptp-sim.toml")]
    config: PathBuf,

    /// Set desired logging level, overriding the configuration file
    #[clap(short, long)]
    loglevel: Option<log::LevelFilter>,

    /// Seconds of simulated time to run, overriding the configuration file
    #[clap(short, long)]
    duration: Option<u64>,

    /// Print the final state of every clock as JSON
    #[clap(long)]
    json: bool,

    /// Let simulated time pass at wall clock speed instead of skipping ahead
    /// whenever all clocks are idle
    #[clap(long)]
    realtime: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = Config::from_file(&args.config).await?;
    let loglevel = match args.loglevel {
        Some(level) => level,
        None => log::LevelFilter::from_str(&config.loglevel)
            .map_err(|_| format!("unknown log level {:?}", config.loglevel))?,
    };
    setup_logger(loglevel)?;

    let duration = Duration::from_secs(args.duration.unwrap_or(config.duration));
    if !args.realtime {
        tokio::time::pause();
    }

    let mut simulation = Simulation::new(&config)?;
    simulation.start()?;
    tracing::info!(
        clocks = config.clocks.len(),
        links = config.links.len(),
        "simulating {:?}",
        duration
    );

    simulation.run(duration).await;
    let status = simulation.status();
    simulation.stop()?;

    if args.json {
        observer::write_json(std::io::stdout().lock(), &status)?;
        println!();
    } else {
        for clock in &status {
            let offset = clock
                .offset_from_grandmaster
                .map_or_else(|| "-".to_owned(), |offset| format!("{offset}ns"));
            println!(
                "{:<16} {:<12} synchronized: {:<5} offset: {:>12} frequency: {:.1}ppb",
                clock.name,
                clock.kind,
                clock.synchronized,
                offset,
                clock.frequency_adjustment_ppb
            );
        }
    }

    Ok(())
}
