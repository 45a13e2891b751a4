use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;

use cluster_snn::config::NetworkConfig;
use cluster_snn::core::record::Recorder;
use cluster_snn::error::SNNError;

#[derive(Parser, Debug)]
struct Args {
    /// The JSON configuration of the simulation
    #[arg(short, long)]
    config: PathBuf,
    /// Where to save the record of the simulation (JSON)
    #[arg(short, long)]
    record: Option<PathBuf>,
    /// Override the number of workers of the configuration
    #[arg(short = 'W', long)]
    workers: Option<usize>,
    /// Also write the logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// The log level, one of: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(args: &Args) -> Result<(), SNNError> {
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|_| SNNError::InvalidParameters(format!("Unknown log level: {}", args.log_level)))?;
    let pattern = "{d(%H:%M:%S%.3f)} {l} [{T}] - {m}\n";
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let mut config = Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
    let mut root = Root::builder().appender("stdout");
    if let Some(path) = &args.log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .build(path)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
        config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(level))
        .map_err(|e| SNNError::IOError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| SNNError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), SNNError> {
    let args = Args::parse();
    init_logging(&args)?;
    log::info!("{:?}", args);

    let mut config = NetworkConfig::load_from(&args.config)?;
    if let Some(workers) = args.workers {
        config.num_workers = workers;
    }
    log::info!("Configuration loaded from {}", args.config.display());

    let mut network = config.build()?;
    let mut recorder = Recorder::new();
    network.run(&mut recorder)?;

    let record = recorder.into_record();
    for (t, output) in record.network_output().iter().enumerate() {
        log::info!(
            "Timestep {}: network output {:?}",
            t,
            output.iter().map(|&o| o as u8).collect::<Vec<u8>>()
        );
    }

    if let Some(path) = &args.record {
        record.save_to(path)?;
        log::info!("Record saved to {}", path.display());
    }
    Ok(())
}
