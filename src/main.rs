use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::batch::BatchFetcher;
use crate::codec::ImageCodec;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::report::RunSummary;

mod batch;
mod codec;
mod config;
mod decoder;
mod encoder;
mod fetcher;
mod report;
#[cfg(test)]
mod test_support;

const LOG_CONFIG_PATH: &str = "log4rs.yaml";

/// Download images listed in a config file and store them as 8-bit RGB.
#[derive(Parser, Debug)]
#[command(name = "pixfetch", version)]
struct Cli {
    /// YAML config with output_root, jpeg_quality and the image list
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn init_logger(level: &str) {
    if Path::new(LOG_CONFIG_PATH).exists() {
        match log4rs::init_file(LOG_CONFIG_PATH, Default::default()) {
            Ok(_) => return,
            Err(e) => eprintln!("Cannot use {}: {:#}", LOG_CONFIG_PATH, e),
        }
    }

    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level));

    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Cannot initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Invalid logger configuration: {}", e),
    }
}

fn main() {
    let config_path = Cli::parse().config;

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
            process::exit(2);
        }
    };

    init_logger(&config.log_level);

    let batch = config.batch();
    if batch.is_empty() {
        warn!("No images configured in {}", config_path.display());
    }
    info!("Downloading {} images into {}", batch.len(), config.output_root.display());

    let fetcher = BatchFetcher::new(Box::new(HttpFetcher::new()), ImageCodec::default())
        .with_jpeg_quality(config.jpeg_quality);
    let outcomes = fetcher.run(&batch, &config.output_root);

    for outcome in outcomes.iter() {
        println!("{}", outcome);
    }

    let summary = RunSummary::from_outcomes(&outcomes);
    if !summary.failed.is_empty() {
        let failed: Vec<String> = summary.failed.iter().map(|p| p.display().to_string()).collect();
        error!("Run finished with failures: {} ({})", summary, failed.join(", "));
    } else {
        info!("Run finished: {}", summary);
    }

    process::exit(summary.exit_code(config.fail_on_error));
}
