//! mp3-recorder CLI entry point

use std::process::ExitCode;

use clap::Parser;

use mp3_recorder::cli::{
    app::{default_output_path, load_merged_config, run_devices, run_record, run_worker},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging::init_logging,
    presenter::Presenter,
    RecordOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use mp3_recorder::domain::config::AppConfig;
use mp3_recorder::domain::recording::Duration;
use mp3_recorder::domain::worker::WorkerLocation;
use mp3_recorder::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Worker) => {
            init_logging(cli.debug);
            return run_worker().await;
        }
        Some(Commands::Devices) => {
            init_logging(cli.debug);
            return run_devices(&presenter);
        }
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Validate the worker flag before merging so a bad value is a usage error
    if let Some(worker) = cli.worker.as_deref() {
        if let Err(e) = worker.parse::<WorkerLocation>() {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        worker: cli.worker.clone(),
        device: cli.device.clone(),
        duration: cli.duration.clone(),
        drain_timeout: None,
        output_dir: None,
        debug: if cli.debug { Some(true) } else { None },
    };

    // Merge config
    let config = load_merged_config(cli_config).await;
    init_logging(config.debug_or_default());

    // Parse duration
    let duration = match config.duration.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => Some(d),
            Err(e) => {
                presenter.error(&format!("Invalid duration: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => None,
    };

    let options = RecordOptions {
        duration,
        output: cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&config.output_dir_or_default())),
        source: config.input_source(),
        worker: config.worker_or_default(),
        drain_timeout: config.drain_timeout_or_default(),
        debug: config.debug_or_default(),
    };

    run_record(options).await
}
