//! `streakly` launcher.
//!
//! # Responsibility
//! - Parse launcher flags and environment overrides.
//! - Start logging, then run the web UI on a multi-threaded runtime.
//!
//! # Invariants
//! - Once logging is up, every serve run ends with a `status=ok` or
//!   `status=error` line.

mod cli;

use clap::Parser;
use cli::{Cli, Command, ServeArgs};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;
use streakly_core::init_logging;
use streakly_web::ServeConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve(args) => run_serve(&args),
        Command::Version => {
            println!("streakly {}", env!("CARGO_PKG_VERSION"));
            println!("streakly_core {}", streakly_core::core_version());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_serve(args: &ServeArgs) -> Result<(), Box<dyn Error>> {
    let log_dir = args.resolved_log_dir(&std::env::current_dir()?);
    init_logging(args.log_level(), &log_dir)?;

    let config = args.serve_config();
    println!(
        "Streakly on http://{} (database: {})",
        config.bind,
        config.db_path.display()
    );
    info!("{}", serve_event("start", &config));

    let outcome = run_server(config.clone());
    match &outcome {
        Ok(()) => info!("{}", serve_event("ok", &config)),
        Err(err) => error!("{} error={err}", serve_event("error", &config)),
    }
    outcome
}

fn run_server(config: ServeConfig) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(streakly_web::serve(config))?;
    Ok(())
}

fn serve_event(status: &str, config: &ServeConfig) -> String {
    format!(
        "event=cli_serve module=cli status={status} bind={} db_path={}",
        config.bind,
        config.db_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::serve_event;
    use streakly_web::ServeConfig;

    #[test]
    fn serve_events_carry_status_and_target() {
        let config = ServeConfig {
            db_path: "data/habits.db".into(),
            bind: "127.0.0.1:8501".parse().unwrap(),
        };
        assert_eq!(
            serve_event("start", &config),
            "event=cli_serve module=cli status=start bind=127.0.0.1:8501 db_path=data/habits.db"
        );
        assert!(serve_event("error", &config).contains("status=error"));
    }
}
