use std::path::PathBuf;
use std::time::Duration;

use actix::System;
use anyhow::Context;
use clap::Parser;
use listrev_modules::ModuleRegistry;
use listrev_runtime::{AppConfig, Application};
use log::info;

/// Run the list reversal DAQ application
#[derive(Debug, Parser)]
#[command(name = "listrev", version, about)]
struct Args {
    /// JSON application description (defaults to the built-in topology)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds to run between start and stop
    #[arg(short, long, default_value_t = 5)]
    run_secs: u64,

    /// Log level (off, error, warn, info, debug, trace), overriding RUST_LOG
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match &args.log_level {
        Some(level) => {
            let level: log::LevelFilter = level
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid log level {}: {}", level, e))?;
            listrev_core::init_logging(level)?;
        }
        None => env_logger::init_from_env(env_logger::Env::default().default_filter_or("info")),
    }

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading application description {}", path.display()))?,
        None => AppConfig::reference(),
    };

    let system = System::new();
    system.block_on(async move {
        let registry = ModuleRegistry::with_builtin_modules();
        let app = Application::build(&config, &registry).context("building application")?;
        info!("Application built with modules {:?}", app.module_names());

        app.init().await.context("initializing modules")?;
        app.run_for(Duration::from_secs(args.run_secs))
            .await
            .context("running modules")?;

        for (module, stats) in app.stats().await? {
            println!("{}: {}", module, stats);
        }
        Ok::<(), anyhow::Error>(())
    })
}
