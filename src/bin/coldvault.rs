use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use coldvault::{pipeline, BackupConfig, RunLog, StatusEmailNotifier, ToolBundle};

#[derive(Parser)]
#[command(name = "coldvault", version, about = "Encrypted directory backups with retention")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Mirror log output to the console and pause before exiting
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("coldvault: {err:#}");
            ExitCode::FAILURE
        }
    };

    // The pause keys off the CLI flag alone: it must also cover runs where
    // the config (and its debug_mode) never loaded. config.debug_mode still
    // drives log mirroring inside run().
    if cli.debug {
        println!("Press Enter to exit.");
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }

    code
}

fn run(cli: &Cli) -> Result<()> {
    let config = BackupConfig::load(&cli.config)
        .with_context(|| format!("loading configuration '{}'", cli.config.display()))?;
    let debug = cli.debug || config.debug_mode;
    if debug {
        println!("Running in debug mode...");
    }

    let mut log = RunLog::open(&config.backup_dir, &config.log_file_name, debug)
        .context("opening run log")?;
    log.line(&format!("logging to file: {}", log.path().display()));

    let bundle_dir = match &config.tool_bundle_dir {
        Some(dir) => dir.clone(),
        None => ToolBundle::default_dir().context("resolving tool bundle directory")?,
    };
    let bundle = ToolBundle::new(bundle_dir);
    let notifier = StatusEmailNotifier::new(config.email.clone());

    let result = pipeline::run(&config, &bundle, &notifier, &mut log);
    match &result {
        Ok(report) => {
            log.line(&format!(
                "backup archive ready: {}",
                report.archive_path.display()
            ));
        }
        Err(err) => {
            log.line(&format!("backup run failed: {err}"));
        }
    }
    result.context("backup run failed")?;
    Ok(())
}
