use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

mod cli;

use cli::Cli;
use cli::commands::Commands;
use startstop::HostConfig;
use startstop::daemon::{Request, ServiceHost, ServiceSummary, handle_request};
use startstop::loops;

fn setup_logging(to_stderr: bool, default_level: &str) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if to_stderr {
        builder.target(env_logger::Target::Stderr).init();
        return Ok(());
    }

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("startstop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("startstop.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &HostConfig) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Validate => handle_validate_command(config),
        Commands::Run { duration_secs } => handle_run_command(config, *duration_secs),
    }
}

fn handle_validate_command(config: &HostConfig) -> Result<()> {
    info!("Validating {} services", config.services.len());

    let mut failures = 0;
    if let Err(e) = config.validate() {
        println!("{} host config: {}", "FAIL".red(), e);
        failures += 1;
    }

    for service in &config.services {
        match loops::validate_config(service) {
            Ok(()) => println!("{} {} ({})", "OK".green(), service.name, service.model.dimmed()),
            Err(e) => {
                println!("{} {} ({}): {}", "FAIL".red(), service.name, service.model.dimmed(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eyre::bail!("{} validation failure(s)", failures);
    }
    println!("{}", "Configuration is valid".green());
    Ok(())
}

fn handle_run_command(config: &HostConfig, duration_secs: Option<u64>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let result = runtime.block_on(run_host(config, duration_secs));

    // Stdin reads park a blocking thread that never returns on its own.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run_host(config: &HostConfig, duration_secs: Option<u64>) -> Result<()> {
    let host = Arc::new(ServiceHost::spawn(config.clone()).await?);
    println!("{}", "Services started".cyan());
    print_summaries(&host.summaries());

    let deadline = async {
        match duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = &mut deadline => {
                info!("Run duration elapsed, shutting down");
                break;
            }
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => dispatch_line(&host, line).await?,
                    None => {
                        info!("End of input, shutting down");
                        break;
                    }
                }
            }
        }
    }

    println!("{}", "Stopping services...".cyan());
    let stopping = host.clone();
    tokio::task::spawn_blocking(move || stopping.stop_all())
        .await
        .context("Failed to stop services")?;
    print_summaries(&host.summaries());
    Ok(())
}

async fn dispatch_line(host: &Arc<ServiceHost>, line: String) -> Result<()> {
    let request = match Request::parse(&line) {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(e) => {
            println!("{} {}", "error:".red(), e);
            return Ok(());
        }
    };

    if request == Request::List {
        print_summaries(&host.summaries());
        return Ok(());
    }

    let host = host.clone();
    let reply = tokio::task::spawn_blocking(move || handle_request(&host, request))
        .await
        .context("Command task failed")?;

    match reply {
        Ok(value) => println!("{}", value),
        Err(e) => println!("{} {}", "error:".red(), e),
    }
    Ok(())
}

fn print_summaries(summaries: &[ServiceSummary]) {
    for summary in summaries {
        let status = if summary.status.is_running() {
            summary.status.to_string().green()
        } else {
            summary.status.to_string().yellow()
        };
        let outcome = summary
            .last_outcome
            .as_ref()
            .map(|o| format!(" last run: {:?}", o))
            .unwrap_or_default();
        println!("  {} [{}]{}", summary.name, status, outcome.dimmed());
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = HostConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let default_level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(cli.stderr, default_level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
