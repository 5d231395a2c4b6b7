mod cli;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use rtt_av::{MediaProber, ToolRegistry};
use rtt_core::config::{Config, DEFAULT_SEGMENT_LENGTH_SECS};
use rtt_core::PlanningStrategy;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "rttstream=trace,rtt_server=trace,rtt_av=trace,rtt_media=debug,tower_http=debug"
                .to_string()
        } else {
            "rttstream=debug,rtt_server=debug,rtt_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        Some(Commands::CheckTools) => rt.block_on(check_tools(cli.config.as_deref())),
        Some(Commands::Probe { ref file, json }) => {
            rt.block_on(probe_file(file, json, cli.config.as_deref()))
        }
        None => {
            let (config, root) = startup_config(&cli);
            rt.block_on(rtt_server::start(config, root))?;
            Ok(())
        }
    }
}

/// Merge the config file with command-line overrides and pick the root.
fn startup_config(cli: &Cli) -> (Config, PathBuf) {
    let mut config = Config::load_or_default(cli.config.as_deref());

    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref raw) = cli.segment_time {
        config.segment.length_secs = parse_segment_time(raw).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid segment time '{raw}', using {DEFAULT_SEGMENT_LENGTH_SECS} seconds"
            );
            DEFAULT_SEGMENT_LENGTH_SECS
        });
    }
    if let Some(ref raw) = cli.strategy {
        match raw.parse::<PlanningStrategy>() {
            Ok(strategy) => config.segment.strategy = strategy,
            Err(e) => tracing::warn!("{e}; keeping {}", config.segment.strategy),
        }
    }
    if let Some(max) = cli.max_transcodes {
        config.transcode.max_concurrent = max;
    }

    let root = resolve_root(cli.root.clone().or_else(|| config.server.root_dir.clone()));
    (config, root)
}

/// A positive whole number of seconds.
fn parse_segment_time(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|&secs| secs > 0)
}

/// The requested root if it is a directory, otherwise the working directory.
fn resolve_root(requested: Option<PathBuf>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match requested {
        Some(dir) if dir.is_dir() => dir,
        Some(dir) => {
            tracing::warn!(
                "Root directory {} is not a directory, serving {} instead",
                dir.display(),
                cwd.display()
            );
            cwd
        }
        None => {
            tracing::warn!("No root directory given, serving {}", cwd.display());
            cwd
        }
    }
}

async fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = Config::load_or_default(config_path);
    let registry = ToolRegistry::discover(&config.tools);
    let mut all_ok = true;

    for tool in registry.check_all().await {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Playlist and segment requests will fail without them.");
    }

    Ok(())
}

async fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = Config::load_or_default(config_path);
    let registry = ToolRegistry::discover(&config.tools);
    let asset = MediaProber::new(registry.program("ffprobe"))
        .probe(file)
        .await?;

    if json {
        let value = serde_json::json!({
            "path": asset.path,
            "duration": asset.duration.to_string(),
            "has_audio": asset.has_audio,
            "time_base": asset.time_base.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("File: {}", asset.path.display());
        println!("Duration: {} s", asset.duration);
        println!("Audio: {}", if asset.has_audio { "yes" } else { "no" });
        println!("Time base: {}", asset.time_base);
    }

    Ok(())
}
