//! sc-monitor - bind a Steam Controller and watch what it reports.

mod device;
mod sink;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hid_steam_controller_protocol::MotionMode;
use hidapi::HidApi;
use sc_hid_common::hidapi_transport::HidapiFrameReader;
use steam_controller_driver::{DeviceSession, ProbeOutcome, SessionConfig, Setting};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::sink::PrintingSink;

/// Read timeout of one pump iteration.
const POLL_MS: i32 = 100;

#[derive(Parser, Debug)]
#[command(name = "sc-monitor", version)]
#[command(about = "Bind a Steam Controller and print decoded input")]
struct Cli {
    /// Output in JSON, one object per line
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List Valve HID interfaces and whether they would be bound
    List,

    /// Bind a controller and print its input
    Monitor {
        /// hidraw path of the interface (default: first controller found)
        #[arg(long)]
        path: Option<String>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Report motion as tilt angles instead of raw accelerometer values
        #[arg(long)]
        tilt: bool,

        /// Keep the motion endpoint open so the motion sensors stay powered
        #[arg(long)]
        motion: bool,

        /// Session configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write a setting before monitoring, e.g. `--set automouse=on`
        #[arg(long = "set", value_parser = parse_assignment)]
        settings: Vec<(Setting, String)>,
    },

    /// Write settings once the controller is up, then print all of them
    Settings {
        /// hidraw path of the interface (default: first controller found)
        #[arg(long)]
        path: Option<String>,

        /// How long to wait for a receiver to report its controller
        #[arg(long, default_value = "5")]
        wait: u64,

        /// Setting to write, e.g. `--set orientation=0x14`
        #[arg(long = "set", value_parser = parse_assignment)]
        settings: Vec<(Setting, String)>,
    },
}

fn parse_assignment(s: &str) -> Result<(Setting, String), String> {
    let (name, token) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <setting>=<value>, got '{s}'"))?;
    let setting = name.parse::<Setting>().map_err(|e| e.to_string())?;
    Ok((setting, token.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let api = HidApi::new().context("Failed to initialize hidapi")?;
    match cli.command {
        Commands::List => list(&api, cli.json),
        Commands::Monitor {
            path,
            duration,
            tilt,
            motion,
            config,
            settings,
        } => {
            let mut config = load_config(config.as_deref())?;
            if tilt {
                config.motion_mode = MotionMode::Tilt;
            }
            let sink = PrintingSink {
                json: cli.json,
                open_motion: motion,
            };
            monitor(
                &api,
                path.as_deref(),
                duration.map(Duration::from_secs),
                config,
                sink,
                &settings,
            )
        }
        Commands::Settings {
            path,
            wait,
            settings,
        } => configure(
            &api,
            path.as_deref(),
            Duration::from_secs(wait),
            &settings,
            cli.json,
        ),
    }
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: SessionConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn list(api: &HidApi, json: bool) -> Result<()> {
    let interfaces = device::enumerate(api);
    if json {
        println!("{}", serde_json::to_string_pretty(&interfaces)?);
        return Ok(());
    }
    if interfaces.is_empty() {
        println!("No Valve HID interfaces found.");
        return Ok(());
    }
    println!("{:<24} {:<8} {:<6} Verdict", "Path", "PID", "Bind");
    println!("{}", "-".repeat(72));
    for iface in &interfaces {
        println!(
            "{:<24} {:<8} {:<6} {}",
            iface.info.path,
            format!("0x{:04X}", iface.info.product_id),
            if iface.bindable { "yes" } else { "no" },
            iface.verdict,
        );
    }
    Ok(())
}

fn bind(
    api: &HidApi,
    path: Option<&str>,
    config: SessionConfig,
    sink: PrintingSink,
) -> Result<(DeviceSession, HidapiFrameReader)> {
    let device::OpenController {
        info,
        control,
        frames,
    } = device::open_controller(api, path)?;
    let location = info.path.clone();
    match DeviceSession::probe(info, Arc::new(control), Arc::new(sink), config)? {
        ProbeOutcome::Bound(session) => Ok((session, frames)),
        ProbeOutcome::Skipped(verdict) => {
            anyhow::bail!("{location} is not a controller interface: {verdict:?}")
        }
    }
}

fn configure(
    api: &HidApi,
    path: Option<&str>,
    wait: Duration,
    settings: &[(Setting, String)],
    json: bool,
) -> Result<()> {
    let sink = PrintingSink {
        json,
        open_motion: false,
    };
    let (session, mut frames) = bind(api, path, SessionConfig::default(), sink)?;

    // A receiver only initializes once its controller reports in.
    let deadline = Instant::now().checked_add(wait);
    while !session.is_ready() && deadline.is_some_and(|deadline| Instant::now() < deadline) {
        session.pump(&mut frames, POLL_MS)?;
        session.wait_idle();
    }
    if !session.is_ready() {
        warn!("No controller connected; settings are only stored locally");
    }

    for (setting, token) in settings {
        session.write_setting(*setting, token)?;
    }
    let values: BTreeMap<&str, String> = Setting::ALL
        .into_iter()
        .map(|setting| (setting.name(), session.read_setting(setting)))
        .collect();
    session.shutdown();

    if json {
        println!("{}", serde_json::to_string(&values)?);
    } else {
        for (name, value) in &values {
            println!("{name:<18} {value}");
        }
    }
    Ok(())
}

fn monitor(
    api: &HidApi,
    path: Option<&str>,
    duration: Option<Duration>,
    config: SessionConfig,
    sink: PrintingSink,
    settings: &[(Setting, String)],
) -> Result<()> {
    let (session, mut frames) = bind(api, path, config, sink)?;
    let location = session.device_info().path.clone();
    for (setting, token) in settings {
        session.write_setting(*setting, token)?;
        info!("{} = {}", setting, session.read_setting(*setting));
    }

    let deadline = duration.and_then(|d| Instant::now().checked_add(d));
    info!("Monitoring {} ({})", location, session.topology());
    while deadline.is_none_or(|deadline| Instant::now() < deadline) {
        if let Err(e) = session.pump(&mut frames, POLL_MS) {
            warn!("Read from {} failed: {}", location, e);
            break;
        }
    }

    let stats = session.stats();
    session.shutdown();
    if sink.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!(
            "frames: {} received, {} ignored, {} bad length; jobs: {} run, {} coalesced, {} dropped",
            stats.frames_received,
            stats.frames_ignored,
            stats.malformed_lengths,
            stats.jobs_executed,
            stats.jobs_coalesced,
            stats.jobs_dropped,
        );
    }
    Ok(())
}
