//! CLI for droidlern.
//!
//! Operational commands against a single device: inspect it, drive single
//! actions, sample the UI hierarchy and run one environment step from a JSON
//! config. It is a thin shell over the library crates.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use droidlern_core::{Action, Cell, Environment, Point, RawAction, Step};
use droidlern_device::{list_devices, AdbTransport, Controller};
use droidlern_env::{dispatch, sampler, DiscreteWrapper, EnvConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the adb executable
    #[arg(long, env = "DROIDLERN_ADB", default_value = "adb", global = true)]
    adb: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DeviceArgs {
    /// Device serial (see `droidlern devices`)
    #[arg(long, env = "ANDROID_SERIAL")]
    device: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached devices
    Devices,
    /// Print the screen size of a device
    Size {
        #[command(flatten)]
        target: DeviceArgs,
    },
    /// Save a screenshot (PNG)
    Screenshot {
        #[command(flatten)]
        target: DeviceArgs,
        /// Output file
        #[arg(long, default_value = "screen.png")]
        out: PathBuf,
    },
    /// Save the UI hierarchy dump (XML)
    Dump {
        #[command(flatten)]
        target: DeviceArgs,
        /// Output file
        #[arg(long, default_value = "window.xml")]
        out: PathBuf,
    },
    /// Print the sampled element centers of the current screen as JSON
    Sample {
        #[command(flatten)]
        target: DeviceArgs,
    },
    /// Run a single action, e.g. '{"action_type":2,"pos":{"x":540,"y":1200}}'
    Act {
        #[command(flatten)]
        target: DeviceArgs,
        /// Action as JSON, either `{"action_type":..}` or `{"type":"tap",..}`
        action: String,
    },
    /// Reset an environment from a config file and run one step
    Step {
        /// Environment config (JSON)
        #[arg(long)]
        config: PathBuf,
        /// Action as JSON; positions are grid cells when the config has a grid
        #[arg(long)]
        action: String,
    },
    /// Print log lines that arrive within a short window
    Logs {
        #[command(flatten)]
        target: DeviceArgs,
        /// How long to collect, in milliseconds
        #[arg(long, default_value = "2000")]
        wait_ms: u64,
    },
}

#[derive(Serialize, Debug)]
struct StepReport {
    reward: f32,
    terminated: bool,
    truncated: bool,
    elements: usize,
    width: u32,
    height: u32,
}

impl From<&Step> for StepReport {
    fn from(step: &Step) -> Self {
        let (width, height) = step.observation.image.dimensions();
        Self {
            reward: step.reward,
            terminated: step.terminated,
            truncated: step.truncated,
            elements: step.observation.element_count(),
            width,
            height,
        }
    }
}

/// Accepts the loose `{"action_type":..}` record as well as the tagged form.
fn parse_action<P: DeserializeOwned>(json: &str) -> Result<Action<P>> {
    if let Ok(raw) = serde_json::from_str::<RawAction<P>>(json) {
        return Ok(Action::try_from(raw)?);
    }
    serde_json::from_str(json).with_context(|| format!("Invalid action: {json}"))
}

fn connect(transport: AdbTransport, target: &DeviceArgs) -> Result<Controller> {
    let controller = Controller::new(transport, target.device.clone())
        .with_context(|| format!("Failed to connect to {}", target.device))?;
    let size = controller.size();
    tracing::info!(
        device = %target.device,
        width = size.width,
        height = size.height,
        "connected"
    );
    Ok(controller)
}

fn run_step(transport: AdbTransport, config_path: &Path, action: &str) -> Result<Step> {
    let config = EnvConfig::load(config_path)
        .with_context(|| format!("Failed to load config {:?}", config_path))?;
    let env = config.build(transport).context("Failed to build environment")?;
    tracing::info!(device = %config.device, app = ?config.app, grid = ?config.grid, "environment ready");

    match config.grid {
        Some(grid) => {
            let action: Action<Cell> = parse_action(action)?;
            let mut env = DiscreteWrapper::new(env, grid.rows, grid.cols)?;
            env.reset();
            Ok(env.step(&action))
        }
        None => {
            let action: Action<Point> = parse_action(action)?;
            let mut env = env;
            env.reset();
            Ok(env.step(&action))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let transport = AdbTransport::new(&cli.adb);

    match cli.command {
        Commands::Devices => {
            let devices = list_devices(&transport)
                .with_context(|| format!("Could not list devices via {:?}", cli.adb))?;
            for serial in devices {
                println!("{serial}");
            }
        }
        Commands::Size { target } => {
            let controller = connect(transport, &target)?;
            let size = controller.size();
            println!("{}x{}", size.width, size.height);
        }
        Commands::Screenshot { target, out } => {
            let controller = connect(transport, &target)?;
            if controller.get_screenshot(&out).is_none() {
                bail!("Screenshot failed");
            }
            println!("Saved {:?}", out);
        }
        Commands::Dump { target, out } => {
            let controller = connect(transport, &target)?;
            if controller.get_xml(&out).is_none() {
                bail!("UI dump failed");
            }
            println!("Saved {:?}", out);
        }
        Commands::Sample { target } => {
            let controller = connect(transport, &target)?;
            let scratch = tempfile::tempdir().context("Failed to create scratch dir")?;
            let dump = scratch
                .path()
                .join(format!("droidlern-sample-{}.xml", std::process::id()));
            if controller.get_xml(&dump).is_none() {
                bail!("UI dump failed");
            }
            let (posx, posy) = sampler::sample_file(&dump);
            println!("{}", serde_json::json!({ "posx": posx, "posy": posy }));
        }
        Commands::Act { target, action } => {
            let action: Action = parse_action(&action)?;
            let controller = connect(transport, &target)?;
            match dispatch(&controller, &action, false) {
                Some(out) if !out.is_empty() => println!("{out}"),
                Some(_) => {}
                None => bail!("Action failed"),
            }
        }
        Commands::Step { config, action } => {
            let step = run_step(transport, &config, &action)?;
            serde_json::to_writer_pretty(std::io::stdout(), &StepReport::from(&step))?;
            println!();
        }
        Commands::Logs { target, wait_ms } => {
            let controller = connect(transport, &target)?;
            std::thread::sleep(Duration::from_millis(wait_ms));
            for line in controller.get_log() {
                println!("{line}");
            }
        }
    }

    Ok(())
}
