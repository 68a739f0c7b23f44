//! # MTC Tool Change
//!
//! Runs a sequence of tool changes against the simulated machine described
//! by the configuration file and reports the resulting tool state.
//!
//! ```text
//! mtc_toolchange --config config/toolchange.toml -t 1 -t 0 --state-json
//! ```

use clap::Parser;
use mtc_common::config::LogLevel;
use mtc_common::consts::DEFAULT_CONFIG_PATH;
use mtc_common::tool::types::ToolIndex;
use mtc_toolchange::config::{LoadedConfig, load_config};
use mtc_toolchange::{ChangeRequest, ToolChanger};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// MTC Tool Change: multi-tool switching against a simulated machine
#[derive(Parser, Debug)]
#[command(name = "mtc_toolchange")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Tool-change orchestrator for multi-extruder machines")]
struct Args {
    /// Path to the tool-change configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Tool to select. Repeat for a sequence of changes.
    #[arg(short, long = "tool", required = true)]
    tools: Vec<ToolIndex>,

    /// Run the full sequence even when the tool is already active.
    #[arg(long)]
    force: bool,

    /// Do not move back to the pre-change position.
    #[arg(long)]
    no_move: bool,

    /// Also run non-switch waypoints of the switch path.
    #[arg(long)]
    clean: bool,

    /// Travel feedrate for the changes [mm/s].
    #[arg(long)]
    feedrate: Option<f64>,

    /// Cut the fiber after the last change.
    #[arg(long)]
    cut_fiber: bool,

    /// Print the final tool state as JSON on stdout.
    #[arg(long)]
    state_json: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);
    let log_level = loaded
        .as_ref()
        .map_or(LogLevel::default(), |c| c.shared.log_level);
    setup_tracing(&args, log_level);

    info!("MTC Tool Change v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let machine = loaded.simulated_machine();
    let mut changer = ToolChanger::new(&loaded.toolchange, machine)?;
    info!(
        "Config OK: service={}, tools={}, actuator={}",
        loaded.shared.service_name,
        loaded.toolchange.tool_count,
        changer.actuator_kind()
    );

    for &tool in &args.tools {
        let outcome = changer.change(request(args, tool))?;
        info!("T{} -> {:?}", tool, outcome);
    }

    if args.cut_fiber {
        changer.cut_fiber()?;
    }

    info!(
        "Done: {} collaborator calls, active T{}",
        changer.machine().events().len(),
        changer.state().active_extruder
    );

    if args.state_json {
        println!("{}", serde_json::to_string_pretty(changer.state())?);
    }
    Ok(())
}

fn request(args: &Args, tool: ToolIndex) -> ChangeRequest {
    let mut req = ChangeRequest::to(tool);
    if let Some(f) = args.feedrate {
        req = req.with_feedrate(f);
    }
    if args.no_move {
        req = req.no_move();
    }
    if args.force {
        req = req.force();
    }
    if args.clean {
        req = req.clean();
    }
    req
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        log_level.as_tracing_level()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
