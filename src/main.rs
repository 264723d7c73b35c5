use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use turnwright::cli::commands;
use turnwright::config::ResolverConfig;

#[derive(Parser)]
#[command(name = "turnwright")]
#[command(about = "Deterministic turn resolution for edict-driven multi-faction strategy games")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "turnwright.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a turn-zero world from the roster
    Init {
        /// Output world file (defaults to state_file from the config)
        #[arg(short, long)]
        output: Option<String>,

        /// Overwrite an existing world file
        #[arg(long)]
        force: bool,
    },

    /// Resolve one turn and save the resulting world
    Resolve {
        /// Seed for the faction-order shuffle
        #[arg(short, long)]
        seed: u64,

        /// World file to read (defaults to state_file from the config)
        #[arg(short, long)]
        world: Option<String>,

        /// Orders file to read (defaults to orders_file from the config)
        #[arg(long)]
        orders: Option<String>,

        /// Where to write the new world (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the turn result as JSON instead of the log
        #[arg(long)]
        json: bool,
    },

    /// Check an orders file against the validator without resolving
    Validate {
        #[arg(short, long)]
        world: Option<String>,

        #[arg(long)]
        orders: Option<String>,
    },

    /// Show a faction's edict limits from the settlements it owns
    Limits {
        /// Faction id
        faction: String,

        #[arg(short, long)]
        world: Option<String>,
    },

    /// Inspect world or faction state
    Inspect {
        /// Faction id to inspect; world summary when omitted
        #[arg(short, long)]
        faction: Option<String>,

        #[arg(short, long)]
        world: Option<String>,
    },
}

fn init_tracing(config: &ResolverConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn exit_with(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let config = match ResolverConfig::from_file_or_default(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => exit_with("Error loading config", e),
    };
    init_tracing(&config);

    let state_path = |arg: Option<String>| PathBuf::from(arg.unwrap_or_else(|| config.state_file.clone()));
    let orders_path = |arg: Option<String>| PathBuf::from(arg.unwrap_or_else(|| config.orders_file.clone()));

    match cli.command {
        Commands::Init { output, force } => {
            let output = state_path(output);
            match commands::init_world(&config, &output, force) {
                Ok(world) => println!(
                    "World saved to {} ({} factions, {} settlements)",
                    output.display(),
                    world.factions.len(),
                    world.settlements.len()
                ),
                Err(e) => exit_with("Cannot initialize world", e),
            }
        }

        Commands::Resolve {
            seed,
            world,
            orders,
            output,
            json,
        } => {
            let input = state_path(world);
            let output = output.map(PathBuf::from).unwrap_or_else(|| input.clone());
            let orders = orders_path(orders);

            match commands::resolve(&config, &input, &orders, seed, &output) {
                Ok(result) if json => {
                    let payload = serde_json::json!({
                        "log": result.log.entries(),
                        "faction_order": result.faction_order,
                        "military_intents": result.military_intents,
                        "prepared_battles": result.prepared_battles,
                        "statistics": result.statistics,
                    });
                    match serde_json::to_string_pretty(&payload) {
                        Ok(text) => println!("{}", text),
                        Err(e) => exit_with("Cannot encode turn result", e),
                    }
                }
                Ok(result) => commands::print_turn(&result),
                Err(e) => exit_with("Turn failed", e),
            }
        }

        Commands::Validate { world, orders } => {
            match commands::validate_orders(&state_path(world), &orders_path(orders)) {
                Ok(report) => {
                    commands::print_validation(&report);
                    if !report.is_clean() {
                        std::process::exit(1);
                    }
                }
                Err(e) => exit_with("Cannot validate orders", e),
            }
        }

        Commands::Limits { faction, world } => {
            match commands::edict_limits(&config, &state_path(world), &faction) {
                Ok(limits) => commands::print_limits(&faction, &limits),
                Err(e) => exit_with("Cannot compute limits", e),
            }
        }

        Commands::Inspect { faction, world } => {
            if let Err(e) = commands::inspect(&state_path(world), faction.as_deref()) {
                exit_with("Error", e);
            }
        }
    }
}
