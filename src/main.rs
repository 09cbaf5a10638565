//! CLI for previewing generated worlds and dungeon floors.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use world_forge::ascii;
use world_forge::biomes::BiomeTable;
use world_forge::chunks::{ChunkStreamer, StreamerConfig};
use world_forge::dungeon::DungeonRegistry;
use world_forge::seeds::WorldSeeds;

#[derive(Parser)]
#[command(name = "world_forge", about = "Seeded world and dungeon generator")]
struct Cli {
    /// Master world seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Dungeon definition JSON file; omitted = built-in roster
    #[arg(long)]
    definitions: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a window of the overworld around a world position
    Overworld {
        #[arg(long, default_value_t = 0)]
        x: i64,
        #[arg(long, default_value_t = 0)]
        y: i64,
        #[arg(long, default_value_t = 96)]
        width: usize,
        #[arg(long, default_value_t = 40)]
        height: usize,
    },
    /// Render one floor of a dungeon
    Dungeon {
        /// Dungeon id, e.g. "burial_barrow"
        id: String,
        #[arg(long, default_value_t = 0)]
        floor: u32,
    },
    /// List the registered dungeon ids
    List,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let seeds = WorldSeeds::from_master(cli.seed);
    let registry = load_registry(cli.definitions.as_deref())?;

    match cli.command {
        Command::Overworld { x, y, width, height } => {
            let mut streamer = ChunkStreamer::new(
                seeds,
                BiomeTable::default_table(),
                StreamerConfig::default(),
            );
            print!("{}", ascii::render_overworld(&mut streamer, x, y, width, height));
        }
        Command::Dungeon { id, floor } => {
            let map = registry.generate_floor(&id, floor, &seeds);
            println!("{} (floor {floor}, {}x{})", map.id, map.width(), map.height());
            print!("{}", ascii::render_map(&map));
        }
        Command::List => {
            let mut ids: Vec<&str> = registry.ids().collect();
            ids.sort_unstable();
            for id in ids {
                println!("{id}");
            }
        }
    }
    Ok(())
}

fn load_registry(path: Option<&std::path::Path>) -> Result<DungeonRegistry, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(DungeonRegistry::builtin());
    };
    let json = fs::read_to_string(path)?;
    DungeonRegistry::from_json(&json).map_err(|errors| {
        let listing = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n  ");
        format!("invalid dungeon definitions:\n  {listing}").into()
    })
}
