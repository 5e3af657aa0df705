use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tileworld_common::{Color, EntityId, TileId};
use tileworld_kernel::{FixedTicker, PlacementSpec, World};
use tileworld_nav::{SearchOptions, route_and_connect};
use tileworld_persist::{Autosaver, FileStore, PersistenceGateway};
use tileworld_tools::WorldInspector;

#[derive(Parser)]
#[command(name = "tileworld-cli", about = "Drive a persistent tile world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the saved world
    #[arg(long, default_value = "./world_data")]
    data_dir: PathBuf,

    /// Seed used when a default world has to be generated
    #[arg(long, default_value = "42")]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of the saved world
    Info {
        /// Also describe this entity
        #[arg(short, long)]
        entity: Option<u64>,
    },
    /// Discard the saved world and generate a fresh one
    Reset {
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Place an entity with its top-left corner at X,Y
    Place {
        #[arg(allow_hyphen_values = true)]
        at: TileId,
        #[arg(long, default_value = "1")]
        width: u32,
        #[arg(long, default_value = "1")]
        height: u32,
        /// Hue in degrees
        #[arg(long, default_value = "220")]
        hue: u16,
    },
    /// Find a path between two tiles and connect it
    Connect {
        #[arg(allow_hyphen_values = true)]
        from: TileId,
        #[arg(allow_hyphen_values = true)]
        to: TileId,
        /// Search budget in expanded nodes
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Remove the connection between two adjacent tiles
    Disconnect {
        #[arg(allow_hyphen_values = true)]
        a: TileId,
        #[arg(allow_hyphen_values = true)]
        b: TileId,
    },
    /// Run the simulation in real time, autosaving as it goes
    Run {
        #[arg(short, long, default_value = "5")]
        seconds: u64,
        /// Sleep between frames
        #[arg(long, default_value = "16")]
        frame_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let store = FileStore::open(&cli.data_dir)
        .with_context(|| format!("opening data directory {}", cli.data_dir.display()))?;
    let mut gateway = PersistenceGateway::new(store);

    match cli.command {
        Commands::Info { entity } => {
            let world = gateway.load_or_default(cli.seed);
            println!("tileworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", WorldInspector::summary(&world));
            if let Some(id) = entity {
                match WorldInspector::inspect_entity(&world, EntityId(id)) {
                    Some(info) => println!("{info}"),
                    None => println!("no entity {id}"),
                }
            }
        }
        Commands::Reset { seed } => {
            let world = gateway.reset(seed.unwrap_or(cli.seed));
            println!("{}", WorldInspector::summary(&world));
        }
        Commands::Place {
            at,
            width,
            height,
            hue,
        } => {
            let mut world = gateway.load_or_default(cli.seed);
            let spec = PlacementSpec::new(at.x, at.y, width, height)
                .with_color(Color::hsl(hue % 360, 100, 50));
            let id = world.try_place(spec).context("placement rejected")?;
            save(&mut gateway, &world)?;
            println!("placed entity {id} at {at}");
        }
        Commands::Connect {
            from,
            to,
            max_iterations,
        } => {
            let mut world = gateway.load_or_default(cli.seed);
            let mut options = SearchOptions::default();
            if let Some(budget) = max_iterations {
                options = options.with_max_iterations(budget);
            }
            match route_and_connect(&mut world, from, to, &options)? {
                Some(path) => {
                    save(&mut gateway, &world)?;
                    let keys: Vec<String> = path.iter().map(TileId::key).collect();
                    println!("connected {} tiles: {}", path.len(), keys.join(" -> "));
                }
                None => println!("no path from {from} to {to}"),
            }
        }
        Commands::Disconnect { a, b } => {
            let mut world = gateway.load_or_default(cli.seed);
            if world.disconnect(a, b) {
                save(&mut gateway, &world)?;
                println!("disconnected {a} and {b}");
            } else {
                println!("{a} and {b} were not connected");
            }
        }
        Commands::Run { seconds, frame_ms } => {
            let mut world = gateway.load_or_default(cli.seed);
            run(&mut world, &mut gateway, seconds, frame_ms);
            println!("{}", WorldInspector::summary(&world));
        }
    }

    Ok(())
}

fn save(gateway: &mut PersistenceGateway<FileStore>, world: &World) -> anyhow::Result<()> {
    gateway
        .try_save(world)
        .with_context(|| format!("saving world to {}", gateway.store().root().display()))?;
    Ok(())
}

/// Real-time loop: fixed-rate ticks, periodic autosave, and a final save.
fn run(
    world: &mut World,
    gateway: &mut PersistenceGateway<FileStore>,
    seconds: u64,
    frame_ms: u64,
) {
    let _span = tracing::info_span!("run", seconds, frame_ms).entered();
    let mut ticker = FixedTicker::default();
    let mut autosaver = Autosaver::default();
    let frame = Duration::from_millis(frame_ms);
    let deadline = Instant::now() + Duration::from_secs(seconds);
    let start_tick = world.tick();

    let mut last = Instant::now();
    while last < deadline {
        thread::sleep(frame);
        let now = Instant::now();
        let elapsed = now - last;
        last = now;

        ticker.drive(world, elapsed);
        autosaver.poll(elapsed, world, gateway);
    }
    autosaver.flush(world, gateway);

    tracing::info!(
        ticks = world.tick() - start_tick,
        saves = autosaver.saves(),
        failures = autosaver.failures(),
        "run finished"
    );
}
