mod config;
mod scene;

use std::path::PathBuf;

use bevy_app::App;
use clap::Parser;
use rs_entity::{EntityPlugin, SimClock, TickReport};
use rs_sim::MovableEntity;
use tracing::{Level, debug, info};

use crate::config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "rs-server", about = "Steps entity motion on a flat test world")]
struct Args {
    /// TOML file with `[motion]` and `[world]` tables.
    #[arg(long, default_value = "rs-server.toml")]
    config: PathBuf,
    /// Overrides `world.ticks`.
    #[arg(long)]
    ticks: Option<u32>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .without_time()
        .compact()
        .init();

    info!("Starting rs-server");

    let config = ServerConfig::load(&args.config)?;
    let ticks = args.ticks.unwrap_or(config.world.ticks);

    let mut app = App::new();
    app.insert_resource(scene::build_world(&config.world))
        .add_plugins(EntityPlugin {
            motion: config.motion,
        });
    let ground = f64::from(config.world.ground_level + 1);
    let scene = scene::spawn_scene(app.world_mut(), ground)?;

    for _ in 0..ticks {
        app.update();
        let tick = app.world().resource::<SimClock>().tick;
        let report = app.world().resource::<TickReport>();
        if report.placed.is_empty() && report.dropped.is_empty() && report.despawned.is_empty() {
            debug!(tick, moved = report.moved, "tick");
        } else {
            info!(
                tick,
                placed = ?report.placed,
                dropped = ?report.dropped,
                despawned = ?report.despawned,
                "tick"
            );
        }
    }

    for (label, entity) in scene.named() {
        match app.world().get::<MovableEntity>(entity) {
            Some(body) => info!(
                label,
                position = ?body.position(),
                on_ground = body.on_ground,
                fall_distance = body.fall_distance,
                "final state"
            ),
            None => info!(label, "despawned"),
        }
    }
    Ok(())
}
