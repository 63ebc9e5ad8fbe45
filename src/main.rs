use anyhow::Context;
use blockworld::config::GameConfig;
use blockworld::world::WorldEvent;
use blockworld::App;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless blockworld simulation", long_about = None)]
struct Args {
    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Load a saved world instead of generating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save the world here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Number of fixed ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Config file (RON); defaults to ./blockworld.ron if present
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = GameConfig::load_from(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    log::info!("Starting blockworld");
    let mut app = App::new(config)?;

    if let Some(path) = &args.load {
        app.load_from_file(path)?;
    }
    app.drain_events();

    let start = app.body().position;
    for tick in 0..args.ticks {
        script_input(&mut app, tick);
        app.tick();
    }

    let updated = app
        .drain_events()
        .iter()
        .filter(|e| matches!(e, WorldEvent::TerrainUpdated { .. }))
        .count();
    log::info!(
        "Simulated {} ticks: player {:?} -> {:?}, grounded={}, {} chunk rebuilds",
        app.ticks(),
        start,
        app.body().position,
        app.body().grounded,
        updated
    );

    if let Some(path) = &args.save {
        app.save_to_file(path)
            .with_context(|| format!("Saving to {} failed", path.display()))?;
        log::info!("World saved to {}", path.display());
    }

    Ok(())
}

/// Walk right, hop every second, and dig the cell ahead now and then
fn script_input(app: &mut App, tick: u64) {
    let center = app.body().center();
    let block_size = app.world().settings().block_size as f32;
    let input = app.input_mut();

    input.d_pressed = true;
    input.jump_pressed = tick % 60 == 0;

    let dig = tick % 90 == 45;
    input.left_mouse_pressed = dig;
    input.mouse_world_pos = dig.then(|| center + glam::Vec2::new(block_size, 0.0));
}
