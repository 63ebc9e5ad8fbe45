//! Application state and fixed-step game loop
//!
//! Owns the world, the player body and its controller. A renderer or a
//! headless driver feeds `InputState` and calls `update` once per frame.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use glam::{IVec2, Vec2};
use std::path::Path;
use std::sync::Arc;

use crate::config::GameConfig;
use crate::entity::{Body, InputState};
use crate::physics::{CharacterController, Rect, StepReport};
use crate::simulation::{BlockId, BlockRegistry};
use crate::world::events::EventSink;
use crate::world::{World, WorldEvent};

/// Simulation tick length in seconds
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Ticks allowed per `update` before the backlog is dropped
const MAX_STEPS_PER_FRAME: u32 = 5;

pub struct App {
    config: GameConfig,
    world: World,
    body: Body,
    controller: CharacterController,
    input: InputState,
    events: Receiver<WorldEvent>,
    sink: EventSink,
    accumulator: f32,
    ticks: u64,
    last_report: StepReport,
}

impl App {
    pub fn new(config: GameConfig) -> Result<Self> {
        config
            .world
            .settings()
            .validate()
            .context("Invalid world layout in configuration")?;

        let mut registry = BlockRegistry::with_defaults();
        if let Some(dir) = &config.world.blocks_dir {
            let loaded = registry
                .load_dir(Path::new(dir))
                .with_context(|| format!("Failed to load block definitions from {}", dir))?;
            log::info!("Loaded {} block definitions from {}", loaded, dir);
        }

        let seed = config.world.seed.unwrap_or_else(rand::random);
        let (sink, events) = EventSink::channel();
        let world = World::generate(
            seed,
            config.world.settings(),
            config.generation.clone(),
            config.lighting.clone(),
            Arc::new(registry),
            sink.clone(),
        );

        let body = Body::new(Vec2::ZERO, config.player.body_size());
        let controller = CharacterController::new(config.player.clone());

        let mut app = Self {
            config,
            world,
            body,
            controller,
            input: InputState::new(),
            events,
            sink,
            accumulator: 0.0,
            ticks: 0,
            last_report: StepReport::default(),
        };
        app.respawn();
        Ok(app)
    }

    /// Put the body back on the ground above the configured spawn column
    pub fn respawn(&mut self) {
        let settings = self.world.settings();
        let columns = (settings.chunk_width * settings.chunk_count) as i32;
        let column = self.config.player.spawn_column.clamp(0, (columns - 1).max(0));

        self.body.position = self.world.spawn_point(column, self.body.size);
        self.body.halt();
        log::info!("Player spawned at {:?} (column {})", self.body.position, column);
    }

    /// Advance by a frame's worth of fixed ticks. Returns how many ticks ran.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);

        let mut steps = 0;
        while self.accumulator >= FIXED_DT && steps < MAX_STEPS_PER_FRAME {
            self.tick();
            self.accumulator -= FIXED_DT;
            steps += 1;
        }

        if steps == MAX_STEPS_PER_FRAME && self.accumulator >= FIXED_DT {
            log::warn!("Simulation falling behind, dropping {:.3}s", self.accumulator);
            self.accumulator = 0.0;
        }
        steps
    }

    /// One simulation step: edits, world rebuild, then player movement
    pub fn tick(&mut self) {
        self.apply_mouse();
        self.world.update();

        self.last_report = self
            .controller
            .step(&mut self.body, &self.input, &self.world, FIXED_DT);
        self.input.end_tick();
        self.ticks += 1;

        if self.body.position.y > self.world.settings().world_pixel_size().y {
            log::warn!("Player fell out of the world at {:?}", self.body.position);
            self.respawn();
        }

        if self.ticks % 120 == 0 {
            log::info!(
                "Tick {}: player_pos={:?}, grounded={}, selected_block={}",
                self.ticks,
                self.body.position,
                self.body.grounded,
                self.input.selected_block
            );
        }
    }

    fn apply_mouse(&mut self) {
        let Some(target) = self.input.mouse_world_pos else {
            return;
        };
        if target.distance(self.body.center()) > self.config.player.reach {
            return;
        }

        if self.input.left_mouse_pressed {
            self.remove_block(target);
        }
        if self.input.right_clicked() {
            self.place_block(target, self.input.selected_block);
        }
    }

    /// Place a block unless the cell would overlap the player
    pub fn place_block(&mut self, world_pos: Vec2, block: u16) -> bool {
        let bs = self.world.settings().block_size as f32;
        let cell = self.world.settings().cell_at(world_pos);
        let cell_rect = Rect::new(cell.as_vec2() * bs, Vec2::splat(bs));

        if block != BlockId::AIR
            && self.world.registry().get(block).collision.collides()
            && cell_rect.intersects(&self.body.rect())
        {
            log::debug!("Refusing to place block {} inside the player at {:?}", block, cell);
            return false;
        }
        self.world.place_block(world_pos, block)
    }

    pub fn remove_block(&mut self, world_pos: Vec2) -> bool {
        self.world.remove_block(world_pos)
    }

    /// First solid cell on the segment from `origin` toward `target`, at most
    /// `max_distance` pixels away
    pub fn raycast(&self, origin: Vec2, target: Vec2, max_distance: f32) -> Option<IVec2> {
        let bs = self.world.settings().block_size as f32;
        let max_steps = (max_distance.max(0.0) * std::f32::consts::SQRT_2 / bs).ceil() as usize;
        self.world.raycast(origin, target, max_steps)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.world
            .save(path)
            .with_context(|| format!("Failed to save world to {}", path.display()))
    }

    /// Replace the current world with a saved one and respawn the player
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let world = World::load(
            path,
            self.config.generation.clone(),
            self.config.lighting.clone(),
            self.world.registry().clone(),
            self.sink.clone(),
        )
        .with_context(|| format!("Failed to load world from {}", path.display()))?;

        log::info!("Loaded world with seed {} from {}", world.seed(), path.display());
        self.world = world;
        self.respawn();
        Ok(())
    }

    /// Everything the world announced since the last call
    pub fn drain_events(&self) -> Vec<WorldEvent> {
        self.events.try_iter().collect()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn controller_mut(&mut self) -> &mut CharacterController {
        &mut self.controller
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }
}
