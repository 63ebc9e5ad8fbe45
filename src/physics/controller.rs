//! Character controller - movement, gravity, jumping, collision

use crate::config::PlayerConfig;
use crate::entity::{Body, InputState};
use crate::physics::collider::Collider;
use crate::physics::collision::{sweep, Contact};
use crate::physics::rect::Rect;
use crate::simulation::CollisionClass;
use crate::world::World;
use glam::Vec2;

/// A swept contact against one candidate collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptContact {
    pub collider: Collider,
    pub contact: Contact,
}

/// What happened during one resolve pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Swept contacts sorted by time of impact
    pub contacts: Vec<SweptContact>,
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// Became grounded this step after being airborne
    pub landed: bool,
}

/// Reads input, writes velocity into a `Body`, and moves it through the colliders
#[derive(Debug, Clone)]
pub struct CharacterController {
    config: PlayerConfig,
    coyote_time: f32,
    jump_buffer: f32,
    fly: bool,
    noclip: bool,
}

impl CharacterController {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            coyote_time: 0.0,
            jump_buffer: 0.0,
            fly: false,
            noclip: false,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_flying(&self) -> bool {
        self.fly
    }

    pub fn is_noclip(&self) -> bool {
        self.noclip
    }

    pub fn toggle_fly(&mut self) -> bool {
        self.fly = !self.fly;
        log::info!("Fly mode: {}", if self.fly { "ON" } else { "OFF" });
        self.fly
    }

    pub fn toggle_noclip(&mut self) -> bool {
        self.noclip = !self.noclip;
        log::info!("Noclip mode: {}", if self.noclip { "ON" } else { "OFF" });
        self.noclip
    }

    /// Turn input into velocity. Positive y points down.
    pub fn apply_input(&mut self, body: &mut Body, input: &InputState, dt: f32) {
        let cfg = &self.config;

        // Grace period for jumping after leaving ground
        if body.grounded {
            self.coyote_time = cfg.coyote_time;
        } else {
            self.coyote_time = (self.coyote_time - dt).max(0.0);
        }

        // Jump input slightly before landing still counts
        if input.jump_pressed {
            self.jump_buffer = cfg.jump_buffer;
        } else {
            self.jump_buffer = (self.jump_buffer - dt).max(0.0);
        }

        let horizontal = input.horizontal();
        if horizontal != 0.0 {
            body.velocity.x = horizontal * cfg.move_speed;
        } else if body.grounded || self.fly {
            let friction = cfg.deceleration * dt;
            if body.velocity.x.abs() < friction {
                body.velocity.x = 0.0;
            } else {
                body.velocity.x -= body.velocity.x.signum() * friction;
            }
        }

        if self.fly {
            body.velocity.y = input.vertical() * cfg.fly_speed;
        } else if self.jump_buffer > 0.0 && self.coyote_time > 0.0 {
            body.velocity.y = -cfg.jump_velocity;
            self.jump_buffer = 0.0;
            self.coyote_time = 0.0;
            body.grounded = false;
            log::debug!("Player jumped!");
        } else if !body.grounded {
            body.velocity.y = (body.velocity.y + cfg.gravity * dt).clamp(-cfg.max_fall_speed, cfg.max_fall_speed);
        } else {
            body.velocity.y = 0.0;
        }
    }

    /// Move the body through `colliders` for one tick.
    ///
    /// Each axis is walked one whole unit at a time, X then Y, and a step is
    /// refused when the next rect would overlap a blocker.
    pub fn resolve(&mut self, body: &mut Body, colliders: &[Collider], dt: f32, drop_through: bool) -> StepReport {
        let mut report = StepReport {
            contacts: self.sweep_contacts(body, colliders, dt),
            ..Default::default()
        };

        if self.noclip {
            body.move_by(body.velocity * dt);
            body.remainder = Vec2::ZERO;
            body.grounded = false;
            return report;
        }

        let was_grounded = body.grounded;
        let motion = body.velocity * dt + body.remainder;
        let steps = motion.round();
        body.remainder = motion - steps;

        let dir_x = steps.x.signum();
        for _ in 0..steps.x.abs() as u32 {
            let next = body.rect().translated(Vec2::new(dir_x, 0.0));
            if colliders.iter().any(|c| blocks_horizontal(c, &next)) {
                body.velocity.x = 0.0;
                body.remainder.x = 0.0;
                report.blocked_x = true;
                break;
            }
            body.move_by(Vec2::new(dir_x, 0.0));
        }

        let dir_y = steps.y.signum();
        let mut grounded = false;
        for _ in 0..steps.y.abs() as u32 {
            let current = body.rect();
            let next = current.translated(Vec2::new(0.0, dir_y));
            let falling = dir_y > 0.0 && body.velocity.y >= 0.0;
            if colliders
                .iter()
                .any(|c| blocks_vertical(c, &current, &next, falling, drop_through))
            {
                grounded = dir_y > 0.0;
                body.velocity.y = 0.0;
                body.remainder.y = 0.0;
                report.blocked_y = true;
                break;
            }
            body.move_by(Vec2::new(0.0, dir_y));
        }

        if !grounded && body.velocity.y >= 0.0 {
            let current = body.rect();
            let below = current.translated(Vec2::Y);
            grounded = colliders
                .iter()
                .any(|c| blocks_vertical(c, &current, &below, true, drop_through));
        }

        body.grounded = grounded;
        report.landed = grounded && !was_grounded;
        if report.landed {
            log::debug!("Player landed at {:?}", body.position);
        }

        report
    }

    /// Apply input, then resolve against the colliders of the chunks the motion spans
    pub fn step(&mut self, body: &mut Body, input: &InputState, world: &World, dt: f32) -> StepReport {
        self.apply_input(body, input, dt);

        let start = body.position;
        let motion = body.velocity * dt;
        let min_x = start.x.min(start.x + motion.x) - 1.0;
        let max_x = (start.x + body.size.x).max(start.x + body.size.x + motion.x) + 1.0;
        let colliders: Vec<Collider> = world.colliders_in_span(min_x, max_x).copied().collect();

        let report = self.resolve(body, &colliders, dt, input.drop_through());

        if body.position != start {
            log::trace!(
                "Player: {:?} -> {:?} (vel: {:?}, grounded: {})",
                start,
                body.position,
                body.velocity,
                body.grounded
            );
        }
        report
    }

    fn sweep_contacts(&self, body: &Body, colliders: &[Collider], dt: f32) -> Vec<SweptContact> {
        let rect = body.rect();
        let mut contacts: Vec<SweptContact> = colliders
            .iter()
            .filter_map(|collider| {
                sweep(&rect, body.velocity, dt, &collider.rect, self.config.sweep_length_divisor)
                    .map(|contact| SweptContact { collider: *collider, contact })
            })
            .collect();
        contacts.sort_by(|a, b| a.contact.time.total_cmp(&b.contact.time));
        contacts
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

fn blocks_horizontal(collider: &Collider, next: &Rect) -> bool {
    collider.class == CollisionClass::Solid && collider.rect.intersects(next)
}

/// Platforms only catch a falling body that started above them
fn blocks_vertical(collider: &Collider, current: &Rect, next: &Rect, falling: bool, drop_through: bool) -> bool {
    match collider.class {
        CollisionClass::Solid => collider.rect.intersects(next),
        CollisionClass::Platform => {
            falling && !drop_through && current.bottom() <= collider.rect.top() && collider.rect.intersects(next)
        }
        CollisionClass::None => false,
    }
}
