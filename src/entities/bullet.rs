use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::body::{Body, EntityId};
use super::ship::Ship;

pub const BULLET_SPEED: f32 = 15.0;
/// Frames a bullet lives without hitting anything
pub const BULLET_LIFE: u32 = 60;
/// Homing bullets only consider ships closer than this
pub const HOMING_RANGE: f32 = 300.0;
const HOMING_RATE: f32 = 0.1;
const BULLET_RADIUS: f32 = 5.0;

/// Wraps an angle difference into `[-PI, PI]`
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped < -PI { wrapped + TAU } else { wrapped }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub body: Body,
    pub owner: EntityId,
    pub from_player: bool,
    pub life: u32,
    pub damage: f32,
    pub homing: f32,
    /// Remaining reflections before the bullet is destroyed instead
    pub bounce: u32,
    pub color: [u8; 3],
    /// Last target hit, so a bouncing bullet doesn't hit it again while
    /// overlapping. Cleared once the bullet is clear of it.
    pub last_hit: Option<EntityId>,
}

impl Bullet {
    /// Creates a bullet carrying the owner's stats as they are right now.
    pub fn from_ship(owner: &Ship, angle: f32) -> Self {
        let mut body = Body::new(owner.body.pos, BULLET_RADIUS * owner.size_mult);
        body.vel = Vec2::from_angle(angle) * BULLET_SPEED;

        Self {
            body,
            owner: owner.id,
            from_player: owner.is_player,
            life: BULLET_LIFE,
            damage: owner.damage,
            homing: owner.homing,
            bounce: owner.bounce,
            color: owner.color,
            last_hit: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    /// Whether the bullet overlaps a circle at `pos`
    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        self.body.distance_to(pos) < radius + self.body.radius
    }

    /// Bends a player bullet's heading toward the nearest ship in range.
    pub fn steer(&mut self, ships: &[Ship]) {
        if self.homing <= 0.0 || !self.from_player {
            return;
        }

        let closest = ships
            .iter()
            .filter(|s| s.id != self.owner && s.is_alive())
            .map(|s| (s, self.body.distance_to(s.body.pos)))
            .filter(|(_, d)| *d < HOMING_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((target, _)) = closest {
            let to_target = target.body.pos - self.body.pos;
            let desired = to_target.y.atan2(to_target.x);
            let current = self.body.vel.y.atan2(self.body.vel.x);
            let turned = current + wrap_angle(desired - current) * (HOMING_RATE * self.homing);
            self.body.vel = Vec2::from_angle(turned) * self.body.vel.length();
        }
    }

    /// Moves the bullet, spends a frame of life and handles the world boundary.
    pub fn advance(&mut self, world_size: f32) {
        self.body.pos += self.body.vel;
        self.life = self.life.saturating_sub(1);

        let mut bounced = false;
        if self.body.pos.x < 0.0 || self.body.pos.x > world_size {
            bounced |= self.reflect_or_die(Axis::X);
        }
        if self.body.pos.y < 0.0 || self.body.pos.y > world_size {
            bounced |= self.reflect_or_die(Axis::Y);
        }
        if bounced {
            self.body.pos = self.body.pos.max(Vec2::ZERO).min(Vec2::splat(world_size));
        }

        if self.life == 0 {
            self.body.dead = true;
        }
    }

    /// Called when the bullet strikes `target`: bounces back or is consumed.
    pub fn on_hit(&mut self, target: EntityId) {
        self.last_hit = Some(target);
        if self.bounce == 0 {
            self.body.dead = true;
        } else {
            self.body.vel = -self.body.vel;
            self.bounce -= 1;
        }
    }

    fn reflect_or_die(&mut self, axis: Axis) -> bool {
        if self.bounce == 0 {
            self.body.dead = true;
            return false;
        }

        match axis {
            Axis::X => self.body.vel.x = -self.body.vel.x,
            Axis::Y => self.body.vel.y = -self.body.vel.y,
        }
        self.bounce -= 1;
        true
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}
