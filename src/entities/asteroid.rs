use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::body::{Body, Death, EntityId};

/// Vertices in an asteroid's outline
pub const ASTEROID_POINTS: usize = 8;

/// A static rock. Bigger tiers are wider, tougher and drop more orbs.
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub id: EntityId,
    pub body: Body,
    /// Size tier, 1 to 3
    pub size: u8,
    pub hp: f32,
    pub angle: f32,
    /// Jagged outline relative to the centre, before rotation
    pub outline: Vec<Vec2>,
}

impl Asteroid {
    pub fn new(id: EntityId, pos: Vec2, size: u8, rng: &mut impl Rng) -> Self {
        let size = size.clamp(1, 3);
        let radius = size as f32 * 15.0;
        let outline = (0..ASTEROID_POINTS)
            .map(|i| {
                let a = i as f32 / ASTEROID_POINTS as f32 * TAU;
                Vec2::from_angle(a) * radius * rng.random_range(0.8..1.2)
            })
            .collect();

        Self {
            id,
            body: Body::new(pos, radius),
            size,
            hp: size as f32 * 20.0,
            angle: rng.random_range(0.0..TAU),
            outline,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    /// Outline in world coordinates, rotated and translated
    pub fn world_outline(&self) -> impl Iterator<Item = Vec2> + '_ {
        let rotation = Vec2::from_angle(self.angle);
        self.outline
            .iter()
            .map(move |p| self.body.pos + rotation.rotate(*p))
    }

    /// Asteroid kills drop orbs but don't count toward anyone's kills.
    pub fn take_damage(&mut self, amount: f32) -> Option<Death> {
        if self.body.dead {
            return None;
        }

        self.hp -= amount;
        if self.hp > 0.0 {
            return None;
        }

        self.hp = 0.0;
        self.body.dead = true;
        Some(Death {
            pos: self.body.pos,
            orb_count: self.size as u32 * 2,
            orb_value: 10,
            bounty: None,
        })
    }
}
