use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::body::Body;

/// An experience pickup dropped by destroyed ships and asteroids.
#[derive(Debug, Clone)]
pub struct Orb {
    pub body: Body,
    pub value: u32,
    /// Phase of the bobbing animation
    pub phase: f32,
}

impl Orb {
    pub fn new(pos: Vec2, value: u32, rng: &mut impl Rng) -> Self {
        let radius = 5.0 + (value as f32 / 10.0).min(10.0);
        Self {
            body: Body::new(pos, radius),
            value,
            phase: rng.random_range(0.0..TAU),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    pub fn update(&mut self) {
        self.phase += 0.1;
    }

    /// Pulls the orb toward `target` when inside the magnet radius and
    /// reports whether it is close enough to be picked up.
    ///
    /// Both checks use the distance at the start of the frame.
    pub fn attract(&mut self, target: Vec2, magnet_radius: f32, pull: f32, pickup_radius: f32) -> bool {
        let distance = self.body.distance_to(target);
        if distance < magnet_radius {
            self.body.pos += (target - self.body.pos) * pull;
        }

        if distance < pickup_radius + self.body.radius {
            self.body.dead = true;
            return true;
        }
        false
    }
}
