mod asteroid;
mod body;
mod bullet;
mod orb;
mod ship;

// Re-export all public types
pub use asteroid::{ASTEROID_POINTS, Asteroid};
pub use body::{Body, Death, EntityId};
pub use bullet::{BULLET_LIFE, BULLET_SPEED, Bullet, HOMING_RANGE, wrap_angle};
pub use orb::Orb;
pub use ship::{BotMind, ORBITAL_DAMAGE, ORBITAL_RADIUS, Ship, xp_threshold};

/// Kind tag for dispatching over the arena's entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Ship,
    Bullet,
    Asteroid,
    Orb,
}

/// Borrowed view of any entity, used where collections are walked together
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Ship(&'a Ship),
    Bullet(&'a Bullet),
    Asteroid(&'a Asteroid),
    Orb(&'a Orb),
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Ship(_) => EntityKind::Ship,
            EntityRef::Bullet(_) => EntityKind::Bullet,
            EntityRef::Asteroid(_) => EntityKind::Asteroid,
            EntityRef::Orb(_) => EntityKind::Orb,
        }
    }

    pub fn body(&self) -> &'a Body {
        match self {
            EntityRef::Ship(ship) => &ship.body,
            EntityRef::Bullet(bullet) => &bullet.body,
            EntityRef::Asteroid(asteroid) => &asteroid.body,
            EntityRef::Orb(orb) => &orb.body,
        }
    }
}
