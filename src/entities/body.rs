use glam::Vec2;

/// Identifies a ship or asteroid for damage attribution and hit bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// State shared by every entity in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Set once; the entity is swept at the end of the frame
    pub dead: bool,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            dead: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.pos.distance(point)
    }
}

/// What a kill leaves behind, reported exactly once per entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Death {
    pub pos: Vec2,
    pub orb_count: u32,
    pub orb_value: u32,
    /// Score credited to the killer; `None` when kills are not counted
    pub bounty: Option<u32>,
}
