use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::body::{Body, Death, EntityId};
use super::bullet::Bullet;
use crate::config::{BotConfig, PlayerConfig};

/// Max hp gained per level
const HP_PER_LEVEL: f32 = 20.0;
/// Radians per frame the orbitals advance
const ORBITAL_SPIN: f32 = 0.05;
/// Distance between the hull and the orbital ring
const ORBITAL_GAP: f32 = 30.0;
/// Collision radius of a single orbital
pub const ORBITAL_RADIUS: f32 = 8.0;
/// Damage an orbital deals per frame of contact
pub const ORBITAL_DAMAGE: f32 = 5.0;

/// Experience needed to advance from `level` to the next one.
pub fn xp_threshold(level: u32) -> u32 {
    let exponent = level.saturating_sub(1) as i32;
    (100.0 * 1.2_f64.powi(exponent)).floor() as u32
}

/// Behaviour state of a bot ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BotMind {
    /// Hold the current heading until the timer runs out
    Wander { frames_left: u32 },
    /// Fly at the player and shoot when in range
    Chase,
}

#[derive(Debug, Clone)]
pub struct Ship {
    pub id: EntityId,
    pub body: Body,
    pub acc: Vec2,
    /// Heading in radians, also the aim direction
    pub angle: f32,
    pub color: [u8; 3],
    pub name: String,
    pub is_player: bool,

    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub fire_rate: f32,
    pub cooldown: f32,
    pub xp: u32,
    pub level: u32,
    pub score: u32,
    pub kills: u32,

    // Upgrade modifiers
    pub projectile_count: u32,
    pub spread: f32,
    pub homing: f32,
    pub bounce: u32,
    pub aura_radius: f32,
    pub aura_damage: f32,
    pub orbitals: u32,
    pub size_mult: f32,

    pub mind: BotMind,
}

impl Ship {
    fn with_stats(
        id: EntityId,
        pos: Vec2,
        name: String,
        color: [u8; 3],
        is_player: bool,
        stats: &PlayerConfig,
        speed: f32,
    ) -> Self {
        Self {
            id,
            body: Body::new(pos, stats.radius),
            acc: Vec2::ZERO,
            angle: 0.0,
            color,
            name,
            is_player,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            speed,
            damage: stats.damage,
            fire_rate: stats.fire_rate,
            cooldown: 0.0,
            xp: 0,
            level: 1,
            score: 0,
            kills: 0,
            projectile_count: 1,
            spread: stats.spread,
            homing: 0.0,
            bounce: 0,
            aura_radius: 0.0,
            aura_damage: 0.0,
            orbitals: 0,
            size_mult: 1.0,
            mind: BotMind::Wander { frames_left: 0 },
        }
    }

    pub fn player(id: EntityId, pos: Vec2, name: impl Into<String>, stats: &PlayerConfig) -> Self {
        Self::with_stats(id, pos, name.into(), stats.color, true, stats, stats.speed)
    }

    /// Bots share the player's base stats but start slower.
    pub fn bot(
        id: EntityId,
        pos: Vec2,
        name: impl Into<String>,
        color: [u8; 3],
        stats: &PlayerConfig,
        bots: &BotConfig,
    ) -> Self {
        Self::with_stats(id, pos, name.into(), color, false, stats, bots.speed)
    }

    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    /// Collision radius, scaled by size upgrades
    pub fn hit_radius(&self) -> f32 {
        self.body.radius * self.size_mult
    }

    /// Sets this frame's acceleration from a movement direction.
    pub fn thrust(&mut self, direction: Vec2, force: f32) {
        self.acc = direction * force;
    }

    /// Integrates acceleration and velocity, then clamps into the world.
    pub fn integrate(&mut self, world_size: f32, friction: f32) {
        self.body.vel += self.acc;
        self.body.vel *= friction;
        self.body.pos += self.body.vel;
        self.acc = Vec2::ZERO;

        self.body.pos = self
            .body
            .pos
            .max(Vec2::ZERO)
            .min(Vec2::splat(world_size));

        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - 1.0).max(0.0);
        }
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Fires a volley fanned around the current heading and resets the cooldown.
    pub fn fire(&mut self) -> Vec<Bullet> {
        let count = self.projectile_count.max(1);
        let start = self.angle - self.spread * (count - 1) as f32 / 2.0;
        let volley = (0..count)
            .map(|i| Bullet::from_ship(self, start + self.spread * i as f32))
            .collect();
        self.cooldown = self.fire_rate;
        volley
    }

    /// Fires only when off cooldown; returns an empty volley otherwise
    pub fn try_fire(&mut self) -> Vec<Bullet> {
        if !self.can_fire() {
            return vec![];
        }
        self.fire()
    }

    /// Applies damage. Returns the death record the first time hp reaches zero.
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
            orb_count: 5 + self.level * 2,
            orb_value: self.level * 10,
            bounty: Some(100 * self.level),
        })
    }

    pub fn credit_kill(&mut self, bounty: u32) {
        self.score += bounty;
        self.kills += 1;
    }

    pub fn collect(&mut self, value: u32) {
        self.xp += value;
        self.score += value;
    }

    /// Advances one level per threshold crossed; each level fully heals.
    /// Bots also auto-upgrade. Returns how many levels were gained.
    pub fn gain_levels(&mut self, bot_max_speed: f32) -> u32 {
        let mut gained = 0;
        loop {
            let needed = xp_threshold(self.level);
            if self.xp < needed {
                break;
            }

            self.xp -= needed;
            self.level += 1;
            self.max_hp += HP_PER_LEVEL;
            self.hp = self.max_hp;
            gained += 1;

            if !self.is_player {
                self.damage *= 1.1;
                self.speed = (self.speed * 1.05).min(bot_max_speed);
            }
        }
        gained
    }

    /// World positions of the guardian drones circling the ship at `frame`.
    pub fn orbital_points(&self, frame: u64) -> Vec<Vec2> {
        let base = frame as f32 * ORBITAL_SPIN;
        let step = TAU / self.orbitals.max(1) as f32;
        (0..self.orbitals)
            .map(|i| {
                let angle = base + i as f32 * step;
                self.body.pos + Vec2::from_angle(angle) * (self.body.radius + ORBITAL_GAP)
            })
            .collect()
    }

    /// Fraction of the way to the next level, in `[0, 1)`
    pub fn xp_progress(&self) -> f64 {
        let needed = xp_threshold(self.level).max(1);
        (self.xp as f64 / needed as f64).min(1.0)
    }

    /// Runs the bot behaviour for one frame and returns whether it wants to fire.
    ///
    /// `player` is the player's position, or `None` once the player is dead.
    pub fn steer_bot(&mut self, player: Option<Vec2>, rng: &mut impl Rng, cfg: &BotConfig) -> bool {
        match (self.mind, player) {
            (BotMind::Chase, None) => self.mind = BotMind::Wander { frames_left: 0 },
            (BotMind::Wander { .. }, Some(target))
                if self.body.distance_to(target) < cfg.aggro_radius =>
            {
                self.mind = BotMind::Chase;
            }
            _ => {}
        }

        match (self.mind, player) {
            (BotMind::Chase, Some(target)) => {
                let to_target = target - self.body.pos;
                self.angle = to_target.y.atan2(to_target.x);
                self.acc = Vec2::from_angle(self.angle) * (self.speed * cfg.chase_thrust);
                to_target.length() < cfg.fire_range && self.can_fire()
            }
            (BotMind::Wander { frames_left }, _) => {
                let mut remaining = frames_left.saturating_sub(1);
                if remaining == 0 {
                    let lo = cfg.wander_min_frames.min(cfg.wander_max_frames).max(1);
                    let hi = cfg.wander_max_frames.max(lo);
                    self.angle = rng.random_range(0.0..TAU);
                    remaining = rng.random_range(lo..=hi);
                }
                self.mind = BotMind::Wander {
                    frames_left: remaining,
                };
                self.acc = Vec2::from_angle(self.angle) * (self.speed * cfg.wander_thrust);
                false
            }
            (BotMind::Chase, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn player_at(x: f32, y: f32) -> Ship {
        Ship::player(EntityId(1), Vec2::new(x, y), "Tester", &PlayerConfig::default())
    }

    fn bot_at(x: f32, y: f32) -> Ship {
        Ship::bot(
            EntityId(2),
            Vec2::new(x, y),
            "Viper",
            [255, 0, 85],
            &PlayerConfig::default(),
            &BotConfig::default(),
        )
    }

    #[test]
    fn test_ship_new() {
        let player = player_at(2000.0, 2000.0);
        assert!(player.is_player);
        assert_eq!(player.hp, 100.0);
        assert_eq!(player.speed, 5.0);
        assert_eq!(player.level, 1);
        assert_eq!(player.projectile_count, 1);
        assert_eq!(player.hit_radius(), 20.0);

        let bot = bot_at(0.0, 0.0);
        assert!(!bot.is_player);
        assert_eq!(bot.speed, 2.0);
    }

    #[test]
    fn test_xp_threshold() {
        assert_eq!(xp_threshold(1), 100);
        assert_eq!(xp_threshold(2), 120);
        assert_eq!(xp_threshold(3), 144);
        assert_eq!(xp_threshold(4), 172);
    }

    #[test]
    fn test_integrate_applies_friction() {
        let mut ship = player_at(100.0, 100.0);
        ship.thrust(Vec2::new(1.0, 0.0), 1.0);
        ship.integrate(4000.0, 0.5);
        assert_eq!(ship.body.vel, Vec2::new(0.5, 0.0));
        assert_eq!(ship.body.pos, Vec2::new(100.5, 100.0));
        assert_eq!(ship.acc, Vec2::ZERO);

        ship.integrate(4000.0, 0.5);
        assert_eq!(ship.body.vel, Vec2::new(0.25, 0.0));
        assert_eq!(ship.acc, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_clamps_to_world() {
        let mut ship = player_at(1.0, 3999.0);
        ship.body.vel = Vec2::new(-50.0, 50.0);
        ship.integrate(4000.0, 1.0);
        assert_eq!(ship.body.pos, Vec2::new(0.0, 4000.0));
    }

    #[test]
    fn test_fire_cooldown() {
        let mut ship = player_at(100.0, 100.0);
        assert_eq!(ship.try_fire().len(), 1);
        assert!(!ship.can_fire());
        assert!(ship.try_fire().is_empty());

        for _ in 0..30 {
            ship.integrate(4000.0, 0.95);
        }
        assert!(ship.can_fire());
    }

    #[test]
    fn test_fire_fans_across_spread() {
        let mut ship = player_at(100.0, 100.0);
        ship.projectile_count = 3;
        ship.spread = 0.2;
        ship.angle = 1.0;

        let volley = ship.fire();
        let angles: Vec<f32> = volley
            .iter()
            .map(|b| b.body.vel.y.atan2(b.body.vel.x))
            .collect();
        assert_eq!(angles.len(), 3);
        assert!((angles[0] - 0.8).abs() < 1e-4);
        assert!((angles[1] - 1.0).abs() < 1e-4);
        assert!((angles[2] - 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_take_damage_reports_death_once() {
        let mut bot = bot_at(500.0, 500.0);
        bot.level = 3;
        assert!(bot.take_damage(60.0).is_none());
        assert_eq!(bot.hp, 40.0);

        let death = bot.take_damage(50.0).expect("second hit kills");
        assert_eq!(death.orb_count, 11);
        assert_eq!(death.orb_value, 30);
        assert_eq!(death.bounty, Some(300));
        assert!(!bot.is_alive());
        assert_eq!(bot.hp, 0.0);

        assert!(bot.take_damage(50.0).is_none());
    }

    #[test]
    fn test_level_up_heals_fully() {
        let mut ship = player_at(100.0, 100.0);
        ship.hp = 10.0;
        ship.xp = 100;

        assert_eq!(ship.gain_levels(8.0), 1);
        assert_eq!(ship.level, 2);
        assert_eq!(ship.xp, 0);
        assert_eq!(ship.max_hp, 120.0);
        assert_eq!(ship.hp, 120.0);
        // Player stats are left to upgrades
        assert_eq!(ship.damage, 10.0);
    }

    #[test]
    fn test_level_up_once_per_threshold_crossed() {
        let mut ship = player_at(100.0, 100.0);
        ship.xp = 100 + 120 + 5;
        assert_eq!(ship.gain_levels(8.0), 2);
        assert_eq!(ship.level, 3);
        assert_eq!(ship.xp, 5);

        assert_eq!(ship.gain_levels(8.0), 0);
        assert_eq!(ship.level, 3);
    }

    #[test]
    fn test_bot_auto_upgrades_on_level() {
        let mut bot = bot_at(100.0, 100.0);
        bot.speed = 7.9;
        bot.xp = 100;
        bot.gain_levels(8.0);
        assert!((bot.damage - 11.0).abs() < 1e-4);
        assert_eq!(bot.speed, 8.0);
    }

    #[test]
    fn test_bot_chases_player_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bot = bot_at(100.0, 100.0);
        let wants_fire = bot.steer_bot(Some(Vec2::new(400.0, 100.0)), &mut rng, &BotConfig::default());

        assert_eq!(bot.mind, BotMind::Chase);
        assert!(wants_fire);
        assert!(bot.angle.abs() < 1e-6);
        assert!(bot.acc.x > 0.0);
    }

    #[test]
    fn test_bot_holds_fire_out_of_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bot = bot_at(100.0, 100.0);
        let wants_fire = bot.steer_bot(Some(Vec2::new(700.0, 100.0)), &mut rng, &BotConfig::default());
        assert_eq!(bot.mind, BotMind::Chase);
        assert!(!wants_fire);
    }

    #[test]
    fn test_bot_wanders_when_player_far_or_dead() {
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = BotConfig::default();

        let mut bot = bot_at(100.0, 100.0);
        assert!(!bot.steer_bot(Some(Vec2::new(3000.0, 3000.0)), &mut rng, &cfg));
        let BotMind::Wander { frames_left } = bot.mind else {
            panic!("expected wander");
        };
        assert!((60..=180).contains(&frames_left));

        let heading = bot.angle;
        bot.steer_bot(None, &mut rng, &cfg);
        assert_eq!(bot.angle, heading);
        assert_eq!(bot.mind, BotMind::Wander { frames_left: frames_left - 1 });

        bot.mind = BotMind::Chase;
        bot.steer_bot(None, &mut rng, &cfg);
        assert!(matches!(bot.mind, BotMind::Wander { .. }));
    }

    #[test]
    fn test_orbitals_evenly_spaced() {
        let mut ship = player_at(1000.0, 1000.0);
        assert!(ship.orbital_points(0).is_empty());

        ship.orbitals = 2;
        let points = ship.orbital_points(0);
        assert_eq!(points.len(), 2);
        assert!((points[0] - Vec2::new(1050.0, 1000.0)).length() < 1e-3);
        assert!((points[1] - Vec2::new(950.0, 1000.0)).length() < 1e-3);
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_ship_stays_in_world(
                start in (0f32..4000.0, 0f32..4000.0),
                pushes in prop::collection::vec((-30f32..30.0, -30f32..30.0), 0..100)
            ) {
                let mut ship = player_at(start.0, start.1);
                for (dx, dy) in pushes {
                    ship.thrust(Vec2::new(dx, dy), 1.0);
                    ship.integrate(4000.0, 0.95);
                    prop_assert!(ship.body.pos.x >= 0.0 && ship.body.pos.x <= 4000.0);
                    prop_assert!(ship.body.pos.y >= 0.0 && ship.body.pos.y <= 4000.0);
                }
            }

            #[test]
            fn test_death_reported_at_most_once(
                hits in prop::collection::vec(0f32..80.0, 0..20)
            ) {
                let mut bot = bot_at(10.0, 10.0);
                let deaths = hits.into_iter().filter_map(|amount| bot.take_damage(amount)).count();
                prop_assert!(deaths <= 1);
                prop_assert!(bot.hp >= 0.0);
            }

            #[test]
            fn test_levels_match_thresholds(xp in 0u32..5000) {
                let mut ship = player_at(10.0, 10.0);
                ship.xp = xp;
                let gained = ship.gain_levels(8.0);
                prop_assert_eq!(ship.level, 1 + gained);
                prop_assert!(ship.xp < xp_threshold(ship.level));
                prop_assert_eq!(ship.hp, ship.max_hp);
            }
        }
    }
}
