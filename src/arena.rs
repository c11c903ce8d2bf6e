use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::config::ArenaConfig;
use crate::entities::{
    Asteroid, Bullet, Death, EntityId, EntityRef, ORBITAL_DAMAGE, ORBITAL_RADIUS, Orb, Ship,
};
use crate::error::ArenaError;
use crate::upgrades::{Upgrade, roll_offers};

/// Auras pulse once every this many frames
pub const AURA_INTERVAL: u64 = 30;
/// Attempts at finding a bot spawn point away from the player
const SPAWN_ATTEMPTS: usize = 32;

/// Where the simulation is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum SimState {
    Running,
    /// Frozen until one of `offers` is picked. `queued` counts further
    /// level-ups that will be offered afterwards.
    AwaitingUpgradeChoice { offers: Vec<Upgrade>, queued: u32 },
    /// The player died; ticking has stopped for good
    Ended,
}

/// Input sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer offset from the top-left corner of the view, in world units
    pub pointer: Option<Vec2>,
    pub fire: bool,
}

impl FrameInput {
    /// Movement direction from held keys. Right beats left and down beats up.
    pub fn direction(&self) -> Vec2 {
        let x = if self.right {
            1.0
        } else if self.left {
            -1.0
        } else {
            0.0
        };
        let y = if self.down {
            1.0
        } else if self.up {
            -1.0
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

/// Things that happened during a frame, for sound and logging
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaEvent {
    Shot { by_player: bool },
    OrbCollected { value: u32 },
    Kill { by_player: bool, victim: String },
    LevelUp { level: u32 },
    PlayerDied { score: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub is_player: bool,
}

/// A death observed this frame, waiting for its rewards
struct Casualty {
    death: Death,
    killer: Option<EntityId>,
    victim: String,
}

/// The whole game session: every live entity plus the loop that advances them.
pub struct Arena {
    config: ArenaConfig,
    rng: StdRng,
    state: SimState,
    frame: u64,
    next_id: u32,
    camera: Vec2,
    view: Vec2,
    player: Ship,
    bots: Vec<Ship>,
    bullets: Vec<Bullet>,
    asteroids: Vec<Asteroid>,
    orbs: Vec<Orb>,
    events: Vec<ArenaEvent>,
}

impl Arena {
    /// Starts a session with the configured initial bots and asteroids.
    pub fn new(config: ArenaConfig, player_name: &str, rng: StdRng) -> Self {
        let mut arena = Self::empty(config, player_name, rng);

        if arena.config.spawning.enabled {
            for _ in 0..arena.config.spawning.initial_bots {
                arena.spawn_bot();
            }
            for _ in 0..arena.config.spawning.initial_asteroids {
                arena.spawn_asteroid();
            }
        }

        info!(
            "session started for {} with {} bots and {} asteroids",
            arena.player.name,
            arena.bots.len(),
            arena.asteroids.len()
        );
        arena
    }

    /// Seeds the rng from `seed`, or from the OS when none is given.
    pub fn with_seed(config: ArenaConfig, player_name: &str, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(config, player_name, rng)
    }

    /// A session with only the player in it, centred in the world.
    pub fn empty(config: ArenaConfig, player_name: &str, rng: StdRng) -> Self {
        let centre = Vec2::splat(config.world.size / 2.0);
        let name = if player_name.trim().is_empty() {
            config.player.name.clone()
        } else {
            player_name.trim().to_string()
        };
        let player = Ship::player(EntityId(0), centre, name, &config.player);

        Self {
            config,
            rng,
            state: SimState::Running,
            frame: 0,
            next_id: 1,
            camera: Vec2::ZERO,
            view: Vec2::new(1280.0, 720.0),
            player,
            bots: Vec::new(),
            bullets: Vec::new(),
            asteroids: Vec::new(),
            orbs: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Top-left corner of the view in world coordinates
    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn view_size(&self) -> Vec2 {
        self.view
    }

    /// Sets the size of the visible area in world units.
    pub fn set_view_size(&mut self, width: f32, height: f32) {
        self.view = Vec2::new(width.max(0.0), height.max(0.0));
    }

    pub fn player(&self) -> &Ship {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Ship {
        &mut self.player
    }

    pub fn bots(&self) -> &[Ship] {
        &self.bots
    }

    pub fn bot_mut(&mut self, id: EntityId) -> Option<&mut Ship> {
        self.bots.iter_mut().find(|b| b.id == id)
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    /// Every ship still flying, the player first
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        std::iter::once(&self.player)
            .filter(|s| s.is_alive())
            .chain(self.bots.iter().filter(|s| s.is_alive()))
    }

    /// Entities back to front: orbs, asteroids, bullets, then ships.
    pub fn draw_order(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.orbs
            .iter()
            .map(EntityRef::Orb)
            .chain(self.asteroids.iter().map(EntityRef::Asteroid))
            .chain(self.bullets.iter().map(EntityRef::Bullet))
            .chain(self.bots.iter().map(EntityRef::Ship))
            .chain(std::iter::once(&self.player).filter(|p| p.is_alive()).map(EntityRef::Ship))
    }

    /// Living ships by descending score
    pub fn leaderboard(&self, count: usize) -> Vec<LeaderboardEntry> {
        let mut ships: Vec<&Ship> = self.ships().collect();
        ships.sort_by(|a, b| b.score.cmp(&a.score));
        ships
            .into_iter()
            .take(count)
            .map(|s| LeaderboardEntry {
                name: s.name.clone(),
                score: s.score,
                level: s.level,
                is_player: s.is_player,
            })
            .collect()
    }

    /// Takes the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_bot(&mut self, pos: Vec2, name: &str) -> EntityId {
        let id = self.allocate_id();
        let color = self.config.bots.colors.first().copied().unwrap_or([255, 255, 255]);
        self.bots.push(Ship::bot(
            id,
            pos,
            name,
            color,
            &self.config.player,
            &self.config.bots,
        ));
        id
    }

    pub fn add_asteroid(&mut self, pos: Vec2, size: u8) -> EntityId {
        let id = self.allocate_id();
        self.asteroids.push(Asteroid::new(id, pos, size, &mut self.rng));
        id
    }

    pub fn add_bullet(&mut self, bullet: Bullet) {
        self.bullets.push(bullet);
    }

    pub fn add_orb(&mut self, pos: Vec2, value: u32) {
        self.orbs.push(Orb::new(pos, value, &mut self.rng));
    }

    /// Advances the simulation by one frame. Does nothing unless running.
    pub fn tick(&mut self, input: &FrameInput) {
        if self.state != SimState::Running {
            return;
        }

        self.frame += 1;
        self.spawn();
        self.update_camera();
        self.apply_input(input);
        let levels_gained = self.update_entities();

        let mut casualties = self.resolve_collisions();
        self.collect_orbs();
        casualties.extend(self.apply_auras());
        casualties.extend(self.apply_orbitals());
        self.settle(casualties);
        self.sweep();

        if !self.player.is_alive() {
            info!(
                "{} died at level {} with score {}",
                self.player.name, self.player.level, self.player.score
            );
            self.events.push(ArenaEvent::PlayerDied {
                score: self.player.score,
            });
            self.state = SimState::Ended;
            return;
        }

        if levels_gained > 0 {
            let offers = roll_offers(&mut self.rng);
            debug!("offering upgrades {offers:?}");
            self.state = SimState::AwaitingUpgradeChoice {
                offers,
                queued: levels_gained - 1,
            };
        }
    }

    /// Applies one of the offered upgrades and resumes the simulation.
    pub fn choose_upgrade(&mut self, index: usize) -> Result<Upgrade, ArenaError> {
        let SimState::AwaitingUpgradeChoice { offers, queued } = &self.state else {
            return Err(ArenaError::NoUpgradePending);
        };
        let upgrade = *offers.get(index).ok_or(ArenaError::InvalidUpgradeChoice {
            index,
            offered: offers.len(),
        })?;
        let queued = *queued;

        upgrade.apply(&mut self.player);
        info!("{} picked {}", self.player.name, upgrade.title());

        self.state = if queued > 0 {
            SimState::AwaitingUpgradeChoice {
                offers: roll_offers(&mut self.rng),
                queued: queued - 1,
            }
        } else {
            SimState::Running
        };
        Ok(upgrade)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn random_point(&mut self) -> Vec2 {
        let size = self.config.world.size;
        Vec2::new(self.rng.random::<f32>() * size, self.rng.random::<f32>() * size)
    }

    fn spawn(&mut self) {
        let spawning = &self.config.spawning;
        if !spawning.enabled {
            return;
        }

        let ship_cap = spawning.base_ship_cap as f64
            + self.frame as f64 / spawning.frames_per_extra_ship.max(1) as f64;
        let bot_chance = spawning.bot_spawn_chance.clamp(0.0, 1.0);
        let asteroid_cap = spawning.asteroid_cap;
        let asteroid_chance = spawning.asteroid_spawn_chance.clamp(0.0, 1.0);

        if ((1 + self.bots.len()) as f64) < ship_cap && self.rng.random_bool(bot_chance) {
            self.spawn_bot();
        }
        if self.asteroids.len() < asteroid_cap && self.rng.random_bool(asteroid_chance) {
            self.spawn_asteroid();
        }
    }

    fn spawn_bot(&mut self) {
        let mut pos = self.random_point();
        for _ in 0..SPAWN_ATTEMPTS {
            if pos.distance(self.player.body.pos) >= self.config.spawning.min_spawn_distance {
                break;
            }
            pos = self.random_point();
        }

        let name = self
            .config
            .bots
            .names
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| "Bot".to_string());
        let color = self
            .config
            .bots
            .colors
            .choose(&mut self.rng)
            .copied()
            .unwrap_or([255, 255, 255]);

        let id = self.allocate_id();
        let mut bot = Ship::bot(id, pos, name, color, &self.config.player, &self.config.bots);

        let difficulty =
            1.0 + self.frame as f32 / self.config.spawning.difficulty_frames.max(1) as f32;
        let top = difficulty * 5.0;
        bot.level = if top > 1.0 {
            (self.rng.random_range(1.0..top).floor() as u32).max(1)
        } else {
            1
        };
        bot.max_hp *= difficulty;
        bot.hp = bot.max_hp;
        bot.damage *= difficulty;

        debug!(
            "spawned bot {} level {} at ({:.0}, {:.0})",
            bot.name, bot.level, pos.x, pos.y
        );
        self.bots.push(bot);
    }

    fn spawn_asteroid(&mut self) {
        let pos = self.random_point();
        let size = self.rng.random_range(1..=3u8);
        self.add_asteroid(pos, size);
    }

    fn update_camera(&mut self) {
        let max = Vec2::splat(self.config.world.size) - self.view;
        let centred = self.player.body.pos - self.view / 2.0;
        self.camera = centred.min(max).max(Vec2::ZERO);
    }

    fn apply_input(&mut self, input: &FrameInput) {
        if !self.player.is_alive() {
            return;
        }

        let direction = input.direction();
        if let Some(pointer) = input.pointer {
            let aim = self.camera + pointer - self.player.body.pos;
            if aim != Vec2::ZERO {
                self.player.angle = aim.y.atan2(aim.x);
            }
        } else if direction != Vec2::ZERO {
            self.player.angle = direction.y.atan2(direction.x);
        }

        let base_speed = self.config.player.speed;
        let force = if base_speed > 0.0 {
            self.config.player.thrust * self.player.speed / base_speed
        } else {
            self.config.player.thrust
        };
        self.player.thrust(direction, force);

        if input.fire {
            let volley = self.player.try_fire();
            if !volley.is_empty() {
                self.events.push(ArenaEvent::Shot { by_player: true });
            }
            self.bullets.extend(volley);
        }
    }

    /// Moves everything and runs bot behaviour. Returns the player's level-ups.
    fn update_entities(&mut self) -> u32 {
        let world = self.config.world.size;
        let friction = self.config.world.friction;
        let max_speed = self.config.bots.max_speed;

        let mut levels_gained = 0;
        if self.player.is_alive() {
            self.player.integrate(world, friction);
            levels_gained = self.player.gain_levels(max_speed);
            if levels_gained > 0 {
                info!("{} reached level {}", self.player.name, self.player.level);
                self.events.push(ArenaEvent::LevelUp {
                    level: self.player.level,
                });
            }
        }

        let target = self
            .player
            .is_alive()
            .then_some(self.player.body.pos);
        let hearing = self.view.x;
        let mut volleys = Vec::new();
        for bot in self.bots.iter_mut().filter(|b| b.is_alive()) {
            bot.integrate(world, friction);
            bot.gain_levels(max_speed);
            if bot.steer_bot(target, &mut self.rng, &self.config.bots) {
                volleys.extend(bot.fire());
                if target.is_some_and(|p| bot.body.distance_to(p) < hearing) {
                    self.events.push(ArenaEvent::Shot { by_player: false });
                }
            }
        }

        for bullet in self.bullets.iter_mut().filter(|b| b.is_alive()) {
            bullet.steer(&self.bots);
            bullet.advance(world);
        }

        for orb in self.orbs.iter_mut() {
            orb.update();
        }

        // Fired this frame, so they start moving next frame
        self.bullets.extend(volleys);
        levels_gained
    }

    /// Bullets against ships, then asteroids. One target per bullet per frame.
    fn resolve_collisions(&mut self) -> Vec<Casualty> {
        let Self {
            player,
            bots,
            bullets,
            asteroids,
            ..
        } = self;
        let mut casualties = Vec::new();

        for bullet in bullets.iter_mut().filter(|b| b.is_alive()) {
            if let Some(id) = bullet.last_hit {
                let touching = std::iter::once(&*player)
                    .chain(bots.iter())
                    .find(|ship| ship.id == id)
                    .map(|ship| ship.is_alive() && bullet.touches(ship.body.pos, ship.hit_radius()))
                    .or_else(|| {
                        asteroids
                            .iter()
                            .find(|a| a.id == id)
                            .map(|a| a.is_alive() && bullet.touches(a.body.pos, a.body.radius))
                    })
                    .unwrap_or(false);
                if !touching {
                    bullet.last_hit = None;
                }
            }

            let ship_hit = std::iter::once(&mut *player)
                .chain(bots.iter_mut())
                .find(|ship| {
                    ship.is_alive()
                        && ship.id != bullet.owner
                        && bullet.last_hit != Some(ship.id)
                        && bullet.touches(ship.body.pos, ship.hit_radius())
                });

            if let Some(ship) = ship_hit {
                bullet.on_hit(ship.id);
                if let Some(death) = ship.take_damage(bullet.damage) {
                    casualties.push(Casualty {
                        death,
                        killer: Some(bullet.owner),
                        victim: ship.name.clone(),
                    });
                }
                continue;
            }

            let asteroid_hit = asteroids.iter_mut().find(|a| {
                a.is_alive()
                    && bullet.last_hit != Some(a.id)
                    && bullet.touches(a.body.pos, a.body.radius)
            });

            if let Some(asteroid) = asteroid_hit {
                bullet.on_hit(asteroid.id);
                if let Some(death) = asteroid.take_damage(bullet.damage) {
                    casualties.push(Casualty {
                        death,
                        killer: Some(bullet.owner),
                        victim: "asteroid".to_string(),
                    });
                }
            }
        }

        casualties
    }

    fn collect_orbs(&mut self) {
        if !self.player.is_alive() {
            return;
        }

        let pickups = &self.config.pickups;
        let magnet = pickups.base_magnet_radius + self.player.size_mult * pickups.magnet_per_size;
        let pull = pickups.magnet_pull;
        let reach = self.player.hit_radius();
        let target = self.player.body.pos;

        for orb in self.orbs.iter_mut().filter(|o| o.is_alive()) {
            if orb.attract(target, magnet, pull, reach) {
                self.player.collect(orb.value);
                self.events.push(ArenaEvent::OrbCollected { value: orb.value });
            }
        }
    }

    /// Periodic area damage: the player's aura hurts bots and asteroids,
    /// bot auras hurt the player.
    fn apply_auras(&mut self) -> Vec<Casualty> {
        let mut casualties = Vec::new();
        if self.frame % AURA_INTERVAL != 0 || !self.player.is_alive() {
            return casualties;
        }

        let Self {
            player,
            bots,
            asteroids,
            ..
        } = self;

        if player.aura_radius > 0.0 {
            let centre = player.body.pos;
            let reach = player.aura_radius;
            for bot in bots
                .iter_mut()
                .filter(|b| b.is_alive() && b.body.distance_to(centre) < reach)
            {
                if let Some(death) = bot.take_damage(player.aura_damage) {
                    casualties.push(Casualty {
                        death,
                        killer: Some(player.id),
                        victim: bot.name.clone(),
                    });
                }
            }
            for asteroid in asteroids
                .iter_mut()
                .filter(|a| a.is_alive() && a.body.distance_to(centre) < reach)
            {
                if let Some(death) = asteroid.take_damage(player.aura_damage) {
                    casualties.push(Casualty {
                        death,
                        killer: Some(player.id),
                        victim: "asteroid".to_string(),
                    });
                }
            }
        }

        let centre = player.body.pos;
        for bot in bots
            .iter()
            .filter(|b| b.is_alive() && b.aura_radius > 0.0 && b.body.distance_to(centre) < b.aura_radius)
        {
            if let Some(death) = player.take_damage(bot.aura_damage) {
                casualties.push(Casualty {
                    death,
                    killer: Some(bot.id),
                    victim: player.name.clone(),
                });
            }
        }

        casualties
    }

    /// Guardian drones grind anything they touch, every frame.
    fn apply_orbitals(&mut self) -> Vec<Casualty> {
        let mut casualties = Vec::new();
        if self.player.orbitals == 0 || !self.player.is_alive() {
            return casualties;
        }

        let points = self.player.orbital_points(self.frame);
        let killer = self.player.id;
        for point in points {
            for bot in self
                .bots
                .iter_mut()
                .filter(|b| b.is_alive() && b.body.distance_to(point) < b.body.radius + ORBITAL_RADIUS)
            {
                if let Some(death) = bot.take_damage(ORBITAL_DAMAGE) {
                    casualties.push(Casualty {
                        death,
                        killer: Some(killer),
                        victim: bot.name.clone(),
                    });
                }
            }
            for asteroid in self
                .asteroids
                .iter_mut()
                .filter(|a| a.is_alive() && a.body.distance_to(point) < a.body.radius + ORBITAL_RADIUS)
            {
                if let Some(death) = asteroid.take_damage(ORBITAL_DAMAGE) {
                    casualties.push(Casualty {
                        death,
                        killer: Some(killer),
                        victim: "asteroid".to_string(),
                    });
                }
            }
        }

        casualties
    }

    /// Drops orbs and pays out bounties, once per death.
    fn settle(&mut self, casualties: Vec<Casualty>) {
        for Casualty {
            death,
            killer,
            victim,
        } in casualties
        {
            self.drop_orbs(&death);

            let (Some(bounty), Some(killer)) = (death.bounty, killer) else {
                continue;
            };
            let by_player = killer == self.player.id;
            let credited = if by_player {
                Some(&mut self.player)
            } else {
                self.bots.iter_mut().find(|b| b.id == killer)
            };
            if let Some(ship) = credited {
                ship.credit_kill(bounty);
                debug!("{} destroyed {victim} (+{bounty})", ship.name);
            }
            self.events.push(ArenaEvent::Kill { by_player, victim });
        }
    }

    fn drop_orbs(&mut self, death: &Death) {
        let jitter = self.config.pickups.drop_jitter.abs();
        for _ in 0..death.orb_count {
            let offset = if jitter > 0.0 {
                Vec2::new(
                    self.rng.random_range(-jitter..jitter),
                    self.rng.random_range(-jitter..jitter),
                )
            } else {
                Vec2::ZERO
            };
            let orb = Orb::new(death.pos + offset, death.orb_value, &mut self.rng);
            self.orbs.push(orb);
        }
    }

    fn sweep(&mut self) {
        self.bots.retain(|b| b.is_alive());
        self.bullets.retain(|b| b.is_alive());
        self.asteroids.retain(|a| a.is_alive());
        self.orbs.retain(|o| o.is_alive());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> ArenaConfig {
        let mut config = ArenaConfig::default();
        config.spawning.enabled = false;
        config
    }

    fn quiet_arena() -> Arena {
        Arena::empty(quiet_config(), "Tester", StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_direction_right_and_down_take_priority() {
        let input = FrameInput {
            up: true,
            down: true,
            left: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_camera_clamped_to_world() {
        let mut arena = quiet_arena();
        arena.set_view_size(1000.0, 800.0);
        arena.player_mut().body.pos = Vec2::new(100.0, 3950.0);
        arena.tick(&FrameInput::default());
        assert_eq!(arena.camera(), Vec2::new(0.0, 3200.0));
    }

    #[test]
    fn test_camera_pinned_when_view_exceeds_world() {
        let mut arena = quiet_arena();
        arena.set_view_size(9000.0, 9000.0);
        arena.tick(&FrameInput::default());
        assert_eq!(arena.camera(), Vec2::ZERO);
    }

    #[test]
    fn test_pointer_aims_in_world_space() {
        let mut arena = quiet_arena();
        arena.set_view_size(1000.0, 1000.0);
        // Camera lands on (1500, 1500); pointer straight below the player
        let input = FrameInput {
            pointer: Some(Vec2::new(500.0, 900.0)),
            ..Default::default()
        };
        arena.tick(&input);
        assert!((arena.player().angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_roll_respects_caps() {
        let mut config = ArenaConfig::default();
        config.spawning.initial_bots = 0;
        config.spawning.initial_asteroids = 0;
        config.spawning.bot_spawn_chance = 1.0;
        config.spawning.asteroid_spawn_chance = 1.0;
        config.spawning.base_ship_cap = 3;
        config.spawning.asteroid_cap = 2;

        let mut arena = Arena::new(config, "Tester", StdRng::seed_from_u64(2));
        for _ in 0..10 {
            arena.tick(&FrameInput::default());
        }
        assert_eq!(arena.bots().len(), 2);
        assert_eq!(arena.asteroids().len(), 2);
    }

    #[test]
    fn test_bots_scale_with_difficulty() {
        let mut config = quiet_config();
        config.spawning.difficulty_frames = 100;
        let mut arena = Arena::empty(config, "Tester", StdRng::seed_from_u64(5));
        arena.frame = 150;

        for _ in 0..50 {
            arena.spawn_bot();
        }

        // Difficulty 2.5 rolls levels from [1, 12.5)
        let levels: Vec<u32> = arena.bots().iter().map(|b| b.level).collect();
        assert!(levels.iter().all(|l| (1..=12).contains(l)));
        assert!(levels.iter().any(|l| *l > 5));
        for bot in arena.bots() {
            assert_eq!(bot.max_hp, 250.0);
            assert_eq!(bot.hp, 250.0);
            assert_eq!(bot.damage, 25.0);
        }
    }

    #[test]
    fn test_first_bots_spawn_at_base_strength() {
        let mut arena = quiet_arena();
        arena.spawn_bot();
        // Difficulty 1.0 rolls levels from [1, 5)
        let bot = &arena.bots()[0];
        assert!((1..=4).contains(&bot.level));
        assert_eq!(bot.max_hp, 100.0);
        assert_eq!(bot.damage, 10.0);
    }

    #[test]
    fn test_ship_cap_grows_over_time() {
        let mut config = ArenaConfig::default();
        config.spawning.initial_bots = 0;
        config.spawning.initial_asteroids = 0;
        config.spawning.bot_spawn_chance = 1.0;
        config.spawning.asteroid_spawn_chance = 0.0;
        config.spawning.base_ship_cap = 3;
        config.spawning.frames_per_extra_ship = 10;

        // Frames 30 to 34 allow six ships, player included
        let mut arena = Arena::new(config, "Tester", StdRng::seed_from_u64(2));
        arena.frame = 29;
        for _ in 0..5 {
            arena.tick(&FrameInput::default());
        }
        assert_eq!(arena.frame(), 34);
        assert_eq!(arena.bots().len(), 5);
    }

    #[test]
    fn test_frozen_while_awaiting_upgrade() {
        let mut arena = quiet_arena();
        arena.player_mut().xp = 100;
        arena.tick(&FrameInput::default());
        assert!(matches!(arena.state(), SimState::AwaitingUpgradeChoice { .. }));

        let frame = arena.frame();
        arena.tick(&FrameInput::default());
        assert_eq!(arena.frame(), frame);
    }

    #[test]
    fn test_choose_upgrade_requires_pending_choice() {
        let mut arena = quiet_arena();
        assert!(matches!(
            arena.choose_upgrade(0),
            Err(ArenaError::NoUpgradePending)
        ));
    }
}
