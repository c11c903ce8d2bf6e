use rand::Rng;
use rand::seq::IndexedRandom;

use crate::entities::Ship;

/// Upgrades offered per level-up
pub const OFFER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn get_name(&self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upgrade {
    Multishot,
    TurboEngine,
    PlasmaRounds,
    RapidFire,
    HullReinforcement,
    SmartBullets,
    Ricochet,
    StaticField,
    GuardianDrone,
    Gigantism,
    SniperModule,
    ScatterModule,
}

impl Upgrade {
    pub const ALL: [Upgrade; 12] = [
        Upgrade::Multishot,
        Upgrade::TurboEngine,
        Upgrade::PlasmaRounds,
        Upgrade::RapidFire,
        Upgrade::HullReinforcement,
        Upgrade::SmartBullets,
        Upgrade::Ricochet,
        Upgrade::StaticField,
        Upgrade::GuardianDrone,
        Upgrade::Gigantism,
        Upgrade::SniperModule,
        Upgrade::ScatterModule,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Upgrade::Multishot => "Multishot",
            Upgrade::TurboEngine => "Turbo Engine",
            Upgrade::PlasmaRounds => "Plasma Rounds",
            Upgrade::RapidFire => "Rapid Fire",
            Upgrade::HullReinforcement => "Hull Reinforcement",
            Upgrade::SmartBullets => "Smart Bullets",
            Upgrade::Ricochet => "Ricochet",
            Upgrade::StaticField => "Static Field",
            Upgrade::GuardianDrone => "Guardian Drone",
            Upgrade::Gigantism => "Gigantism",
            Upgrade::SniperModule => "Sniper Module",
            Upgrade::ScatterModule => "Scatter Module",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Upgrade::Multishot => "+1 Projectile",
            Upgrade::TurboEngine => "+15% Speed",
            Upgrade::PlasmaRounds => "+20% Damage",
            Upgrade::RapidFire => "-10% Cooldown",
            Upgrade::HullReinforcement => "+50 Max HP & Heal",
            Upgrade::SmartBullets => "Bullets seek enemies",
            Upgrade::Ricochet => "Bullets bounce off walls",
            Upgrade::StaticField => "Damage aura around ship",
            Upgrade::GuardianDrone => "Orbital projectile",
            Upgrade::Gigantism => "+20% Size & HP",
            Upgrade::SniperModule => "Less spread, more damage",
            Upgrade::ScatterModule => "More spread, more bullets",
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            Upgrade::Multishot
            | Upgrade::Ricochet
            | Upgrade::Gigantism
            | Upgrade::SniperModule
            | Upgrade::ScatterModule => Rarity::Rare,
            Upgrade::SmartBullets | Upgrade::StaticField => Rarity::Epic,
            Upgrade::GuardianDrone => Rarity::Legendary,
            _ => Rarity::Common,
        }
    }

    /// Mutates the ship's modifiers. Bullets already in flight keep their stats.
    pub fn apply(&self, ship: &mut Ship) {
        match self {
            Upgrade::Multishot => ship.projectile_count += 1,
            Upgrade::TurboEngine => ship.speed *= 1.15,
            Upgrade::PlasmaRounds => ship.damage *= 1.2,
            Upgrade::RapidFire => ship.fire_rate *= 0.9,
            Upgrade::HullReinforcement => {
                ship.max_hp += 50.0;
                ship.hp = ship.max_hp;
            }
            Upgrade::SmartBullets => ship.homing += 0.5,
            Upgrade::Ricochet => ship.bounce += 1,
            Upgrade::StaticField => {
                ship.aura_radius += 50.0;
                ship.aura_damage += 0.5;
            }
            Upgrade::GuardianDrone => ship.orbitals += 1,
            Upgrade::Gigantism => {
                ship.size_mult *= 1.2;
                ship.max_hp *= 1.2;
                ship.hp = (ship.hp + 20.0).min(ship.max_hp);
            }
            Upgrade::SniperModule => {
                ship.spread *= 0.5;
                ship.damage *= 1.2;
            }
            Upgrade::ScatterModule => {
                ship.spread += 0.2;
                ship.projectile_count += 2;
            }
        }
    }
}

/// Picks three distinct upgrades to offer.
pub fn roll_offers(rng: &mut impl Rng) -> Vec<Upgrade> {
    Upgrade::ALL
        .choose_multiple(rng, OFFER_COUNT)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::entities::EntityId;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ship() -> Ship {
        Ship::player(EntityId(1), Vec2::new(10.0, 10.0), "Tester", &PlayerConfig::default())
    }

    #[test]
    fn test_multishot_twice_adds_two_projectiles() {
        let mut ship = ship();
        Upgrade::Multishot.apply(&mut ship);
        Upgrade::Multishot.apply(&mut ship);
        assert_eq!(ship.projectile_count, 3);
        assert_eq!(ship.fire().len(), 3);
    }

    #[test]
    fn test_hull_reinforcement_heals() {
        let mut ship = ship();
        ship.hp = 5.0;
        Upgrade::HullReinforcement.apply(&mut ship);
        assert_eq!(ship.max_hp, 150.0);
        assert_eq!(ship.hp, 150.0);
    }

    #[test]
    fn test_gigantism_grows_ship_and_hull() {
        let mut ship = ship();
        Upgrade::Gigantism.apply(&mut ship);
        assert!((ship.hit_radius() - 24.0).abs() < 1e-4);
        assert!((ship.max_hp - 120.0).abs() < 1e-4);
        assert!((ship.hp - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_combat_modifiers() {
        let mut ship = ship();
        Upgrade::SmartBullets.apply(&mut ship);
        Upgrade::Ricochet.apply(&mut ship);
        Upgrade::StaticField.apply(&mut ship);
        Upgrade::GuardianDrone.apply(&mut ship);
        Upgrade::RapidFire.apply(&mut ship);
        assert_eq!(ship.homing, 0.5);
        assert_eq!(ship.bounce, 1);
        assert_eq!(ship.aura_radius, 50.0);
        assert_eq!(ship.aura_damage, 0.5);
        assert_eq!(ship.orbitals, 1);
        assert!((ship.fire_rate - 27.0).abs() < 1e-4);
    }

    #[test]
    fn test_scatter_and_sniper_adjust_spread() {
        let mut ship = ship();
        Upgrade::ScatterModule.apply(&mut ship);
        assert_eq!(ship.projectile_count, 3);
        assert!((ship.spread - 0.3).abs() < 1e-5);

        Upgrade::SniperModule.apply(&mut ship);
        assert!((ship.spread - 0.15).abs() < 1e-5);
        assert!((ship.damage - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_offers_are_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let offers = roll_offers(&mut rng);
            assert_eq!(offers.len(), OFFER_COUNT);
            assert_ne!(offers[0], offers[1]);
            assert_ne!(offers[0], offers[2]);
            assert_ne!(offers[1], offers[2]);
        }
    }

    #[test]
    fn test_rarity_tiers() {
        assert_eq!(Upgrade::TurboEngine.rarity(), Rarity::Common);
        assert_eq!(Upgrade::Multishot.rarity(), Rarity::Rare);
        assert_eq!(Upgrade::StaticField.rarity(), Rarity::Epic);
        assert_eq!(Upgrade::GuardianDrone.rarity(), Rarity::Legendary);
    }
}
