// Library exports for testing
pub use arena::{Arena, ArenaEvent, FrameInput, LeaderboardEntry, SimState};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use upgrades::{Rarity, Upgrade};

pub mod app;
pub mod arena;
pub mod audio;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod renderer;
pub mod upgrades;
