mod keeper_config;

pub use keeper_config::{KeeperConfig, KeeperConfigError};
