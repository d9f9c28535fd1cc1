pub mod config;
pub mod config_loader;
pub mod error;

pub use config::{EngineConfig, ResolutionWatcherConfig, SameMarketConfig, TradingMode};
pub use config_loader::ConfigLoader;
pub use error::{EngineError, Result};
