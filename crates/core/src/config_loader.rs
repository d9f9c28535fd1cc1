use crate::config::EngineConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by merging TOML, environment variables, and
    /// a JSON override file, in that precedence order (later layers win).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<EngineConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Same as [`Self::load`] but reads the TOML layer from an explicit path,
    /// used by the CLI's `--config` flag.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_from(toml_path: &str) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("APP_"))
            .merge(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }
}
