use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    // Audio
    pub default_volume: u16, // En porcentaje, 100 = volumen original del nodo
    pub default_search_engine: String,

    // Voz
    pub self_deaf: bool,
    pub self_mute: bool,

    // Eventos
    pub event_buffer: usize,

    // Logging
    pub log_filter: String,
}

impl PlayerConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Audio
            default_volume: std::env::var("DEFAULT_VOLUME")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            default_search_engine: std::env::var("DEFAULT_SEARCH_ENGINE")
                .unwrap_or_else(|_| "ytsearch".to_string()),

            // Voz
            self_deaf: std::env::var("SELF_DEAF")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,
            self_mute: std::env::var("SELF_MUTE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,

            // Eventos
            event_buffer: std::env::var("EVENT_BUFFER")
                .unwrap_or_else(|_| "256".to_string())
                .parse()?,

            // Logging
            log_filter: std::env::var("LOG_FILTER")
                .unwrap_or_else(|_| "guild_player=debug".to_string()),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Volume must be between 0 and 1000 percent
    /// - The event buffer must hold at least one event
    /// - The search engine prefix must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.default_volume > 1000 {
            anyhow::bail!(
                "Default volume must be between 0 and 1000, got: {}",
                self.default_volume
            );
        }

        if self.event_buffer == 0 {
            anyhow::bail!("Event buffer must be greater than 0");
        }

        if self.default_search_engine.trim().is_empty() {
            anyhow::bail!("Default search engine must not be empty");
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging.
    pub fn summary(&self) -> String {
        format!(
            "Player config: {}% vol, engine={}, deaf={}, mute={}, event buffer={}",
            self.default_volume,
            self.default_search_engine,
            self.self_deaf,
            self.self_mute,
            self.event_buffer
        )
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: 100,
            default_search_engine: "ytsearch".to_string(),
            self_deaf: true,
            self_mute: false,
            event_buffer: 256,
            log_filter: "guild_player=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = PlayerConfig::default();
        config.default_volume = 1500;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.event_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.default_search_engine = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_mentions_engine() {
        let summary = PlayerConfig::default().summary();
        assert!(summary.contains("engine=ytsearch"));
        assert!(summary.contains("100% vol"));
    }
}
