use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::{DEFAULT_MAX_PLAYERS_CAP, MAX_ROSTER, MIN_PLAYERS};

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("min_players must be >= {MIN_PLAYERS} (got {value})")]
    MinPlayersTooLow { value: u8 },
    #[error("max_players_cap ({cap}) must be >= min_players ({min})")]
    CapBelowMinimum { cap: u8, min: u8 },
    #[error("max_players_cap must be <= {MAX_ROSTER} (got {value})")]
    CapTooHigh { value: u8 },
    #[error("invalid rules json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rule knobs shared by every node executing the same chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub min_players: u8,
    pub max_players_cap: u8,
    /// Deal one Detective and one Doctor when at least two non-Mafia seats exist.
    pub special_roles: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players_cap: DEFAULT_MAX_PLAYERS_CAP,
            special_roles: true,
        }
    }
}

impl RulesConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < MIN_PLAYERS {
            return Err(ConfigError::MinPlayersTooLow {
                value: self.min_players,
            });
        }
        if self.max_players_cap < self.min_players {
            return Err(ConfigError::CapBelowMinimum {
                cap: self.max_players_cap,
                min: self.min_players,
            });
        }
        if self.max_players_cap as usize > MAX_ROSTER {
            return Err(ConfigError::CapTooHigh {
                value: self.max_players_cap,
            });
        }
        Ok(())
    }

    pub fn allows_max_players(&self, max_players: u8) -> bool {
        (self.min_players..=self.max_players_cap).contains(&max_players)
    }
}
