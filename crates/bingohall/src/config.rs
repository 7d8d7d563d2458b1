//! Service configuration.
//!
//! Every setting has a default and can be overridden from the environment.
//! An override that doesn't parse is an error, not a silent fallback.

use std::str::FromStr;
use std::time::Duration;

use bingohall_room::RoomConfig;
use serde::{Deserialize, Serialize};

/// Cooldown between calls, in milliseconds.
pub const ENV_CALL_COOLDOWN_MS: &str = "BINGOHALL_CALL_COOLDOWN_MS";
/// `true` to let only a room's creator start it.
pub const ENV_CREATOR_ONLY_START: &str = "BINGOHALL_CREATOR_ONLY_START";
/// `true` to let only a room's creator call numbers.
pub const ENV_CREATOR_ONLY_CALL: &str = "BINGOHALL_CREATOR_ONLY_CALL";
/// Largest `max_players` a room may be created with.
pub const ENV_MAX_PLAYERS_CAP: &str = "BINGOHALL_MAX_PLAYERS_CAP";
/// Rows returned by a leaderboard request that names no limit.
pub const ENV_LEADERBOARD_LIMIT: &str = "BINGOHALL_LEADERBOARD_LIMIT";

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Everything the hall needs to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallConfig {
    /// Policy handed to every room.
    pub room: RoomConfig,
    /// Default leaderboard length.
    pub leaderboard_limit: usize,
}

impl Default for HallConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

impl HallConfig {
    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if a variable is set but malformed, or
    /// [`ConfigError::OutOfRange`] if it parses to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name
    /// to its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cooldown_ms = parse_var(
            &lookup,
            ENV_CALL_COOLDOWN_MS,
            duration_millis(defaults.room.call_cooldown),
        )?;

        let config = Self {
            room: RoomConfig {
                call_cooldown: Duration::from_millis(cooldown_ms),
                creator_only_start: parse_var(
                    &lookup,
                    ENV_CREATOR_ONLY_START,
                    defaults.room.creator_only_start,
                )?,
                creator_only_call: parse_var(
                    &lookup,
                    ENV_CREATOR_ONLY_CALL,
                    defaults.room.creator_only_call,
                )?,
                max_players_cap: parse_var(
                    &lookup,
                    ENV_MAX_PLAYERS_CAP,
                    defaults.room.max_players_cap,
                )?,
                ..defaults.room
            },
            leaderboard_limit: parse_var(
                &lookup,
                ENV_LEADERBOARD_LIMIT,
                defaults.leaderboard_limit,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room.max_players_cap == 0 {
            return Err(ConfigError::OutOfRange {
                var: ENV_MAX_PLAYERS_CAP.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::OutOfRange {
                var: ENV_LEADERBOARD_LIMIT.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },

    #[error("out of range value for {var}: {reason}")]
    OutOfRange { var: String, reason: String },
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            value: raw,
        }),
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<HallConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HallConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.room.call_cooldown, Duration::from_secs(5));
        assert!(!config.room.creator_only_start);
        assert!(!config.room.creator_only_call);
        assert_eq!(config.room.max_players_cap, 100);
        assert_eq!(config.leaderboard_limit, 10);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (ENV_CALL_COOLDOWN_MS, "250"),
            (ENV_CREATOR_ONLY_START, "true"),
            (ENV_CREATOR_ONLY_CALL, " true "),
            (ENV_MAX_PLAYERS_CAP, "8"),
            (ENV_LEADERBOARD_LIMIT, "3"),
        ])
        .unwrap();
        assert_eq!(config.room.call_cooldown, Duration::from_millis(250));
        assert!(config.room.creator_only_start);
        assert!(config.room.creator_only_call);
        assert_eq!(config.room.max_players_cap, 8);
        assert_eq!(config.leaderboard_limit, 3);
        assert_eq!(config.room.win_points, 100);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = load(&[(ENV_CALL_COOLDOWN_MS, "five seconds")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: ENV_CALL_COOLDOWN_MS.to_string(),
                value: "five seconds".to_string(),
            }
        );

        let err = load(&[(ENV_CREATOR_ONLY_CALL, "yes")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        assert!(matches!(
            load(&[(ENV_MAX_PLAYERS_CAP, "0")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            load(&[(ENV_LEADERBOARD_LIMIT, "0")]),
            Err(ConfigError::OutOfRange { .. })
        ));
    }
}
