//! Room configuration.

use lycan_engine::GameConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a room instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Capacity of the room's command channel. Senders wait when it fills.
    pub channel_size: usize,

    /// Settings handed to the engine.
    pub game: GameConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 20,
            channel_size: 64,
            game: GameConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_players, 20);
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.game.min_players, 4);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"max_players": 8}"#).unwrap();
        assert_eq!(config.max_players, 8);
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.game, GameConfig::default());
    }
}
