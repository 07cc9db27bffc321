//! Game configuration

use serde::{Deserialize, Serialize};

use crate::coord::Shape;
use crate::error::{GameError, Result};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Parameters for a new game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Initial board extents
    pub shape: Shape,
    /// Seats at the table (2-4)
    pub players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            players: MIN_PLAYERS,
        }
    }
}

impl GameConfig {
    pub fn new(shape: [usize; 4], players: usize) -> Result<Self> {
        let config = Self {
            shape: Shape::new(shape)?,
            players,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(GameError::InvalidPlayerCount(self.players));
        }
        Shape::new(self.shape.extents())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.shape, Shape::default());
        assert_eq!(config.players, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_player_count_bounds() {
        assert_eq!(
            GameConfig::default().with_players(1).validate(),
            Err(GameError::InvalidPlayerCount(1))
        );
        assert!(GameConfig::default().with_players(4).validate().is_ok());
        assert!(GameConfig::new([4, 4, 4, 4], 5).is_err());
        assert!(GameConfig::new([4, 0, 4, 4], 2).is_err());
    }
}
