use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::{DungeonError, Result};

/// Generation parameters. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DungeonConfig {
    pub room_count: u32,
    pub width: u32,
    pub height: u32,
    /// Minimum per-axis distance between origins, before it is capped by
    /// `width / room_count` and `height / room_count`.
    pub min_separation: u32,
    /// Samples per room before the last candidate is taken regardless.
    pub max_attempts: u32,
    /// Unseeded when absent.
    pub seed: Option<u64>,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            room_count: 5,
            width: 80,
            height: 48,
            min_separation: 5,
            max_attempts: 100,
            seed: None,
        }
    }
}

impl DungeonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.room_count == 0 {
            return Err(DungeonError::NoRooms);
        }
        if self.width == 0 || self.height == 0 {
            return Err(DungeonError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        let too_large = DungeonError::GridTooLarge {
            width: self.width,
            height: self.height,
        };
        let (Ok(w), Ok(h)) = (i32::try_from(self.width), i32::try_from(self.height)) else {
            return Err(too_large);
        };
        // cells are indexed as `y * width + x` in i32, and the ring arithmetic
        // reaches `x + step` with `step` up to the larger side
        if w.checked_mul(h).is_none()
            || w.checked_mul(2).is_none()
            || h.checked_mul(2).is_none()
            || (self.width as usize).checked_mul(self.height as usize).is_none()
        {
            return Err(too_large);
        }
        if self.max_attempts == 0 {
            return Err(DungeonError::NoAttempts);
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DungeonConfig::default();
        assert_eq!(config.room_count, 5);
        assert_eq!((config.width, config.height), (80, 48));
        assert_eq!(config.min_separation, 5);
        assert_eq!(config.max_attempts, 100);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_rooms() {
        let config = DungeonConfig {
            room_count: 0,
            ..DungeonConfig::default()
        };
        assert!(matches!(config.validate(), Err(DungeonError::NoRooms)));
    }

    #[test]
    fn rejects_empty_grid() {
        for (width, height) in [(0, 10), (10, 0), (0, 0)] {
            let config = DungeonConfig {
                width,
                height,
                ..DungeonConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(DungeonError::EmptyGrid { .. })
            ));
        }
    }

    #[test]
    fn rejects_oversized_grid() {
        for (width, height) in [(u32::MAX, 48), (80, u32::MAX), (65_536, 65_536), (1 << 30, 4)] {
            let config = DungeonConfig {
                room_count: 1,
                width,
                height,
                ..DungeonConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(DungeonError::GridTooLarge { .. })),
                "{width}x{height}"
            );
        }
    }

    #[test]
    fn accepts_grid_whose_cell_count_fits_i32() {
        let config = DungeonConfig {
            room_count: 1,
            width: 46_340,
            height: 46_340,
            ..DungeonConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_attempts() {
        let config = DungeonConfig {
            max_attempts: 0,
            ..DungeonConfig::default()
        };
        assert!(matches!(config.validate(), Err(DungeonError::NoAttempts)));
    }

    #[test]
    fn one_by_one_grid_is_allowed() {
        let config = DungeonConfig {
            room_count: 1,
            width: 1,
            height: 1,
            ..DungeonConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = DungeonConfig::from_json_str(r#"{ "room_count": 3, "seed": 7 }"#).unwrap();
        assert_eq!(config.room_count, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.width, 80);
        assert_eq!(config.max_attempts, 100);
    }

    #[test]
    fn json_is_validated() {
        let err = DungeonConfig::from_json_str(r#"{ "width": 0 }"#).unwrap_err();
        assert!(matches!(err, DungeonError::EmptyGrid { width: 0, .. }));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = DungeonConfig::from_json_str(r#"{ "rooms": 3 }"#).unwrap_err();
        assert!(matches!(err, DungeonError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DungeonConfig::from_path("/nonexistent/dungeon.json").unwrap_err();
        assert!(matches!(err, DungeonError::Io(_)));
    }
}
