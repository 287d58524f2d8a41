use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::StoreError, store::KeyValueStore};

/// Storage key holding the master volume as a decimal string.
pub const VOLUME_KEY: &str = "kelime-oyunu-volume";
/// Storage key holding the mute flag as `"true"` / `"false"`.
pub const MUTED_KEY: &str = "kelime-oyunu-muted";

/// The engine's persisted settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Stored level in [0, 1]; kept while muted.
    pub master_volume: f32,
    pub muted: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            muted: false,
        }
    }
}

impl EngineConfig {
    /// Read both keys, falling back to the default for anything missing,
    /// unreadable or malformed. Never fails.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let master_volume = read(store, VOLUME_KEY)
            .and_then(|text| text.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.master_volume);

        let muted = read(store, MUTED_KEY)
            .and_then(|text| match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            })
            .unwrap_or(defaults.muted);

        Self {
            master_volume,
            muted,
        }
    }

    /// Write both keys.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(VOLUME_KEY, &self.master_volume.to_string())?;
        store.set(MUTED_KEY, if self.muted { "true" } else { "false" })
    }

    /// What the master gain should actually output.
    pub fn effective_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume
        }
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, "could not read setting, using default: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store_with(volume: Option<&str>, muted: Option<&str>) -> MemoryStore {
        let mut store = MemoryStore::new();
        if let Some(v) = volume {
            store.set(VOLUME_KEY, v).unwrap();
        }
        if let Some(m) = muted {
            store.set(MUTED_KEY, m).unwrap();
        }
        store
    }

    #[test]
    fn empty_store_loads_defaults() {
        let config = EngineConfig::load(&MemoryStore::new());
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.master_volume, 0.7);
        assert!(!config.muted);
    }

    #[test]
    fn garbage_falls_back_per_key() {
        let config = EngineConfig::load(&store_with(Some("loud"), Some("true")));
        assert_eq!(config.master_volume, 0.7);
        assert!(config.muted);

        let config = EngineConfig::load(&store_with(Some("0.25"), Some("yes")));
        assert_eq!(config.master_volume, 0.25);
        assert!(!config.muted);

        let config = EngineConfig::load(&store_with(Some("NaN"), None));
        assert_eq!(config.master_volume, 0.7);
    }

    #[test]
    fn out_of_range_volume_is_clamped() {
        assert_eq!(
            EngineConfig::load(&store_with(Some("3"), None)).master_volume,
            1.0
        );
        assert_eq!(
            EngineConfig::load(&store_with(Some("-1"), None)).master_volume,
            0.0
        );
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        let config = EngineConfig {
            master_volume: 0.42,
            muted: true,
        };
        config.save(&mut store).unwrap();

        assert_eq!(store.get(VOLUME_KEY).unwrap().as_deref(), Some("0.42"));
        assert_eq!(store.get(MUTED_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(EngineConfig::load(&store), config);
    }

    #[test]
    fn muting_zeroes_the_effective_level_only() {
        let config = EngineConfig {
            master_volume: 0.9,
            muted: true,
        };
        assert_eq!(config.effective_level(), 0.0);
        assert_eq!(config.master_volume, 0.9);
    }
}
