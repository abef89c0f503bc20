//! # Engine Configuration
//!
//! Configuration for the booking store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CONCIERGE_MODE=multi                                               │
//! │     CONCIERGE_DATA_DIR=/tmp/concierge                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/concierge/concierge.toml (Linux)                         │
//! │     ~/Library/Application Support/com.concierge.concierge/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     single mode, hotel rules, per-night pricing, persistence on        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # concierge.toml
//! [store]
//! mode = "multi"
//! hotel_rules = true
//!
//! [pricing]
//! per_night = true
//! volume_discount_min_offers = 3
//! volume_discount_bps = 1000   # 10.00%
//!
//! [persistence]
//! enabled = true
//! storage_key = "concierge-booking-state"
//! # data_dir = "/var/lib/concierge"
//! ```

use std::path::PathBuf;

use concierge_core::{BookingMode, PricingRule, RuleSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::persistence::{FileStorage, STORAGE_KEY};

// =============================================================================
// Store Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Booking mode the store starts in.
    #[serde(default)]
    pub mode: BookingMode,

    /// Load the built-in hotel rule set. When off, only structural eviction
    /// applies.
    #[serde(default = "default_true")]
    pub hotel_rules: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            mode: BookingMode::default(),
            hotel_rules: true,
        }
    }
}

impl StoreSettings {
    pub fn rule_set(&self) -> RuleSet {
        if self.hotel_rules {
            RuleSet::hotel_defaults()
        } else {
            RuleSet::empty()
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Charge `perNight` items for every night of the stay.
    #[serde(default = "default_true")]
    pub per_night: bool,

    /// Offers needed before the volume discount applies.
    #[serde(default = "default_min_offers")]
    pub volume_discount_min_offers: usize,

    /// Volume discount in basis points. 0 disables it.
    #[serde(default = "default_discount_bps")]
    pub volume_discount_bps: u32,
}

fn default_min_offers() -> usize {
    3
}

fn default_discount_bps() -> u32 {
    1000
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            per_night: true,
            volume_discount_min_offers: default_min_offers(),
            volume_discount_bps: default_discount_bps(),
        }
    }
}

impl PricingSettings {
    /// The pricing rules these settings describe, in application order.
    pub fn pricing_rules(&self) -> Vec<PricingRule> {
        let mut rules = Vec::new();
        if self.per_night {
            rules.push(PricingRule::PerNight);
        }
        if self.volume_discount_bps > 0 {
            rules.push(PricingRule::VolumeDiscount {
                min_offers: self.volume_discount_min_offers,
                discount_bps: self.volume_discount_bps,
            });
        }
        rules
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Overrides the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            enabled: true,
            storage_key: default_storage_key(),
            data_dir: None,
        }
    }
}

impl PersistenceSettings {
    /// File storage in `data_dir`, or in the platform data directory.
    pub fn file_storage(&self) -> StoreResult<FileStorage> {
        match &self.data_dir {
            Some(dir) => Ok(FileStorage::new(dir)),
            None => FileStorage::default_location(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (concierge.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.persistence.storage_key.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "persistence.storage_key must not be empty".into(),
            ));
        }

        if self.pricing.volume_discount_bps > 10_000 {
            return Err(StoreError::InvalidConfig(format!(
                "pricing.volume_discount_bps must be at most 10000, got {}",
                self.pricing.volume_discount_bps
            )));
        }

        if self.pricing.volume_discount_bps > 0 && self.pricing.volume_discount_min_offers == 0 {
            return Err(StoreError::InvalidConfig(
                "pricing.volume_discount_min_offers must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `CONCIERGE_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("CONCIERGE_MODE") {
            match mode.parse::<BookingMode>() {
                Ok(parsed) => {
                    debug!(mode = %parsed, "Overriding booking mode from environment");
                    self.store.mode = parsed;
                }
                Err(e) => warn!(mode = %mode, "{}", e),
            }
        }

        if let Some(flag) = lookup("CONCIERGE_HOTEL_RULES") {
            if let Some(enabled) = parse_flag(&flag) {
                self.store.hotel_rules = enabled;
            }
        }

        if let Some(bps) = lookup("CONCIERGE_VOLUME_DISCOUNT_BPS") {
            if let Ok(bps) = bps.parse::<u32>() {
                self.pricing.volume_discount_bps = bps;
            }
        }

        if let Some(flag) = lookup("CONCIERGE_PERSISTENCE") {
            if let Some(enabled) = parse_flag(&flag) {
                self.persistence.enabled = enabled;
            }
        }

        if let Some(dir) = lookup("CONCIERGE_DATA_DIR") {
            debug!(dir = %dir, "Overriding data dir from environment");
            self.persistence.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "concierge", "concierge")
            .map(|dirs| dirs.config_dir().join("concierge.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
