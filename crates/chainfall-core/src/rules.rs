//! Embedder configuration.
//!
//! [`Rules`] collects every constant the embedder supplies: grid size, group
//! threshold, chain mode, attribute set size, status durations, the invisible
//! remap and how animations complete. Every field has a default, so partial
//! JSON documents load.
//!
//! # Example
//!
//! ```
//! use chainfall_core::rules::{ChainMode, Rules};
//!
//! let rules = Rules::from_json_str(r#"{ "min_group": 3, "chain_mode": "Single" }"#).unwrap();
//! assert_eq!(rules.width, 6);
//! assert_eq!(rules.min_group, 3);
//! assert_eq!(rules.chain_mode, ChainMode::Single);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attribute::Attribute;
use crate::token::InvisibleRule;

/// Configuration errors.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum RulesError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("minimum group size must be at least 2, got {0}")]
    GroupThreshold(usize),
    #[error("attribute count must be between 2 and {max}, got {count}", max = Attribute::COUNT)]
    AttributeCount { count: usize },
    /// A prebuilt board does not match the configured dimensions.
    #[error("board is {actual_width}x{actual_height} but rules expect {width}x{height}")]
    BoardMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How many qualifying groups may vanish in one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainMode {
    /// Stop scanning after the first qualifying group.
    Single,
    /// Vanish every qualifying group found in the scan.
    #[default]
    Multiple,
}

/// How vanish and move animations complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationMode {
    /// The engine completes them immediately (headless embedding).
    #[default]
    Instant,
    /// The animation layer completes them through the engine's completion calls.
    External,
}

/// Embedder-supplied configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Smallest group that vanishes.
    pub min_group: usize,
    /// Single- or multiple-match scanning.
    pub chain_mode: ChainMode,
    /// Attributes in play, drawn from the front of [`Attribute::ALL`].
    pub attribute_count: usize,
    /// Freeze duration in ticks; `None` lasts until cured.
    pub freeze_ticks: Option<u32>,
    /// Paralysis duration in ticks; `None` lasts until cured.
    pub paralysis_ticks: Option<u32>,
    /// Invisibility duration in ticks; `None` lasts until cured.
    pub invisible_ticks: Option<u32>,
    /// Attribute remap applied by invisibility.
    pub invisible: InvisibleRule,
    /// How animations complete.
    pub animation: AnimationMode,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            width: 6,
            height: 12,
            min_group: 4,
            chain_mode: ChainMode::Multiple,
            attribute_count: Attribute::COUNT,
            freeze_ticks: Some(600),
            paralysis_ticks: Some(600),
            invisible_ticks: Some(600),
            invisible: InvisibleRule::default(),
            animation: AnimationMode::Instant,
        }
    }
}

impl Rules {
    /// Parses rules from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Checks that the rules describe a playable board.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.width == 0 || self.height == 0 {
            return Err(RulesError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.min_group < 2 {
            return Err(RulesError::GroupThreshold(self.min_group));
        }
        // One attribute makes every refill a group, so the cascade never finishes.
        if !(2..=Attribute::COUNT).contains(&self.attribute_count) {
            return Err(RulesError::AttributeCount {
                count: self.attribute_count,
            });
        }
        Ok(())
    }
}
