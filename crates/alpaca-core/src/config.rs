//! Analysis configuration

use serde::{Deserialize, Serialize};

/// How the representation map treats two states sharing a glyph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphPolicy {
    /// The state declared last keeps the glyph
    #[default]
    LastWins,
    /// A shared glyph is a `GlyphCollision` error
    Reject,
}

/// Options for [`crate::analysis::analyze`] and the representation map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub glyph_policy: GlyphPolicy,
    /// Materialize the literal playfield as part of the report
    pub include_playfield: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            glyph_policy: GlyphPolicy::LastWins,
            include_playfield: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
