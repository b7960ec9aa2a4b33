//! Distance orientation of a TOPSIS configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// DSL tag for [`Orientation::Positive`].
pub const TAG_POSITIVE: &str = "TOPSIS_POSITIVE";

/// DSL tag for [`Orientation::Negative`].
pub const TAG_NEGATIVE: &str = "TOPSIS_NEGATIVE";

/// Whether larger raw indicator values are better or worse.
///
/// `Positive` takes the per-indicator maximum as the positive ideal;
/// `Negative` swaps maximum and minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    #[default]
    Positive,
    Negative,
}

impl Orientation {
    /// Returns the DSL tag for this orientation.
    pub fn tag(&self) -> &'static str {
        match self {
            Orientation::Positive => TAG_POSITIVE,
            Orientation::Negative => TAG_NEGATIVE,
        }
    }

    /// Maps a DSL tag to an orientation. Only exact tags are recognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TAG_POSITIVE => Some(Orientation::Positive),
            TAG_NEGATIVE => Some(Orientation::Negative),
            _ => None,
        }
    }

    /// Picks the positive-ideal value from an observed `(min, max)` pair.
    pub fn positive_ideal(&self, min: f64, max: f64) -> f64 {
        match self {
            Orientation::Positive => max,
            Orientation::Negative => min,
        }
    }

    /// Picks the negative-ideal value from an observed `(min, max)` pair.
    pub fn negative_ideal(&self, min: f64, max: f64) -> f64 {
        match self {
            Orientation::Positive => min,
            Orientation::Negative => max,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
