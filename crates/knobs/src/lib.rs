//! Live parameter panel for the sketches.
//!
//! Every sketch declares a [`KnobSchema`]: an ordered list of numeric knobs
//! with a range, a step and a default. A [`KnobPanel`] owns the current
//! values and is edited from the keyboard while the window runs; sketches
//! only ever read it through [`ParameterSource::snapshot`], once per frame.
//!
//! Values are layered: schema defaults, then an optional [`Preset`] file,
//! then `name=value` overrides from the command line.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod panel;
mod preset;
mod schema;

pub use panel::{KnobPanel, ParameterSet, ParameterSource};
pub use preset::{parse_override, Override, Preset};
pub use schema::{Knob, KnobSchema};

#[derive(Debug, thiserror::Error)]
pub enum KnobError {
    #[error("unknown knob '{name}' for the {sketch} sketch")]
    UnknownKnob { sketch: SketchKind, name: String },
    #[error("value for '{0}' must be finite")]
    NonFinite(String),
    #[error("failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read preset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preset targets the {found} sketch, not {expected}")]
    SketchMismatch {
        expected: SketchKind,
        found: SketchKind,
    },
    #[error("invalid override '{0}'; expected name=value")]
    InvalidOverride(String),
}

/// The three sketches the workspace ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchKind {
    Cloud,
    Genie,
    Aurora,
}

impl SketchKind {
    pub const ALL: [SketchKind; 3] = [SketchKind::Cloud, SketchKind::Genie, SketchKind::Aurora];

    pub fn as_str(self) -> &'static str {
        match self {
            SketchKind::Cloud => "cloud",
            SketchKind::Genie => "genie",
            SketchKind::Aurora => "aurora",
        }
    }

    pub fn schema(self) -> KnobSchema {
        match self {
            SketchKind::Cloud => schema::cloud(),
            SketchKind::Genie => schema::genie(),
            SketchKind::Aurora => schema::aurora(),
        }
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SketchKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cloud" | "clouds" => Ok(SketchKind::Cloud),
            "genie" => Ok(SketchKind::Genie),
            "aurora" => Ok(SketchKind::Aurora),
            other => Err(format!(
                "unknown sketch '{other}'; expected cloud, genie or aurora"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_names_round_trip() {
        for kind in SketchKind::ALL {
            assert_eq!(kind.as_str().parse::<SketchKind>(), Ok(kind));
        }
        assert_eq!(" Aurora ".parse::<SketchKind>(), Ok(SketchKind::Aurora));
        assert!("fog".parse::<SketchKind>().is_err());
    }

    #[test]
    fn every_sketch_has_a_schema() {
        assert_eq!(SketchKind::Cloud.schema().len(), 5);
        assert_eq!(SketchKind::Genie.schema().len(), 3);
        assert_eq!(SketchKind::Aurora.schema().len(), 15);
    }
}
