use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::{KnobError, SketchKind};

/// Saved knob values.
///
/// ```toml
/// sketch = "cloud"
///
/// [values]
/// threshold = 0.3
/// steps = "120"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Preset {
    #[serde(default)]
    pub sketch: Option<SketchKind>,
    #[serde(default, deserialize_with = "deserialize_values")]
    pub values: BTreeMap<String, f64>,
}

impl Preset {
    pub fn from_toml_str(input: &str) -> Result<Self, KnobError> {
        let preset: Preset = toml::from_str(input)?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn load(path: &Path) -> Result<Self, KnobError> {
        let raw = fs::read_to_string(path).map_err(|source| KnobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let preset = Self::from_toml_str(&raw)?;
        tracing::info!(path = %path.display(), knobs = preset.values.len(), "loaded preset");
        Ok(preset)
    }

    pub fn validate(&self) -> Result<(), KnobError> {
        for (name, value) in &self.values {
            if !value.is_finite() {
                return Err(KnobError::NonFinite(name.clone()));
            }
        }
        if let Some(sketch) = self.sketch {
            let schema = sketch.schema();
            if let Some(name) = self.values.keys().find(|name| schema.get(name).is_none()) {
                return Err(KnobError::UnknownKnob {
                    sketch,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// A preset without a `sketch` key applies to any sketch whose schema
    /// knows its knob names.
    pub fn check_sketch(&self, expected: SketchKind) -> Result<(), KnobError> {
        match self.sketch {
            Some(found) if found != expected => Err(KnobError::SketchMismatch { expected, found }),
            _ => Ok(()),
        }
    }
}

fn deserialize_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Num(f64),
        Str(String),
    }

    let raw: BTreeMap<String, Helper> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, value)| -> Result<(String, f64), D::Error> {
            let number = match value {
                Helper::Num(number) => number,
                Helper::Str(text) => text.trim().parse::<f64>().map_err(|_| {
                    <D::Error as de::Error>::custom(format!(
                        "value for '{name}' is not a number: '{text}'"
                    ))
                })?,
            };
            Ok((name, number))
        })
        .collect()
}

/// One `name=value` assignment from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub name: String,
    pub value: f64,
}

pub fn parse_override(raw: &str) -> Result<Override, KnobError> {
    let invalid = || KnobError::InvalidOverride(raw.to_string());
    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }
    let value: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(KnobError::NonFinite(name.to_string()));
    }
    Ok(Override {
        name: name.to_string(),
        value,
    })
}
