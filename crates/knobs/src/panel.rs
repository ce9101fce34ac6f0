use std::fmt::Write as _;

use crate::preset::{Override, Preset};
use crate::schema::{Knob, KnobSchema};
use crate::KnobError;

/// Read-only view of the panel that sketches poll once per frame.
pub trait ParameterSource {
    fn snapshot(&self) -> ParameterSet;
}

/// Named values at one instant, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: Vec<(&'static str, f32)>,
}

impl ParameterSet {
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Like [`ParameterSet::get`] but reads a missing knob as `0.0`, which is
    /// what an unset uniform holds.
    pub fn value(&self, name: &str) -> f32 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParameterSource for ParameterSet {
    fn snapshot(&self) -> ParameterSet {
        self.clone()
    }
}

#[derive(Debug, Clone)]
pub struct KnobPanel {
    schema: KnobSchema,
    values: Vec<f64>,
    selected: usize,
}

impl KnobPanel {
    pub fn new(schema: KnobSchema) -> Self {
        let values = schema.iter().map(|knob| knob.default).collect();
        Self {
            schema,
            values,
            selected: 0,
        }
    }

    pub fn schema(&self) -> &KnobSchema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|index| self.values[index])
    }

    /// Sets a knob by name and returns the stored (clamped, snapped) value.
    pub fn set(&mut self, name: &str, value: f64) -> Result<f64, KnobError> {
        if !value.is_finite() {
            return Err(KnobError::NonFinite(name.to_string()));
        }
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| KnobError::UnknownKnob {
                sketch: self.schema.sketch,
                name: name.to_string(),
            })?;
        let stored = self.store(index, value);
        tracing::debug!(knob = name, value = stored, "knob set");
        Ok(stored)
    }

    fn store(&mut self, index: usize, value: f64) -> f64 {
        let stored = match self.schema.knob(index) {
            Some(knob) => knob.constrain(value),
            None => return value,
        };
        self.values[index] = stored;
        stored
    }

    pub fn selected(&self) -> Option<&Knob> {
        self.schema.knob(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.schema.is_empty() {
            self.selected = (self.selected + 1) % self.schema.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.schema.is_empty() {
            self.selected = (self.selected + self.schema.len() - 1) % self.schema.len();
        }
    }

    /// Moves the selected knob by whole steps; returns the new value.
    pub fn nudge(&mut self, steps: i32) -> Option<f64> {
        let knob = self.selected().copied()?;
        let target = self.values[self.selected] + knob.step * steps as f64;
        let stored = self.store(self.selected, target);
        tracing::debug!(knob = knob.name, value = stored, "knob nudged");
        Some(stored)
    }

    pub fn reset_selected(&mut self) {
        if let Some(knob) = self.selected().copied() {
            self.values[self.selected] = knob.default;
        }
    }

    pub fn reset_all(&mut self) {
        for (value, knob) in self.values.iter_mut().zip(self.schema.iter()) {
            *value = knob.default;
        }
    }

    pub fn apply_preset(&mut self, preset: &Preset) -> Result<(), KnobError> {
        preset.check_sketch(self.schema.sketch)?;
        for (name, value) in &preset.values {
            self.set(name, *value)?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &[Override]) -> Result<(), KnobError> {
        for item in overrides {
            self.set(&item.name, item.value)?;
        }
        Ok(())
    }

    /// One-line status of the selected knob, suitable for a window title.
    pub fn describe(&self) -> String {
        match self.selected() {
            Some(knob) => format!(
                "{} [{}/{}] {} = {} ({}..{}, step {})",
                self.schema.title,
                self.selected + 1,
                self.schema.len(),
                knob.label,
                format_value(self.values[self.selected]),
                format_value(knob.min),
                format_value(knob.max),
                format_value(knob.step),
            ),
            None => self.schema.title.to_string(),
        }
    }

    /// Every knob as `name=value`, space separated.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (knob, value) in self.schema.iter().zip(&self.values) {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}={}", knob.name, format_value(*value));
        }
        out
    }
}

impl ParameterSource for KnobPanel {
    fn snapshot(&self) -> ParameterSet {
        ParameterSet {
            values: self
                .schema
                .iter()
                .zip(&self.values)
                .map(|(knob, value)| (knob.name, *value as f32))
                .collect(),
        }
    }
}

fn format_value(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SketchKind;

    fn cloud_panel() -> KnobPanel {
        KnobPanel::new(SketchKind::Cloud.schema())
    }

    #[test]
    fn starts_from_defaults() {
        let panel = cloud_panel();
        let snapshot = panel.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.get("steps"), Some(87.0));
        assert_eq!(snapshot.get("blurStrength"), Some(3.1));
        assert_eq!(snapshot.value("missing"), 0.0);
    }

    #[test]
    fn set_clamps_and_rejects_bad_input() {
        let mut panel = cloud_panel();
        assert_eq!(panel.set("threshold", 4.0).expect("set"), 1.0);
        assert_eq!(panel.set("steps", -3.0).expect("set"), 0.0);
        assert!(matches!(
            panel.set("density", 0.5),
            Err(KnobError::UnknownKnob { .. })
        ));
        assert!(matches!(
            panel.set("opacity", f64::NAN),
            Err(KnobError::NonFinite(_))
        ));
        assert_eq!(panel.get("opacity"), Some(0.25));
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut panel = cloud_panel();
        assert_eq!(panel.selected().map(|k| k.name), Some("threshold"));
        panel.select_previous();
        assert_eq!(panel.selected().map(|k| k.name), Some("blurStrength"));
        panel.select_next();
        panel.select_next();
        assert_eq!(panel.selected().map(|k| k.name), Some("opacity"));
    }

    #[test]
    fn nudge_moves_by_steps_and_reset_restores() {
        let mut panel = cloud_panel();
        for _ in 0..3 {
            panel.select_next();
        }
        assert_eq!(panel.nudge(10), Some(97.0));
        assert_eq!(panel.nudge(-1), Some(96.0));
        assert_eq!(panel.nudge(500), Some(200.0));
        panel.reset_selected();
        assert_eq!(panel.get("steps"), Some(87.0));

        panel.select_next();
        assert_eq!(panel.nudge(1), Some(3.2));
    }

    #[test]
    fn describe_names_the_selected_knob() {
        let mut panel = KnobPanel::new(SketchKind::Genie.schema());
        panel.set("progress", 0.5).expect("set");
        assert_eq!(
            panel.describe(),
            "Genie [1/3] Animation Progress = 0.5 (0..1, step 0.01)"
        );
        assert!(panel
            .summary()
            .starts_with("progress=0.5 glintIntensity=0 glintProgress=0"));
    }

    #[test]
    fn overrides_apply_after_reset_all() {
        let mut panel = cloud_panel();
        panel.set("range", 0.9).expect("set");
        panel.reset_all();
        assert_eq!(panel.get("range"), Some(0.15));
        let overrides = [Override {
            name: "range".into(),
            value: 0.2,
        }];
        panel.apply_overrides(&overrides).expect("override");
        assert_eq!(panel.snapshot().get("range"), Some(0.2));
    }
}
