use crate::SketchKind;

/// One live-editable numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knob {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Knob {
    const fn new(name: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            label: name,
            min,
            max,
            step,
            default,
        }
    }

    const fn labelled(self, label: &'static str) -> Self {
        Self { label, ..self }
    }

    /// Clamps to the range and snaps to the step grid anchored at `min`.
    pub fn constrain(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        // Round away binary noise such as 0.30000000000000004.
        let snapped = ((self.min + steps * self.step) * 1e9).round() / 1e9;
        snapped.clamp(self.min, self.max)
    }
}

/// Ordered knob list for one sketch.
#[derive(Debug, Clone, PartialEq)]
pub struct KnobSchema {
    pub sketch: SketchKind,
    pub title: &'static str,
    knobs: Vec<Knob>,
}

impl KnobSchema {
    pub fn new(sketch: SketchKind, title: &'static str, knobs: Vec<Knob>) -> Self {
        Self {
            sketch,
            title,
            knobs,
        }
    }

    pub fn len(&self) -> usize {
        self.knobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Knob> {
        self.knobs.iter()
    }

    pub fn knob(&self, index: usize) -> Option<&Knob> {
        self.knobs.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.knobs.iter().position(|knob| knob.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Knob> {
        self.index_of(name).map(|index| &self.knobs[index])
    }
}

pub(crate) fn cloud() -> KnobSchema {
    KnobSchema::new(
        SketchKind::Cloud,
        "Cloud",
        vec![
            Knob::new("threshold", 0.25, 0.0, 1.0, 0.01),
            Knob::new("opacity", 0.25, 0.0, 1.0, 0.01),
            Knob::new("range", 0.15, 0.0, 1.0, 0.01),
            Knob::new("steps", 87.0, 0.0, 200.0, 1.0),
            Knob::new("blurStrength", 3.1, 0.0, 5.0, 0.1),
        ],
    )
}

pub(crate) fn genie() -> KnobSchema {
    KnobSchema::new(
        SketchKind::Genie,
        "Genie",
        vec![
            Knob::new("progress", 0.0, 0.0, 1.0, 0.01).labelled("Animation Progress"),
            Knob::new("glintIntensity", 0.0, 0.0, 1.0, 0.01).labelled("Glint Intensity"),
            Knob::new("glintProgress", 0.0, 0.0, 1.0, 0.01).labelled("Glint Progress"),
        ],
    )
}

pub(crate) fn aurora() -> KnobSchema {
    KnobSchema::new(
        SketchKind::Aurora,
        "Aurora Controls",
        vec![
            // noise
            Knob::new("noiseScale", 3.0, 0.1, 10.0, 0.1),
            Knob::new("noiseStretch", 0.05, 0.01, 0.5, 0.01),
            Knob::new("noiseSpeed", 0.5, 0.1, 2.0, 0.1),
            // gradients
            Knob::new("verticalGradientStrength", 1.0, 0.0, 2.0, 0.1),
            Knob::new("radialGradientStrength", 1.0, 0.0, 2.0, 0.1),
            // palette
            Knob::new("greenIntensity", 0.8, 0.0, 1.0, 0.1),
            Knob::new("blueIntensity", 1.0, 0.0, 1.0, 0.1),
            Knob::new("purpleIntensity", 1.0, 0.0, 1.0, 0.1),
            // animation
            Knob::new("colorMixSpeed1", 0.3, 0.1, 1.0, 0.1),
            Knob::new("colorMixSpeed2", 0.5, 0.1, 1.0, 0.1),
            Knob::new("colorMixFrequency1", 3.0, 1.0, 10.0, 0.5),
            Knob::new("colorMixFrequency2", 2.0, 1.0, 10.0, 0.5),
            // intensity
            Knob::new("auroraThreshold", 0.6, 0.0, 1.0, 0.1),
            Knob::new("auroraBlur", 0.3, 0.0, 0.5, 0.05),
            Knob::new("overallIntensity", 1.0, 0.0, 2.0, 0.1),
        ],
    )
}
