//! Knob snapshots to the parameter structs of the reference programs.
//!
//! Both the GPU uniform blocks and the CPU still exporter go through these,
//! so a knob always means the same thing on either path.

use glam::Vec2;
use knobs::ParameterSet;
use procedural::{AuroraParams, CloudParams, GenieParams};

pub fn cloud_params(knobs: &ParameterSet, frame: u32) -> CloudParams {
    CloudParams {
        threshold: knobs.value("threshold"),
        range: knobs.value("range"),
        opacity: knobs.value("opacity"),
        steps: knobs.value("steps"),
        blur_strength: knobs.value("blurStrength"),
        frame,
    }
}

pub fn genie_params(knobs: &ParameterSet, resolution: Vec2) -> GenieParams {
    GenieParams {
        progress: knobs.value("progress"),
        glint_intensity: knobs.value("glintIntensity"),
        glint_progress: knobs.value("glintProgress"),
        resolution,
    }
}

pub fn aurora_params(knobs: &ParameterSet, time: f32) -> AuroraParams {
    AuroraParams {
        time,
        noise_scale: knobs.value("noiseScale"),
        noise_stretch: knobs.value("noiseStretch"),
        noise_speed: knobs.value("noiseSpeed"),
        vertical_gradient_strength: knobs.value("verticalGradientStrength"),
        radial_gradient_strength: knobs.value("radialGradientStrength"),
        green_intensity: knobs.value("greenIntensity"),
        blue_intensity: knobs.value("blueIntensity"),
        purple_intensity: knobs.value("purpleIntensity"),
        color_mix_speed1: knobs.value("colorMixSpeed1"),
        color_mix_speed2: knobs.value("colorMixSpeed2"),
        color_mix_frequency1: knobs.value("colorMixFrequency1"),
        color_mix_frequency2: knobs.value("colorMixFrequency2"),
        threshold: knobs.value("auroraThreshold"),
        blur: knobs.value("auroraBlur"),
        overall_intensity: knobs.value("overallIntensity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobs::{KnobPanel, ParameterSource, SketchKind};

    fn defaults(kind: SketchKind) -> ParameterSet {
        KnobPanel::new(kind.schema()).snapshot()
    }

    #[test]
    fn schema_defaults_match_reference_defaults() {
        assert_eq!(
            cloud_params(&defaults(SketchKind::Cloud), 0),
            CloudParams::default()
        );
        assert_eq!(
            aurora_params(&defaults(SketchKind::Aurora), 0.0),
            AuroraParams::default()
        );
        let genie = genie_params(&defaults(SketchKind::Genie), Vec2::new(1280.0, 720.0));
        assert_eq!(genie, GenieParams::default());
    }

    #[test]
    fn edits_reach_the_params() {
        let mut panel = KnobPanel::new(SketchKind::Cloud.schema());
        panel.set("blurStrength", 0.0).expect("set");
        panel.set("steps", 12.0).expect("set");
        let params = cloud_params(&panel.snapshot(), 7);
        assert_eq!(params.blur_strength, 0.0);
        assert_eq!(params.steps, 12.0);
        assert_eq!(params.frame, 7);
    }
}
