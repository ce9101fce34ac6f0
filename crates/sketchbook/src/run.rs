use anyhow::{bail, Context, Result};
use knobs::{parse_override, KnobPanel, Preset, SketchKind};
use procedural::VolumeSpec;
use renderer::{GenieSource, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{KnobArgs, RunArgs};

pub fn run(args: RunArgs) -> Result<()> {
    let Some(sketch) = args.sketch else {
        bail!("no sketch given; expected cloud, genie or aurora (see --help)");
    };

    let mut config = RendererConfig::new(sketch);
    config.panel = build_panel(sketch, &args.knobs)?;
    if let Some(size) = args.size {
        config.surface_size = size;
    }
    config.target_fps = args.fps.filter(|fps| *fps > 0.0);
    config.antialiasing = args.antialias;
    config.color_space = args.color_space;
    config.options.volume = volume_spec(args.volume_size)?;
    if let Some(path) = args.image {
        config.options.genie_source = GenieSource::Texture(path);
    }
    config.options.model = args.model;

    if args.knobs.preset.is_some() || !args.knobs.overrides.is_empty() {
        tracing::info!(knobs = %config.panel.summary(), "starting values");
    }

    Renderer::new(config).run()
}

/// Schema defaults, then the preset file, then `--set` overrides.
pub fn build_panel(sketch: SketchKind, args: &KnobArgs) -> Result<KnobPanel> {
    let mut panel = KnobPanel::new(sketch.schema());
    if let Some(path) = &args.preset {
        let preset = Preset::load(path)?;
        panel
            .apply_preset(&preset)
            .with_context(|| format!("failed to apply preset {}", path.display()))?;
    }
    let overrides = args
        .overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>, _>>()?;
    panel.apply_overrides(&overrides)?;
    Ok(panel)
}

pub fn volume_spec(size: Option<u32>) -> Result<VolumeSpec> {
    let mut spec = VolumeSpec::default();
    if let Some(size) = size {
        spec.size = size;
    }
    spec.validate().context("invalid --volume-size")?;
    Ok(spec)
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_defaults() {
        let args = KnobArgs {
            preset: None,
            overrides: vec!["steps=120".into(), "opacity = 2".into()],
        };
        let panel = build_panel(SketchKind::Cloud, &args).expect("panel");
        assert_eq!(panel.get("steps"), Some(120.0));
        assert_eq!(panel.get("opacity"), Some(1.0));
        assert_eq!(panel.get("range"), Some(0.15));
    }

    #[test]
    fn rejects_knobs_from_another_sketch() {
        let args = KnobArgs {
            preset: None,
            overrides: vec!["progress=0.5".into()],
        };
        assert!(build_panel(SketchKind::Aurora, &args).is_err());
        let malformed = KnobArgs {
            preset: None,
            overrides: vec!["progress".into()],
        };
        assert!(build_panel(SketchKind::Genie, &malformed).is_err());
    }

    #[test]
    fn volume_size_is_validated() {
        assert_eq!(volume_spec(None).expect("default").size, 128);
        assert_eq!(volume_spec(Some(32)).expect("small").size, 32);
        assert!(volume_spec(Some(0)).is_err());
        assert!(volume_spec(Some(4096)).is_err());
    }
}
