use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use knobs::SketchKind;
use renderer::{Antialiasing, ColorSpaceMode};

#[derive(Parser, Debug)]
#[command(
    name = "sketchbook",
    author,
    version,
    about = "Real-time shader sketches: volumetric cloud, genie reveal, aurora",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Knob values layered over the schema defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct KnobArgs {
    /// TOML preset with a `[values]` table.
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Override one knob (repeatable), e.g. `--set threshold=0.3`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Sketch to open: `cloud`, `genie` or `aurora`.
    #[arg(value_name = "SKETCH", value_parser = parse_sketch)]
    pub sketch: Option<SketchKind>,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_antialias,
        default_value = "auto"
    )]
    pub antialias: Antialiasing,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    #[command(flatten)]
    pub knobs: KnobArgs,

    /// Edge length of the cloud noise volume.
    #[arg(long, value_name = "N")]
    pub volume_size: Option<u32>,

    /// Picture for the genie sketch instead of the UV ramp.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// glTF/GLB file with the `aurora1`..`aurora4` meshes.
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one still with the CPU reference programs and write a PNG.
    Render(RenderArgs),
    /// Print the knob schema of a sketch.
    Knobs(KnobsArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[arg(value_name = "SKETCH", value_parser = parse_sketch)]
    pub sketch: SketchKind,

    /// Output PNG path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Image size in pixels.
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_size,
        default_value = "640x360"
    )]
    pub size: (u32, u32),

    /// Clock value in seconds (aurora).
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f32,

    /// Frame counter (cloud jitter and drift).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub frame: u32,

    #[command(flatten)]
    pub knobs: KnobArgs,

    /// Edge length of the cloud noise volume.
    #[arg(long, value_name = "N")]
    pub volume_size: Option<u32>,

    /// Picture the genie reveals instead of the UV ramp.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct KnobsArgs {
    #[arg(value_name = "SKETCH", value_parser = parse_sketch)]
    pub sketch: SketchKind,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_sketch(value: &str) -> Result<SketchKind, String> {
    value.parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size(" 64X32 ").unwrap(), (64, 32));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn parses_antialias_modes() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("OFF").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_color_spaces() {
        assert_eq!(parse_color_space("gamma").unwrap(), ColorSpaceMode::Gamma);
        assert_eq!(parse_color_space("sRGB").unwrap(), ColorSpaceMode::Linear);
        assert!(parse_color_space("p3").is_err());
    }

    #[test]
    fn bare_sketch_name_opens_the_window() {
        let cli = Cli::try_parse_from(["sketchbook", "aurora", "--set", "noiseScale=4"])
            .expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.run.sketch, Some(SketchKind::Aurora));
        assert_eq!(cli.run.knobs.overrides, vec!["noiseScale=4".to_string()]);
    }

    #[test]
    fn render_subcommand_takes_its_own_flags() {
        let cli = Cli::try_parse_from([
            "sketchbook",
            "render",
            "cloud",
            "--out",
            "cloud.png",
            "--size",
            "32x16",
            "--frame",
            "7",
        ])
        .expect("parse");
        match cli.command {
            Some(Command::Render(args)) => {
                assert_eq!(args.sketch, SketchKind::Cloud);
                assert_eq!(args.size, (32, 16));
                assert_eq!(args.frame, 7);
                assert_eq!(args.time, 0.0);
                assert_eq!(args.image, None);
            }
            other => panic!("expected render, got {other:?}"),
        }
    }
}
