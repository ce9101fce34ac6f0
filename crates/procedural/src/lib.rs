//! Procedural building blocks shared by the sketches.
//!
//! Everything in this crate runs on the CPU and is free of GPU types. The
//! renderer uses it for the one-shot work that happens before the first
//! frame (the cloud noise volume), and the still exporter uses the reference
//! programs to produce the same pictures the fragment shaders draw:
//!
//! ```text
//!   noise ──▶ volume ──▶ raymarch   (cloud)
//!   noise ─────────────▶ aurora     (aurora)
//!                        genie      (genie, no noise)
//! ```
//!
//! The GLSL sources under `crates/renderer/shaders` mirror these functions
//! line for line, so behaviour can be pinned down with ordinary unit tests.

pub mod aurora;
pub mod genie;
pub mod glsl;
pub mod noise;
pub mod raymarch;
pub mod volume;

pub use aurora::AuroraParams;
pub use genie::GenieParams;
pub use raymarch::{CloudParams, DensityField, RaySetup};
pub use volume::{NoiseVolume, VolumeError, VolumeSpec};
