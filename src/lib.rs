//! Glimmer is a procedural scene animation engine for decorative 3D
//! backdrops.
//!
//! Glimmer v0.2 turns a small effect description ([`EffectConfig`]) into
//! render-ready per-frame element states ([`FrameState`]) without ever
//! touching a graphics context.
//!
//! # Pipeline overview
//!
//! 1. **Generate**: `EffectConfig -> Vec<Element>`, a deterministic, seeded
//!    static layout per effect kind (runs once at registration)
//! 2. **Update**: `(&[Element], TickInputs) -> Vec<FrameState>`, a pure
//!    per-frame evaluation driven solely by host-supplied elapsed time
//! 3. **Drive**: [`SceneDriver::tick`] evaluates every registered effect and
//!    forwards its states to the effect's [`RenderSurface`]
//!
//! The key design constraints in v0.2:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: generation and evaluation are pure and
//!   stable for a given seed and time; there is no ambient randomness.
//! - **No clock, no IO**: the engine is ticked from outside and only ever
//!   computes; drawing belongs to the render surface.
//! - **Per-effect fault isolation**: one failing effect never stops the
//!   frame for the others.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

mod animation;
mod effect;
mod eval;
mod foundation;
mod scene;

pub use animation::ease::Ease;
pub use animation::envelope::{CycleSpec, Envelope, EnvelopePhase};
pub use animation::wave::{HuePulse, PaletteCycle, WaveTerm, wave_sum};
pub use effect::generate::{Element, ElementDetail, generate};
pub use effect::model::{EffectConfig, EffectKind, ParamRange};
pub use eval::update::{FrameState, FrameUpdate, TickInputs};
pub use foundation::core::{Rgb, Vec2, Vec3, clamp01};
pub use foundation::error::{GlimmerError, GlimmerResult};
pub use foundation::math::{Rng64, lerp, smoothstep, value_noise3};
pub use scene::driver::{
    EffectId, RenderSurface, SceneDriver, TickReport, UpdateThreading, surface_fn,
};
