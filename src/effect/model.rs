use std::collections::BTreeMap;

use crate::{
    animation::envelope::CycleSpec,
    foundation::core::Vec3,
    foundation::error::{GlimmerError, GlimmerResult},
    foundation::math::Rng64,
};

/// Animation family of an effect.
///
/// Each kind pairs a closed-form element placement rule with a per-frame
/// motion/color model; together they reproduce the decorative visuals the
/// engine was distilled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    /// Undulating vertical curtains with a traveling palette.
    WaveRibbon,
    /// Concentric pulsing rings around a swirling core.
    RadialPortal,
    /// Slowly rotating spiral point cloud.
    ParticleCloud,
    /// Layered graph of pulsing nodes and weighted edges.
    NodeGraph,
    /// Twin helical strands joined by rungs.
    HelixStrand,
    /// Crystal shards growing in staggered layers.
    CrystalLattice,
    /// Plane of lattice vertices displaced by stacked waves.
    WaveGrid,
    /// Sphere surface distorted along its normals.
    EnergyShell,
    /// Particles that form a constellation, hold, and dissolve cyclically.
    TextConstellation,
    /// Trail of followers lagging behind the pointer.
    PointerTrail,
}

impl EffectKind {
    pub(crate) fn tag(self) -> &'static str {
        match self {
            Self::WaveRibbon => "wave-ribbon",
            Self::RadialPortal => "radial-portal",
            Self::ParticleCloud => "particle-cloud",
            Self::NodeGraph => "node-graph",
            Self::HelixStrand => "helix-strand",
            Self::CrystalLattice => "crystal-lattice",
            Self::WaveGrid => "wave-grid",
            Self::EnergyShell => "energy-shell",
            Self::TextConstellation => "text-constellation",
            Self::PointerTrail => "pointer-trail",
        }
    }

    /// Minimum element count this kind can be built with.
    pub(crate) fn min_elements(self) -> usize {
        match self {
            // Needs at least one node on each side of an edge.
            Self::NodeGraph => 2,
            // Needs a point on each strand.
            Self::HelixStrand => 2,
            _ => 1,
        }
    }

    /// Default parameter ranges. Values are tunable defaults taken from the
    /// visuals this engine was distilled from, not load-bearing contracts.
    pub fn default_ranges(self) -> BTreeMap<String, ParamRange> {
        let ranges: &[(&str, f64, f64)] = match self {
            Self::WaveRibbon => &[
                ("wave_speed", 0.5, 1.0),
                ("wave_amplitude", 0.3, 0.6),
                ("opacity", 0.6, 0.9),
            ],
            Self::RadialPortal => &[("spin_speed", 0.5, 2.0), ("pulse_depth", 0.2, 0.4)],
            Self::ParticleCloud => &[("radius", 2.0, 10.0), ("wobble_amplitude", 0.05, 0.12)],
            Self::NodeGraph => &[("activation", 0.0, 1.0), ("depth", -1.0, 1.0)],
            Self::HelixStrand => &[("bob_amplitude", 0.4, 0.6)],
            Self::CrystalLattice => &[("shard_scale", 0.3, 0.8), ("growth_rate", 0.4, 0.6)],
            Self::WaveGrid => &[("swell", 0.8, 1.2)],
            Self::EnergyShell => &[("distortion", 0.8, 1.2)],
            Self::TextConstellation => &[
                ("scatter_radius", 3.0, 5.0),
                ("particle_size", 0.02, 0.03),
            ],
            Self::PointerTrail => &[("trail_spacing", 0.25, 0.35), ("falloff", 0.08, 0.12)],
        };
        ranges
            .iter()
            .map(|&(name, min, max)| (name.to_string(), ParamRange { min, max }))
            .collect()
    }
}

/// Inclusive numeric range for a named effect parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound; must be >= `min`.
    pub max: f64,
}

impl ParamRange {
    /// Build a range, rejecting inverted or non-finite bounds.
    pub fn new(min: f64, max: f64) -> GlimmerResult<Self> {
        let r = Self { min, max };
        r.validate("range")?;
        Ok(r)
    }

    pub(crate) fn validate(&self, name: &str) -> GlimmerResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(GlimmerError::parameter(format!(
                "range '{name}' bounds must be finite"
            )));
        }
        if self.min > self.max {
            return Err(GlimmerError::parameter(format!(
                "range '{name}' has min > max"
            )));
        }
        Ok(())
    }

    pub(crate) fn sample(&self, rng: &mut Rng64) -> f64 {
        self.min + (self.max - self.min) * rng.next_f64_01()
    }

    pub(crate) fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Construction-time description of one decorative effect.
///
/// Immutable for the effect's lifetime; changing the seed or count means
/// registering a new effect, which regenerates (never mutates) its elements.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EffectConfig {
    /// Animation family.
    pub kind: EffectKind,
    /// Deterministic seed for element generation.
    pub seed: u64,
    /// Number of elements; fixed for the effect's lifetime.
    pub element_count: usize,
    /// World-space anchor of the effect.
    #[serde(default)]
    pub base_position: Vec3,
    /// Uniform scale applied to element offsets and sizes.
    #[serde(default = "default_base_scale")]
    pub base_scale: f64,
    /// Named parameter ranges; entries override the kind's defaults.
    #[serde(default)]
    pub param_ranges: BTreeMap<String, ParamRange>,
    /// Lifecycle cycle for formation/dissolution effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<CycleSpec>,
    /// Adds a gentle floating bob on top of the kind's own motion.
    #[serde(default)]
    pub floating_enabled: bool,
}

fn default_base_scale() -> f64 {
    1.0
}

impl EffectConfig {
    /// Config with defaults for everything but the identifying triple.
    pub fn new(kind: EffectKind, seed: u64, element_count: usize) -> Self {
        Self {
            kind,
            seed,
            element_count,
            base_position: Vec3::ZERO,
            base_scale: 1.0,
            param_ranges: BTreeMap::new(),
            cycle: None,
            floating_enabled: false,
        }
    }

    /// Validate construction invariants.
    pub fn validate(&self) -> GlimmerResult<()> {
        if self.element_count == 0 {
            return Err(GlimmerError::parameter("element_count must be > 0"));
        }
        if self.element_count < self.kind.min_elements() {
            return Err(GlimmerError::parameter(format!(
                "kind '{}' needs at least {} elements",
                self.kind.tag(),
                self.kind.min_elements()
            )));
        }
        if !self.base_scale.is_finite() || self.base_scale <= 0.0 {
            return Err(GlimmerError::parameter(
                "base_scale must be finite and > 0",
            ));
        }
        if !self.base_position.is_finite() {
            return Err(GlimmerError::parameter("base_position must be finite"));
        }
        for (name, range) in &self.param_ranges {
            if name.trim().is_empty() {
                return Err(GlimmerError::parameter("range name must be non-empty"));
            }
            range.validate(name)?;
        }
        if let Some(cycle) = &self.cycle {
            cycle.validate()?;
        }
        Ok(())
    }

    /// Resolved range for `name`: explicit override, else the kind default,
    /// else a degenerate zero range.
    pub(crate) fn range(&self, name: &str) -> ParamRange {
        if let Some(r) = self.param_ranges.get(name) {
            return *r;
        }
        self.kind
            .default_ranges()
            .remove(name)
            .unwrap_or(ParamRange { min: 0.0, max: 0.0 })
    }

    /// Cycle to animate lifecycle-envelope kinds with.
    pub(crate) fn cycle_or_default(&self) -> CycleSpec {
        self.cycle.unwrap_or(CycleSpec::TEXT_DEFAULT)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effect/model.rs"]
mod tests;
