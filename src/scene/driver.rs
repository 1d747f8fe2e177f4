use std::collections::BTreeMap;

use crate::{
    animation::envelope::EnvelopePhase,
    effect::generate::{Element, generate},
    effect::model::EffectConfig,
    eval::update::{FrameState, FrameUpdate, TickInputs},
    foundation::error::{GlimmerError, GlimmerResult},
};

/// Stable handle addressing one registered effect.
///
/// Effects and their elements are addressed by `(EffectId, element index)`
/// into the driver's table; no live object references cross the boundary to
/// the render surface.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EffectId(pub u64);

/// Sink for the per-frame output of one effect.
///
/// Implementations own all graphics-API-specific work (buffer upload,
/// drawing); the engine only hands over index-aligned [`FrameState`] slices.
/// For quick wiring, [`surface_fn`] adapts a closure.
pub trait RenderSurface {
    /// Consume this tick's states for `effect`. The slice is index-aligned
    /// with the effect's element table and only valid for this call.
    fn apply(&mut self, effect: EffectId, states: &[FrameState]) -> GlimmerResult<()>;
}

/// Adapt a closure into a [`RenderSurface`].
pub fn surface_fn<F>(f: F) -> impl RenderSurface
where
    F: FnMut(EffectId, &[FrameState]) -> GlimmerResult<()>,
{
    struct FnSurface<F>(F);

    impl<F> RenderSurface for FnSurface<F>
    where
        F: FnMut(EffectId, &[FrameState]) -> GlimmerResult<()>,
    {
        fn apply(&mut self, effect: EffectId, states: &[FrameState]) -> GlimmerResult<()> {
            (self.0)(effect, states)
        }
    }

    FnSurface(f)
}

/// Element evaluation strategy for a tick.
///
/// Elements are independent, so parallel evaluation is a legal optimization
/// for large counts; sequential is the default and the reference path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateThreading {
    /// Evaluate elements on the calling thread, in index order.
    #[default]
    Sequential,
    /// Fan element evaluation out over the rayon pool.
    Parallel,
}

struct EffectEntry {
    config: EffectConfig,
    elements: Vec<Element>,
    surface: Box<dyn RenderSurface>,
}

/// Owns the set of active effects and drives one update per host tick.
///
/// The driver keeps no clock: `elapsed_seconds` arrives from the host render
/// loop on every [`SceneDriver::tick`]. Effects may be registered or removed
/// between ticks; removal takes effect starting from the next tick.
pub struct SceneDriver {
    effects: BTreeMap<EffectId, EffectEntry>,
    next_id: u64,
    surface_available: bool,
    threading: UpdateThreading,
    last_elapsed_seconds: f64,
}

impl Default for SceneDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDriver {
    /// Driver with sequential evaluation and an available surface.
    pub fn new() -> Self {
        Self::with_threading(UpdateThreading::Sequential)
    }

    /// Driver with an explicit evaluation strategy.
    pub fn with_threading(threading: UpdateThreading) -> Self {
        Self {
            effects: BTreeMap::new(),
            next_id: 0,
            surface_available: true,
            threading,
            last_elapsed_seconds: 0.0,
        }
    }

    /// Validate `config`, generate the effect's element table, and register
    /// its render surface. A failure aborts only this effect's setup.
    pub fn register(
        &mut self,
        config: EffectConfig,
        surface: impl RenderSurface + 'static,
    ) -> GlimmerResult<EffectId> {
        let elements = generate(&config)?;
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects.insert(
            id,
            EffectEntry {
                config,
                elements,
                surface: Box::new(surface),
            },
        );
        Ok(id)
    }

    /// Remove an effect. Returns whether it was present. The effect receives
    /// no further `apply` calls starting from the next tick.
    pub fn remove(&mut self, id: EffectId) -> bool {
        self.effects.remove(&id).is_some()
    }

    /// Flag whether the external render surface is usable. While `false`,
    /// [`SceneDriver::tick`] skips all dispatch without error.
    pub fn set_surface_available(&mut self, available: bool) {
        self.surface_available = available;
    }

    /// Number of registered effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// True when no effects are registered.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// True when `id` is currently registered.
    pub fn contains(&self, id: EffectId) -> bool {
        self.effects.contains_key(&id)
    }

    /// Static element table of a registered effect.
    pub fn elements(&self, id: EffectId) -> Option<&[Element]> {
        self.effects.get(&id).map(|e| e.elements.as_slice())
    }

    /// Lifecycle phase of a cycle-driven effect at `elapsed_seconds`, or
    /// `None` for effects without a cycle (or an unknown id).
    pub fn phase(&self, id: EffectId, elapsed_seconds: f64) -> Option<EnvelopePhase> {
        let entry = self.effects.get(&id)?;
        entry.config.cycle.map(|c| c.phase(elapsed_seconds))
    }

    /// Most recent `elapsed_seconds` supplied by the host.
    pub fn last_elapsed_seconds(&self) -> f64 {
        self.last_elapsed_seconds
    }

    /// Drive one frame: evaluate every effect at `inputs` and forward the
    /// states to its render surface.
    ///
    /// A failure in one effect's evaluation or surface is logged and
    /// reported in the returned [`TickReport`]; remaining effects still run
    /// within the same tick.
    #[tracing::instrument(skip(self), fields(effects = self.effects.len()))]
    pub fn tick(&mut self, inputs: TickInputs) -> TickReport {
        self.last_elapsed_seconds = inputs.elapsed_seconds;
        let mut report = TickReport::default();

        if !self.surface_available {
            report.skipped = true;
            return report;
        }

        for (&id, entry) in self.effects.iter_mut() {
            let states = match self.threading {
                UpdateThreading::Sequential => {
                    FrameUpdate::update(&entry.config, &entry.elements, inputs)
                }
                UpdateThreading::Parallel => {
                    FrameUpdate::update_parallel(&entry.config, &entry.elements, inputs)
                }
            };
            let outcome = states.and_then(|s| entry.surface.apply(id, &s));
            match outcome {
                Ok(()) => report.dispatched += 1,
                Err(err) => {
                    tracing::warn!(effect = id.0, error = %err, "effect failed this tick; continuing");
                    report.failures.push((id, err));
                }
            }
        }
        report
    }
}

/// Outcome summary of one [`SceneDriver::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    /// Effects whose surface received `apply` this tick.
    pub dispatched: usize,
    /// Per-effect failures; the tick continued past each of them.
    pub failures: Vec<(EffectId, GlimmerError)>,
    /// True when dispatch was skipped because the surface is unavailable.
    pub skipped: bool,
}

impl TickReport {
    /// True when every registered effect dispatched cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.skipped
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/driver.rs"]
mod tests;
