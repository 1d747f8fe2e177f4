use crate::{
    animation::ease::Ease,
    foundation::error::{GlimmerError, GlimmerResult},
};

/// Timing description of a repeating formation/display/dissolution cycle.
///
/// `breakpoints = (t_form, t_hold, t_dissolve)` split one cycle into four
/// windows: `[0, t_form)` forming, `[t_form, t_hold)` formed,
/// `[t_hold, t_dissolve)` dissolving, `[t_dissolve, length)` scattered.
/// All values are seconds; the cycle repeats with period `length_seconds`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CycleSpec {
    /// Total repeating cycle length in seconds.
    pub length_seconds: f64,
    /// Phase breakpoints `(t_form, t_hold, t_dissolve)` in seconds.
    pub breakpoints: (f64, f64, f64),
    /// Easing applied to the formation and dissolution ramps.
    #[serde(default)]
    pub ease: Ease,
}

impl CycleSpec {
    /// The text-formation cycle shipped as a default: 3s forming, 5s hold,
    /// 2s dissolve, 2s scattered, with linear ramps.
    pub const TEXT_DEFAULT: Self = Self {
        length_seconds: 12.0,
        breakpoints: (3.0, 8.0, 10.0),
        ease: Ease::Linear,
    };

    /// Validate cycle invariants.
    pub fn validate(&self) -> GlimmerResult<()> {
        let (t_form, t_hold, t_dissolve) = self.breakpoints;
        if !self.length_seconds.is_finite() || self.length_seconds <= 0.0 {
            return Err(GlimmerError::parameter(
                "cycle length_seconds must be finite and > 0",
            ));
        }
        for (name, v) in [
            ("t_form", t_form),
            ("t_hold", t_hold),
            ("t_dissolve", t_dissolve),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(GlimmerError::parameter(format!(
                    "cycle breakpoint {name} must be finite and >= 0"
                )));
            }
        }
        if !(t_form <= t_hold && t_hold <= t_dissolve && t_dissolve <= self.length_seconds) {
            return Err(GlimmerError::parameter(
                "cycle breakpoints must satisfy t_form <= t_hold <= t_dissolve <= length",
            ));
        }
        Ok(())
    }

    /// Envelope scalars at an absolute elapsed time.
    ///
    /// Purely a function of `elapsed_seconds mod length`; restartable from
    /// any time value, including negative ones.
    pub fn eval(&self, elapsed_seconds: f64) -> Envelope {
        let (t_form, t_hold, t_dissolve) = self.breakpoints;
        let local = elapsed_seconds.rem_euclid(self.length_seconds);

        if local < t_form {
            Envelope {
                formation: self.ease.apply(local / t_form),
                dissolution: 0.0,
            }
        } else if local < t_hold {
            Envelope {
                formation: 1.0,
                dissolution: 0.0,
            }
        } else if local < t_dissolve {
            Envelope {
                formation: 1.0,
                dissolution: self.ease.apply((local - t_hold) / (t_dissolve - t_hold)),
            }
        } else {
            Envelope {
                formation: 0.0,
                dissolution: 1.0,
            }
        }
    }

    /// Lifecycle state at an absolute elapsed time.
    pub fn phase(&self, elapsed_seconds: f64) -> EnvelopePhase {
        let (t_form, t_hold, t_dissolve) = self.breakpoints;
        let local = elapsed_seconds.rem_euclid(self.length_seconds);
        if local < t_form {
            EnvelopePhase::Forming
        } else if local < t_hold {
            EnvelopePhase::Formed
        } else if local < t_dissolve {
            EnvelopePhase::Dissolving
        } else {
            EnvelopePhase::Scattered
        }
    }
}

/// Formation/dissolution scalars for one instant of a cycle, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    /// 0 = fully scattered, 1 = fully formed.
    pub formation: f64,
    /// 0 = intact, 1 = fully dispersed.
    pub dissolution: f64,
}

/// Cyclic lifecycle state, derived purely from elapsed time.
///
/// `Scattered -> Forming -> Formed -> Dissolving -> Scattered`; transitions
/// happen exactly when `elapsed mod length` crosses a breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EnvelopePhase {
    /// Elements converge toward their targets.
    Forming,
    /// Elements hold their formed positions.
    Formed,
    /// Elements disperse outward.
    Dissolving,
    /// Elements rest at scattered positions awaiting the next cycle.
    Scattered,
}

#[cfg(test)]
#[path = "../../tests/unit/animation/envelope.rs"]
mod tests;
