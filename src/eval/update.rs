use rayon::prelude::*;

use crate::{
    animation::wave::{HuePulse, PaletteCycle, WaveTerm, wave_sum},
    effect::generate::{Element, ElementDetail},
    effect::model::{EffectConfig, EffectKind},
    foundation::core::{Rgb, Vec2, Vec3, clamp01},
    foundation::error::{GlimmerError, GlimmerResult},
    foundation::math::{smoothstep, stable_hash64, value_noise3},
};

/// Ephemeral per-element output of one frame evaluation.
///
/// Owned by the caller for the duration of one tick, then handed to the
/// render surface and discarded. Opacity and color channels are always in
/// `[0, 1]` by the time a value leaves this module.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FrameState {
    /// World-space position.
    pub position: Vec3,
    /// Straight RGB color.
    pub color: Rgb,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Uniform scale; for edge/rung elements this is the segment length.
    pub scale: f64,
}

/// Per-tick inputs supplied by the host render loop.
///
/// The engine owns no clock and subscribes to no events: elapsed time and
/// the pointer sample both arrive through this value, once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInputs {
    /// Host-supplied elapsed time in seconds.
    pub elapsed_seconds: f64,
    /// Pointer position normalized to `[-1, 1]` per axis, if known.
    pub pointer: Option<Vec2>,
}

impl TickInputs {
    /// Inputs with only an elapsed time (no pointer sample).
    pub fn at(elapsed_seconds: f64) -> Self {
        Self {
            elapsed_seconds,
            pointer: None,
        }
    }
}

/// Stateless frame-update function: static element table in, per-frame
/// states out. Order-preserving, one [`FrameState`] per [`Element`].
pub struct FrameUpdate;

impl FrameUpdate {
    /// Evaluate every element of an effect at the given inputs.
    #[tracing::instrument(skip(config, elements), fields(kind = config.kind.tag(), n = elements.len()))]
    pub fn update(
        config: &EffectConfig,
        elements: &[Element],
        inputs: TickInputs,
    ) -> GlimmerResult<Vec<FrameState>> {
        check_lengths(config, elements)?;
        elements
            .iter()
            .map(|el| eval_element(config, el, inputs))
            .collect()
    }

    /// Parallel evaluation across elements. Elements are independent pure
    /// functions of time, so this produces results identical to
    /// [`FrameUpdate::update`], in the same index order.
    pub fn update_parallel(
        config: &EffectConfig,
        elements: &[Element],
        inputs: TickInputs,
    ) -> GlimmerResult<Vec<FrameState>> {
        check_lengths(config, elements)?;
        elements
            .par_iter()
            .map(|el| eval_element(config, el, inputs))
            .collect()
    }
}

fn check_lengths(config: &EffectConfig, elements: &[Element]) -> GlimmerResult<()> {
    if elements.len() != config.element_count {
        return Err(GlimmerError::state(format!(
            "element table length {} does not match configured count {}",
            elements.len(),
            config.element_count
        )));
    }
    Ok(())
}

fn detail_mismatch(config: &EffectConfig) -> GlimmerError {
    GlimmerError::state(format!(
        "element detail does not match effect kind '{}'",
        config.kind.tag()
    ))
}

fn eval_element(
    config: &EffectConfig,
    el: &Element,
    inputs: TickInputs,
) -> GlimmerResult<FrameState> {
    let t = inputs.elapsed_seconds;
    let mut state = match config.kind {
        EffectKind::WaveRibbon => wave_ribbon(config, el, t)?,
        EffectKind::RadialPortal => radial_portal(config, el, t)?,
        EffectKind::ParticleCloud => particle_cloud(config, el, t)?,
        EffectKind::NodeGraph => node_graph(config, el, t)?,
        EffectKind::HelixStrand => helix_strand(config, el, t)?,
        EffectKind::CrystalLattice => crystal_lattice(config, el, t)?,
        EffectKind::WaveGrid => wave_grid(config, el, t)?,
        EffectKind::EnergyShell => energy_shell(config, el, t)?,
        EffectKind::TextConstellation => text_constellation(config, el, t)?,
        EffectKind::PointerTrail => pointer_trail(config, el, inputs)?,
    };

    if config.floating_enabled {
        state.position.y += (t + el.phase).sin() * 0.1;
    }

    state.position = config.base_position + state.position * config.base_scale;
    state.scale *= config.base_scale;
    state.opacity = clamp01(state.opacity);
    Ok(state)
}

fn rotate_y(p: Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x * c + p.z * s, p.y, -p.x * s + p.z * c)
}

fn rotate_x(p: Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x, p.y * c - p.z * s, p.y * s + p.z * c)
}

fn wave_ribbon(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Curtain {
        wave_speed,
        wave_amplitude,
        base_opacity,
        color_shift,
    } = el.detail
    else {
        return Err(detail_mismatch(config));
    };
    let (ws, wa) = (wave_speed, wave_amplitude);
    let base = el.base_position;
    let mut pos = base;

    // Three stacked waves plus smooth noise for organic drift.
    let stack = [
        (
            WaveTerm {
                amplitude: wa,
                frequency: ws,
                speed: 1.0,
                phase: 0.0,
            },
            base.y * 2.0,
        ),
        (
            WaveTerm {
                amplitude: wa * 0.7,
                frequency: ws,
                speed: 1.3,
                phase: 1.0,
            },
            base.y * 1.5,
        ),
        (
            WaveTerm {
                amplitude: wa * 0.5,
                frequency: ws,
                speed: 0.8,
                phase: 2.0,
            },
            base.y * 3.0,
        ),
    ];
    let noise_seed = stable_hash64(config.seed, "ribbon-noise");
    let drift =
        value_noise3(noise_seed, Vec3::new(base.x * 2.0, base.y + t * 0.5, t * 0.3)) * 0.2;
    pos.x += wave_sum(&stack, t) + drift;
    pos.z += (t * ws * 0.6 + base.y * 1.2).sin() * wa * 0.3;
    pos.y += (t * ws * 0.4 + base.x * 0.5).sin() * 0.1;

    // Whole-field sway and bob.
    pos = rotate_y(pos, (t * 0.1).sin() * 0.1);
    pos.y += (t * 0.3).sin() * 0.2;

    let intensity = ((t * 2.0 + base.x * 0.5 + base.y * 0.3).sin() * 0.3 + 0.7)
        * ((t * 1.5 + base.y * 2.0).sin() * 0.2 + 0.8);
    let color = PaletteCycle::aurora(color_shift)
        .eval(t, base.x * 0.2 + base.y * 0.1)
        .scaled(intensity);

    Ok(FrameState {
        position: pos,
        color,
        opacity: base_opacity * intensity,
        scale: el.size,
    })
}

fn radial_portal(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Ring {
        radius,
        spin_speed,
        angle_offset,
    } = el.detail
    else {
        return Err(detail_mismatch(config));
    };
    let depth = config.range("pulse_depth").midpoint();

    let breathe = 1.0 + (t * 2.0).sin() * 0.05;
    let ring_pulse = 1.0 + (t * 3.0 + el.phase).sin() * 0.1;
    let pulse = 1.0 - depth * (0.5 - 0.5 * (t * 8.0).sin());
    let spin = t * spin_speed + angle_offset;
    let shimmer = spin.sin() * 0.15 + 0.85;

    let inner = Rgb::new(0.0, 0.8, 1.0);
    let outer = Rgb::new(1.0, 0.0, 0.8);
    Ok(FrameState {
        position: el.base_position,
        color: inner.mix(outer, el.color_seed).scaled(pulse * shimmer),
        opacity: 0.6 * pulse,
        scale: radius * ring_pulse * breathe,
    })
}

fn particle_cloud(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Point = el.detail else {
        return Err(detail_mismatch(config));
    };
    let wobble = config.range("wobble_amplitude").midpoint();
    let base = el.base_position;
    let ring_radius = (base.x * base.x + base.z * base.z).sqrt();

    let mut pos = base;
    pos.y += (t * 2.0 + ring_radius * 0.5).sin() * wobble;
    pos = rotate_y(pos, t * 0.1);
    pos = rotate_x(pos, (t * 0.3).sin() * 0.1);

    let palette = HuePulse {
        saturation: 0.8,
        lightness: 0.6,
        pulse_rate: 3.0,
        pulse_depth: 0.25,
    };
    Ok(FrameState {
        position: pos,
        color: palette.eval(t, el.color_seed, el.phase),
        opacity: 0.8,
        scale: el.size * (1.0 + (t * 3.0).sin() * 0.4),
    })
}

fn node_graph(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    match el.detail {
        ElementDetail::Node { activation, .. } => {
            let low = Rgb::new(0.1, 0.1, 0.3);
            let high = Rgb::new(0.0, 1.0, 1.0);
            let pulse = (t * 8.0 + activation * 10.0).sin() * 0.3 + 0.7;
            Ok(FrameState {
                position: el.base_position,
                color: low.mix(high, activation).scaled(pulse),
                opacity: 0.9,
                scale: el.size * (1.0 + activation * (t * 5.0).sin() * 0.3),
            })
        }
        ElementDetail::Edge { weight, .. } => {
            // Traveling activation flash along the connection.
            let flow = (t * 3.0 + weight * 5.0).sin() * 0.5 + 0.5;
            Ok(FrameState {
                position: el.base_position,
                color: Rgb::new(0.4, 0.9, 1.0).scaled(0.6 + 0.4 * flow),
                opacity: 0.15 + 0.45 * flow * weight.abs(),
                scale: el.size,
            })
        }
        _ => Err(detail_mismatch(config)),
    }
}

fn helix_strand(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let bob = config.range("bob_amplitude").midpoint();
    let angle = t * 0.5;
    let mut pos = rotate_y(el.base_position, angle);
    pos.y += (t * 0.8).sin() * bob;

    match el.detail {
        ElementDetail::Point => {
            let palette = HuePulse {
                saturation: 1.0,
                lightness: 0.55,
                pulse_rate: 2.0,
                pulse_depth: 0.15,
            };
            Ok(FrameState {
                position: pos,
                color: palette.eval(t, el.color_seed, el.phase),
                opacity: 0.9,
                scale: el.size,
            })
        }
        ElementDetail::Rung { .. } => Ok(FrameState {
            position: pos,
            color: Rgb::WHITE.scaled(0.9),
            opacity: 0.6,
            scale: el.size,
        }),
        _ => Err(detail_mismatch(config)),
    }
}

fn crystal_lattice(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Shard { grown_scale, .. } = el.detail else {
        return Err(detail_mismatch(config));
    };
    let rate = config.range("growth_rate").midpoint();
    let growth = ((t - el.delay).max(0.0) * rate).min(1.0);

    let mut pos = rotate_y(el.base_position, t * 0.2);
    pos = rotate_x(pos, (t * 0.3).sin() * 0.1);
    pos.y += (t * 2.0 + el.phase).sin() * 0.1;

    let palette = HuePulse {
        saturation: 0.8,
        lightness: 0.6,
        pulse_rate: 3.0,
        pulse_depth: 0.2,
    };
    Ok(FrameState {
        position: pos,
        color: palette.eval(t, el.color_seed, el.phase),
        opacity: 0.85 * growth,
        scale: grown_scale * growth,
    })
}

fn wave_grid(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Point = el.detail else {
        return Err(detail_mismatch(config));
    };
    let swell = config.range("swell").midpoint();
    let base = el.base_position;

    let stack = [
        (
            WaveTerm {
                amplitude: 0.3,
                frequency: 0.5,
                speed: 1.0,
                phase: 0.0,
            },
            base.x * 0.5,
        ),
        (
            WaveTerm {
                amplitude: 0.2,
                frequency: 0.8,
                speed: 0.7,
                phase: 0.0,
            },
            base.z * 0.8,
        ),
        (
            WaveTerm {
                amplitude: 0.4,
                frequency: 0.3,
                speed: 1.0,
                phase: 0.0,
            },
            (base.x + base.z) * 0.3,
        ),
    ];
    let mut pos = base;
    pos.y += wave_sum(&stack, t) * swell;

    // Shared hue drift across the whole lattice.
    let hue = (t * 20.0).rem_euclid(360.0) / 360.0;
    Ok(FrameState {
        position: pos,
        color: Rgb::from_hsl(hue, 0.6, 0.4),
        opacity: 0.3,
        scale: el.size,
    })
}

fn energy_shell(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Point = el.detail else {
        return Err(detail_mismatch(config));
    };
    let distortion = config.range("distortion").midpoint();
    let base = el.base_position;
    let normal = base / crate::effect::generate::SHELL_RADIUS;

    let stack = [
        (
            WaveTerm {
                amplitude: 0.1,
                frequency: 1.0,
                speed: 1.0,
                phase: 0.0,
            },
            base.x * 2.0,
        ),
        (
            WaveTerm {
                amplitude: 0.05,
                frequency: 1.5,
                speed: 1.0,
                phase: 0.0,
            },
            base.y * 3.0,
        ),
        (
            WaveTerm {
                amplitude: 0.15,
                frequency: 0.8,
                speed: 1.0,
                phase: 0.0,
            },
            base.z * 1.5,
        ),
    ];
    let mut pos = base + normal * (wave_sum(&stack, t) * distortion);
    pos = rotate_x(pos, t * 0.2);
    pos = rotate_y(pos, t * 0.3);

    let p1 = (base.x * 5.0 + t * 2.0).sin() * 0.5 + 0.5;
    let p2 = (base.y * 3.0 + t * 1.5).sin() * 0.5 + 0.5;
    let p3 = (base.z * 4.0 + t * 3.0).sin() * 0.5 + 0.5;
    let color = Rgb::new(0.0, 1.0, 1.0)
        .mix(Rgb::new(1.0, 0.0, 1.0), p1)
        .mix(Rgb::new(1.0, 1.0, 0.0), p2 * p3);

    let rim = (1.0 - normal.z.abs()).powi(2);
    Ok(FrameState {
        position: pos,
        color,
        opacity: 0.2 + rim * 0.5 + (t * 4.0).sin() * 0.1,
        scale: el.size,
    })
}

fn text_constellation(config: &EffectConfig, el: &Element, t: f64) -> GlimmerResult<FrameState> {
    let ElementDetail::Mote {
        scattered,
        target,
        velocity,
    } = el.detail
    else {
        return Err(detail_mismatch(config));
    };
    let env = config.cycle_or_default().eval(t - el.delay);

    let mut pos = scattered.lerp(target, env.formation);
    pos += velocity * env.dissolution * 3.0;

    let settled = env.formation > 0.8 && env.dissolution < 0.2;
    if settled {
        pos.y += (t * 2.0 + el.phase).sin() * 0.05;
        pos.x += (t * 1.5 + el.phase + 1.0).sin() * 0.02;
        pos.z += (t * 1.8 + el.phase + 2.0).sin() * 0.03;
    }

    let forming = Rgb::new(0.3, 0.8, 1.0);
    let dissolving = Rgb::new(1.0, 0.5, 0.0);
    let color = if settled {
        Rgb::WHITE
    } else if env.dissolution > 0.2 {
        dissolving
    } else {
        forming
    };
    let sparkle = (t * 8.0 + el.phase).sin() * 0.3 + 0.7;

    let alpha = smoothstep(0.0, 0.3, env.formation) * smoothstep(1.0, 0.7, env.dissolution);
    Ok(FrameState {
        position: pos,
        color: color.scaled(sparkle),
        opacity: alpha,
        scale: el.size,
    })
}

fn pointer_trail(
    config: &EffectConfig,
    el: &Element,
    inputs: TickInputs,
) -> GlimmerResult<FrameState> {
    let ElementDetail::Follower { index, lag } = el.detail else {
        return Err(detail_mismatch(config));
    };
    let t = inputs.elapsed_seconds;
    let pointer = inputs.pointer.unwrap_or(Vec2::ZERO) * 5.0;

    // Followers reach a lag-scaled fraction of the pointer displacement,
    // which reads as trailing without any state carried between ticks.
    let mut pos = el.base_position + Vec3::new(pointer.x * lag, pointer.y * lag, 0.0);
    pos.y += (t * 3.0 + el.phase).sin() * 0.05;

    let fade = index as f64 * 0.05;
    Ok(FrameState {
        position: pos,
        color: Rgb::from_hsl(el.color_seed, 0.7, (0.7 - fade).max(0.2)),
        opacity: (0.6 - fade).max(0.05),
        scale: el.size,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/eval/update.rs"]
mod tests;
