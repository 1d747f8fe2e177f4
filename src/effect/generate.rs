use std::f64::consts::{PI, TAU};

use crate::{
    effect::model::{EffectConfig, EffectKind},
    foundation::core::Vec3,
    foundation::error::GlimmerResult,
    foundation::math::{Rng64, stable_hash64},
};

/// One animatable unit of an effect.
///
/// All fields are fixed at generation time; per-frame state is derived from
/// them by the update function and never written back.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Element {
    /// Rest position relative to the effect anchor.
    pub base_position: Vec3,
    /// Random scalar offset desynchronizing this element from its siblings.
    pub phase: f64,
    /// Stable hue parameter in `[0, 1)`.
    pub color_seed: f64,
    /// Base size or weight handed through to the render surface.
    pub size: f64,
    /// Stagger delay in seconds for formation/growth style animation.
    pub delay: f64,
    /// Kind-specific static payload.
    pub detail: ElementDetail,
}

/// Kind-specific static payload carried by an element.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub enum ElementDetail {
    /// Free particle, lattice vertex, or shell point with no extra payload.
    Point,
    /// Aurora-style curtain segment.
    Curtain {
        /// Base wave speed multiplier.
        wave_speed: f64,
        /// Base wave displacement amplitude.
        wave_amplitude: f64,
        /// Rest opacity before intensity modulation.
        base_opacity: f64,
        /// Phase shift of the traveling palette.
        color_shift: f64,
    },
    /// Concentric ring of a portal.
    Ring {
        /// Ring radius.
        radius: f64,
        /// Angular spin rate in rad/s.
        spin_speed: f64,
        /// Constant spin offset.
        angle_offset: f64,
    },
    /// Graph node on a layered lattice.
    Node {
        /// Layer index.
        layer: usize,
        /// Static activation level in `[0, 1]`.
        activation: f64,
    },
    /// Graph edge between two nodes, endpoints baked at generation.
    Edge {
        /// Start endpoint.
        from: Vec3,
        /// End endpoint.
        to: Vec3,
        /// Signed weight in `[-1, 1]`.
        weight: f64,
    },
    /// Helix rung connecting the two strands.
    Rung {
        /// Strand-A endpoint.
        from: Vec3,
        /// Strand-B endpoint.
        to: Vec3,
    },
    /// Crystal shard with staggered growth.
    Shard {
        /// Rest orientation in Euler radians.
        rotation: Vec3,
        /// Fully grown scale.
        grown_scale: f64,
    },
    /// Particle that forms into a target then scatters.
    Mote {
        /// Scattered rest position.
        scattered: Vec3,
        /// Formed target position.
        target: Vec3,
        /// Outward velocity applied during dissolution.
        velocity: Vec3,
    },
    /// Trailing follower behind the pointer.
    Follower {
        /// Index along the trail, 0 = head.
        index: usize,
        /// Fraction of the pointer displacement this follower reaches.
        lag: f64,
    },
}

/// Deterministically generate the static element table for an effect.
///
/// Same config => identical elements, element for element. All jitter comes
/// from a [`Rng64`] seeded with `stable_hash(seed, kind tag)`, so two kinds
/// sharing a seed still draw independent sequences.
pub fn generate(config: &EffectConfig) -> GlimmerResult<Vec<Element>> {
    config.validate()?;
    let mut rng = Rng64::new(stable_hash64(config.seed, config.kind.tag()));
    let elements = match config.kind {
        EffectKind::WaveRibbon => gen_wave_ribbon(config, &mut rng),
        EffectKind::RadialPortal => gen_radial_portal(config, &mut rng),
        EffectKind::ParticleCloud => gen_particle_cloud(config, &mut rng),
        EffectKind::NodeGraph => gen_node_graph(config, &mut rng),
        EffectKind::HelixStrand => gen_helix_strand(config),
        EffectKind::CrystalLattice => gen_crystal_lattice(config, &mut rng),
        EffectKind::WaveGrid => gen_wave_grid(config, &mut rng),
        EffectKind::EnergyShell => gen_energy_shell(config, &mut rng),
        EffectKind::TextConstellation => gen_text_constellation(config, &mut rng),
        EffectKind::PointerTrail => gen_pointer_trail(config),
    };
    debug_assert_eq!(elements.len(), config.element_count);
    Ok(elements)
}

fn gen_wave_ribbon(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let n = config.element_count;
    let speed = config.range("wave_speed");
    let amplitude = config.range("wave_amplitude");
    let opacity = config.range("opacity");

    (0..n)
        .map(|i| {
            let x = (i as f64 - (n as f64 - 1.0) / 2.0) * 2.0;
            let z = rng.next_f64_signed();
            let height = 3.0 + rng.next_f64_01() * 2.0;
            Element {
                base_position: Vec3::new(x, 0.0, z),
                phase: rng.next_f64_01() * TAU,
                color_seed: rng.next_f64_01(),
                size: height,
                delay: 0.0,
                detail: ElementDetail::Curtain {
                    wave_speed: speed.sample(rng),
                    wave_amplitude: amplitude.sample(rng),
                    base_opacity: opacity.sample(rng),
                    color_shift: rng.next_f64_01() * TAU,
                },
            }
        })
        .collect()
}

fn gen_radial_portal(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let spin = config.range("spin_speed");
    (0..config.element_count)
        .map(|i| {
            let fi = i as f64;
            Element {
                base_position: Vec3::ZERO,
                // Small per-ring desync on top of the closed-form ladder.
                phase: fi + rng.next_f64_01() * 0.2,
                color_seed: fi / config.element_count as f64,
                size: 0.02 + fi * 0.01,
                delay: 0.0,
                detail: ElementDetail::Ring {
                    radius: 0.5 + fi * 0.3,
                    spin_speed: spin.min + fi * 0.2,
                    angle_offset: fi * PI / 4.0,
                },
            }
        })
        .collect()
}

fn gen_particle_cloud(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let n = config.element_count;
    let radius = config.range("radius");
    (0..n)
        .map(|i| {
            let r = radius.sample(rng);
            let angle = (i as f64 / n as f64) * TAU * 2.0 + rng.next_f64_01() * 0.5;
            let height = rng.next_f64_signed();
            let x = angle.cos() * r;
            let z = angle.sin() * r;
            let y = height + (r * 0.5).sin() * 0.5;
            let hue = (r * 0.1 + i as f64 * 0.01).rem_euclid(1.0);
            Element {
                base_position: Vec3::new(x, y, z),
                phase: rng.next_f64_01() * TAU,
                color_seed: hue,
                size: 0.05,
                delay: 0.0,
                detail: ElementDetail::Point,
            }
        })
        .collect()
}

/// Fraction of a node-graph's element budget spent on nodes; the rest
/// becomes edges between adjacent layers.
const NODE_SHARE: f64 = 0.4;
const GRAPH_LAYERS: usize = 5;

fn gen_node_graph(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let n = config.element_count;
    let node_count = (((n as f64) * NODE_SHARE).ceil() as usize).clamp(2, n);
    let edge_count = n - node_count;
    let layers = GRAPH_LAYERS.min(node_count);
    let activation = config.range("activation");
    let depth = config.range("depth");

    // Nodes spread evenly across layers; x by layer, y by slot within layer.
    let mut per_layer: Vec<Vec<usize>> = vec![Vec::new(); layers];
    let mut nodes = Vec::with_capacity(node_count);
    for j in 0..node_count {
        let layer = j * layers / node_count;
        per_layer[layer].push(j);
        nodes.push((j, layer));
    }

    let mut out: Vec<Element> = nodes
        .iter()
        .map(|&(j, layer)| {
            let slot = per_layer[layer].iter().position(|&k| k == j).unwrap_or(0);
            let layer_len = per_layer[layer].len() as f64;
            let pos = Vec3::new(
                (layer as f64 - (layers as f64 - 1.0) / 2.0) * 2.0,
                (slot as f64 - layer_len / 2.0) * 0.8,
                depth.sample(rng),
            );
            Element {
                base_position: pos,
                phase: rng.next_f64_01() * TAU,
                color_seed: rng.next_f64_01(),
                size: 0.12,
                delay: 0.0,
                detail: ElementDetail::Node {
                    layer,
                    activation: activation.sample(rng),
                },
            }
        })
        .collect();

    for _ in 0..edge_count {
        // Pick a layer pair with nodes on both sides; layers >= 1 is
        // guaranteed by min_elements, and with a single layer edges loop
        // inside it rather than across.
        let from_layer = if layers > 1 { rng.next_index(layers - 1) } else { 0 };
        let to_layer = if layers > 1 { from_layer + 1 } else { 0 };
        let from = out[pick(&per_layer[from_layer], rng)].base_position;
        let to = out[pick(&per_layer[to_layer], rng)].base_position;
        out.push(Element {
            base_position: (from + to) / 2.0,
            phase: rng.next_f64_01() * TAU,
            color_seed: rng.next_f64_01(),
            size: (to - from).length(),
            delay: 0.0,
            detail: ElementDetail::Edge {
                from,
                to,
                weight: rng.next_f64_signed(),
            },
        });
    }
    out
}

fn pick(slots: &[usize], rng: &mut Rng64) -> usize {
    slots[rng.next_index(slots.len())]
}

const HELIX_RADIUS: f64 = 1.5;
const HELIX_TURNS: f64 = 2.0;
const HELIX_HEIGHT: f64 = 6.0;

fn gen_helix_strand(config: &EffectConfig) -> Vec<Element> {
    let n = config.element_count;
    // Index rule: 0 -> strand A, 1 -> strand B, 2 -> rung, repeating.
    let segments = n.div_ceil(3).max(1);
    (0..n)
        .map(|i| {
            let seg = i / 3;
            let u = seg as f64 / segments as f64;
            let t = u * HELIX_TURNS * TAU;
            let y = u * HELIX_HEIGHT - HELIX_HEIGHT / 2.0;
            let a = Vec3::new(t.cos() * HELIX_RADIUS, y, t.sin() * HELIX_RADIUS);
            let b = Vec3::new(
                (t + PI).cos() * HELIX_RADIUS,
                y,
                (t + PI).sin() * HELIX_RADIUS,
            );
            match i % 3 {
                0 => Element {
                    base_position: a,
                    phase: t,
                    color_seed: 0.42,
                    size: 0.08,
                    delay: 0.0,
                    detail: ElementDetail::Point,
                },
                1 => Element {
                    base_position: b,
                    phase: t + PI,
                    color_seed: 0.91,
                    size: 0.08,
                    delay: 0.0,
                    detail: ElementDetail::Point,
                },
                _ => Element {
                    base_position: (a + b) / 2.0,
                    phase: t,
                    color_seed: 0.0,
                    size: (b - a).length(),
                    delay: 0.0,
                    detail: ElementDetail::Rung { from: a, to: b },
                },
            }
        })
        .collect()
}

const LATTICE_RING: usize = 5;

fn gen_crystal_lattice(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let shard_scale = config.range("shard_scale");
    (0..config.element_count)
        .map(|i| {
            let layer = i / LATTICE_RING;
            let angle = (i % LATTICE_RING) as f64 / LATTICE_RING as f64 * TAU;
            let radius = 1.0 + layer as f64 * 0.5;
            let height = layer as f64 * 0.5 + rng.next_f64_01() * 0.3;
            Element {
                base_position: Vec3::new(angle.cos() * radius, height, angle.sin() * radius),
                phase: rng.next_f64_01() * TAU,
                color_seed: 0.5 + rng.next_f64_01() * 0.3,
                size: 0.5,
                delay: i as f64 * 0.15 + rng.next_f64_01() * 0.2,
                detail: ElementDetail::Shard {
                    rotation: Vec3::new(
                        rng.next_f64_01() * PI,
                        angle + rng.next_f64_01() * 0.5,
                        rng.next_f64_01() * PI,
                    ),
                    grown_scale: shard_scale.sample(rng) + layer as f64 * 0.1,
                },
            }
        })
        .collect()
}

const GRID_SPAN: f64 = 20.0;
const GRID_JITTER: f64 = 0.15;

fn gen_wave_grid(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let n = config.element_count;
    let side = (n as f64).sqrt().ceil() as usize;
    let step = if side > 1 {
        GRID_SPAN / (side as f64 - 1.0)
    } else {
        0.0
    };
    (0..n)
        .map(|i| {
            let gx = (i % side) as f64;
            let gz = (i / side) as f64;
            let x = gx * step - GRID_SPAN / 2.0 + rng.next_f64_signed() * GRID_JITTER;
            let z = gz * step - GRID_SPAN / 2.0 + rng.next_f64_signed() * GRID_JITTER;
            Element {
                base_position: Vec3::new(x, 0.0, z),
                phase: rng.next_f64_01() * TAU,
                color_seed: 0.0,
                size: 1.0,
                delay: 0.0,
                detail: ElementDetail::Point,
            }
        })
        .collect()
}

pub(crate) const SHELL_RADIUS: f64 = 3.0;

fn gen_energy_shell(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let n = config.element_count;
    // Fibonacci sphere: even coverage for any count.
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f64;
            Element {
                base_position: Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
                    * SHELL_RADIUS,
                phase: rng.next_f64_01() * TAU,
                color_seed: rng.next_f64_01(),
                size: 0.06,
                delay: 0.0,
                detail: ElementDetail::Point,
            }
        })
        .collect()
}

/// Particles per constellation slot; matches the per-letter particle
/// grouping of the source visuals.
const MOTES_PER_SLOT: usize = 12;

fn gen_text_constellation(config: &EffectConfig, rng: &mut Rng64) -> Vec<Element> {
    let n = config.element_count;
    let slots = n.div_ceil(MOTES_PER_SLOT).max(1);
    let scatter = config.range("scatter_radius");
    let size = config.range("particle_size");
    (0..n)
        .map(|i| {
            let slot = i / MOTES_PER_SLOT;
            let slot_x = (slot as f64 - (slots as f64 - 1.0) / 2.0) * 0.4;
            let target = Vec3::new(
                slot_x + rng.next_f64_signed() * 0.1,
                rng.next_f64_signed() * 0.1,
                rng.next_f64_signed() * 0.05,
            );
            let radius = scatter.sample(rng);
            let scattered = target
                + Vec3::new(
                    rng.next_f64_signed(),
                    rng.next_f64_signed(),
                    rng.next_f64_signed(),
                ) * radius;
            Element {
                base_position: target,
                phase: rng.next_f64_01() * TAU,
                color_seed: rng.next_f64_01(),
                size: size.sample(rng),
                delay: slot as f64 * 0.1 + (i % MOTES_PER_SLOT) as f64 * 0.02,
                detail: ElementDetail::Mote {
                    scattered,
                    target,
                    velocity: Vec3::new(
                        rng.next_f64_signed(),
                        rng.next_f64_signed(),
                        rng.next_f64_signed(),
                    ),
                },
            }
        })
        .collect()
}

fn gen_pointer_trail(config: &EffectConfig) -> Vec<Element> {
    let spacing = config.range("trail_spacing").midpoint();
    let falloff = config.range("falloff").midpoint();
    (0..config.element_count)
        .map(|i| {
            let fi = i as f64;
            Element {
                base_position: Vec3::new(-fi * spacing, (fi * 0.5).sin() * 0.2, 2.0 - fi * 0.1),
                phase: fi * 0.7,
                color_seed: ((200.0 + fi * 20.0) % 360.0) / 360.0,
                size: (0.05 - fi * 0.005).max(0.01),
                delay: 0.0,
                detail: ElementDetail::Follower {
                    index: i,
                    lag: (-falloff * fi * 10.0).exp(),
                },
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effect/generate.rs"]
mod tests;
