use super::*;
use crate::animation::ease::Ease;
use crate::animation::envelope::CycleSpec;
use crate::effect::generate::generate;

const ALL_KINDS: [EffectKind; 10] = [
    EffectKind::WaveRibbon,
    EffectKind::RadialPortal,
    EffectKind::ParticleCloud,
    EffectKind::NodeGraph,
    EffectKind::HelixStrand,
    EffectKind::CrystalLattice,
    EffectKind::WaveGrid,
    EffectKind::EnergyShell,
    EffectKind::TextConstellation,
    EffectKind::PointerTrail,
];

fn effect(kind: EffectKind, count: usize) -> (EffectConfig, Vec<Element>) {
    let config = EffectConfig::new(kind, 1234, count);
    let elements = generate(&config).unwrap();
    (config, elements)
}

#[test]
fn update_is_idempotent_at_fixed_time() {
    for kind in ALL_KINDS {
        let (config, elements) = effect(kind, 24);
        let inputs = TickInputs::at(3.7);
        let a = FrameUpdate::update(&config, &elements, inputs).unwrap();
        let b = FrameUpdate::update(&config, &elements, inputs).unwrap();
        assert_eq!(a, b, "{kind:?} is not pure at fixed t");
    }
}

#[test]
fn update_preserves_element_order_and_count() {
    let (config, elements) = effect(EffectKind::ParticleCloud, 100);
    let states = FrameUpdate::update(&config, &elements, TickInputs::at(0.5)).unwrap();
    assert_eq!(states.len(), elements.len());
}

#[test]
fn opacity_and_color_stay_clamped_across_kinds_and_times() {
    for kind in ALL_KINDS {
        let (config, elements) = effect(kind, 24);
        for i in 0..60 {
            let t = i as f64 * 0.73 - 5.0;
            let states = FrameUpdate::update(&config, &elements, TickInputs::at(t)).unwrap();
            for s in &states {
                assert!(
                    (0.0..=1.0).contains(&s.opacity),
                    "{kind:?} opacity {} at t={t}",
                    s.opacity
                );
                for ch in [s.color.r, s.color.g, s.color.b] {
                    assert!((0.0..=1.0).contains(&ch), "{kind:?} channel {ch} at t={t}");
                }
            }
        }
    }
}

#[test]
fn parallel_evaluation_matches_sequential() {
    for kind in [EffectKind::WaveGrid, EffectKind::EnergyShell] {
        let (config, elements) = effect(kind, 300);
        let inputs = TickInputs::at(2.25);
        let seq = FrameUpdate::update(&config, &elements, inputs).unwrap();
        let par = FrameUpdate::update_parallel(&config, &elements, inputs).unwrap();
        assert_eq!(seq, par);
    }
}

#[test]
fn length_mismatch_is_a_state_error() {
    let (config, mut elements) = effect(EffectKind::WaveGrid, 16);
    elements.pop();
    let err = FrameUpdate::update(&config, &elements, TickInputs::at(0.0)).unwrap_err();
    assert!(matches!(err, GlimmerError::State(_)));
}

#[test]
fn foreign_detail_is_a_state_error() {
    let (grid_config, _) = effect(EffectKind::WaveGrid, 16);
    // Elements generated for another kind carry the wrong detail payload.
    let (_, ribbon_elements) = effect(EffectKind::WaveRibbon, 16);
    let err =
        FrameUpdate::update(&grid_config, &ribbon_elements, TickInputs::at(0.0)).unwrap_err();
    assert!(matches!(err, GlimmerError::State(_)));
}

#[test]
fn update_never_mutates_elements() {
    let (config, elements) = effect(EffectKind::CrystalLattice, 15);
    let before: Vec<Vec3> = elements.iter().map(|e| e.base_position).collect();
    FrameUpdate::update(&config, &elements, TickInputs::at(9.0)).unwrap();
    let after: Vec<Vec3> = elements.iter().map(|e| e.base_position).collect();
    assert_eq!(before, after);
}

#[test]
fn constellation_follows_its_envelope() {
    let mut config = EffectConfig::new(EffectKind::TextConstellation, 7, 12);
    config.cycle = Some(CycleSpec {
        length_seconds: 12.0,
        breakpoints: (3.0, 8.0, 10.0),
        ease: Ease::Linear,
    });
    let elements = generate(&config).unwrap();

    // Mid-hold: motes sit at their targets (plus a small settled wobble).
    let held = FrameUpdate::update(&config, &elements, TickInputs::at(5.0)).unwrap();
    for (el, s) in elements.iter().zip(&held) {
        let ElementDetail::Mote { target, .. } = el.detail else {
            unreachable!()
        };
        assert!((s.position - target).length() < 0.2);
        assert!(s.opacity > 0.9);
    }

    // Fully scattered window: opacity has ramped out.
    let scattered = FrameUpdate::update(&config, &elements, TickInputs::at(11.5)).unwrap();
    for s in &scattered {
        assert_eq!(s.opacity, 0.0);
    }
}

#[test]
fn pointer_moves_the_trail_only() {
    let (config, elements) = effect(EffectKind::PointerTrail, 8);
    let t = 1.0;
    let centered = FrameUpdate::update(&config, &elements, TickInputs::at(t)).unwrap();
    let offset = FrameUpdate::update(
        &config,
        &elements,
        TickInputs {
            elapsed_seconds: t,
            pointer: Some(Vec2::new(0.8, -0.4)),
        },
    )
    .unwrap();
    assert_ne!(centered[0].position, offset[0].position);

    // The head follows more closely than the tail.
    let head_shift = (offset[0].position - centered[0].position).length();
    let tail_shift = (offset[7].position - centered[7].position).length();
    assert!(head_shift > tail_shift);

    // A pointer sample is ignored by non-reactive kinds.
    let (grid_config, grid_elements) = effect(EffectKind::WaveGrid, 9);
    let a = FrameUpdate::update(&grid_config, &grid_elements, TickInputs::at(t)).unwrap();
    let b = FrameUpdate::update(
        &grid_config,
        &grid_elements,
        TickInputs {
            elapsed_seconds: t,
            pointer: Some(Vec2::new(0.8, -0.4)),
        },
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn base_position_and_scale_anchor_the_effect() {
    let mut config = EffectConfig::new(EffectKind::WaveGrid, 5, 9);
    let elements = generate(&config).unwrap();
    let origin = FrameUpdate::update(&config, &elements, TickInputs::at(1.0)).unwrap();

    config.base_position = Vec3::new(10.0, -2.0, 4.0);
    config.base_scale = 2.0;
    let moved = FrameUpdate::update(&config, &elements, TickInputs::at(1.0)).unwrap();
    for (a, b) in origin.iter().zip(&moved) {
        let expected = config.base_position + a.position * 2.0;
        assert!((b.position - expected).length() < 1e-9);
        assert!((b.scale - a.scale * 2.0).abs() < 1e-9);
    }
}

#[test]
fn crystal_growth_is_delayed_and_monotonic() {
    let (config, elements) = effect(EffectKind::CrystalLattice, 15);
    let early = FrameUpdate::update(&config, &elements, TickInputs::at(0.01)).unwrap();
    let late = FrameUpdate::update(&config, &elements, TickInputs::at(30.0)).unwrap();
    // The most delayed shard has not started growing yet.
    let last = elements.len() - 1;
    assert!(early[last].scale < late[last].scale);
    assert!(early[last].opacity < 1e-6);
    assert!(late[last].opacity > 0.5);
}

#[test]
fn floating_flag_changes_motion_without_structural_branching() {
    let mut config = EffectConfig::new(EffectKind::HelixStrand, 2, 12);
    let elements = generate(&config).unwrap();
    let still = FrameUpdate::update(&config, &elements, TickInputs::at(1.3)).unwrap();
    config.floating_enabled = true;
    let floating = FrameUpdate::update(&config, &elements, TickInputs::at(1.3)).unwrap();
    assert_ne!(still, floating);
    assert_eq!(still.len(), floating.len());
}
