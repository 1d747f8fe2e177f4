use super::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::effect::model::EffectKind;
use crate::foundation::error::GlimmerError;

/// Recording surface: remembers which effects applied and how many states.
#[derive(Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<(EffectId, usize)>>>,
}

impl Recorder {
    fn new() -> (Self, Rc<RefCell<Vec<(EffectId, usize)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl RenderSurface for Recorder {
    fn apply(&mut self, effect: EffectId, states: &[FrameState]) -> GlimmerResult<()> {
        self.calls.borrow_mut().push((effect, states.len()));
        Ok(())
    }
}

fn failing_surface() -> impl RenderSurface {
    surface_fn(|_, _| Err(GlimmerError::surface("upload rejected")))
}

#[test]
fn register_validates_and_allocates_distinct_ids() {
    let mut driver = SceneDriver::new();
    let (rec, _) = Recorder::new();
    let a = driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 1, 9), rec)
        .unwrap();
    let (rec, _) = Recorder::new();
    let b = driver
        .register(EffectConfig::new(EffectKind::ParticleCloud, 1, 50), rec)
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(driver.len(), 2);

    // A bad config aborts only that registration.
    let (rec, _) = Recorder::new();
    let err = driver.register(EffectConfig::new(EffectKind::WaveGrid, 1, 0), rec);
    assert!(matches!(err, Err(GlimmerError::Parameter(_))));
    assert_eq!(driver.len(), 2);
}

#[test]
fn registering_five_hundred_elements_yields_exactly_five_hundred() {
    let mut driver = SceneDriver::new();
    let (rec, calls) = Recorder::new();
    let id = driver
        .register(EffectConfig::new(EffectKind::ParticleCloud, 7, 500), rec)
        .unwrap();
    assert_eq!(driver.elements(id).unwrap().len(), 500);
    driver.tick(TickInputs::at(0.1));
    assert_eq!(calls.borrow().as_slice(), &[(id, 500)]);
}

#[test]
fn tick_dispatches_every_effect_in_id_order() {
    let mut driver = SceneDriver::new();
    let (rec_a, calls_a) = Recorder::new();
    let (rec_b, calls_b) = Recorder::new();
    let a = driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 1, 4), rec_a)
        .unwrap();
    let b = driver
        .register(EffectConfig::new(EffectKind::EnergyShell, 1, 8), rec_b)
        .unwrap();

    let report = driver.tick(TickInputs::at(1.0));
    assert!(report.is_clean());
    assert_eq!(report.dispatched, 2);
    assert_eq!(calls_a.borrow().as_slice(), &[(a, 4)]);
    assert_eq!(calls_b.borrow().as_slice(), &[(b, 8)]);
    assert_eq!(driver.last_elapsed_seconds(), 1.0);
}

#[test]
fn removed_effect_gets_no_further_calls() {
    let mut driver = SceneDriver::new();
    let (rec_a, calls_a) = Recorder::new();
    let (rec_b, calls_b) = Recorder::new();
    let a = driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 1, 4), rec_a)
        .unwrap();
    let b = driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 2, 4), rec_b)
        .unwrap();

    driver.tick(TickInputs::at(1.0));
    assert!(driver.remove(a));
    assert!(!driver.remove(a), "double removal reports absence");
    driver.tick(TickInputs::at(2.0));

    assert_eq!(calls_a.borrow().len(), 1, "no call after removal");
    assert_eq!(calls_b.borrow().len(), 2);
    assert!(!driver.contains(a));
    assert!(driver.contains(b));
}

#[test]
fn one_failing_surface_does_not_starve_the_rest() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
    let mut driver = SceneDriver::new();
    let (rec_a, calls_a) = Recorder::new();
    let a = driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 1, 4), rec_a)
        .unwrap();
    let bad = driver
        .register(
            EffectConfig::new(EffectKind::EnergyShell, 1, 8),
            failing_surface(),
        )
        .unwrap();
    let (rec_c, calls_c) = Recorder::new();
    let c = driver
        .register(EffectConfig::new(EffectKind::ParticleCloud, 1, 16), rec_c)
        .unwrap();

    let report = driver.tick(TickInputs::at(0.5));
    assert_eq!(report.dispatched, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, bad);
    assert!(matches!(report.failures[0].1, GlimmerError::Surface(_)));
    // Both neighbors, before and after the failing id, still applied.
    assert_eq!(calls_a.borrow().as_slice(), &[(a, 4)]);
    assert_eq!(calls_c.borrow().as_slice(), &[(c, 16)]);
}

#[test]
fn unavailable_surface_degrades_to_a_noop() {
    let mut driver = SceneDriver::new();
    let (rec, calls) = Recorder::new();
    driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 1, 4), rec)
        .unwrap();

    driver.set_surface_available(false);
    let report = driver.tick(TickInputs::at(1.0));
    assert!(report.skipped);
    assert_eq!(report.dispatched, 0);
    assert!(report.failures.is_empty());
    assert!(calls.borrow().is_empty());
    // Time is still tracked while degraded.
    assert_eq!(driver.last_elapsed_seconds(), 1.0);

    driver.set_surface_available(true);
    driver.tick(TickInputs::at(2.0));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn parallel_driver_produces_identical_states() {
    let captured_seq = Rc::new(RefCell::new(Vec::new()));
    let captured_par = Rc::new(RefCell::new(Vec::new()));

    let capture = |store: &Rc<RefCell<Vec<Vec<FrameState>>>>| {
        let store = Rc::clone(store);
        surface_fn(move |_, states| {
            store.borrow_mut().push(states.to_vec());
            Ok(())
        })
    };

    let mut seq = SceneDriver::new();
    seq.register(
        EffectConfig::new(EffectKind::EnergyShell, 3, 200),
        capture(&captured_seq),
    )
    .unwrap();
    let mut par = SceneDriver::with_threading(UpdateThreading::Parallel);
    par.register(
        EffectConfig::new(EffectKind::EnergyShell, 3, 200),
        capture(&captured_par),
    )
    .unwrap();

    seq.tick(TickInputs::at(4.2));
    par.tick(TickInputs::at(4.2));
    assert_eq!(*captured_seq.borrow(), *captured_par.borrow());
}

#[test]
fn lifecycle_phase_is_reported_for_cycled_effects_only() {
    let mut driver = SceneDriver::new();
    let mut config = EffectConfig::new(EffectKind::TextConstellation, 5, 24);
    config.cycle = Some(crate::animation::envelope::CycleSpec::TEXT_DEFAULT);
    let (rec, _) = Recorder::new();
    let cycled = driver.register(config, rec).unwrap();
    let (rec, _) = Recorder::new();
    let plain = driver
        .register(EffectConfig::new(EffectKind::WaveGrid, 5, 4), rec)
        .unwrap();

    assert_eq!(driver.phase(cycled, 5.0), Some(EnvelopePhase::Formed));
    assert_eq!(driver.phase(cycled, 9.0), Some(EnvelopePhase::Dissolving));
    assert_eq!(driver.phase(plain, 5.0), None);
    assert_eq!(driver.phase(EffectId(999), 5.0), None);
}
