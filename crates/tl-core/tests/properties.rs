use approx::{assert_abs_diff_eq, assert_relative_eq};
use tl_core::interface::{boundary_conditions, state_size, Side};
use tl_core::{
    compute, compute_with, Environment, Layer, LayerClass, LayerStack, StackModel, SweepConfig,
    TlError,
};

fn aluminium_panel() -> Layer {
    Layer::new(LayerClass::Panel, 0.001)
        .with("density", 2700.0)
        .with("youngs_modulus", 70e9)
        .with("poissons_ratio", 0.33)
        .with("loss_factor", 0.01)
}

fn rubber_sheet() -> Layer {
    Layer::new(LayerClass::ElasticSolid, 0.004)
        .with("density", 1100.0)
        .with("youngs_modulus", 5e6)
        .with("poissons_ratio", 0.45)
}

fn melamine() -> Layer {
    Layer::new(LayerClass::PoroElastic, 0.02)
        .with("airflow_resistivity", 10_900.0)
        .with("porosity", 0.99)
        .with("tortuosity", 1.02)
        .with("viscous_cl", 100e-6)
        .with("thermal_cl", 130e-6)
        .with("density", 8.8)
        .with("youngs_modulus", 180e3)
        .with("poissons_ratio", 0.3)
        .with("loss_factor", 0.1)
}

fn gap() -> Layer {
    Layer::new(LayerClass::Fluid, 0.05)
}

fn scenario_environment() -> Environment {
    Environment {
        pressure_pa: 101_325.0,
        temperature_c: 20.0,
        relative_humidity: 0.5,
        incidence_deg: 0.0,
    }
}

fn coarse() -> SweepConfig {
    SweepConfig {
        points: 40,
        ..SweepConfig::default()
    }
}

#[test]
fn empty_stack_transmits_everything() {
    for angle in [0.0, 30.0, 60.0] {
        let env = Environment {
            incidence_deg: angle,
            ..Environment::default()
        };
        let result = compute(&LayerStack::default(), &env).unwrap();
        assert_eq!(result.len(), 1000);
        for i in 0..result.len() {
            assert_abs_diff_eq!(result.complex_transmission[i].norm(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(result.transmission_loss_db[i], 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(result.reflection[i].norm(), 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn reversed_stack_has_same_transmission_loss() {
    let env = scenario_environment();
    let stacks = [
        LayerStack::new(vec![aluminium_panel(), rubber_sheet()]),
        LayerStack::new(vec![aluminium_panel(), melamine()]),
        LayerStack::new(vec![melamine(), gap(), aluminium_panel()]),
    ];
    for stack in stacks {
        let forward = compute_with(&stack, &env, &coarse()).unwrap();
        let backward = compute_with(&stack.reversed(), &env, &coarse()).unwrap();
        for i in 0..forward.len() {
            let (a, b) = (forward.transmission_loss_db[i], backward.transmission_loss_db[i]);
            assert!(
                (a - b).abs() < 1e-5,
                "{:?} at {:.1} Hz: {a} dB forward, {b} dB backward",
                stack.layers.iter().map(|l| l.class).collect::<Vec<_>>(),
                forward.frequency_hz[i]
            );
        }
    }
}

#[test]
fn gap_separated_segments_cascade() {
    let env = Environment {
        incidence_deg: 20.0,
        ..scenario_environment()
    };
    let upper = StackModel::new(&LayerStack::new(vec![aluminium_panel()]), &env).unwrap();
    let lower = StackModel::new(&LayerStack::new(vec![melamine()]), &env).unwrap();
    let combined = StackModel::new(
        &LayerStack::new(vec![aluminium_panel(), gap(), melamine()]),
        &env,
    )
    .unwrap();
    assert_eq!(combined.segments().len(), 2);

    for f in [125.0, 800.0, 4000.0] {
        let expected = upper
            .global_transfer(f)
            .unwrap()
            .chain(&lower.global_transfer(f).unwrap());
        let actual = combined.global_transfer(f).unwrap();
        for (x, y) in [
            (actual.a, expected.a),
            (actual.b, expected.b),
            (actual.c, expected.c),
            (actual.d, expected.d),
        ] {
            assert!((x - y).norm() <= 1e-12 * y.norm().max(1e-12), "{f} Hz: {x} != {y}");
        }
    }
}

#[test]
fn omitted_porosity_matches_default() {
    let mut implicit = melamine();
    implicit.properties.remove("porosity");
    let explicit = melamine().with("porosity", 0.99);

    let env = Environment::default();
    let a = StackModel::new(&LayerStack::new(vec![implicit]), &env).unwrap();
    let b = StackModel::new(&LayerStack::new(vec![explicit]), &env).unwrap();
    assert_eq!(a.interfaces(), b.interfaces());
}

#[test]
fn every_class_pair_has_boundary_conditions() {
    let classes = [
        LayerClass::Fluid,
        LayerClass::PoroElastic,
        LayerClass::ElasticSolid,
        LayerClass::Panel,
    ];
    for upper in classes {
        for lower in classes {
            let pair = boundary_conditions(Side::new(upper), Side::new(lower))
                .unwrap_or_else(|e| panic!("{upper:?} above {lower:?}: {e}"));
            assert_eq!(pair.pos.ncols(), state_size(upper));
            assert_eq!(pair.neg.ncols(), state_size(lower));
            assert_eq!(pair.pos.nrows(), pair.neg.nrows());
        }
    }
}

#[test]
fn aluminium_panel_follows_mass_law() {
    let env = scenario_environment();
    let stack = LayerStack::new(vec![aluminium_panel()]);
    let result = compute(&stack, &env).unwrap();
    let air = env.validate().unwrap();
    let surface_mass = 2700.0 * 0.001;

    let mut previous = f64::NEG_INFINITY;
    for i in 0..result.len() {
        let f = result.frequency_hz[i];
        let tl = result.transmission_loss_db[i];
        if f <= 1000.0 {
            assert!(tl > previous, "TL not increasing at {f} Hz: {tl} after {previous}");
            previous = tl;
        }

        // at normal incidence the plate acts as a limp mass
        let x = 2.0 * std::f64::consts::PI * f * surface_mass / (2.0 * air.impedance());
        let expected = 10.0 * (1.0 + x * x).log10();
        assert_relative_eq!(tl, expected, max_relative = 1e-8);
    }

    let model = StackModel::new(&stack, &env).unwrap();
    let (at_1k, _) = tl_core::frequency_response::transmission_at(&model, 1000.0).unwrap();
    assert!((10.0..=50.0).contains(&at_1k), "TL(1 kHz) = {at_1k}");
}

#[test]
fn invalid_inputs_abort_before_sweeping() {
    let mut missing = melamine();
    missing.properties.remove("tortuosity");
    match compute(&LayerStack::new(vec![aluminium_panel(), missing]), &Environment::default()) {
        Err(TlError::InvalidLayerProperty { layer, property, .. }) => {
            assert_eq!(layer, 1);
            assert_eq!(property, "tortuosity");
        }
        other => panic!("expected InvalidLayerProperty, got {other:?}"),
    }

    let humid = Environment {
        relative_humidity: 1.5,
        ..Environment::default()
    };
    assert!(matches!(
        compute(&LayerStack::new(vec![aluminium_panel()]), &humid),
        Err(TlError::InvalidEnvironment { parameter: "RH", .. })
    ));

    let thin = Layer::new(LayerClass::Panel, -1.0);
    assert!(matches!(
        compute(&LayerStack::new(vec![thin]), &Environment::default()),
        Err(TlError::InvalidLayerProperty { ref property, .. }) if property == "thickness"
    ));
}

#[test]
fn repeated_runs_are_identical() {
    let stack = LayerStack::new(vec![aluminium_panel(), melamine(), gap(), rubber_sheet()]);
    let env = Environment {
        incidence_deg: 45.0,
        ..Environment::default()
    };
    let a = compute_with(&stack, &env, &coarse()).unwrap();
    let b = compute_with(&stack, &env, &coarse()).unwrap();
    assert_eq!(a.transmission_loss_db, b.transmission_loss_db);
    assert_eq!(a.complex_transmission, b.complex_transmission);
    for alpha in &a.absorption_coefficient {
        assert!(alpha.is_finite());
    }
}
