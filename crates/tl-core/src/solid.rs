//! Isotropic elastic solid layer. Face state: `[v_x, v_z, σ_zz, σ_xz]`.

use num_complex::Complex64;

use crate::air::AirProperties;
use crate::elements::{propagation, FrequencyState, LayerMatrices, Properties};
use crate::error::Result;
use crate::linalg::real;
use crate::LayerWaveModel;

#[derive(Debug, Clone, PartialEq)]
pub struct ElasticSolid {
    /// Thickness in metres.
    pub thickness: f64,
    /// Density in kg/m³.
    pub density: f64,
    /// Young's modulus in Pa.
    pub youngs_modulus: f64,
    pub poissons_ratio: f64,
}

impl ElasticSolid {
    pub(crate) fn from_properties(props: &Properties<'_>) -> Result<Self> {
        Ok(Self {
            thickness: props.thickness(),
            density: props.positive("density")?,
            youngs_modulus: props.positive("youngs_modulus")?,
            poissons_ratio: props.poissons_ratio()?,
        })
    }

    /// Shear modulus μ and Lamé constant λ.
    pub fn lame(&self) -> (f64, f64) {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;
        let mu = e / (2.0 * (1.0 + nu));
        let lambda = e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu));
        (mu, lambda)
    }
}

impl LayerWaveModel for ElasticSolid {
    fn wave_matrices(&self, freq: &FrequencyState, _air: &AirProperties) -> LayerMatrices {
        let w = freq.omega;
        let kt = freq.kt;
        let (mu, lambda) = self.lame();

        let k1 = w * (self.density / (lambda + 2.0 * mu)).sqrt();
        let k3 = w * (self.density / mu).sqrt();

        // Past the critical angle the radicand would go negative; hold it at
        // machine epsilon instead.
        let k13 = (k1 * k1 - kt * kt).max(f64::EPSILON).sqrt();
        let k33 = (k3 * k3 - kt * kt).max(f64::EPSILON).sqrt();

        let d1 = lambda * (k13 * k13 + kt * kt) + 2.0 * mu * k13 * k13;
        let d2 = 2.0 * mu * kt;
        let shear = mu * (k33 * k33 - kt * kt);

        #[rustfmt::skip]
        let phi = real(4, 4, &[
            w * kt,      w * kt,      -w * k33,    w * k33,
            w * k13,     -w * k13,    w * kt,      w * kt,
            -d1,         -d1,         -d2 * k33,   d2 * k33,
            -d2 * k13,   d2 * k13,    shear,       shear,
        ]);

        let j = Complex64::i();
        let exponents = [-j * k13, j * k13, -j * k33, j * k33];

        LayerMatrices {
            phi,
            lambda: propagation(&exponents, self.thickness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::air_properties;
    use crate::elements::Material;
    use crate::{Layer, LayerClass};
    use std::f64::consts::PI;

    fn aluminium(thickness: f64) -> ElasticSolid {
        let layer = Layer::new(LayerClass::ElasticSolid, thickness)
            .with("density", 2700.0)
            .with("youngs_modulus", 70e9)
            .with("poissons_ratio", 0.33);
        match Material::from_layer(0, &layer).unwrap() {
            Material::ElasticSolid(m) => m,
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn test_lame_constants() {
        let (mu, lambda) = aluminium(0.001).lame();
        assert!((mu - 26.316e9).abs() / 26.316e9 < 1e-3, "mu = {mu}");
        assert!((lambda - 51.085e9).abs() / 51.085e9 < 1e-3, "lambda = {lambda}");
    }

    #[test]
    fn test_phase_advance_matches_bulk_wave_speed() {
        let air = air_properties(101_325.0, 20.0, 0.5).unwrap();
        let solid = aluminium(0.01);
        let freq = FrequencyState::new(5000.0, &air, 0.0);
        let lm = solid.wave_matrices(&freq, &air);

        let (mu, lambda) = solid.lame();
        let c_l = ((lambda + 2.0 * mu) / solid.density).sqrt();
        let expected = 2.0 * PI * 5000.0 / c_l * solid.thickness;
        let phase = lm.lambda[(0, 0)].arg();
        assert!((phase - expected).abs() < 1e-9, "phase = {phase}, expected {expected}");
        assert!((lm.lambda[(0, 0)].norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_beyond_critical_angle_stays_finite() {
        // Both bulk waves of aluminium are faster than sound in air, so at
        // grazing incidence the trace wavenumber exceeds k1 and k3.
        let air = air_properties(101_325.0, 20.0, 0.5).unwrap();
        let solid = aluminium(0.002);
        let freq = FrequencyState::new(1000.0, &air, 80f64.to_radians());
        let (mu, _) = solid.lame();
        let k3 = freq.omega * (solid.density / mu).sqrt();
        assert!(freq.kt > k3);

        let lm = solid.wave_matrices(&freq, &air);
        for value in lm.phi.iter().chain(lm.lambda.iter()) {
            assert!(value.re.is_finite() && value.im.is_finite(), "{value}");
        }
        assert!((lm.lambda[(0, 0)].norm() - 1.0).abs() < 1e-12);
    }
}
