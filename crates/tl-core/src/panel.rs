//! Thin plate with bending and membrane stiffness.
//!
//! Face state: `[v_x, v_z, p, σ_xz]` where `p = -σ_zz`. The plate is not
//! decomposed into waves: its basis is the identity and the full
//! upper-from-lower face transfer is returned as the propagation matrix.

use num_complex::Complex64;

use crate::air::AirProperties;
use crate::elements::{FrequencyState, LayerMatrices, Properties};
use crate::error::Result;
use crate::linalg::{identity, CMatrix};
use crate::LayerWaveModel;

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Thickness in metres.
    pub thickness: f64,
    /// Density in kg/m³.
    pub density: f64,
    /// Young's modulus in Pa.
    pub youngs_modulus: f64,
    pub loss_factor: f64,
    pub poissons_ratio: f64,
}

impl Panel {
    pub(crate) fn from_properties(props: &Properties<'_>) -> Result<Self> {
        Ok(Self {
            thickness: props.thickness(),
            density: props.positive("density")?,
            youngs_modulus: props.positive("youngs_modulus")?,
            loss_factor: props.loss_factor()?,
            poissons_ratio: props.poissons_ratio()?,
        })
    }

    /// Mass per unit area in kg/m².
    pub fn surface_mass(&self) -> f64 {
        self.density * self.thickness
    }

    fn modulus(&self) -> Complex64 {
        Complex64::new(self.youngs_modulus, self.youngs_modulus * self.loss_factor)
    }

    /// Membrane stiffness E·h.
    pub fn membrane_stiffness(&self) -> Complex64 {
        self.modulus() * self.thickness
    }

    /// Bending stiffness E·h³ / 12(1 − ν²).
    pub fn bending_stiffness(&self) -> Complex64 {
        let nu = self.poissons_ratio;
        self.modulus() * self.thickness.powi(3) / (12.0 * (1.0 - nu * nu))
    }
}

impl LayerWaveModel for Panel {
    fn wave_matrices(&self, freq: &FrequencyState, _air: &AirProperties) -> LayerMatrices {
        let j = Complex64::i();
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let w = freq.omega;
        let k = freq.kt;
        let h = self.thickness;
        let ms = self.surface_mass();

        let c1 = self.membrane_stiffness() * k * k - ms * w * w;
        let c2 = self.bending_stiffness() * k.powi(4) - ms * w * w;

        #[rustfmt::skip]
        let transfer = CMatrix::from_row_slice(4, 4, &[
            one,                        -j * k * h,                                               zero, zero,
            zero,                       one,                                                      zero, zero,
            k * h / (2.0 * w) * c1,     (k * k * h * h / 4.0 * c1 + c2) / (j * w),                one,  j * k * h,
            c1 / (j * w),               -k * h / (2.0 * w) * c1,                                  zero, one,
        ]);

        LayerMatrices {
            phi: identity(4),
            lambda: transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::air_properties;
    use crate::elements::Material;
    use crate::{Layer, LayerClass};

    fn plate() -> Panel {
        let layer = Layer::new(LayerClass::Panel, 0.001)
            .with("density", 2700.0)
            .with("youngs_modulus", 70e9)
            .with("poissons_ratio", 0.33)
            .with("loss_factor", 0.01);
        match Material::from_layer(0, &layer).unwrap() {
            Material::Panel(m) => m,
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn test_stiffness_terms() {
        let p = plate();
        assert!((p.surface_mass() - 2.7).abs() < 1e-12);
        let d = p.bending_stiffness();
        let expected = 70e9 * 1e-9 / (12.0 * (1.0 - 0.33 * 0.33));
        assert!((d.re - expected).abs() / expected < 1e-12, "D = {d}");
        assert!((d.im - 0.01 * expected).abs() / expected < 1e-12, "D = {d}");
    }

    #[test]
    fn test_normal_incidence_is_pure_mass() {
        // Without a trace wavenumber the plate only adds inertia: the
        // pressure jump across it is jω·m·v.
        let air = air_properties(101_325.0, 20.0, 0.5).unwrap();
        let p = plate();
        let freq = FrequencyState::new(500.0, &air, 0.0);
        let lm = p.wave_matrices(&freq, &air);

        assert_eq!(lm.phi, identity(4));
        let jwm = Complex64::new(0.0, freq.omega * p.surface_mass());
        assert!((lm.lambda[(2, 1)] - jwm).norm() < 1e-9, "T[2,1] = {}", lm.lambda[(2, 1)]);
        assert!((lm.lambda[(3, 0)] - jwm).norm() < 1e-9, "T[3,0] = {}", lm.lambda[(3, 0)]);
        assert_eq!(lm.lambda[(0, 1)], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_transfer_is_unimodular() {
        let air = air_properties(101_325.0, 20.0, 0.5).unwrap();
        let p = plate();
        let freq = FrequencyState::new(3000.0, &air, 45f64.to_radians());
        let det = p.wave_matrices(&freq, &air).lambda.determinant();
        assert!((det - Complex64::new(1.0, 0.0)).norm() < 1e-6, "det = {det}");
    }
}
