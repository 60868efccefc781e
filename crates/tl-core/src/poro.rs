//! Biot poro-elastic layer with a JCA equivalent fluid in the pores.
//!
//! Face state: `[v_x^s, v_z^s, v_z^f, σ_zz^s, σ_xz^s, σ_zz^f]`.

use num_complex::Complex64;

use crate::air::AirProperties;
use crate::elements::{propagation, FrequencyState, LayerMatrices, Properties};
use crate::error::Result;
use crate::interface::DEFAULT_POROSITY;
use crate::jca::{equivalent_fluid, PoreStructure};
use crate::linalg::CMatrix;
use crate::LayerWaveModel;

#[derive(Debug, Clone, PartialEq)]
pub struct PoroElastic {
    /// Thickness in metres.
    pub thickness: f64,
    pub pores: PoreStructure,
    /// Bulk density of the frame in kg/m³.
    pub density: f64,
    /// In-vacuo Young's modulus of the frame in Pa.
    pub youngs_modulus: f64,
    pub loss_factor: f64,
    pub poissons_ratio: f64,
}

impl PoroElastic {
    pub(crate) fn from_properties(props: &Properties<'_>) -> Result<Self> {
        let porosity = props.optional("porosity", DEFAULT_POROSITY);
        let in_range = porosity > 0.0 && porosity <= 1.0;
        let porosity = props.ensure("porosity", porosity, in_range, "(0, 1]")?;
        let tortuosity = props.required("tortuosity")?;
        let tortuosity = props.ensure("tortuosity", tortuosity, tortuosity >= 1.0, ">= 1")?;

        Ok(Self {
            thickness: props.thickness(),
            pores: PoreStructure {
                airflow_resistivity: props.positive("airflow_resistivity")?,
                porosity,
                tortuosity,
                viscous_length: props.positive("viscous_cl")?,
                thermal_length: props.positive("thermal_cl")?,
            },
            density: props.positive("density")?,
            youngs_modulus: props.positive("youngs_modulus")?,
            loss_factor: props.loss_factor()?,
            poissons_ratio: props.poissons_ratio()?,
        })
    }
}

impl LayerWaveModel for PoroElastic {
    fn wave_matrices(&self, freq: &FrequencyState, air: &AirProperties) -> LayerMatrices {
        let j = Complex64::i();
        let w = freq.omega;
        let w2 = w * w;
        let kt = Complex64::new(freq.kt, 0.0);
        let phi = self.pores.porosity;

        let (rho_eq, k_eq) = equivalent_fluid(w, &self.pores, air);
        let rho22 = phi * phi * rho_eq;
        let rho12 = phi * air.density - rho22;
        let rho11 = self.density - rho12;

        // Biot elastic coefficients, frame made lossy through its modulus
        let e = Complex64::new(self.youngs_modulus, self.youngs_modulus * self.loss_factor);
        let nu = self.poissons_ratio;
        let k_frame = e / (3.0 * (1.0 - 2.0 * nu));
        let n = e / (2.0 * (1.0 + nu));
        let p = 4.0 / 3.0 * n + k_frame + k_eq * (1.0 - phi).powi(2);
        let q = k_eq * phi * (1.0 - phi);
        let r = k_eq * phi * phi;

        // compressional dispersion: (PR - Q²)k⁴ - ω²(Pρ22 + Rρ11 - 2Qρ12)k² + ω⁴ det(ρ) = 0
        let coupling = p * rho22 + r * rho11 - 2.0 * q * rho12;
        let det_rho = rho11 * rho22 - rho12 * rho12;
        let det_k = p * r - q * q;
        let root = (coupling * coupling - 4.0 * det_k * det_rho).sqrt();
        let k1 = (w2 * (coupling - root) / (2.0 * det_k)).sqrt();
        let k2 = (w2 * (coupling + root) / (2.0 * det_k)).sqrt();
        let k3 = (w2 * det_rho / (n * rho22)).sqrt();

        let k13 = (k1 * k1 - kt * kt).sqrt();
        let k23 = (k2 * k2 - kt * kt).sqrt();
        let k33 = (k3 * k3 - kt * kt).sqrt();

        // fluid-to-frame velocity ratios of each branch
        let mu1 = (p * k1 * k1 - w2 * rho11) / (w2 * rho12 - q * k1 * k1);
        let mu2 = (p * k2 * k2 - w2 * rho11) / (w2 * rho12 - q * k2 * k2);
        let mu3 = -rho12 / rho22;

        let d1 = (p + q * mu1) * k1 * k1 - 2.0 * n * kt * kt;
        let d2 = (p + q * mu2) * k2 * k2 - 2.0 * n * kt * kt;
        let e1 = (r * mu1 + q) * k1 * k1;
        let e2 = (r * mu2 + q) * k2 * k2;
        let shear = n * (k33 * k33 - kt * kt);
        let zero = Complex64::new(0.0, 0.0);

        #[rustfmt::skip]
        let phi_matrix = CMatrix::from_row_slice(6, 6, &[
            w * kt,         w * kt,          w * kt,         w * kt,          -w * k33,                 w * k33,
            w * k13,        -w * k13,        w * k23,        -w * k23,        w * kt,                   w * kt,
            w * k13 * mu1,  -w * k13 * mu1,  w * k23 * mu2,  -w * k23 * mu2,  w * kt * mu3,             w * kt * mu3,
            -d1,            -d1,             -d2,            -d2,             -2.0 * n * k33 * kt,      2.0 * n * k33 * kt,
            -2.0 * n * kt * k13, 2.0 * n * kt * k13, -2.0 * n * kt * k23, 2.0 * n * kt * k23, shear,   shear,
            -e1,            -e1,             -e2,            -e2,             zero,                     zero,
        ]);

        let exponents = [-j * k13, j * k13, -j * k23, j * k23, -j * k33, j * k33];

        LayerMatrices {
            phi: phi_matrix,
            lambda: propagation(&exponents, self.thickness),
        }
    }
}
