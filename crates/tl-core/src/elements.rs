use std::f64::consts::PI;

use num_complex::Complex64;

use crate::air::AirProperties;
use crate::error::{Result, TlError};
use crate::linalg::CMatrix;
use crate::panel::Panel;
use crate::poro::PoroElastic;
use crate::solid::ElasticSolid;
use crate::{Layer, LayerClass, LayerWaveModel};

/// Per-bin excitation shared by every layer model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyState {
    pub frequency_hz: f64,
    /// Angular frequency ω in rad/s.
    pub omega: f64,
    /// Trace wavenumber kt = ω/c0·sin θ, conserved across all layers.
    pub kt: f64,
}

impl FrequencyState {
    pub fn new(frequency_hz: f64, air: &AirProperties, incidence_rad: f64) -> Self {
        let omega = 2.0 * PI * frequency_hz;
        Self {
            frequency_hz,
            omega,
            kt: omega / air.sound_speed * incidence_rad.sin(),
        }
    }
}

/// Face-state relation of one layer: the state on its upper face is
/// `phi · lambda · a` and on its lower face `phi · a`, for wave amplitudes `a`.
#[derive(Debug, Clone)]
pub struct LayerMatrices {
    pub phi: CMatrix,
    pub lambda: CMatrix,
}

impl LayerMatrices {
    /// Number of state variables on each face.
    pub fn size(&self) -> usize {
        self.phi.nrows()
    }
}

/// Decay/growth factors `exp(-α·d)` for wave exponents `α`.
pub(crate) fn propagation(exponents: &[Complex64], thickness: f64) -> CMatrix {
    let values: Vec<Complex64> = exponents.iter().map(|&a| (a * -thickness).exp()).collect();
    crate::linalg::diagonal(&values)
}

/// A validated stack element, one variant per layer class.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Unbonded air gap: a break between bonded segments.
    Fluid,
    PoroElastic(PoroElastic),
    ElasticSolid(ElasticSolid),
    Panel(Panel),
}

impl Material {
    /// Validate `layer` (stack position `index`) into a typed material.
    pub fn from_layer(index: usize, layer: &Layer) -> Result<Self> {
        if !(layer.thickness.is_finite() && layer.thickness > 0.0) {
            return Err(TlError::property(
                index,
                "thickness",
                format!("must be finite and > 0, got {}", layer.thickness),
            ));
        }
        for (key, value) in &layer.properties {
            if !value.is_finite() {
                return Err(TlError::property(index, key, format!("non-finite value {value}")));
            }
        }

        let props = Properties { index, layer };
        Ok(match layer.class {
            LayerClass::Fluid => Material::Fluid,
            LayerClass::PoroElastic => Material::PoroElastic(PoroElastic::from_properties(&props)?),
            LayerClass::ElasticSolid => {
                Material::ElasticSolid(ElasticSolid::from_properties(&props)?)
            }
            LayerClass::Panel => Material::Panel(Panel::from_properties(&props)?),
        })
    }

    pub fn class(&self) -> LayerClass {
        match self {
            Material::Fluid => LayerClass::Fluid,
            Material::PoroElastic(_) => LayerClass::PoroElastic,
            Material::ElasticSolid(_) => LayerClass::ElasticSolid,
            Material::Panel(_) => LayerClass::Panel,
        }
    }

    /// Open porosity, for classes whose interfaces depend on it.
    pub fn porosity(&self) -> Option<f64> {
        match self {
            Material::PoroElastic(poro) => Some(poro.pores.porosity),
            Material::Fluid | Material::ElasticSolid(_) | Material::Panel(_) => None,
        }
    }

    /// Thickness that contributes to the transmitted phase reference.
    pub fn acoustic_thickness(&self) -> f64 {
        match self {
            Material::Fluid => 0.0,
            Material::PoroElastic(m) => m.thickness,
            Material::ElasticSolid(m) => m.thickness,
            Material::Panel(m) => m.thickness,
        }
    }

    /// Wave model of a bonded layer; `None` for a fluid gap.
    pub fn wave_model(&self) -> Option<&dyn LayerWaveModel> {
        match self {
            Material::Fluid => None,
            Material::PoroElastic(m) => Some(m),
            Material::ElasticSolid(m) => Some(m),
            Material::Panel(m) => Some(m),
        }
    }
}

/// Checked access to the named properties of one layer.
pub(crate) struct Properties<'a> {
    index: usize,
    layer: &'a Layer,
}

impl Properties<'_> {
    pub fn thickness(&self) -> f64 {
        self.layer.thickness
    }

    pub fn required(&self, key: &str) -> Result<f64> {
        self.layer
            .properties
            .get(key)
            .copied()
            .ok_or_else(|| TlError::property(self.index, key, "missing"))
    }

    pub fn optional(&self, key: &str, default: f64) -> f64 {
        self.layer.properties.get(key).copied().unwrap_or(default)
    }

    /// Fail unless `check` holds for `value`.
    pub fn ensure(&self, key: &str, value: f64, check: bool, expected: &str) -> Result<f64> {
        if check {
            Ok(value)
        } else {
            let reason = format!("{value} out of range, expected {expected}");
            Err(TlError::property(self.index, key, reason))
        }
    }

    pub fn positive(&self, key: &str) -> Result<f64> {
        let value = self.required(key)?;
        self.ensure(key, value, value > 0.0, "> 0")
    }

    pub fn poissons_ratio(&self) -> Result<f64> {
        let nu = self.required("poissons_ratio")?;
        self.ensure("poissons_ratio", nu, nu > -1.0 && nu < 0.5, "(-1, 0.5)")
    }

    pub fn loss_factor(&self) -> Result<f64> {
        let eta = self.optional("loss_factor", 0.0);
        self.ensure("loss_factor", eta, eta >= 0.0, ">= 0")
    }
}
