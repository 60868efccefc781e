//! Boundary conditions between adjoining domains.
//!
//! Every interface is a pair `(pos, neg)` with `pos · V_upper = neg · V_lower`,
//! where `V_upper` is the state on the lower face of the upper domain and
//! `V_lower` the state on the upper face of the lower domain. The table does
//! not depend on frequency.

use num_complex::Complex64;

use crate::error::{Result, TlError};
use crate::linalg::{identity, real, CMatrix};
use crate::LayerClass;

/// Porosity assumed when a porous side does not supply one.
pub const DEFAULT_POROSITY: f64 = 0.99;

/// Boundary-condition matrix pair of one interface.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPair {
    /// Applied to the state of the upper side.
    pub pos: CMatrix,
    /// Applied to the state of the lower side.
    pub neg: CMatrix,
}

impl BoundaryPair {
    /// Number of coupling conditions.
    pub fn rows(&self) -> usize {
        self.pos.nrows()
    }
}

/// One side of an interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Side {
    pub class: LayerClass,
    /// Porosity of this side, if the material declares one.
    pub porosity: Option<f64>,
}

impl Side {
    pub fn new(class: LayerClass) -> Self {
        Self { class, porosity: None }
    }

    pub fn porous(porosity: f64) -> Self {
        Self {
            class: LayerClass::PoroElastic,
            porosity: Some(porosity),
        }
    }
}

/// Which sides of an interface carry a porosity into its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PorosityNeed {
    None,
    Upper,
    Lower,
    Both,
}

pub fn porosity_need(upper: LayerClass, lower: LayerClass) -> PorosityNeed {
    use LayerClass::*;
    match (upper, lower) {
        (PoroElastic, PoroElastic) => PorosityNeed::Both,
        (PoroElastic, Fluid) => PorosityNeed::Upper,
        (Fluid, PoroElastic) => PorosityNeed::Lower,
        _ => PorosityNeed::None,
    }
}

/// State variables per face for each class.
pub fn state_size(class: LayerClass) -> usize {
    match class {
        LayerClass::Fluid => 2,
        LayerClass::PoroElastic => 6,
        LayerClass::ElasticSolid | LayerClass::Panel => 4,
    }
}

// Poro side of a fluid contact: frame and pore stresses share the fluid
// pressure by porosity, total normal velocity is continuous, no shear.
fn poro_fluid_contact(phi: f64) -> (CMatrix, CMatrix) {
    #[rustfmt::skip]
    let poro = real(4, 6, &[
        0.0, 0.0,       0.0, 1.0, 0.0, 0.0,
        0.0, 0.0,       0.0, 0.0, 0.0, 1.0,
        0.0, 1.0 - phi, phi, 0.0, 0.0, 0.0,
        0.0, 0.0,       0.0, 0.0, 1.0, 0.0,
    ]);
    #[rustfmt::skip]
    let fluid = real(4, 2, &[
        -(1.0 - phi), 0.0,
        -phi,         0.0,
        0.0,          1.0,
        0.0,          0.0,
    ]);
    (poro, fluid)
}

// Normal velocity, normal stress and vanishing shear on a 4-state solid face.
fn solid_fluid_contact() -> CMatrix {
    #[rustfmt::skip]
    let m = real(3, 4, &[
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);
    m
}

// Fluid side against a face whose third state is `sign · p`.
fn fluid_against_solid(sign: f64) -> CMatrix {
    real(3, 2, &[0.0, 1.0, sign, 0.0, 0.0, 0.0])
}

// Bonded poro frame: frame velocities tied to the neighbour, pore fluid
// cannot flow through, total normal stress and shear continuous.
fn poro_bonded_contact() -> CMatrix {
    #[rustfmt::skip]
    let m = real(5, 6, &[
        1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0, 1.0,
        0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
    ]);
    m
}

// Neighbour of a bonded poro face; `stress_sign` maps its third state to σ_zz.
fn bonded_against_poro(stress_sign: f64) -> CMatrix {
    #[rustfmt::skip]
    let m = real(5, 4, &[
        1.0, 0.0, 0.0,         0.0,
        0.0, 1.0, 0.0,         0.0,
        0.0, 1.0, 0.0,         0.0,
        0.0, 0.0, stress_sign, 0.0,
        0.0, 0.0, 0.0,         1.0,
    ]);
    m
}

// Pass-through between two porous layers, weighting by each side's porosity.
fn poro_passthrough(phi: f64) -> CMatrix {
    let mut m = identity(6);
    m[(2, 1)] = Complex64::new(1.0 - phi, 0.0);
    m[(2, 2)] = Complex64::new(phi, 0.0);
    m[(3, 5)] = Complex64::new(1.0, 0.0);
    m[(5, 5)] = Complex64::new(1.0 / phi, 0.0);
    m
}

// Panel pressure against solid normal stress.
fn panel_sign_flip() -> CMatrix {
    let mut m = identity(4);
    m[(2, 2)] = Complex64::new(-1.0, 0.0);
    m
}

/// Boundary-condition pair for `upper` lying on top of `lower`.
///
/// Sides that need a porosity and do not carry one resolve to
/// [`DEFAULT_POROSITY`]. A resolved porosity outside (0, 1] has no
/// meaningful coupling and fails with `UnsupportedInterface`.
pub fn boundary_conditions(upper: Side, lower: Side) -> Result<BoundaryPair> {
    use LayerClass::*;

    let resolve = |side: &Side| {
        let phi = side.porosity.unwrap_or(DEFAULT_POROSITY);
        if phi > 0.0 && phi <= 1.0 {
            Ok(phi)
        } else {
            Err(TlError::UnsupportedInterface {
                upper: upper.class,
                lower: lower.class,
                porosity: Some(phi),
            })
        }
    };

    let need = porosity_need(upper.class, lower.class);
    let phi_up = match need {
        PorosityNeed::Upper | PorosityNeed::Both => resolve(&upper)?,
        _ => DEFAULT_POROSITY,
    };
    let phi_down = match need {
        PorosityNeed::Lower | PorosityNeed::Both => resolve(&lower)?,
        _ => DEFAULT_POROSITY,
    };

    let (pos, neg) = match (upper.class, lower.class) {
        (Fluid, Fluid) => (identity(2), identity(2)),
        (PoroElastic, PoroElastic) => (poro_passthrough(phi_up), poro_passthrough(phi_down)),
        (ElasticSolid, ElasticSolid) | (Panel, Panel) => (identity(4), identity(4)),

        (PoroElastic, Fluid) => poro_fluid_contact(phi_up),
        (Fluid, PoroElastic) => {
            let (poro, fluid) = poro_fluid_contact(phi_down);
            (fluid, poro)
        }

        // panel state carries p, solid state carries σ_zz = -p
        (Panel, Fluid) => (solid_fluid_contact(), fluid_against_solid(1.0)),
        (Fluid, Panel) => (fluid_against_solid(1.0), solid_fluid_contact()),
        (ElasticSolid, Fluid) => (solid_fluid_contact(), fluid_against_solid(-1.0)),
        (Fluid, ElasticSolid) => (fluid_against_solid(-1.0), solid_fluid_contact()),

        (PoroElastic, Panel) => (poro_bonded_contact(), bonded_against_poro(-1.0)),
        (Panel, PoroElastic) => (bonded_against_poro(-1.0), poro_bonded_contact()),
        (PoroElastic, ElasticSolid) => (poro_bonded_contact(), bonded_against_poro(1.0)),
        (ElasticSolid, PoroElastic) => (bonded_against_poro(1.0), poro_bonded_contact()),

        (ElasticSolid, Panel) => (identity(4), panel_sign_flip()),
        (Panel, ElasticSolid) => (panel_sign_flip(), identity(4)),
    };

    Ok(BoundaryPair { pos, neg })
}
