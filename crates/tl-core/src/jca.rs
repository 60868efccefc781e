//! Johnson–Champoux–Allard equivalent fluid for a rigid-frame porous
//! material.

use num_complex::Complex64;

use crate::air::AirProperties;

/// Microstructural parameters of an open-cell porous material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoreStructure {
    /// Static airflow resistivity σ in Pa·s/m².
    pub airflow_resistivity: f64,
    /// Open porosity φ.
    pub porosity: f64,
    /// High-frequency tortuosity α∞.
    pub tortuosity: f64,
    /// Viscous characteristic length Λ in m.
    pub viscous_length: f64,
    /// Thermal characteristic length Λ' in m.
    pub thermal_length: f64,
}

/// Effective density ρ_eq and bulk modulus K_eq of the saturating air at
/// angular frequency `omega`.
///
/// Both quantities are per unit volume of the porous material (already
/// divided by φ). `omega` must be strictly positive.
pub fn equivalent_fluid(
    omega: f64,
    pores: &PoreStructure,
    air: &AirProperties,
) -> (Complex64, Complex64) {
    let j = Complex64::i();
    let PoreStructure {
        airflow_resistivity: sigma,
        porosity: phi,
        tortuosity: alpha,
        viscous_length,
        thermal_length,
    } = *pores;
    let rho0 = air.density;
    let eta = air.viscosity;
    let pr = air.prandtl;
    let gamma = air.specific_heat_ratio;

    // viscous inertial correction (Johnson et al.)
    let m = sigma * phi / (j * omega * alpha * rho0);
    let n = (1.0 + 4.0 * j * eta * rho0 * omega * alpha * alpha
        / (sigma * sigma * viscous_length * viscous_length * phi * phi))
        .sqrt();
    let rho_eq = rho0 * alpha / phi * (1.0 + m * n);

    // thermal relaxation (Champoux & Allard)
    let q = 8.0 * j * eta / (thermal_length * thermal_length * pr * rho0 * omega);
    let s = (1.0 + j * thermal_length * thermal_length * pr * rho0 * omega / (16.0 * eta)).sqrt();
    let u = (gamma - 1.0) / (1.0 - q * s);
    let k_eq = gamma * air.pressure / phi / (gamma - u);

    (rho_eq, k_eq)
}
