use crate::error::{Result, TlError};

/// Specific gas constant of dry air, J/(kg·K).
const R_DRY: f64 = 287.058;
/// Specific gas constant of water vapour, J/(kg·K).
const R_VAPOUR: f64 = 461.495;
/// Sutherland reference viscosity at 273.15 K, Pa·s.
const SUTHERLAND_ETA0: f64 = 1.716e-5;
/// Sutherland constant for air, K.
const SUTHERLAND_S: f64 = 110.4;

pub const KELVIN_OFFSET: f64 = 273.15;
pub const SPECIFIC_HEAT_RATIO: f64 = 1.4;
pub const PRANDTL: f64 = 0.707;

/// Ambient air constants at a given pressure, temperature and humidity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirProperties {
    /// Density ρ0 in kg/m³.
    pub density: f64,
    /// Speed of sound c0 in m/s.
    pub sound_speed: f64,
    /// Ratio of specific heats γ.
    pub specific_heat_ratio: f64,
    /// Dynamic viscosity η in Pa·s.
    pub viscosity: f64,
    /// Prandtl number.
    pub prandtl: f64,
    /// Ambient static pressure P0 in Pa.
    pub pressure: f64,
    /// Gas constant of the humid mixture, J/(kg·K).
    pub gas_constant: f64,
    /// Molecular diffusion coefficient, m²/s.
    pub diffusion: f64,
    /// Mean molecular mass, kg.
    pub molecular_mass: f64,
    /// Molecular collision cross-section, m².
    pub cross_section: f64,
}

impl AirProperties {
    /// Characteristic impedance ρ0·c0 in Pa·s/m.
    pub fn impedance(&self) -> f64 {
        self.density * self.sound_speed
    }
}

/// Air constants from static pressure (Pa), temperature (°C) and relative
/// humidity (fraction).
///
/// Density and sound speed follow the ideal-gas scaling from their 0 °C,
/// 1 atm reference values; humidity only enters the mixture gas constant.
pub fn air_properties(
    pressure_pa: f64,
    temperature_c: f64,
    humidity: f64,
) -> Result<AirProperties> {
    if !(pressure_pa.is_finite() && pressure_pa > 0.0) {
        return Err(TlError::InvalidEnvironment {
            parameter: "P0",
            value: pressure_pa,
        });
    }
    if !(temperature_c.is_finite() && temperature_c > -KELVIN_OFFSET) {
        return Err(TlError::InvalidEnvironment {
            parameter: "T",
            value: temperature_c,
        });
    }
    if !(0.0..=1.0).contains(&humidity) {
        return Err(TlError::InvalidEnvironment {
            parameter: "RH",
            value: humidity,
        });
    }

    let t_kelvin = temperature_c + KELVIN_OFFSET;

    // Magnus-type saturation pressure scaled by humidity
    let vapour_pressure =
        humidity * 6.102 * 10f64.powf(7.5 * temperature_c / (temperature_c + 237.8));
    let dry_pressure = pressure_pa - vapour_pressure;
    let gas_constant = pressure_pa / (dry_pressure / R_DRY + vapour_pressure / R_VAPOUR);

    let sound_speed = 20.047 * t_kelvin.sqrt();
    let density = 1.290 * (pressure_pa / 101_325.0) * (KELVIN_OFFSET / t_kelvin);
    let viscosity = SUTHERLAND_ETA0
        * (t_kelvin / KELVIN_OFFSET).powf(1.5)
        * (KELVIN_OFFSET + SUTHERLAND_S)
        / (t_kelvin + SUTHERLAND_S);

    Ok(AirProperties {
        density,
        sound_speed,
        specific_heat_ratio: SPECIFIC_HEAT_RATIO,
        viscosity,
        prandtl: PRANDTL,
        pressure: pressure_pa,
        gas_constant,
        diffusion: 1.35e-10,
        molecular_mass: 4.8106e-26,
        cross_section: 4.3265e-19,
    })
}
