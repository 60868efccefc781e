use num_complex::Complex64;
use tracing::warn;

use crate::error::{Result, TlError};
use crate::stack::{check_frequency, StackModel};
use crate::transfer_matrix::Coefficients;
use crate::SimulationResult;

/// Frequency band of a sweep, log-spaced and inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    pub f_min_hz: f64,
    pub f_max_hz: f64,
    pub points: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            f_min_hz: 100.0,
            f_max_hz: 6400.0,
            points: 1000,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.f_min_hz.is_finite() && self.f_min_hz > 0.0) {
            return Err(TlError::InvalidEnvironment {
                parameter: "f_min_hz",
                value: self.f_min_hz,
            });
        }
        if !(self.f_max_hz.is_finite() && self.f_max_hz > self.f_min_hz) {
            return Err(TlError::InvalidEnvironment {
                parameter: "f_max_hz",
                value: self.f_max_hz,
            });
        }
        if self.points < 2 {
            return Err(TlError::InvalidEnvironment {
                parameter: "points",
                value: self.points as f64,
            });
        }
        Ok(())
    }

    /// Bin centre frequencies in Hz.
    pub fn frequencies(&self) -> Vec<f64> {
        let lo = self.f_min_hz.log10();
        let step = (self.f_max_hz.log10() - lo) / (self.points - 1) as f64;
        (0..self.points)
            .map(|i| match i {
                0 => self.f_min_hz,
                i if i == self.points - 1 => self.f_max_hz,
                i => 10f64.powf(lo + step * i as f64),
            })
            .collect()
    }
}

#[cfg(feature = "parallel")]
fn solve_all(model: &StackModel, frequencies: &[f64]) -> Vec<Result<Coefficients>> {
    use rayon::prelude::*;
    frequencies.par_iter().map(|&f| model.solve_bin(f)).collect()
}

#[cfg(not(feature = "parallel"))]
fn solve_all(model: &StackModel, frequencies: &[f64]) -> Vec<Result<Coefficients>> {
    frequencies.iter().map(|&f| model.solve_bin(f)).collect()
}

/// Solve every frequency bin of a prepared stack.
///
/// Bins are independent and may run in parallel. Results keep the order of
/// `frequencies`; if any bin is singular the lowest-indexed failure is
/// returned and no partial result is produced. Frequencies that are not
/// finite and positive are rejected before any bin is solved.
pub fn sweep(model: &StackModel, frequencies: &[f64]) -> Result<SimulationResult> {
    frequencies.iter().try_for_each(|&f| check_frequency(f))?;
    let coefficients = solve_all(model, frequencies)
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let mut result = SimulationResult {
        frequency_hz: frequencies.to_vec(),
        transmission_loss_db: Vec::with_capacity(frequencies.len()),
        absorption_coefficient: Vec::with_capacity(frequencies.len()),
        complex_transmission: Vec::with_capacity(frequencies.len()),
        reflection: Vec::with_capacity(frequencies.len()),
    };

    for (&f, c) in frequencies.iter().zip(&coefficients) {
        if c.is_fully_reflecting() {
            warn!(
                frequency_hz = f,
                "transmission denominator vanished, treating bin as fully reflecting"
            );
        }
        result.transmission_loss_db.push(c.transmission_loss());
        result.absorption_coefficient.push(c.absorption());
        result.complex_transmission.push(c.transmission);
        result.reflection.push(c.reflection);
    }

    Ok(result)
}

/// Transmission loss of a single bin, mainly for spot checks.
pub fn transmission_at(model: &StackModel, frequency_hz: f64) -> Result<(f64, Complex64)> {
    let c = model.solve_bin(frequency_hz)?;
    Ok((c.transmission_loss(), c.transmission))
}
