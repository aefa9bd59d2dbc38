use crate::errors::{Result, SirError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// The transmission rate is the per-contact hazard with which an infected node infects a
    /// susceptible neighbor.
    pub transmission_rate: f64,

    /// The recovery rate is the hazard with which an infected node recovers.
    pub recovery_rate: f64,
}

impl std::fmt::Display for Parameters {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "beta={} gamma={}",
            self.transmission_rate, self.recovery_rate
        )
    }
}

impl Parameters {
    pub fn new(transmission_rate: f64, recovery_rate: f64) -> Self {
        Self {
            transmission_rate,
            recovery_rate,
        }
    }

    /// Check that the rates admit finite waiting times.
    ///
    /// The transmission rate has to be finite and non-negative, the recovery rate finite and
    /// strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !self.transmission_rate.is_finite() || self.transmission_rate < 0. {
            return Err(SirError::InvalidParameter(format!(
                "transmission rate must be finite and non-negative, got {}",
                self.transmission_rate
            )));
        }
        if !self.recovery_rate.is_finite() || self.recovery_rate <= 0. {
            return Err(SirError::InvalidParameter(format!(
                "recovery rate must be finite and positive, got {}",
                self.recovery_rate
            )));
        }
        Ok(())
    }
}
