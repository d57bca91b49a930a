use serde::Serialize;
use std::fmt;

use crate::workflows::testament::domain::Beneficiary;

const PERCENTAGE_TOLERANCE: f64 = 0.01;
const FORCED_HEIR_MINIMUM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionViolation {
    PercentagesDoNotSumTo100 { total: f64 },
    ForcedHeirsBelowMinimum { total: f64 },
}

impl fmt::Display for DistributionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PercentagesDoNotSumTo100 { .. } => {
                f.write_str("La suma de porcentajes debe ser 100%")
            }
            Self::ForcedHeirsBelowMinimum { .. } => {
                f.write_str("Los herederos forzosos deben recibir al menos el 50% de la herencia")
            }
        }
    }
}

/// Advisory outcome; callers decide whether violations block anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionReview {
    pub violations: Vec<DistributionViolation>,
}

impl DistributionReview {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

pub fn review_distribution(beneficiaries: &[Beneficiary]) -> DistributionReview {
    let mut violations = Vec::new();

    let total: f64 = beneficiaries.iter().map(|b| b.percentage).sum();
    if (total - 100.0).abs() > PERCENTAGE_TOLERANCE {
        violations.push(DistributionViolation::PercentagesDoNotSumTo100 { total });
    }

    // Only checked when at least one forced heir exists.
    let mut forced = beneficiaries.iter().filter(|b| b.forced_heir).peekable();
    if forced.peek().is_some() {
        let forced_total: f64 = forced.map(|b| b.percentage).sum();
        if forced_total < FORCED_HEIR_MINIMUM {
            violations.push(DistributionViolation::ForcedHeirsBelowMinimum {
                total: forced_total,
            });
        }
    }

    DistributionReview { violations }
}
