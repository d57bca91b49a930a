//! Statutory 50/50 estate split between forced heirs and free disposal.

mod policy;

pub use policy::{review_distribution, DistributionReview, DistributionViolation};

use serde::Serialize;
use std::fmt;
use tracing::warn;

use super::domain::Beneficiary;

pub const LEGITIME_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstatePool {
    Legitime,
    FreeDisposal,
}

impl EstatePool {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Legitime => "legítima",
            Self::FreeDisposal => "libre disposición",
        }
    }

    fn of(beneficiary: &Beneficiary) -> Self {
        if beneficiary.forced_heir {
            Self::Legitime
        } else {
            Self::FreeDisposal
        }
    }
}

impl fmt::Display for EstatePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeneficiaryShare {
    pub name: String,
    pub pool: EstatePool,
    pub percentage: f64,
    pub amount: u64,
}

/// Pool that no beneficiary claims. Kept visible instead of being reassigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnclaimedPool {
    pub pool: EstatePool,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionResult {
    pub total_estate_value: f64,
    pub legitime_share: u64,
    pub free_disposal_share: u64,
    pub shares: Vec<BeneficiaryShare>,
    pub unclaimed: Vec<UnclaimedPool>,
}

impl DistributionResult {
    pub fn allocated(&self) -> u64 {
        self.shares.iter().map(|share| share.amount).sum()
    }

    pub fn unclaimed_total(&self) -> u64 {
        self.unclaimed.iter().map(|pool| pool.amount).sum()
    }

    pub fn share_for(&self, name: &str) -> Option<&BeneficiaryShare> {
        self.shares.iter().find(|share| share.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("el valor total de los bienes debe ser un número no negativo (recibido {0})")]
    InvalidEstateValue(f64),
}

/// Splits `total_estate_value` in half and renormalizes each beneficiary's
/// percentage within its own category.
pub fn calculate_distribution(
    beneficiaries: &[Beneficiary],
    total_estate_value: f64,
) -> Result<DistributionResult, DistributionError> {
    if !total_estate_value.is_finite() || total_estate_value < 0.0 {
        return Err(DistributionError::InvalidEstateValue(total_estate_value));
    }

    let legitime = total_estate_value * LEGITIME_FRACTION;
    let free_disposal = total_estate_value - legitime;

    let category_total = |pool: EstatePool| -> f64 {
        beneficiaries
            .iter()
            .filter(|b| EstatePool::of(b) == pool)
            .map(|b| b.percentage)
            .sum()
    };
    let forced_total = category_total(EstatePool::Legitime);
    let free_total = category_total(EstatePool::FreeDisposal);

    let shares = beneficiaries
        .iter()
        .map(|beneficiary| {
            let pool = EstatePool::of(beneficiary);
            let (pool_value, category_total) = match pool {
                EstatePool::Legitime => (legitime, forced_total),
                EstatePool::FreeDisposal => (free_disposal, free_total),
            };
            let amount = if category_total > 0.0 {
                (pool_value * beneficiary.percentage / category_total).round() as u64
            } else {
                0
            };
            BeneficiaryShare {
                name: beneficiary.name.clone(),
                pool,
                percentage: beneficiary.percentage,
                amount,
            }
        })
        .collect();

    let mut unclaimed = Vec::new();
    for (pool, pool_value, category_total) in [
        (EstatePool::Legitime, legitime, forced_total),
        (EstatePool::FreeDisposal, free_disposal, free_total),
    ] {
        if category_total <= 0.0 && pool_value > 0.0 {
            let amount = pool_value.round() as u64;
            warn!(pool = %pool, amount, "estate pool left without beneficiaries");
            unclaimed.push(UnclaimedPool { pool, amount });
        }
    }

    Ok(DistributionResult {
        total_estate_value,
        legitime_share: legitime.round() as u64,
        free_disposal_share: free_disposal.round() as u64,
        shares,
        unclaimed,
    })
}
