use super::common::*;

use crate::workflows::testament::domain::{Beneficiary, Relationship};
use crate::workflows::testament::inheritance::{
    calculate_distribution, review_distribution, DistributionViolation, EstatePool,
};

#[test]
fn forced_heirs_split_the_legitime_and_free_disposal_stays_unclaimed() {
    let beneficiaries = vec![child("Ana", 50.0), child("Luis", 50.0)];

    let result = calculate_distribution(&beneficiaries, 100_000_000.0).expect("valid estate");

    assert_eq!(result.legitime_share, 50_000_000);
    assert_eq!(result.free_disposal_share, 50_000_000);
    assert_eq!(result.share_for("Ana").map(|s| s.amount), Some(25_000_000));
    assert_eq!(result.share_for("Luis").map(|s| s.amount), Some(25_000_000));
    assert_eq!(result.allocated(), 50_000_000);
    assert_eq!(result.unclaimed.len(), 1);
    assert_eq!(result.unclaimed[0].pool, EstatePool::FreeDisposal);
    assert_eq!(result.unclaimed_total(), 50_000_000);
}

#[test]
fn percentages_are_renormalized_within_each_category() {
    let beneficiaries = vec![
        child("Ana", 30.0),
        Beneficiary::new("Marta", "11.111.111-1", Relationship::Spouse, 30.0),
        sibling("Rosa", 25.0),
        Beneficiary::new("Fundación Las Rosas", "22.222.222-2", Relationship::Other, 15.0),
    ];

    let result = calculate_distribution(&beneficiaries, 10_000_000.0).expect("valid estate");

    assert_eq!(result.share_for("Ana").map(|s| s.amount), Some(2_500_000));
    assert_eq!(result.share_for("Marta").map(|s| s.amount), Some(2_500_000));
    assert_eq!(result.share_for("Rosa").map(|s| s.amount), Some(3_125_000));
    assert_eq!(
        result.share_for("Fundación Las Rosas").map(|s| s.amount),
        Some(1_875_000)
    );
    assert!(result.unclaimed.is_empty());
    assert_eq!(result.allocated(), 10_000_000);
}

#[test]
fn overriding_the_forced_heir_flag_moves_the_pool() {
    let mut adopted = sibling("Rosa", 100.0);
    adopted.forced_heir = true;

    let result = calculate_distribution(&[adopted], 2_000_000.0).expect("valid estate");

    let share = result.share_for("Rosa").expect("share present");
    assert_eq!(share.pool, EstatePool::Legitime);
    assert_eq!(share.amount, 1_000_000);
    assert_eq!(result.unclaimed[0].pool, EstatePool::FreeDisposal);
}

#[test]
fn review_reports_sum_and_forced_heir_violations() {
    let review = review_distribution(&[child("Ana", 40.0), sibling("Rosa", 57.0)]);

    assert!(!review.is_valid());
    assert_eq!(
        review.messages(),
        [
            "La suma de porcentajes debe ser 100%",
            "Los herederos forzosos deben recibir al menos el 50% de la herencia",
        ]
    );
    assert!(matches!(
        review.violations[0],
        DistributionViolation::PercentagesDoNotSumTo100 { total } if (total - 97.0).abs() < 1e-9
    ));
}

#[test]
fn review_tolerates_rounding_and_skips_absent_forced_heirs() {
    let thirds = [
        sibling("Rosa", 33.33),
        sibling("Pedro", 33.33),
        sibling("Inés", 33.34),
    ];
    assert!(review_distribution(&thirds).is_valid());

    let review = review_distribution(&[child("Ana", 50.0), sibling("Rosa", 50.0)]);
    assert!(review.is_valid());
}

fn beneficiary_sets() -> Vec<Vec<Beneficiary>> {
    vec![
        vec![child("Ana", 50.0), child("Luis", 50.0)],
        vec![child("Ana", 33.33), child("Luis", 33.33), child("Marta", 33.34)],
        vec![
            child("Ana", 30.0),
            Beneficiary::new("Marta", "11.111.111-1", Relationship::Spouse, 27.0),
            sibling("Rosa", 29.0),
            Beneficiary::new("Fundación Las Rosas", "22.222.222-2", Relationship::Other, 14.0),
        ],
        vec![child("Ana", 70.0), sibling("Rosa", 17.5), sibling("Pedro", 12.5)],
        vec![sibling("Rosa", 100.0)],
    ]
}

#[test]
fn amounts_and_unclaimed_pools_add_up_to_the_estate() {
    for beneficiaries in beneficiary_sets() {
        for estate in [0.0, 1.0, 999.0, 1_000_001.0, 123_456_789.0, 9_876_543_210.0] {
            let result = calculate_distribution(&beneficiaries, estate).expect("valid estate");
            let total = (result.allocated() + result.unclaimed_total()) as f64;
            assert!(
                (total - estate).abs() <= beneficiaries.len() as f64,
                "{total} vs {estate} for {} beneficiaries",
                beneficiaries.len()
            );
        }
    }
}

#[test]
fn amounts_scale_with_the_estate_value() {
    for beneficiaries in beneficiary_sets() {
        let base = calculate_distribution(&beneficiaries, 1_000_003.0).expect("valid estate");
        for factor in [2.0, 7.0, 100.0] {
            let scaled = calculate_distribution(&beneficiaries, 1_000_003.0 * factor)
                .expect("valid estate");
            for (small, large) in base.shares.iter().zip(&scaled.shares) {
                assert_eq!(small.name, large.name);
                let expected = small.amount as f64 * factor;
                assert!(
                    (large.amount as f64 - expected).abs() <= factor,
                    "{}: {} is not {factor} x {}",
                    large.name,
                    large.amount,
                    small.amount
                );
            }
        }
    }
}
