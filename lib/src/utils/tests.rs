use super::*;
use crate::types::contracts::tests::date;
use rust_decimal_macros::dec;

#[test]
fn test_round_half_up() {
    // Midpoints move away from zero, not to the even neighbour
    assert_eq!(round_half_up(dec!(0.125), 2), dec!(0.13));
    assert_eq!(round_half_up(dec!(0.135), 2), dec!(0.14));
    assert_eq!(round_half_up(dec!(-0.125), 2), dec!(-0.13));
    assert_eq!(round_half_up(dec!(2.5), 0), dec!(3));
    assert_eq!(round_half_up(dec!(-2.5), 0), dec!(-3));
    // Non-midpoints round to nearest
    assert_eq!(round_half_up(dec!(1.2649), 2), dec!(1.26));
    assert_eq!(round_half_up(dec!(-3.65), 2), dec!(-3.65));
}

#[test]
fn test_tenor_years_counts_both_ends() {
    // 364 days apart plus the settlement day is exactly one year
    assert_eq!(tenor_years(date("2025-06-30"), date("2024-07-01")), dec!(1));
    // Same day counts as one day
    assert_eq!(
        tenor_years(date("2024-07-01"), date("2024-07-01")),
        Decimal::ONE / dec!(365)
    );
    // Settlement the day after sellback nets to zero
    assert_eq!(tenor_years(date("2024-07-01"), date("2024-07-02")), dec!(0));
    assert!(tenor_years(date("2024-07-01"), date("2024-07-10")) < Decimal::ZERO);
}

#[test]
fn test_clamped_tenor_years() {
    assert_eq!(
        clamped_tenor_years(date("2025-06-30"), date("2024-07-01")),
        (dec!(1), false)
    );
    assert_eq!(
        clamped_tenor_years(date("2024-07-01"), date("2024-07-02")),
        (dec!(0), false)
    );
    assert_eq!(
        clamped_tenor_years(date("2024-07-01"), date("2024-07-10")),
        (dec!(0), true)
    );
}

#[test]
fn test_exercise_price() {
    // 102 - 100 * 1 * 3 / 100
    assert_eq!(exercise_price(dec!(102), dec!(1), dec!(3)), dec!(99));
    // 101.5 - 100 * 0.5 * 2.25 / 100 = 100.375 -> 100.38
    assert_eq!(exercise_price(dec!(101.5), dec!(0.5), dec!(2.25)), dec!(100.38));
    // Zero tenor leaves the sellback price untouched
    assert_eq!(exercise_price(dec!(104.25), dec!(0), dec!(5)), dec!(104.25));
}

#[test]
fn test_lots_amount() {
    assert_eq!(lots_amount(3, dec!(105.5)), dec!(316500));
    assert_eq!(lots_amount(10, dec!(-0.25)), dec!(-2500));
    assert_eq!(lots_amount(0, dec!(99.99)), dec!(0));
}
