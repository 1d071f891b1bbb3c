//! Business-day arithmetic over weekends and an externally supplied holiday set.

use crate::types::HolidaySet;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// Returns true if the date is neither a weekend day nor a holiday.
///
/// # Arguments
///
/// * `date` - The date to check.
/// * `holidays` - The dates on which no settlement can happen.
pub fn is_business_day(date: NaiveDate, holidays: &HolidaySet) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&date)
}

/// Computes the `days`-th business day after `start`.
///
/// Steps forward one calendar day at a time, counting only days that are business days. The
/// start date itself is never counted, whatever kind of day it is. `days = 0` returns `start`.
///
/// # Arguments
///
/// * `start` - The date to count from.
/// * `days` - Number of business days to pass.
/// * `holidays` - The dates on which no settlement can happen.
pub fn next_business_day(start: NaiveDate, days: u32, holidays: &HolidaySet) -> NaiveDate {
    step_business_days(start, days, holidays, |date: NaiveDate| date + Days::new(1))
}

/// Computes the `days`-th business day before `start`. Mirror of [`next_business_day`].
///
/// # Arguments
///
/// * `start` - The date to count from.
/// * `days` - Number of business days to pass.
/// * `holidays` - The dates on which no settlement can happen.
pub fn prev_business_day(start: NaiveDate, days: u32, holidays: &HolidaySet) -> NaiveDate {
    step_business_days(start, days, holidays, |date: NaiveDate| date - Days::new(1))
}

fn step_business_days<F>(start: NaiveDate, days: u32, holidays: &HolidaySet, step: F) -> NaiveDate
where
    F: Fn(NaiveDate) -> NaiveDate,
{
    let mut current: NaiveDate = start;
    let mut passed: u32 = 0;
    while passed < days {
        current = step(current);
        if is_business_day(current, holidays) {
            passed += 1;
        }
    }
    current
}

/// Counts the business days separating a trade date from its settlement date, the `n` of the
/// `T+n` label printed on settlement documents.
///
/// Advances one business day at a time from `start` until `end` is reached or passed. Returns
/// zero when `end` is not after `start`.
///
/// # Arguments
///
/// * `start` - The trade date.
/// * `end` - The settlement date.
/// * `holidays` - The dates on which no settlement can happen.
pub fn business_days_between(start: NaiveDate, end: NaiveDate, holidays: &HolidaySet) -> u32 {
    let mut current: NaiveDate = start;
    let mut count: u32 = 0;
    while current < end {
        current = next_business_day(current, 1, holidays);
        count += 1;
    }
    count
}

/// Adds calendar months to a date, clamping to the last day of the target month
/// (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year).
///
/// # Arguments
///
/// * `date` - The date to shift.
/// * `months` - Number of calendar months to add.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Formats the business-day distance as the `T+n` label.
pub fn settlement_label(
    trade_date: NaiveDate,
    settlement_date: NaiveDate,
    holidays: &HolidaySet,
) -> String {
    format!(
        "T+{}",
        business_days_between(trade_date, settlement_date, holidays)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::contracts::tests::date;

    #[test]
    fn test_next_business_day_skips_weekend() {
        let holidays: HolidaySet = HolidaySet::new();
        // Thursday + 2 = Monday
        assert_eq!(
            next_business_day(date("2024-06-27"), 2, &holidays),
            date("2024-07-01")
        );
        // Friday + 1 = Monday
        assert_eq!(
            next_business_day(date("2024-06-28"), 1, &holidays),
            date("2024-07-01")
        );
    }

    #[test]
    fn test_next_business_day_skips_holidays() {
        let holidays: HolidaySet = HolidaySet::from([date("2024-07-01"), date("2024-07-02")]);
        assert_eq!(
            next_business_day(date("2024-06-27"), 2, &holidays),
            date("2024-07-03")
        );
    }

    #[test]
    fn test_zero_days_is_no_op() {
        let holidays: HolidaySet = HolidaySet::from([date("2024-06-29")]);
        // Even a holiday/weekend start date is returned unchanged
        assert_eq!(
            next_business_day(date("2024-06-29"), 0, &holidays),
            date("2024-06-29")
        );
        assert_eq!(
            prev_business_day(date("2024-06-29"), 0, &holidays),
            date("2024-06-29")
        );
    }

    #[test]
    fn test_non_business_start_is_not_counted() {
        let holidays: HolidaySet = HolidaySet::new();
        // Saturday + 1 = Monday, the Saturday itself and the Sunday do not count
        assert_eq!(
            next_business_day(date("2024-06-29"), 1, &holidays),
            date("2024-07-01")
        );
        // Sunday - 1 = Friday
        assert_eq!(
            prev_business_day(date("2024-06-30"), 1, &holidays),
            date("2024-06-28")
        );
    }

    #[test]
    fn test_prev_business_day_skips_holidays() {
        let holidays: HolidaySet = HolidaySet::from([date("2024-06-28")]);
        // Monday - 1 skips the weekend and the Friday holiday
        assert_eq!(
            prev_business_day(date("2024-07-01"), 1, &holidays),
            date("2024-06-27")
        );
    }

    #[test]
    fn test_next_then_prev_round_trips_on_business_days() {
        for _ in 0..200 {
            let holidays: HolidaySet = random_holidays();
            let start: NaiveDate = random_business_day(&holidays);
            let days: u32 = 1 + rand::random::<u32>() % 30;

            let forward: NaiveDate = next_business_day(start, days, &holidays);
            assert!(is_business_day(forward, &holidays));
            assert_eq!(prev_business_day(forward, days, &holidays), start);
            assert_eq!(business_days_between(start, forward, &holidays), days);
        }
    }

    #[test]
    fn test_business_days_between() {
        let holidays: HolidaySet = HolidaySet::from([date("2024-07-01")]);
        assert_eq!(
            business_days_between(date("2024-06-27"), date("2024-06-27"), &holidays),
            0
        );
        assert_eq!(
            business_days_between(date("2024-06-27"), date("2024-06-20"), &holidays),
            0
        );
        // Thu -> Fri -> Tue (Mon holiday)
        assert_eq!(
            business_days_between(date("2024-06-27"), date("2024-07-02"), &holidays),
            2
        );
        assert_eq!(
            settlement_label(date("2024-06-27"), date("2024-07-02"), &holidays),
            "T+2"
        );
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(date("2024-06-27"), 3), date("2024-09-27"));
        assert_eq!(add_months(date("2024-01-31"), 1), date("2024-02-29"));
        assert_eq!(add_months(date("2023-01-31"), 1), date("2023-02-28"));
        assert_eq!(add_months(date("2024-11-30"), 3), date("2025-02-28"));
        assert_eq!(add_months(date("2024-05-15"), 0), date("2024-05-15"));
    }

    // HELPER FUNCTIONS
    /// Creates a random set of holidays within 2024-2025.
    fn random_holidays() -> HolidaySet {
        (0..rand::random::<u64>() % 40)
            .map(|_| date("2024-01-01") + Days::new(rand::random::<u64>() % 730))
            .collect()
    }

    /// Picks a random business day in the first half of 2024.
    fn random_business_day(holidays: &HolidaySet) -> NaiveDate {
        let candidate: NaiveDate = date("2024-01-01") + Days::new(rand::random::<u64>() % 180);
        if is_business_day(candidate, holidays) {
            candidate
        } else {
            next_business_day(candidate, 1, holidays)
        }
    }
}
