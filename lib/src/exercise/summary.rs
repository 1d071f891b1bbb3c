use rust_decimal::Decimal;
use serde::Serialize;

use super::{Allocation, ExerciseResult, Warning};

/// Totals of an exercise, as shown to the desk before the exercise is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExerciseSummary {
    /// Number of contracts touched.
    pub contracts: usize,
    /// Number of contracts exercised down to zero.
    pub closed_contracts: usize,
    pub allocated_quantity: u64,
    pub settlement_amount: Decimal,
    pub sale_amount: Decimal,
    pub shortfall: u64,
    /// Contracts whose exercise price is at or above the reference price.
    pub inverted_contract_ids: Vec<String>,
    pub requires_approval: bool,
}

impl ExerciseSummary {
    /// Builds the summary of an exercise result.
    ///
    /// # Arguments
    ///
    /// * `result` - The exercise result to summarise.
    pub fn from_result(result: &ExerciseResult) -> Self {
        let mut summary: ExerciseSummary = result.allocations.iter().fold(
            ExerciseSummary::default(),
            |mut summary: ExerciseSummary, allocation: &Allocation| {
                summary.update_from_allocation(allocation);
                summary
            },
        );
        summary.shortfall = result.shortfall;
        result.warnings.iter().for_each(|warning: &Warning| {
            if let Warning::PriceInversion { contract_id, .. } = warning {
                summary.update_inverted_contracts(contract_id);
            }
        });
        summary
    }

    /// Adds an allocation to the totals.
    ///
    /// # Arguments
    ///
    /// * `self` - The summary to be updated.
    /// * `allocation` - The allocation being added.
    pub fn update_from_allocation(&mut self, allocation: &Allocation) {
        self.contracts += 1;
        if allocation.closed {
            self.closed_contracts += 1;
        }
        self.allocated_quantity = self.allocated_quantity.saturating_add(allocation.quantity);
        self.settlement_amount += allocation.settlement_amount;
        self.sale_amount += allocation.sale_amount;
    }

    /// Records a contract that needs approval.
    ///
    /// # Arguments
    ///
    /// * `self` - The summary to be updated.
    /// * `contract_id` - The contract whose exercise price is inverted.
    pub fn update_inverted_contracts(&mut self, contract_id: &str) {
        self.inverted_contract_ids.push(contract_id.to_string());
        self.requires_approval = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::exercise::{allocate_exercise, tests::request, ExerciseRequest, ExerciseResult};
    use crate::types::contracts::{tests::contract, Contracts, ExecutedToday};
    use rust_decimal_macros::dec;

    use super::ExerciseSummary;

    #[test]
    fn test_summary_totals() {
        let contracts: Contracts = vec![
            contract("A", dec!(5), "2023-01-01", 10),
            contract("B", dec!(1), "2023-01-01", 10),
        ];
        let mut exercise: ExerciseRequest = request(25);
        exercise.reference_price = dec!(100);
        let result: ExerciseResult =
            allocate_exercise(&exercise, &contracts, &ExecutedToday::new()).unwrap();

        let summary: ExerciseSummary = result.summary();
        assert_eq!(summary.contracts, 2);
        assert_eq!(summary.closed_contracts, 2);
        assert_eq!(summary.allocated_quantity, 20);
        assert_eq!(summary.shortfall, 5);
        // A: 10 * 3.5 * 1000, B: 10 * -0.5 * 1000
        assert_eq!(summary.settlement_amount, dec!(30000));
        // A: 96.5 * 10 * 1000, B: 100.5 * 10 * 1000
        assert_eq!(summary.sale_amount, dec!(1970000));
        assert_eq!(summary.inverted_contract_ids, vec!["B".to_string()]);
        assert!(summary.requires_approval);
    }

    #[test]
    fn test_empty_summary() {
        let result: ExerciseResult = ExerciseResult {
            allocations: vec![],
            shortfall: 0,
            warnings: vec![],
        };
        assert_eq!(result.summary(), ExerciseSummary::default());
    }
}
