//! Greedy allocation of a requested quantity across a customer's contracts.
//!
//! Exercise and renewal share the same fold and differ only in the order contracts are
//! consumed, which is captured by [`ContractOrdering`].

use crate::types::contracts::{executed_quantity, Contract, Contracts, ExecutedToday};
use std::cmp::Ordering;
use tracing::debug;

/// Trait for the priority in which contracts are consumed by an allocation.
pub trait ContractOrdering {
    /// Compares two contracts, the one ordered first is consumed first.
    fn compare(a: &Contract, b: &Contract) -> Ordering;
}

/// Exercise priority: interest rate descending, trade date ascending, remaining quantity
/// ascending, then contract id ascending.
pub struct ExercisePriority;

impl ContractOrdering for ExercisePriority {
    fn compare(a: &Contract, b: &Contract) -> Ordering {
        b.interest_rate
            .cmp(&a.interest_rate)
            .then_with(|| a.trade_date.cmp(&b.trade_date))
            .then_with(|| a.remaining_quantity.cmp(&b.remaining_quantity))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Renewal priority: oldest trade first, then contract id ascending.
pub struct RenewalPriority;

impl ContractOrdering for RenewalPriority {
    fn compare(a: &Contract, b: &Contract) -> Ordering {
        a.trade_date
            .cmp(&b.trade_date)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Trait for contract collections that can be put in allocation order.
pub trait SortableContracts {
    /// Sorts the contracts by the given priority.
    ///
    /// # Arguments
    ///
    /// * `self` - The contracts being sorted.
    fn sort_contracts<O: ContractOrdering>(&mut self);
}

impl SortableContracts for Contracts {
    fn sort_contracts<O: ContractOrdering>(&mut self) {
        self.sort_by(O::compare);
    }
}

/// How many lots of a contract an allocation may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The stored remaining quantity. Today's executions are reported but not deducted.
    Remaining,
    /// The remaining quantity minus what was executed today, floored at 0.
    NetOfExecutedToday,
}

impl Availability {
    /// Lots of `contract` this rule lets an allocation take.
    pub fn of(&self, contract: &Contract, executed_today: &ExecutedToday) -> u64 {
        match self {
            Availability::Remaining => contract.remaining_quantity,
            Availability::NetOfExecutedToday => contract.available_quantity(executed_today),
        }
    }
}

/// One contract's share of an allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationLeg {
    pub contract: Contract,
    /// Lots of this contract already executed today.
    pub executed_today: u64,
    /// Lots available before this allocation.
    pub available: u64,
    /// Lots taken by this allocation, always positive.
    pub allocated: u64,
}

impl AllocationLeg {
    /// Lots left on the contract once this allocation is executed.
    pub fn remaining_after(&self) -> u64 {
        self.available.saturating_sub(self.allocated)
    }
}

/// The legs of an allocation plus the unfilled part of the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegPlan {
    pub legs: Vec<AllocationLeg>,
    pub shortfall: u64,
}

/// Allocates `requested` lots across `contracts` in the order given by `O`.
///
/// Each contract takes `min(still requested, available)` where available follows
/// `availability`. Contracts that end up with nothing are left out.
///
/// # Arguments
///
/// * `requested` - Lots to allocate.
/// * `contracts` - Candidate contracts, in any order.
/// * `executed_today` - The same-day execution feed snapshot.
/// * `availability` - Whether today's executions reduce what a contract can give.
///
/// # Returns
///
/// The allocation legs in consumption order and the shortfall.
pub fn allocate_legs<O: ContractOrdering>(
    requested: u64,
    contracts: &[Contract],
    executed_today: &ExecutedToday,
    availability: Availability,
) -> LegPlan {
    let mut ordered: Contracts = contracts.to_vec();
    ordered.sort_contracts::<O>();

    let (legs, shortfall) = ordered.into_iter().fold(
        (Vec::new(), requested),
        |(mut legs, outstanding): (Vec<AllocationLeg>, u64), contract: Contract| {
            if outstanding == 0 {
                return (legs, outstanding);
            }
            let executed: u64 = executed_quantity(executed_today, &contract.id);
            let available: u64 = availability.of(&contract, executed_today);
            let allocated: u64 = outstanding.min(available);
            if allocated == 0 {
                return (legs, outstanding);
            }

            debug!(
                contract_id = %contract.id,
                available,
                allocated,
                outstanding = outstanding - allocated,
                "allocated contract"
            );
            legs.push(AllocationLeg {
                contract,
                executed_today: executed,
                available,
                allocated,
            });
            (legs, outstanding - allocated)
        },
    );

    LegPlan { legs, shortfall }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::contracts::tests::{contract, random_contract};
    use rust_decimal_macros::dec;

    #[test]
    fn test_exercise_priority_sort() {
        let mut contracts: Contracts = vec![
            contract("P1", dec!(5), "2024-01-01", 10),
            contract("P2", dec!(5), "2023-01-01", 10),
            contract("P3", dec!(3), "2024-06-01", 10),
        ];
        contracts.sort_contracts::<ExercisePriority>();
        assert_eq!(ids(&contracts), vec!["P2", "P1", "P3"]);
    }

    #[test]
    fn test_exercise_priority_tiebreaks() {
        let mut contracts: Contracts = vec![
            contract("P4", dec!(5), "2023-01-01", 30),
            contract("P2", dec!(5), "2023-01-01", 10),
            contract("P1", dec!(5), "2023-01-01", 10),
        ];
        contracts.sort_contracts::<ExercisePriority>();
        assert_eq!(ids(&contracts), vec!["P1", "P2", "P4"]);
    }

    #[test]
    fn test_renewal_priority_sort() {
        let mut contracts: Contracts = vec![
            contract("P1", dec!(1), "2024-01-01", 10),
            contract("P2", dec!(9), "2023-01-01", 10),
            contract("P0", dec!(5), "2024-01-01", 10),
        ];
        contracts.sort_contracts::<RenewalPriority>();
        assert_eq!(ids(&contracts), vec!["P2", "P0", "P1"]);
    }

    #[test]
    fn test_allocate_legs_skips_exhausted_contracts() {
        let contracts: Contracts = vec![
            contract("P1", dec!(5), "2023-01-01", 20),
            contract("P2", dec!(4), "2023-01-01", 20),
        ];
        let executed_today: ExecutedToday = ExecutedToday::from([("P1".to_string(), 20)]);

        let plan: LegPlan = allocate_legs::<ExercisePriority>(
            15,
            &contracts,
            &executed_today,
            Availability::NetOfExecutedToday,
        );
        assert_eq!(plan.legs.len(), 1);
        assert_eq!(plan.legs[0].contract.id, "P2");
        assert_eq!(plan.legs[0].allocated, 15);
        assert_eq!(plan.legs[0].remaining_after(), 5);
        assert_eq!(plan.shortfall, 0);
    }

    #[test]
    fn test_allocate_legs_against_remaining_ignores_executions() {
        let contracts: Contracts = vec![
            contract("P1", dec!(5), "2023-01-01", 20),
            contract("P2", dec!(4), "2023-01-01", 20),
        ];
        let executed_today: ExecutedToday = ExecutedToday::from([("P1".to_string(), 20)]);

        let plan: LegPlan = allocate_legs::<ExercisePriority>(
            15,
            &contracts,
            &executed_today,
            Availability::Remaining,
        );
        assert_eq!(plan.legs.len(), 1);
        assert_eq!(plan.legs[0].contract.id, "P1");
        assert_eq!(plan.legs[0].executed_today, 20);
        assert_eq!(plan.legs[0].available, 20);
        assert_eq!(plan.legs[0].allocated, 15);
        assert_eq!(plan.legs[0].remaining_after(), 5);
        assert_eq!(plan.shortfall, 0);
    }

    #[test]
    fn test_allocate_legs_random_invariants() {
        for _ in 0..100 {
            let contracts: Contracts = (0..1 + rand::random::<usize>() % 8)
                .map(|index: usize| {
                    let mut random: Contract = random_contract();
                    random.id = format!("P{index}");
                    random
                })
                .collect();
            let executed_today: ExecutedToday = contracts
                .iter()
                .filter(|_| rand::random::<bool>())
                .map(|c: &Contract| (c.id.clone(), rand::random::<u64>() % 150))
                .collect();
            let requested: u64 = 1 + rand::random::<u64>() % 1_000;

            let availability: Availability = if rand::random::<bool>() {
                Availability::Remaining
            } else {
                Availability::NetOfExecutedToday
            };

            let plan: LegPlan = allocate_legs::<ExercisePriority>(
                requested,
                &contracts,
                &executed_today,
                availability,
            );

            let allocated: u64 = plan.legs.iter().map(|leg: &AllocationLeg| leg.allocated).sum();
            let available: u64 = contracts
                .iter()
                .map(|c: &Contract| availability.of(c, &executed_today))
                .sum();
            assert_eq!(allocated + plan.shortfall, requested);
            assert_eq!(allocated, requested.min(available));
            for leg in &plan.legs {
                assert!(leg.allocated > 0);
                assert!(leg.allocated <= leg.contract.remaining_quantity);
                assert!(leg.allocated <= leg.available);
            }
        }
    }

    // HELPER FUNCTIONS
    fn ids(contracts: &Contracts) -> Vec<&str> {
        contracts.iter().map(|c: &Contract| c.id.as_str()).collect()
    }
}
