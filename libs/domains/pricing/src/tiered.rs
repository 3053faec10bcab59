//! Volume-tiered cost calculation.

use crate::models::Tier;

/// Cost of `quantity` units billed across ascending tier bands.
///
/// Each band bills the slice of quantity between the previous band's upper
/// bound and its own, so a quantity sitting exactly on a boundary stays in
/// the lower band. Non-positive or NaN quantities and an empty table cost 0.
/// Quantity beyond the last bound is not billed; tables end with an
/// unbounded band.
pub fn tiered_cost(quantity: f64, tiers: &[Tier]) -> f64 {
    if quantity.is_nan() || quantity <= 0.0 || tiers.is_empty() {
        return 0.0;
    }

    let mut cost = 0.0;
    let mut floor = 0.0;
    for tier in tiers {
        let billable = (tier.upper_bound.min(quantity) - floor).max(0.0);
        cost += billable * tier.rate;
        floor = tier.upper_bound;
        if floor >= quantity {
            break;
        }
    }
    cost
}
