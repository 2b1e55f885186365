//! Breakeven traffic estimate from blended EPC.

use serde::Serialize;

/// Visitors needed for revenue at `blended_epc` to cover `total_cost`.
///
/// Returns `None` when no visitor earns anything (`blended_epc <= 0` or not
/// finite) or when `total_cost` is not finite. This is a single-ratio estimate: it assumes the revenue mix stays
/// the same at any traffic level, which holds for rate-based propagation.
pub fn breakeven(total_cost: f64, blended_epc: f64) -> Option<u64> {
    if !(blended_epc.is_finite() && blended_epc > 0.0) || !total_cost.is_finite() {
        return None;
    }
    if !(total_cost > 0.0) {
        return Some(0);
    }
    let visitors = (total_cost / blended_epc).ceil();
    // Saturating cast: absurd ratios clamp to u64::MAX.
    visitors.is_finite().then_some(visitors as u64)
}

/// Where actual traffic sits relative to the breakeven estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakevenStatus {
    Above,
    AtBreakeven,
    Below,
    /// No revenue-generating path exists.
    Unreachable,
}

pub fn breakeven_status(actual_traffic: u64, visitors_required: Option<u64>) -> BreakevenStatus {
    match visitors_required {
        None => BreakevenStatus::Unreachable,
        Some(required) if actual_traffic > required => BreakevenStatus::Above,
        Some(required) if actual_traffic == required => BreakevenStatus::AtBreakeven,
        Some(_) => BreakevenStatus::Below,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(300.0, 16.0, Some(19))]
    #[case(320.0, 16.0, Some(20))]
    #[case(0.0, 16.0, Some(0))]
    #[case(1.0, 1000.0, Some(1))]
    #[case(300.0, 0.0, None)]
    #[case(300.0, -5.0, None)]
    #[case(0.0, 0.0, None)]
    #[case(300.0, f64::NAN, None)]
    #[case(f64::NAN, 16.0, None)]
    #[case(f64::INFINITY, 16.0, None)]
    fn test_breakeven(#[case] cost: f64, #[case] epc: f64, #[case] expected: Option<u64>) {
        assert_eq!(breakeven(cost, epc), expected);
    }

    #[test]
    fn test_non_positive_epc_has_no_breakeven_for_any_cost() {
        for cost in [0.0, 0.01, 1.0, 300.0, 1e12] {
            assert_eq!(breakeven(cost, 0.0), None);
            assert_eq!(breakeven(cost, -5.0), None);
        }
    }

    #[rstest]
    #[case(1000, Some(19), BreakevenStatus::Above)]
    #[case(19, Some(19), BreakevenStatus::AtBreakeven)]
    #[case(10, Some(19), BreakevenStatus::Below)]
    #[case(1000, None, BreakevenStatus::Unreachable)]
    fn test_status(#[case] actual: u64, #[case] required: Option<u64>, #[case] expected: BreakevenStatus) {
        assert_eq!(breakeven_status(actual, required), expected);
    }
}
