/// Budget what-if analysis over an assembled result.
/// All functions are pure -- they take a result and return computed values.
use crate::errors::{AppResult, MmmError};
use crate::mmm::saturation::hill_fraction;
use crate::mmm::types::{round_to, MmmResult, SimulationResult};
use std::collections::BTreeMap;

/// Score given to an unchanged allocation.
const BASELINE_SCORE: f64 = 65.0;
/// Score points per million of revenue gained.
const SCORE_PER_MILLION: f64 = 2.0;
/// Optimized allocations are rounded to this increment.
const ALLOCATION_INCREMENT: f64 = 100_000.0;

/// Project revenue for a new spend allocation.
///
/// Each channel's contribution scales by hill(new) / hill(current). Channels
/// missing from `budgets` keep their current spend.
pub fn simulate(result: &MmmResult, budgets: &BTreeMap<String, f64>) -> AppResult<SimulationResult> {
    for (name, spend) in budgets {
        if !result.channels.iter().any(|c| &c.name == name) {
            return Err(MmmError::InvalidInput(format!("unknown channel: {name}")));
        }
        if !spend.is_finite() || *spend < 0.0 {
            return Err(MmmError::InvalidInput(format!("{name}: spend must be a non-negative number, got {spend}")));
        }
    }

    let mut projected_incremental = 0.0;
    let mut new_total_spend = 0.0;
    for ch in &result.channels {
        let new_spend = budgets.get(&ch.name).copied().unwrap_or(ch.spend);
        new_total_spend += new_spend;

        let projected = match result.curve_for(&ch.name) {
            Some(curve) => {
                let current = hill_fraction(curve, ch.spend);
                if current > 0.0 {
                    ch.contribution * hill_fraction(curve, new_spend) / current
                } else {
                    // No current spend: fall back to the marginal return
                    new_spend * ch.mroas
                }
            }
            None => ch.contribution + (new_spend - ch.spend) * ch.mroas,
        };
        projected_incremental += projected.max(0.0);
    }

    let base_sales = result.kpis.base_sales;
    let current_revenue = base_sales + result.kpis.total_incremental_revenue;
    let projected_revenue = base_sales + projected_incremental;
    let revenue_vs_current = projected_revenue - current_revenue;
    let blended_roas = if new_total_spend > 0.0 {
        projected_incremental / new_total_spend
    } else {
        0.0
    };
    let optimization_score = (BASELINE_SCORE + revenue_vs_current / 1_000_000.0 * SCORE_PER_MILLION)
        .clamp(0.0, 100.0)
        .round() as i32;

    Ok(SimulationResult {
        projected_revenue: round_to(projected_revenue, 2),
        revenue_vs_current: round_to(revenue_vs_current, 2),
        blended_roas: round_to(blended_roas, 4),
        optimization_score,
    })
}

/// Split `max_budget` across channels in proportion to mROAS, capped at each
/// channel's saturation capacity and rounded to the nearest 100k.
pub fn optimize_allocation(result: &MmmResult, max_budget: f64) -> AppResult<BTreeMap<String, f64>> {
    if !max_budget.is_finite() || max_budget <= 0.0 {
        return Err(MmmError::InvalidInput(format!("budget must be positive, got {max_budget}")));
    }
    let total_mroas: f64 = result.channels.iter().map(|c| c.mroas).sum();
    if total_mroas <= 0.0 {
        return Err(MmmError::InvalidInput("no channel has a positive mROAS".into()));
    }

    let allocation = result
        .channels
        .iter()
        .map(|ch| {
            let weight = ch.mroas / total_mroas;
            let cap = result
                .curve_for(&ch.name)
                .map(|c| c.max_capacity)
                .unwrap_or(ch.spend * 2.0);
            let spend = (weight * max_budget).min(cap);
            let rounded = (spend / ALLOCATION_INCREMENT).round() * ALLOCATION_INCREMENT;
            (ch.name.clone(), rounded)
        })
        .collect();

    Ok(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmm::assembler::ResultAssembler;
    use crate::mmm::types::ScenarioTier;

    fn high() -> MmmResult {
        ResultAssembler::default().assemble(ScenarioTier::High).unwrap()
    }

    #[test]
    fn test_unchanged_allocation_is_neutral() {
        let r = high();
        let sim = simulate(&r, &BTreeMap::new()).unwrap();
        assert!(sim.revenue_vs_current.abs() < 1e-3, "delta {}", sim.revenue_vs_current);
        assert_eq!(sim.optimization_score, 65);
        assert!((sim.projected_revenue - 220_500_000.0).abs() < 1e-3);
        assert!((sim.blended_roas - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_more_spend_more_revenue_diminishing() {
        let r = high();
        let mut budgets = BTreeMap::new();
        budgets.insert("TikTok".to_string(), 7_000_000.0);
        let sim = simulate(&r, &budgets).unwrap();
        assert!(sim.revenue_vs_current > 0.0);
        // Doubling spend cannot double the contribution on a saturating curve
        assert!(sim.revenue_vs_current < 5_100_000.0, "gain {}", sim.revenue_vs_current);
        assert!(sim.optimization_score > 65);
    }

    #[test]
    fn test_cutting_spend_loses_revenue() {
        let r = high();
        let mut budgets = BTreeMap::new();
        budgets.insert("Linear TV".to_string(), 0.0);
        let sim = simulate(&r, &budgets).unwrap();
        assert!((sim.revenue_vs_current + 9_200_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_bad_budgets() {
        let r = high();
        let mut unknown = BTreeMap::new();
        unknown.insert("Radio".to_string(), 1.0);
        assert!(matches!(simulate(&r, &unknown), Err(MmmError::InvalidInput(_))));

        let mut negative = BTreeMap::new();
        negative.insert("TikTok".to_string(), -1.0);
        assert!(matches!(simulate(&r, &negative), Err(MmmError::InvalidInput(_))));
    }

    #[test]
    fn test_score_clamped() {
        let r = high();
        let budgets: BTreeMap<String, f64> = r.channels.iter().map(|c| (c.name.clone(), 0.0)).collect();
        let sim = simulate(&r, &budgets).unwrap();
        assert_eq!(sim.optimization_score, 0);
        assert_eq!(sim.blended_roas, 0.0);
    }

    #[test]
    fn test_optimize_allocation() {
        let r = high();
        let alloc = optimize_allocation(&r, r.total_budget).unwrap();
        assert_eq!(alloc.len(), 8);
        for (name, spend) in &alloc {
            let cap = r.curve_for(name).unwrap().max_capacity;
            assert!(*spend <= cap, "{name}: {spend} over cap {cap}");
            assert_eq!(spend % 100_000.0, 0.0, "{name}: {spend} not rounded");
        }
        // Highest mROAS channel gets the largest share
        assert!(alloc["TikTok"] > alloc["Programmatic Display"]);
        assert!(optimize_allocation(&r, 0.0).is_err());
    }
}
