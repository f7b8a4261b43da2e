use crate::errors::{AppResult, MmmError};
use crate::mmm::catalog::{self, ScenarioConfig};
use crate::mmm::efficiency::EfficiencyThresholds;
use crate::mmm::series::{WeeklySeriesGenerator, DEFAULT_SEED};
use crate::mmm::types::*;
use std::collections::{BTreeMap, HashSet};

/// Weeks in a generated series unless configured otherwise.
pub const DEFAULT_WEEKS: usize = 52;

/// Relative tolerance for the budget/revenue sum checks.
const SUM_TOLERANCE: f64 = 1e-9;

/// Builds a complete `MmmResult` from a scenario configuration.
///
/// Holds only immutable settings; `assemble` is a pure function of its
/// arguments and can be shared freely across request handlers.
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    thresholds: EfficiencyThresholds,
    seed: u64,
    weeks: usize,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self::new(EfficiencyThresholds::default(), DEFAULT_SEED, DEFAULT_WEEKS)
    }
}

impl ResultAssembler {
    pub fn new(thresholds: EfficiencyThresholds, seed: u64, weeks: usize) -> Self {
        Self {
            thresholds,
            seed,
            weeks,
        }
    }

    /// Assemble the sample result for a scenario identifier ("high", "mid", "low").
    pub fn assemble_named(&self, id: &str) -> AppResult<MmmResult> {
        self.assemble_config(catalog::get(id)?)
    }

    pub fn assemble(&self, tier: ScenarioTier) -> AppResult<MmmResult> {
        self.assemble_config(catalog::for_tier(tier))
    }

    /// All-or-nothing: any validation failure returns an error and no partial result.
    pub fn assemble_config(&self, cfg: &ScenarioConfig) -> AppResult<MmmResult> {
        cfg.validate()?;

        let total_budget: f64 = cfg.channels.iter().map(|c| c.spend).sum();
        let incremental: f64 = cfg.channels.iter().map(|c| c.contribution).sum();
        let total_revenue = cfg.top_line.base_sales + incremental;

        let channels = cfg
            .channels
            .iter()
            .map(|c| ChannelMetrics {
                name: c.channel.name().to_string(),
                spend: c.spend,
                mroas: c.mroas,
                contribution: c.contribution,
                contribution_pct: share_pct(c.contribution, total_revenue),
                color: c.channel.color().to_string(),
            })
            .collect();

        let model_parameters = cfg
            .channels
            .iter()
            .map(|c| ModelParameters {
                channel: c.channel.name().to_string(),
                adstock: c.adstock,
                slope: c.param_slope,
            })
            .collect();

        let saturation_curves = cfg
            .channels
            .iter()
            .map(|c| SaturationCurve {
                channel: c.channel.name().to_string(),
                color: c.channel.color().to_string(),
                current_spend: c.spend,
                max_capacity: c.max_capacity,
                half_saturation: c.half_saturation,
                slope: c.curve_slope,
            })
            .collect();

        let marginal_efficiency = cfg
            .channels
            .iter()
            .map(|c| MarginalEfficiency {
                channel: c.channel.name().to_string(),
                mroas: c.mroas,
                current_spend: c.spend,
                recommendation: self.thresholds.classify(c.mroas),
                color: c.channel.color().to_string(),
            })
            .collect();

        let roi: BTreeMap<String, f64> = cfg
            .channels
            .iter()
            .map(|c| (c.channel.name().to_string(), c.legacy_roi))
            .collect();

        let attribution: BTreeMap<String, f64> = cfg
            .channels
            .iter()
            .map(|c| (c.channel.name().to_string(), share_pct(c.contribution, incremental)))
            .collect();

        let t = &cfg.top_line;
        let kpis = Kpis {
            total_incremental_revenue: incremental,
            revenue_delta_pct: t.revenue_delta_pct,
            total_roas: if total_budget > 0.0 {
                round_to(incremental / total_budget, 2)
            } else {
                0.0
            },
            roas_delta_pct: t.roas_delta_pct,
            base_sales: t.base_sales,
            base_sales_delta_pct: t.base_sales_delta_pct,
            marginal_cpa: t.marginal_cpa,
            marginal_cpa_delta_pct: t.marginal_cpa_delta_pct,
        };

        let weekly_data = WeeklySeriesGenerator::new(cfg.series, self.seed)
            .generate(self.weeks, cfg.diagnostics.r_squared)?;

        let result = MmmResult {
            roi,
            attribution,
            model_fit: cfg.diagnostics.r_squared,
            predictions: Vec::new(),
            channels,
            kpis,
            diagnostics: cfg.diagnostics,
            model_parameters,
            saturation_curves,
            marginal_efficiency,
            weekly_data,
            total_budget,
            scenario_quality: cfg.tier,
        };

        check_consistency(&result)?;

        tracing::debug!(
            tier = %cfg.tier,
            channels = result.channels.len(),
            total_budget,
            incremental,
            "result assembled"
        );
        Ok(result)
    }
}

/// Percentage share rounded to one decimal; zero when the whole is empty.
fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round_to(part / whole * 100.0, 1)
    } else {
        0.0
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= SUM_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Verify the cross-list invariants of an assembled result.
pub fn check_consistency(result: &MmmResult) -> AppResult<()> {
    let fail = |msg: String| Err(MmmError::ProcessingFailure(format!("inconsistent result: {msg}")));

    let names: Vec<&str> = result.channels.iter().map(|c| c.name.as_str()).collect();
    let unique: HashSet<&str> = names.iter().copied().collect();
    if unique.len() != names.len() {
        return fail("duplicate channel names".into());
    }

    let lists: [(&str, Vec<&str>); 3] = [
        ("model_parameters", result.model_parameters.iter().map(|p| p.channel.as_str()).collect()),
        ("saturation_curves", result.saturation_curves.iter().map(|c| c.channel.as_str()).collect()),
        ("marginal_efficiency", result.marginal_efficiency.iter().map(|m| m.channel.as_str()).collect()),
    ];
    for (label, list) in &lists {
        if *list != names {
            return fail(format!("{label} channels {list:?} differ from {names:?}"));
        }
    }

    let spend: f64 = result.channels.iter().map(|c| c.spend).sum();
    if !approx_eq(spend, result.total_budget) {
        return fail(format!("total_budget {} != channel spend {spend}", result.total_budget));
    }

    let contribution: f64 = result.channels.iter().map(|c| c.contribution).sum();
    if !approx_eq(contribution, result.kpis.total_incremental_revenue) {
        return fail(format!(
            "total_incremental_revenue {} != channel contribution {contribution}",
            result.kpis.total_incremental_revenue
        ));
    }

    for c in &result.saturation_curves {
        if c.current_spend > c.max_capacity || !(c.half_saturation > 0.0 && c.half_saturation < c.max_capacity) {
            return fail(format!("{}: invalid saturation curve", c.channel));
        }
    }

    for (i, p) in result.weekly_data.iter().enumerate() {
        if p.week != format!("W{}", i + 1) {
            return fail(format!("week {} labelled {}", i + 1, p.week));
        }
    }

    Ok(())
}
