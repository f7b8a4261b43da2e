use crate::errors::{AppResult, MmmError};
use crate::mmm::series::SeriesProfile;
use crate::mmm::types::{Channel, ModelDiagnostics, ScenarioTier};
use std::borrow::Cow;
use std::collections::HashSet;

/// Per-channel inputs for one scenario. Spend, contribution and capacities are in currency units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub channel: Channel,
    pub spend: f64,
    pub mroas: f64,
    pub contribution: f64,
    pub adstock: f64,
    /// Hill shape reported with the model parameters
    pub param_slope: f64,
    pub max_capacity: f64,
    pub half_saturation: f64,
    /// Hill shape used to draw the saturation curve
    pub curve_slope: f64,
    /// Average ROI shown by pre-dashboard consumers
    pub legacy_roi: f64,
}

/// Top-line figures modeled independently of channel attribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopLine {
    pub revenue_delta_pct: f64,
    pub roas_delta_pct: f64,
    pub base_sales: f64,
    pub base_sales_delta_pct: f64,
    pub marginal_cpa: f64,
    pub marginal_cpa_delta_pct: f64,
}

/// Everything needed to assemble one result. Static for the sample tiers,
/// owned when produced by an estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub tier: ScenarioTier,
    pub channels: Cow<'static, [ChannelConfig]>,
    pub diagnostics: ModelDiagnostics,
    pub top_line: TopLine,
    pub series: SeriesProfile,
}

impl ScenarioConfig {
    /// Structural checks a result built from this config relies on.
    pub fn validate(&self) -> AppResult<()> {
        let fail = |msg: String| Err(MmmError::ProcessingFailure(format!("{} scenario: {msg}", self.tier)));

        if self.channels.is_empty() {
            return fail("no channels".into());
        }
        let mut seen = HashSet::with_capacity(self.channels.len());
        for c in self.channels.iter() {
            let name = c.channel.name();
            if !seen.insert(c.channel) {
                return fail(format!("duplicate channel {name}"));
            }
            if !(c.spend >= 0.0 && c.contribution >= 0.0 && c.mroas >= 0.0) {
                return fail(format!("{name}: spend, contribution and mROAS must be non-negative"));
            }
            if !(0.0..=1.0).contains(&c.adstock) {
                return fail(format!("{name}: adstock {} outside [0, 1]", c.adstock));
            }
            if !(c.param_slope > 0.0 && c.curve_slope > 0.0) {
                return fail(format!("{name}: slopes must be positive"));
            }
            if c.spend > c.max_capacity {
                return fail(format!("{name}: spend {} exceeds capacity {}", c.spend, c.max_capacity));
            }
            if !(c.half_saturation > 0.0 && c.half_saturation < c.max_capacity) {
                return fail(format!(
                    "{name}: half saturation {} must lie in (0, {})",
                    c.half_saturation, c.max_capacity
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.diagnostics.r_squared) {
            return fail(format!("r_squared {} outside [0, 1]", self.diagnostics.r_squared));
        }
        if !(self.diagnostics.mape >= 0.0) {
            return fail(format!("mape {} is negative", self.diagnostics.mape));
        }
        if !(self.top_line.base_sales >= 0.0) {
            return fail("base sales must be non-negative".into());
        }
        Ok(())
    }
}

/// Look up a sample scenario by its identifier ("high", "mid", "low").
pub fn get(id: &str) -> AppResult<&'static ScenarioConfig> {
    let tier: ScenarioTier = id.parse()?;
    Ok(for_tier(tier))
}

pub fn for_tier(tier: ScenarioTier) -> &'static ScenarioConfig {
    match tier {
        ScenarioTier::High => &HIGH,
        ScenarioTier::Mid => &MID,
        ScenarioTier::Low => &LOW,
    }
}

/// Fixed configuration returned for uploaded files until a real fit exists.
pub fn upload_baseline() -> &'static ScenarioConfig {
    &UPLOAD
}

#[allow(clippy::too_many_arguments)]
const fn channel(
    channel: Channel,
    spend: f64,
    mroas: f64,
    contribution: f64,
    adstock: f64,
    param_slope: f64,
    max_capacity: f64,
    half_saturation: f64,
    curve_slope: f64,
    legacy_roi: f64,
) -> ChannelConfig {
    ChannelConfig {
        channel,
        spend,
        mroas,
        contribution,
        adstock,
        param_slope,
        max_capacity,
        half_saturation,
        curve_slope,
        legacy_roi,
    }
}

use Channel::*;

// Columns: channel, spend, mROAS, contribution, adstock, param slope,
//          max capacity, half saturation, curve slope, legacy ROI

// ── High: mature mix, excellent fit ──

const HIGH_CHANNELS: [ChannelConfig; 8] = [
    channel(LinearTv, 12_000_000.0, 0.58, 9_200_000.0, 0.48, 3.5, 22_000_000.0, 9_000_000.0, 2.5, 1.9),
    channel(Meta, 8_500_000.0, 1.45, 8_900_000.0, 0.62, 4.8, 18_000_000.0, 7_000_000.0, 2.2, 3.8),
    channel(TikTok, 3_500_000.0, 1.82, 5_100_000.0, 0.75, 5.2, 12_000_000.0, 4_500_000.0, 1.8, 4.2),
    channel(BrandSearch, 5_000_000.0, 0.92, 3_800_000.0, 0.35, 2.8, 14_000_000.0, 5_500_000.0, 2.0, 2.8),
    channel(YouTube, 6_500_000.0, 1.15, 6_200_000.0, 0.58, 4.1, 15_000_000.0, 6_000_000.0, 2.3, 3.1),
    channel(ProgrammaticDisplay, 4_000_000.0, 0.38, 2_100_000.0, 0.42, 3.2, 10_000_000.0, 4_500_000.0, 1.9, 1.4),
    channel(Podcasts, 2_000_000.0, 1.65, 2_800_000.0, 0.68, 4.5, 8_000_000.0, 3_000_000.0, 1.6, 3.6),
    channel(Ooh, 3_500_000.0, 0.72, 2_400_000.0, 0.52, 3.8, 9_000_000.0, 4_000_000.0, 2.1, 2.1),
];

static HIGH: ScenarioConfig = ScenarioConfig {
    tier: ScenarioTier::High,
    channels: Cow::Borrowed(&HIGH_CHANNELS),
    diagnostics: ModelDiagnostics {
        r_squared: 0.94,
        mape: 4.2,
        durbin_watson: 1.98,
    },
    top_line: TopLine {
        revenue_delta_pct: 12.4,
        roas_delta_pct: 4.2,
        base_sales: 180_000_000.0,
        base_sales_delta_pct: 2.8,
        marginal_cpa: 38.50,
        marginal_cpa_delta_pct: -8.5,
    },
    series: SeriesProfile::STANDARD,
};

// ── Mid: moderate fit ──

const MID_CHANNELS: [ChannelConfig; 8] = [
    channel(LinearTv, 10_000_000.0, 0.42, 7_100_000.0, 0.42, 2.8, 18_000_000.0, 7_500_000.0, 2.2, 1.6),
    channel(Meta, 7_000_000.0, 1.05, 6_200_000.0, 0.55, 3.5, 14_000_000.0, 5_500_000.0, 2.0, 2.8),
    channel(TikTok, 4_000_000.0, 1.28, 4_100_000.0, 0.68, 4.2, 10_000_000.0, 3_800_000.0, 1.6, 3.2),
    channel(BrandSearch, 4_500_000.0, 0.68, 2_900_000.0, 0.38, 2.4, 11_000_000.0, 4_800_000.0, 1.8, 2.2),
    channel(YouTube, 5_500_000.0, 0.85, 4_500_000.0, 0.48, 3.2, 12_000_000.0, 5_000_000.0, 2.1, 2.4),
    channel(ProgrammaticDisplay, 3_500_000.0, 0.25, 1_400_000.0, 0.35, 2.6, 8_000_000.0, 3_800_000.0, 1.7, 1.1),
    channel(Podcasts, 1_800_000.0, 1.12, 1_900_000.0, 0.58, 3.8, 6_000_000.0, 2_500_000.0, 1.5, 2.9),
    channel(Ooh, 3_000_000.0, 0.55, 1_800_000.0, 0.45, 3.0, 7_500_000.0, 3_500_000.0, 1.9, 1.7),
];

static MID: ScenarioConfig = ScenarioConfig {
    tier: ScenarioTier::Mid,
    channels: Cow::Borrowed(&MID_CHANNELS),
    diagnostics: ModelDiagnostics {
        r_squared: 0.78,
        mape: 12.5,
        durbin_watson: 1.62,
    },
    top_line: TopLine {
        revenue_delta_pct: 5.8,
        roas_delta_pct: -3.2,
        base_sales: 168_000_000.0,
        base_sales_delta_pct: 0.8,
        marginal_cpa: 52.80,
        marginal_cpa_delta_pct: 4.5,
    },
    series: SeriesProfile::STANDARD,
};

// ── Low: new program / thin data, poor fit ──

const LOW_CHANNELS: [ChannelConfig; 8] = [
    channel(LinearTv, 8_000_000.0, 0.22, 4_200_000.0, 0.32, 1.8, 14_000_000.0, 6_000_000.0, 1.8, 1.1),
    channel(Meta, 5_500_000.0, 0.58, 3_800_000.0, 0.45, 2.5, 11_000_000.0, 4_500_000.0, 1.6, 1.8),
    channel(TikTok, 4_500_000.0, 0.75, 2_900_000.0, 0.58, 3.2, 8_000_000.0, 3_200_000.0, 1.4, 2.0),
    channel(BrandSearch, 3_500_000.0, 0.42, 1_800_000.0, 0.28, 1.6, 8_000_000.0, 3_800_000.0, 1.5, 1.5),
    channel(YouTube, 4_000_000.0, 0.48, 2_200_000.0, 0.38, 2.2, 9_000_000.0, 4_200_000.0, 1.7, 1.6),
    channel(ProgrammaticDisplay, 3_000_000.0, 0.15, 800_000.0, 0.25, 1.8, 6_000_000.0, 3_000_000.0, 1.4, 0.8),
    channel(Podcasts, 1_500_000.0, 0.62, 1_100_000.0, 0.48, 2.8, 5_000_000.0, 2_000_000.0, 1.3, 1.9),
    channel(Ooh, 2_500_000.0, 0.28, 900_000.0, 0.35, 2.0, 6_000_000.0, 2_800_000.0, 1.5, 1.2),
];

static LOW: ScenarioConfig = ScenarioConfig {
    tier: ScenarioTier::Low,
    channels: Cow::Borrowed(&LOW_CHANNELS),
    diagnostics: ModelDiagnostics {
        r_squared: 0.52,
        mape: 28.3,
        durbin_watson: 1.24,
    },
    top_line: TopLine {
        revenue_delta_pct: -4.2,
        roas_delta_pct: -15.8,
        base_sales: 148_000_000.0,
        base_sales_delta_pct: -2.5,
        marginal_cpa: 82.40,
        marginal_cpa_delta_pct: 18.2,
    },
    series: SeriesProfile::STANDARD,
};

// ── Upload baseline: four-channel mix ──

const UPLOAD_CHANNELS: [ChannelConfig; 4] = [
    channel(LinearTv, 8_000_000.0, 0.62, 6_700_000.0, 0.48, 3.5, 15_000_000.0, 6_000_000.0, 2.5, 2.1),
    channel(Meta, 6_000_000.0, 0.85, 6_400_000.0, 0.60, 4.2, 12_000_000.0, 5_000_000.0, 2.2, 3.2),
    channel(TikTok, 2_000_000.0, 0.24, 4_200_000.0, 0.72, 5.1, 8_000_000.0, 3_000_000.0, 1.8, 1.8),
    channel(BrandSearch, 4_000_000.0, 0.69, 268_000.0, 0.35, 2.8, 10_000_000.0, 4_000_000.0, 2.0, 2.5),
];

static UPLOAD: ScenarioConfig = ScenarioConfig {
    tier: ScenarioTier::High,
    channels: Cow::Borrowed(&UPLOAD_CHANNELS),
    diagnostics: ModelDiagnostics {
        r_squared: 0.94,
        mape: 4.2,
        durbin_watson: 1.98,
    },
    top_line: TopLine {
        revenue_delta_pct: 8.4,
        roas_delta_pct: -2.1,
        base_sales: 150_000_000.0,
        base_sales_delta_pct: 1.2,
        marginal_cpa: 42.50,
        marginal_cpa_delta_pct: -5.0,
    },
    series: SeriesProfile::UPLOAD,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn total_spend(cfg: &ScenarioConfig) -> f64 {
        cfg.channels.iter().map(|c| c.spend).sum()
    }

    #[test]
    fn test_all_configs_validate() {
        for tier in ScenarioTier::ALL {
            for_tier(tier).validate().unwrap_or_else(|e| panic!("{tier}: {e}"));
        }
        upload_baseline().validate().unwrap();
    }

    #[test]
    fn test_get_by_name() {
        assert_eq!(get("high").unwrap().tier, ScenarioTier::High);
        assert_eq!(get("mid").unwrap().tier, ScenarioTier::Mid);
        assert_eq!(get("low").unwrap().tier, ScenarioTier::Low);
    }

    #[test]
    fn test_unknown_tier_enumerates_valid() {
        match get("ultra") {
            Err(MmmError::InvalidScenario { requested, valid }) => {
                assert_eq!(requested, "ultra");
                assert_eq!(valid, vec!["high", "mid", "low"]);
            }
            other => panic!("expected InvalidScenario, got {other:?}"),
        }
    }

    #[test]
    fn test_roster_stable_across_tiers() {
        for tier in ScenarioTier::ALL {
            let channels: Vec<Channel> = for_tier(tier).channels.iter().map(|c| c.channel).collect();
            assert_eq!(channels, Channel::ALL.to_vec(), "{tier} roster differs");
        }
    }

    #[test]
    fn test_budgets() {
        assert_eq!(total_spend(for_tier(ScenarioTier::High)), 45_000_000.0);
        assert_eq!(total_spend(for_tier(ScenarioTier::Mid)), 39_300_000.0);
        assert_eq!(total_spend(for_tier(ScenarioTier::Low)), 32_500_000.0);
        assert_eq!(total_spend(upload_baseline()), 20_000_000.0);
    }

    #[test]
    fn test_higher_tier_spends_more_and_returns_more() {
        let tiers = [ScenarioTier::Low, ScenarioTier::Mid, ScenarioTier::High];
        for pair in tiers.windows(2) {
            let (lo, hi) = (for_tier(pair[0]), for_tier(pair[1]));
            assert!(total_spend(hi) > total_spend(lo), "{} should outspend {}", hi.tier, lo.tier);
            assert!(hi.diagnostics.r_squared > lo.diagnostics.r_squared);
            for (a, b) in lo.channels.iter().zip(hi.channels.iter()) {
                assert!(
                    b.mroas > a.mroas,
                    "{}: {} mROAS {} should exceed {} mROAS {}",
                    a.channel, hi.tier, b.mroas, lo.tier, a.mroas
                );
            }
        }
    }

    #[test]
    fn test_validate_catches_bad_curve() {
        let mut cfg = for_tier(ScenarioTier::Mid).clone();
        let mut channels = cfg.channels.to_vec();
        channels[0].half_saturation = channels[0].max_capacity;
        cfg.channels = Cow::Owned(channels);
        assert!(matches!(cfg.validate(), Err(MmmError::ProcessingFailure(_))));
    }

    #[test]
    fn test_validate_catches_duplicate() {
        let mut cfg = upload_baseline().clone();
        let mut channels = cfg.channels.to_vec();
        channels[1].channel = channels[0].channel;
        cfg.channels = Cow::Owned(channels);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }
}
