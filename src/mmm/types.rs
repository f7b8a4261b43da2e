use crate::errors::MmmError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Channel roster ──

/// The eight media channels, in the canonical order every list in a result follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    LinearTv,
    Meta,
    TikTok,
    BrandSearch,
    YouTube,
    ProgrammaticDisplay,
    Podcasts,
    Ooh,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::LinearTv,
        Channel::Meta,
        Channel::TikTok,
        Channel::BrandSearch,
        Channel::YouTube,
        Channel::ProgrammaticDisplay,
        Channel::Podcasts,
        Channel::Ooh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LinearTv => "Linear TV",
            Self::Meta => "Meta (FB/IG)",
            Self::TikTok => "TikTok",
            Self::BrandSearch => "Brand Search",
            Self::YouTube => "YouTube",
            Self::ProgrammaticDisplay => "Programmatic Display",
            Self::Podcasts => "Podcasts",
            Self::Ooh => "OOH (Outdoor)",
        }
    }

    /// Dashboard color (hex).
    pub fn color(self) -> &'static str {
        match self {
            Self::LinearTv => "#6366f1",
            Self::Meta => "#22c55e",
            Self::TikTok => "#f43f5e",
            Self::BrandSearch => "#3b82f6",
            Self::YouTube => "#ef4444",
            Self::ProgrammaticDisplay => "#f59e0b",
            Self::Podcasts => "#8b5cf6",
            Self::Ooh => "#06b6d4",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Scenario quality tier ──

/// Variant order is the quality order: `Low < Mid < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioTier {
    Low,
    Mid,
    High,
}

impl ScenarioTier {
    /// Listed best-first, the order used in error messages.
    pub const ALL: [ScenarioTier; 3] = [ScenarioTier::High, ScenarioTier::Mid, ScenarioTier::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Mid => "mid",
            Self::Low => "low",
        }
    }

    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl std::fmt::Display for ScenarioTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScenarioTier {
    type Err = MmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MmmError::InvalidScenario {
                requested: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

// ── Efficiency recommendation ──

/// Ordered so that a higher variant never corresponds to a lower mROAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Cut,
    Maintain,
    Increase,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cut => write!(f, "CUT"),
            Self::Maintain => write!(f, "MAINTAIN"),
            Self::Increase => write!(f, "INCREASE"),
        }
    }
}

// ── Result components ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    pub name: String,
    pub spend: f64,
    #[serde(rename = "mROAS")]
    pub mroas: f64,
    pub contribution: f64,
    pub contribution_pct: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub channel: String,
    pub adstock: f64,
    pub slope: f64,
}

/// Hill-type response curve parameters for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturationCurve {
    pub channel: String,
    pub color: String,
    pub current_spend: f64,
    pub max_capacity: f64,
    pub half_saturation: f64,
    pub slope: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalEfficiency {
    pub channel: String,
    #[serde(rename = "mROAS")]
    pub mroas: f64,
    pub current_spend: f64,
    pub recommendation: Recommendation,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_incremental_revenue: f64,
    pub revenue_delta_pct: f64,
    pub total_roas: f64,
    pub roas_delta_pct: f64,
    pub base_sales: f64,
    pub base_sales_delta_pct: f64,
    pub marginal_cpa: f64,
    pub marginal_cpa_delta_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelDiagnostics {
    pub r_squared: f64,
    pub mape: f64,
    pub durbin_watson: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub actual: f64,
    pub predicted: f64,
}

/// Aggregate root returned to the dashboard. Built once per request, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmmResult {
    // Legacy flat fields kept for older consumers
    pub roi: BTreeMap<String, f64>,
    pub attribution: BTreeMap<String, f64>,
    pub model_fit: f64,
    pub predictions: Vec<serde_json::Value>,

    pub channels: Vec<ChannelMetrics>,
    pub kpis: Kpis,
    pub diagnostics: ModelDiagnostics,
    pub model_parameters: Vec<ModelParameters>,
    pub saturation_curves: Vec<SaturationCurve>,
    pub marginal_efficiency: Vec<MarginalEfficiency>,
    pub weekly_data: Vec<WeeklyPoint>,
    pub total_budget: f64,
    pub scenario_quality: ScenarioTier,
}

impl MmmResult {
    pub fn curve_for(&self, channel: &str) -> Option<&SaturationCurve> {
        self.saturation_curves.iter().find(|c| c.channel == channel)
    }
}

/// Outcome of re-allocating spend across channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub projected_revenue: f64,
    pub revenue_vs_current: f64,
    pub blended_roas: f64,
    pub optimization_score: i32,
}

/// Round to `dp` decimal places.
#[inline]
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}
