pub mod types;
pub mod catalog;
pub mod series;
pub mod efficiency;
pub mod saturation;
pub mod assembler;
pub mod ingest;
pub mod simulator;

use crate::errors::AppResult;
use crate::mmm::catalog::ScenarioConfig;
use crate::mmm::ingest::UploadSummary;

/// Turns an uploaded dataset into a scenario configuration.
/// This is where a real adstock/saturation fit plugs in; the assembly and
/// API contract stay the same whichever estimator is used.
/// Send + Sync required so handlers can share one instance.
pub trait Estimator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Must return a config that passes `ScenarioConfig::validate`.
    fn estimate(&self, upload: &UploadSummary) -> AppResult<ScenarioConfig>;
}
