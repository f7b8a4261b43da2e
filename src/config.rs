use crate::errors::{AppResult, MmmError};
use crate::mmm::efficiency::EfficiencyThresholds;
use std::path::PathBuf;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174,\
http://127.0.0.1:5173,http://127.0.0.1:5174,\
https://mmm-meridian.vercel.app,https://*.vercel.app";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    /// Exact origins, `*.` host wildcards, or a lone `*` for any origin.
    pub cors_origins: Vec<String>,
    pub series_seed: u64,
    pub series_weeks: usize,
    pub thresholds: EfficiencyThresholds,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_port = var_or("SERVER_PORT", "8001")
            .parse::<u16>()
            .map_err(|e| MmmError::Config(format!("SERVER_PORT: {e}")))?;

        let series_seed = var_or("SERIES_SEED", "42")
            .parse::<u64>()
            .map_err(|e| MmmError::Config(format!("SERIES_SEED: {e}")))?;

        let series_weeks = var_or("SERIES_WEEKS", "52")
            .parse::<usize>()
            .map_err(|e| MmmError::Config(format!("SERIES_WEEKS: {e}")))?;
        if series_weeks == 0 {
            return Err(MmmError::Config("SERIES_WEEKS: must be at least 1".into()));
        }

        let cut_below = var_or("CUT_BELOW_MROAS", "0.60")
            .parse::<f64>()
            .map_err(|e| MmmError::Config(format!("CUT_BELOW_MROAS: {e}")))?;

        let increase_from = var_or("INCREASE_FROM_MROAS", "1.00")
            .parse::<f64>()
            .map_err(|e| MmmError::Config(format!("INCREASE_FROM_MROAS: {e}")))?;

        let thresholds = EfficiencyThresholds::new(cut_below, increase_from)?;

        let cors_origins = var_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            server_port,
            upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "uploads")),
            cors_origins,
            series_seed,
            series_weeks,
            thresholds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.server_port, 8001);
        assert_eq!(cfg.series_seed, 42);
        assert_eq!(cfg.series_weeks, 52);
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert_eq!(cfg.cors_origins.len(), 6);
        assert!((cfg.thresholds.cut_below - 0.6).abs() < 1e-12);
        assert!((cfg.thresholds.increase_from - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("SERVER_PORT", "9000"),
            ("CORS_ORIGINS", " * "),
            ("SERIES_WEEKS", "26"),
        ]))
        .unwrap();
        assert_eq!(cfg.server_port, 9000);
        assert_eq!(cfg.cors_origins, vec!["*".to_string()]);
        assert_eq!(cfg.series_weeks, 26);
    }

    #[test]
    fn test_bad_port_names_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[("SERVER_PORT", "nope")])).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"), "got: {err}");
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("CUT_BELOW_MROAS", "1.2"),
            ("INCREASE_FROM_MROAS", "0.8"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MmmError::Config(_)), "got: {err}");
    }

    #[test]
    fn test_zero_weeks_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("SERIES_WEEKS", "0")])).unwrap_err();
        assert!(err.to_string().contains("SERIES_WEEKS"));
    }
}
