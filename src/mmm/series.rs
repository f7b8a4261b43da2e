use crate::errors::{AppResult, MmmError};
use crate::mmm::types::{round_to, WeeklyPoint};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use std::f64::consts::PI;

/// Seed used by the sample scenarios and the upload path.
pub const DEFAULT_SEED: u64 = 42;

/// Shape of a synthetic weekly revenue series (revenue in millions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesProfile {
    pub base: f64,
    /// Amplitude of the full-period sine (yearly seasonality)
    pub annual_amplitude: f64,
    /// Amplitude of the half-period cosine (secondary harmonic)
    pub harmonic_amplitude: f64,
    pub trend_rate: f64,
    /// Std dev of the noise on actuals
    pub actual_noise: f64,
    /// Prediction noise std dev is this times (1 - fit_quality)
    pub prediction_noise_scale: f64,
}

impl SeriesProfile {
    /// Profile behind the three sample scenarios.
    pub const STANDARD: SeriesProfile = SeriesProfile {
        base: 5.5,
        annual_amplitude: 1.2,
        harmonic_amplitude: 0.4,
        trend_rate: 0.015,
        actual_noise: 0.4,
        prediction_noise_scale: 0.6,
    };

    /// Flatter profile returned for uploaded files (sigma_pred = 0.15 at fit 0.94).
    pub const UPLOAD: SeriesProfile = SeriesProfile {
        base: 5.5,
        annual_amplitude: 0.8,
        harmonic_amplitude: 0.0,
        trend_rate: 0.01,
        actual_noise: 0.3,
        prediction_noise_scale: 2.5,
    };
}

/// Reproducible actual-vs-predicted series.
///
/// Every call builds its own `StdRng` from `seed`, so output is a pure function
/// of (profile, seed, weeks, fit_quality) and concurrent callers cannot disturb
/// each other.
#[derive(Debug, Clone, Copy)]
pub struct WeeklySeriesGenerator {
    profile: SeriesProfile,
    seed: u64,
}

impl WeeklySeriesGenerator {
    pub fn new(profile: SeriesProfile, seed: u64) -> Self {
        Self { profile, seed }
    }

    /// Generate `weeks` points labelled W1..W<weeks>.
    ///
    /// Rejects `weeks == 0` and any `fit_quality` outside [0, 1].
    pub fn generate(&self, weeks: usize, fit_quality: f64) -> AppResult<Vec<WeeklyPoint>> {
        if weeks == 0 {
            return Err(MmmError::InvalidInput("weeks must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&fit_quality) {
            return Err(MmmError::InvalidInput(format!(
                "fit_quality must lie in [0, 1], got {fit_quality}"
            )));
        }

        let p = &self.profile;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let standard = Normal::standard();
        let sigma_pred = p.prediction_noise_scale * (1.0 - fit_quality);
        let period = weeks as f64;

        let points = (1..=weeks)
            .map(|week| {
                let w = week as f64;
                let seasonal = (2.0 * PI * w / period).sin() * p.annual_amplitude
                    + (4.0 * PI * w / period).cos() * p.harmonic_amplitude;
                let trend = w * p.trend_rate;
                // Two draws per week, always, so the actuals do not depend on fit_quality
                let noise = p.actual_noise * standard.sample(&mut rng);
                let prediction_noise = sigma_pred * standard.sample(&mut rng);

                let actual = p.base + seasonal + trend + noise;
                let predicted = actual + prediction_noise;

                WeeklyPoint {
                    week: format!("W{week}"),
                    actual: round_to(actual, 2),
                    predicted: round_to(predicted, 2),
                }
            })
            .collect();

        tracing::debug!(weeks, fit_quality, seed = self.seed, "weekly series generated");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> WeeklySeriesGenerator {
        WeeklySeriesGenerator::new(SeriesProfile::STANDARD, DEFAULT_SEED)
    }

    #[test]
    fn test_deterministic() {
        let g = standard();
        let a = g.generate(52, 0.78).unwrap();
        let b = g.generate(52, 0.78).unwrap();
        assert_eq!(a, b, "same arguments must give identical series");
        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn test_labels_and_length() {
        let points = standard().generate(52, 0.94).unwrap();
        assert_eq!(points.len(), 52);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.week, format!("W{}", i + 1));
        }
        let short = standard().generate(3, 0.5).unwrap();
        assert_eq!(short.len(), 3);
        assert_eq!(short[2].week, "W3");
    }

    #[test]
    fn test_rounded_to_cents() {
        for p in standard().generate(52, 0.52).unwrap() {
            assert!((p.actual * 100.0 - (p.actual * 100.0).round()).abs() < 1e-6, "actual {}", p.actual);
            assert!((p.predicted * 100.0 - (p.predicted * 100.0).round()).abs() < 1e-6, "predicted {}", p.predicted);
        }
    }

    #[test]
    fn test_perfect_fit_tracks_exactly() {
        for p in standard().generate(52, 1.0).unwrap() {
            assert_eq!(p.actual, p.predicted, "{} diverged at fit 1.0", p.week);
        }
    }

    #[test]
    fn test_higher_fit_tracks_tighter() {
        let g = standard();
        let mean_abs_err = |q: f64| {
            let pts = g.generate(52, q).unwrap();
            pts.iter().map(|p| (p.actual - p.predicted).abs()).sum::<f64>() / pts.len() as f64
        };
        let high = mean_abs_err(0.94);
        let low = mean_abs_err(0.52);
        assert!(high < low, "fit 0.94 error {high} should be below fit 0.52 error {low}");
    }

    #[test]
    fn test_actuals_independent_of_fit() {
        let g = standard();
        let a = g.generate(52, 0.94).unwrap();
        let b = g.generate(52, 0.52).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.actual, y.actual);
        }
    }

    #[test]
    fn test_seed_changes_output() {
        let a = standard().generate(52, 0.5).unwrap();
        let b = WeeklySeriesGenerator::new(SeriesProfile::STANDARD, 7).generate(52, 0.5).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_values_in_revenue_range() {
        for p in standard().generate(52, 0.52).unwrap() {
            assert!(p.actual > 1.0 && p.actual < 12.0, "{} actual {} out of range", p.week, p.actual);
        }
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let g = standard();
        assert!(matches!(g.generate(0, 0.5), Err(MmmError::InvalidInput(_))));
        assert!(matches!(g.generate(52, 1.01), Err(MmmError::InvalidInput(_))));
        assert!(matches!(g.generate(52, -0.1), Err(MmmError::InvalidInput(_))));
        assert!(matches!(g.generate(52, f64::NAN), Err(MmmError::InvalidInput(_))));
    }
}
