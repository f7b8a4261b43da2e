use crate::errors::{AppResult, MmmError};
use crate::mmm::types::Recommendation;

/// mROAS thresholds for spend recommendations.
///
/// - mROAS <  cut_below               -> CUT (each extra dollar returns too little)
/// - cut_below <= mROAS < increase_from -> MAINTAIN (roughly breakeven)
/// - mROAS >= increase_from           -> INCREASE (under-invested)
///
/// One rule applies to every scenario, so the recommendation is a
/// non-decreasing function of mROAS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EfficiencyThresholds {
    pub cut_below: f64,
    pub increase_from: f64,
}

impl Default for EfficiencyThresholds {
    fn default() -> Self {
        Self {
            cut_below: 0.60,
            increase_from: 1.00,
        }
    }
}

impl EfficiencyThresholds {
    pub fn new(cut_below: f64, increase_from: f64) -> AppResult<Self> {
        if !cut_below.is_finite() || !increase_from.is_finite() {
            return Err(MmmError::Config("mROAS thresholds must be finite".into()));
        }
        if cut_below < 0.0 || cut_below > increase_from {
            return Err(MmmError::Config(format!(
                "mROAS thresholds must satisfy 0 <= cut_below ({cut_below}) <= increase_from ({increase_from})"
            )));
        }
        Ok(Self {
            cut_below,
            increase_from,
        })
    }

    /// Pure function of mROAS. NaN is treated as no measurable return.
    #[inline]
    pub fn classify(&self, mroas: f64) -> Recommendation {
        if mroas.is_nan() || mroas < self.cut_below {
            Recommendation::Cut
        } else if mroas < self.increase_from {
            Recommendation::Maintain
        } else {
            Recommendation::Increase
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        let t = EfficiencyThresholds::default();
        assert_eq!(t.classify(0.15), Recommendation::Cut);
        assert_eq!(t.classify(0.58), Recommendation::Cut);
        assert_eq!(t.classify(0.60), Recommendation::Maintain);
        assert_eq!(t.classify(0.92), Recommendation::Maintain);
        assert_eq!(t.classify(1.00), Recommendation::Increase);
        assert_eq!(t.classify(1.82), Recommendation::Increase);
    }

    #[test]
    fn test_monotonic() {
        let t = EfficiencyThresholds::default();
        let mut prev = t.classify(0.0);
        for i in 1..=300 {
            let m = i as f64 * 0.01;
            let rec = t.classify(m);
            assert!(rec >= prev, "classification decreased at mROAS={m}: {prev} -> {rec}");
            prev = rec;
        }
    }

    #[test]
    fn test_nan_is_cut() {
        assert_eq!(EfficiencyThresholds::default().classify(f64::NAN), Recommendation::Cut);
    }

    #[test]
    fn test_degenerate_band() {
        let t = EfficiencyThresholds::new(0.8, 0.8).unwrap();
        assert_eq!(t.classify(0.79), Recommendation::Cut);
        assert_eq!(t.classify(0.8), Recommendation::Increase);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(EfficiencyThresholds::new(1.2, 0.8).is_err());
        assert!(EfficiencyThresholds::new(-0.1, 0.8).is_err());
        assert!(EfficiencyThresholds::new(f64::NAN, 0.8).is_err());
    }
}
