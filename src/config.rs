use crate::errors::{EngineError, EngineResult};
use crate::execution::signal::SignalConfig;
use crate::models::implied_vol::SolverConfig;
use crate::models::EngineConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub edge_threshold: f64,
    pub min_time_to_expiry: f64,
    pub default_volatility: f64,
    pub iv_max_iterations: u32,
    pub iv_tolerance: f64,
    pub portfolio_exposure: f64,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let edge_threshold = var_or("EDGE_THRESHOLD", "0.10")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("EDGE_THRESHOLD: {e}")))?;

        let min_time_to_expiry = var_or("MIN_TIME_TO_EXPIRY", "0.02")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("MIN_TIME_TO_EXPIRY: {e}")))?;

        let default_volatility = var_or("DEFAULT_VOLATILITY", "0.30")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("DEFAULT_VOLATILITY: {e}")))?;

        let iv_max_iterations = var_or("IV_MAX_ITERATIONS", "100")
            .parse::<u32>()
            .map_err(|e| EngineError::Config(format!("IV_MAX_ITERATIONS: {e}")))?;

        let iv_tolerance = var_or("IV_TOLERANCE", "1e-6")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("IV_TOLERANCE: {e}")))?;

        let portfolio_exposure = var_or("PORTFOLIO_EXPOSURE", "0.0")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("PORTFOLIO_EXPOSURE: {e}")))?;

        SignalConfig::new(edge_threshold, min_time_to_expiry)
            .map_err(|e| EngineError::Config(format!("EDGE_THRESHOLD / MIN_TIME_TO_EXPIRY: {e}")))?;
        if !(default_volatility.is_finite() && default_volatility > 0.0) {
            return Err(EngineError::Config(format!(
                "DEFAULT_VOLATILITY must be > 0, got {default_volatility}"
            )));
        }
        if !(iv_tolerance.is_finite() && iv_tolerance > 0.0) {
            return Err(EngineError::Config(format!(
                "IV_TOLERANCE must be > 0, got {iv_tolerance}"
            )));
        }

        Ok(Self {
            edge_threshold,
            min_time_to_expiry,
            default_volatility,
            iv_max_iterations,
            iv_tolerance,
            portfolio_exposure,
        })
    }

    pub fn signal(&self) -> SignalConfig {
        SignalConfig {
            edge_threshold: self.edge_threshold,
            min_time_to_expiry: self.min_time_to_expiry,
        }
    }

    /// Signal thresholds with an optional per-run edge threshold, validated
    /// the same way as `EDGE_THRESHOLD`.
    pub fn signal_with_threshold(&self, edge_threshold: Option<f64>) -> EngineResult<SignalConfig> {
        match edge_threshold {
            Some(threshold) => self.signal().with_edge_threshold(threshold),
            None => Ok(self.signal()),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            default_volatility: Some(self.default_volatility),
            solver: SolverConfig {
                max_iterations: self.iv_max_iterations,
                tolerance: self.iv_tolerance,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(cfg.signal(), SignalConfig::default());
        assert_eq!(cfg.engine(), EngineConfig::default());
        assert_eq!(cfg.portfolio_exposure, 0.0);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("EDGE_THRESHOLD", "0.15"),
            ("IV_MAX_ITERATIONS", "50"),
            ("PORTFOLIO_EXPOSURE", "1000"),
        ]))
        .expect("config");
        assert_eq!(cfg.signal().edge_threshold, 0.15);
        assert_eq!(cfg.engine().solver.max_iterations, 50);
        assert_eq!(cfg.portfolio_exposure, 1000.0);
    }

    #[test]
    fn test_bad_values_name_the_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[("IV_TOLERANCE", "tight")])).unwrap_err();
        assert!(err.to_string().contains("IV_TOLERANCE"), "{err}");

        let err = AppConfig::from_lookup(lookup_from(&[("EDGE_THRESHOLD", "0")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("MIN_TIME_TO_EXPIRY", "-1")])).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_threshold_override_is_validated() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(cfg.signal_with_threshold(None).expect("signal"), cfg.signal());

        let tuned = cfg.signal_with_threshold(Some(0.05)).expect("signal");
        assert_eq!(tuned.edge_threshold, 0.05);
        assert_eq!(tuned.min_time_to_expiry, cfg.min_time_to_expiry);

        for bad in [-0.1, 0.0, f64::NAN] {
            let err = cfg.signal_with_threshold(Some(bad)).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)), "threshold={bad}: {err}");
        }
    }
}
