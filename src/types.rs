use crate::errors::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ── Contract & Market Inputs ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Terminal payoff if exercised at `spot`.
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// A vanilla European option. Never mutated by the engine.
#[derive(Debug, Clone)]
pub struct OptionContract {
    pub symbol: String,
    pub strike: f64,
    pub expiration: DateTime<Utc>,
    pub option_type: OptionType,
    /// Observed market premium, if quoted.
    pub current_price: Option<f64>,
    /// Externally supplied implied volatility, if any.
    pub implied_volatility: Option<f64>,
}

impl OptionContract {
    pub fn new(
        symbol: impl Into<String>,
        strike: f64,
        expiration: DateTime<Utc>,
        option_type: OptionType,
    ) -> EngineResult<Self> {
        ensure_positive("strike", strike)?;
        Ok(Self {
            symbol: symbol.into(),
            strike,
            expiration,
            option_type,
            current_price: None,
            implied_volatility: None,
        })
    }

    pub fn with_current_price(mut self, price: f64) -> EngineResult<Self> {
        if !price.is_finite() || price < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "current price must be finite and >= 0, got {price}"
            )));
        }
        self.current_price = Some(price);
        Ok(self)
    }

    pub fn with_implied_volatility(mut self, vol: f64) -> EngineResult<Self> {
        ensure_positive("implied volatility", vol)?;
        self.implied_volatility = Some(vol);
        Ok(self)
    }
}

/// Market state observed at one instant.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub spot: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(spot: f64, risk_free_rate: f64, timestamp: DateTime<Utc>) -> EngineResult<Self> {
        ensure_positive("spot", spot)?;
        if !risk_free_rate.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "risk-free rate must be finite, got {risk_free_rate}"
            )));
        }
        Ok(Self {
            spot,
            risk_free_rate,
            dividend_yield: 0.0,
            timestamp,
        })
    }

    pub fn with_dividend_yield(mut self, q: f64) -> EngineResult<Self> {
        if !q.is_finite() || q < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "dividend yield must be finite and >= 0, got {q}"
            )));
        }
        self.dividend_yield = q;
        Ok(self)
    }
}

/// Strictly positive, finite scalar check shared by the constructors above.
pub fn ensure_positive(name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidInput(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

// ── Engine Outputs ──

/// Where the volatility behind a `PricingResult` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilitySource {
    Override,
    Solved,
    Stored,
    Default,
}

impl std::fmt::Display for VolatilitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Solved => write!(f, "solved"),
            Self::Stored => write!(f, "stored"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Theoretical price plus Greeks.
/// Theta is per calendar day; vega and rho are per 1 percentage point.
#[derive(Debug, Clone, Copy)]
pub struct PricingResult {
    pub theoretical_price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
    pub volatility: f64,
    pub volatility_source: VolatilitySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
    Avoid,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
            Self::Avoid => write!(f, "AVOID"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TradingSignal {
    pub action: SignalAction,
    /// Always in [0, 1].
    pub confidence: f64,
    pub reasoning: String,
    pub fair_value: f64,
    pub market_price: f64,
    pub edge: f64,
}

/// Greeks scaled by a position's exposure.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RiskMetrics {
    pub delta_exposure: f64,
    pub gamma_risk: f64,
    pub theta_decay: f64,
    pub vega_risk: f64,
    pub max_loss: f64,
    pub time_to_expiry: f64,
}

impl RiskMetrics {
    /// Named view in a stable order, for rendering.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("delta_exposure", self.delta_exposure),
            ("gamma_risk", self.gamma_risk),
            ("theta_decay", self.theta_decay),
            ("vega_risk", self.vega_risk),
            ("max_loss", self.max_loss),
            ("time_to_expiry", self.time_to_expiry),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic() {
        assert_eq!(OptionType::Call.intrinsic(155.0, 150.0), 5.0);
        assert_eq!(OptionType::Call.intrinsic(145.0, 150.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(145.0, 150.0), 5.0);
        assert_eq!(OptionType::Put.intrinsic(155.0, 150.0), 0.0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let now = Utc::now();
        assert!(OptionContract::new("AAPL", 0.0, now, OptionType::Call).is_err());
        assert!(OptionContract::new("AAPL", f64::NAN, now, OptionType::Call).is_err());
        assert!(MarketSnapshot::new(-1.0, 0.05, now).is_err());
        assert!(MarketSnapshot::new(100.0, f64::INFINITY, now).is_err());

        let market = MarketSnapshot::new(100.0, -0.01, now).expect("negative rate is valid");
        assert!(market.clone().with_dividend_yield(-0.01).is_err());
        assert!(market.with_dividend_yield(0.02).is_ok());

        let contract = OptionContract::new("AAPL", 150.0, now, OptionType::Put).expect("valid");
        assert!(contract.clone().with_implied_volatility(0.0).is_err());
        assert!(contract.with_current_price(-2.0).is_err());
    }

    #[test]
    fn test_action_serializes_uppercase() {
        let json = serde_json::to_string(&SignalAction::Avoid).expect("serialize");
        assert_eq!(json, "\"AVOID\"");
        let json = serde_json::to_string(&VolatilitySource::Solved).expect("serialize");
        assert_eq!(json, "\"solved\"");
    }

    #[test]
    fn test_risk_map_keys() {
        let metrics = RiskMetrics {
            delta_exposure: 1.0,
            gamma_risk: 2.0,
            theta_decay: 3.0,
            vega_risk: 4.0,
            max_loss: 5.0,
            time_to_expiry: 6.0,
        };
        let map = metrics.to_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map["vega_risk"], 4.0);
        assert_eq!(map["time_to_expiry"], 6.0);
    }
}
