//! Mispricing signal from a Black-Scholes fair value.
//!
//! edge = (fair - market) / market
//!
//!   edge >  threshold  -> BUY,  confidence = min(|edge| / threshold, 1)
//!   edge < -threshold  -> SELL, confidence = min(|edge| / threshold, 1)
//!   otherwise          -> HOLD, confidence = 1 - min(|edge| / threshold, 1)
//!
//! Contracts closer to expiry than `min_time_to_expiry` are AVOID at 0.8,
//! whatever the edge says.

use crate::errors::{EngineError, EngineResult};
use crate::models::{self, EngineConfig};
use crate::types::{ensure_positive, MarketSnapshot, OptionContract, SignalAction, TradingSignal};

/// Confidence attached to every AVOID signal.
const AVOID_CONFIDENCE: f64 = 0.8;

/// Evaluator thresholds. Stack-allocated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    /// Minimum |edge| for a BUY/SELL call (0.10 = 10%)
    pub edge_threshold: f64,
    /// Contracts with less than this many years left are avoided (~1 week)
    pub min_time_to_expiry: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 0.10,
            min_time_to_expiry: 0.02,
        }
    }
}

impl SignalConfig {
    /// A non-positive threshold would push confidence outside [0, 1].
    pub fn new(edge_threshold: f64, min_time_to_expiry: f64) -> EngineResult<Self> {
        ensure_positive("edge threshold", edge_threshold)?;
        if !(min_time_to_expiry.is_finite() && min_time_to_expiry >= 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "min time to expiry must be finite and >= 0, got {min_time_to_expiry}"
            )));
        }
        Ok(Self {
            edge_threshold,
            min_time_to_expiry,
        })
    }

    pub fn with_edge_threshold(self, edge_threshold: f64) -> EngineResult<Self> {
        Self::new(edge_threshold, self.min_time_to_expiry)
    }
}

/// Relative mispricing. Zero when the market price is not positive.
#[inline]
pub fn compute_edge(fair_value: f64, market_price: f64) -> f64 {
    if market_price > 0.0 {
        (fair_value - market_price) / market_price
    } else {
        0.0
    }
}

/// Action and confidence for a given edge and time left.
/// Pure function: same inputs always produce same output.
#[inline]
pub fn classify(edge: f64, time_to_expiry: f64, cfg: &SignalConfig) -> (SignalAction, f64) {
    if time_to_expiry < cfg.min_time_to_expiry {
        return (SignalAction::Avoid, AVOID_CONFIDENCE);
    }

    let strength = (edge.abs() / cfg.edge_threshold).min(1.0);

    if edge > cfg.edge_threshold {
        (SignalAction::Buy, strength)
    } else if edge < -cfg.edge_threshold {
        (SignalAction::Sell, strength)
    } else {
        // Small edge means high confidence the option is fairly priced
        (SignalAction::Hold, 1.0 - strength)
    }
}

/// Turn a contract + market snapshot into a trading recommendation.
///
/// Never fails: a missing market price or a failed analysis both come back
/// as HOLD with zero confidence and the reason in `reasoning`.
pub fn evaluate(
    contract: &OptionContract,
    market: &MarketSnapshot,
    volatility_override: Option<f64>,
    cfg: &SignalConfig,
    engine: &EngineConfig,
) -> TradingSignal {
    let Some(market_price) = contract.current_price else {
        return TradingSignal {
            action: SignalAction::Hold,
            confidence: 0.0,
            reasoning: "No market price available for analysis".to_string(),
            fair_value: 0.0,
            market_price: 0.0,
            edge: 0.0,
        };
    };

    let analysis = match models::analyze(contract, market, volatility_override, engine) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(symbol = %contract.symbol, error = %e, "analysis failed, holding");
            return TradingSignal {
                action: SignalAction::Hold,
                confidence: 0.0,
                reasoning: format!("Analysis failed: {e}"),
                fair_value: 0.0,
                market_price,
                edge: 0.0,
            };
        }
    };

    let fair_value = analysis.theoretical_price;
    let edge = compute_edge(fair_value, market_price);
    let time = models::time_to_expiry(contract.expiration, market.timestamp);
    let (action, confidence) = classify(edge, time, cfg);

    let valuation = format!("Fair value: ${fair_value:.2} vs Market: ${market_price:.2}");
    let rationale = match action {
        SignalAction::Avoid => {
            format!("Option expires too soon ({time:.3} years remaining). {valuation}")
        }
        SignalAction::Buy => format!("Option undervalued by {:.1}%. {valuation}", edge * 100.0),
        SignalAction::Sell => {
            format!("Option overvalued by {:.1}%. {valuation}", edge.abs() * 100.0)
        }
        SignalAction::Hold => {
            format!("Option fairly valued (edge: {:.1}%). {valuation}", edge * 100.0)
        }
    };
    let reasoning = format!(
        "{rationale}\nGreeks - Delta: {:.3}, Theta: {:.2}, Vega: {:.2}",
        analysis.delta, analysis.theta, analysis.vega
    );

    tracing::info!(
        symbol = %contract.symbol,
        action = %action,
        confidence,
        edge,
        fair_value,
        market_price,
        "signal evaluated"
    );

    TradingSignal {
        action,
        confidence,
        reasoning,
        fair_value,
        market_price,
        edge,
    }
}
