pub mod black_scholes;
pub mod implied_vol;
pub mod volatility;

use crate::errors::{EngineError, EngineResult};
use crate::models::black_scholes::DAYS_PER_YEAR;
use crate::models::implied_vol::SolverConfig;
use crate::models::volatility::{resolve, strategy_chain, VolResolution};
use crate::types::{ensure_positive, MarketSnapshot, OptionContract, PricingResult};
use chrono::{DateTime, Utc};

const SECONDS_PER_YEAR: f64 = DAYS_PER_YEAR * 24.0 * 3600.0;

/// Pricing-side knobs. Passed explicitly to every `analyze` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Last resort in the volatility chain. `None` disables it.
    pub default_volatility: Option<f64>,
    pub solver: SolverConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_volatility: Some(0.30),
            solver: SolverConfig::default(),
        }
    }
}

/// Year fraction between `as_of` and `expiration`, clamped to >= 0.
#[inline]
pub fn time_to_expiry(expiration: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
    let secs = (expiration - as_of).num_milliseconds() as f64 / 1_000.0;
    (secs / SECONDS_PER_YEAR).max(0.0)
}

/// Price the contract and all five Greeks under the resolved volatility.
///
/// Volatility priority: `volatility_override`, implied vol solved from
/// `contract.current_price`, `contract.implied_volatility`, then
/// `config.default_volatility`. Fails with `VolatilityUnresolved` only when
/// every entry is missing or unusable.
pub fn analyze(
    contract: &OptionContract,
    market: &MarketSnapshot,
    volatility_override: Option<f64>,
    config: &EngineConfig,
) -> EngineResult<PricingResult> {
    if let Some(v) = volatility_override {
        ensure_positive("volatility override", v)?;
    }

    let time = time_to_expiry(contract.expiration, market.timestamp);
    let chain = strategy_chain(volatility_override, contract, config.default_volatility);

    let (vol, source) = match resolve(&chain, contract, market, time, &config.solver) {
        VolResolution::Resolved { value, source } => (value, source),
        VolResolution::Unresolved => {
            return Err(EngineError::VolatilityUnresolved(format!(
                "{} {} {}: no override, no solvable market price, no stored IV and no default",
                contract.symbol, contract.strike, contract.option_type
            )));
        }
    };

    tracing::debug!(
        symbol = %contract.symbol,
        vol,
        source = %source,
        time,
        "volatility resolved"
    );

    let (spot, strike, ot) = (market.spot, contract.strike, contract.option_type);
    let (rate, q) = (market.risk_free_rate, market.dividend_yield);

    let g = black_scholes::greeks(spot, strike, time, rate, vol, ot, q);
    let result = PricingResult {
        theoretical_price: black_scholes::price(spot, strike, time, rate, vol, ot, q),
        delta: g.delta,
        gamma: g.gamma,
        theta: g.theta,
        vega: g.vega,
        rho: g.rho,
        volatility: vol,
        volatility_source: source,
    };

    Ok(result)
}
