use crate::errors::EngineResult;
use crate::models::{self, EngineConfig};
use crate::types::{MarketSnapshot, OptionContract, RiskMetrics};

/// Project the contract's Greeks onto a position of size `portfolio_exposure`.
///
/// Max loss is the premium paid (the observed market price, or 0 when the
/// contract is unquoted). No decision logic lives here; analysis errors are
/// returned to the caller unchanged.
pub fn risk_metrics(
    contract: &OptionContract,
    market: &MarketSnapshot,
    portfolio_exposure: f64,
    engine: &EngineConfig,
) -> EngineResult<RiskMetrics> {
    let analysis = models::analyze(contract, market, None, engine)?;

    Ok(RiskMetrics {
        delta_exposure: analysis.delta * portfolio_exposure,
        gamma_risk: analysis.gamma * portfolio_exposure,
        theta_decay: analysis.theta * portfolio_exposure,
        vega_risk: analysis.vega * portfolio_exposure,
        max_loss: contract.current_price.unwrap_or(0.0),
        time_to_expiry: models::time_to_expiry(contract.expiration, market.timestamp),
    })
}
