use crate::models::implied_vol::{implied_volatility, SolverConfig};
use crate::types::{MarketSnapshot, OptionContract, VolatilitySource};

/// One way of obtaining a volatility for `analyze`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolStrategy {
    /// Caller-supplied value.
    Override(f64),
    /// Newton-Raphson solve against `contract.current_price`.
    SolveFromPrice,
    /// `contract.implied_volatility`.
    Stored,
    /// Fixed fallback.
    Default(f64),
}

impl VolStrategy {
    fn source(&self) -> VolatilitySource {
        match self {
            Self::Override(_) => VolatilitySource::Override,
            Self::SolveFromPrice => VolatilitySource::Solved,
            Self::Stored => VolatilitySource::Stored,
            Self::Default(_) => VolatilitySource::Default,
        }
    }
}

/// Outcome of walking a strategy list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolResolution {
    Resolved { value: f64, source: VolatilitySource },
    Unresolved,
}

/// Priority order: override, solve from market price, stored IV, default.
/// Entries that cannot apply (no override, no price, no stored IV, default
/// disabled) are left out.
pub fn strategy_chain(
    override_vol: Option<f64>,
    contract: &OptionContract,
    default_vol: Option<f64>,
) -> Vec<VolStrategy> {
    let mut chain = Vec::with_capacity(4);
    if let Some(v) = override_vol {
        chain.push(VolStrategy::Override(v));
    }
    if contract.current_price.is_some() {
        chain.push(VolStrategy::SolveFromPrice);
    }
    if contract.implied_volatility.is_some() {
        chain.push(VolStrategy::Stored);
    }
    if let Some(v) = default_vol {
        chain.push(VolStrategy::Default(v));
    }
    chain
}

/// Evaluate `chain` in order and return the first usable volatility.
/// A value is usable when it is finite and strictly positive.
pub fn resolve(
    chain: &[VolStrategy],
    contract: &OptionContract,
    market: &MarketSnapshot,
    time: f64,
    solver: &SolverConfig,
) -> VolResolution {
    for strategy in chain {
        let candidate = match *strategy {
            VolStrategy::Override(v) | VolStrategy::Default(v) => Some(v),
            VolStrategy::Stored => contract.implied_volatility,
            VolStrategy::SolveFromPrice => contract.current_price.and_then(|observed| {
                implied_volatility(
                    observed,
                    market.spot,
                    contract.strike,
                    time,
                    market.risk_free_rate,
                    contract.option_type,
                    market.dividend_yield,
                    solver,
                )
            }),
        };

        match candidate {
            Some(value) if value.is_finite() && value > 0.0 => {
                return VolResolution::Resolved {
                    value,
                    source: strategy.source(),
                };
            }
            _ => {
                tracing::debug!(?strategy, "volatility strategy yielded nothing, trying next");
            }
        }
    }
    VolResolution::Unresolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::price;
    use crate::types::OptionType;
    use chrono::{Duration, Utc};

    fn fixtures() -> (OptionContract, MarketSnapshot) {
        let now = Utc::now();
        let expiry = now + Duration::days(91);
        let contract =
            OptionContract::new("AAPL", 150.0, expiry, OptionType::Call).expect("contract");
        let market = MarketSnapshot::new(155.0, 0.05, now).expect("market");
        (contract, market)
    }

    #[test]
    fn test_chain_order() {
        let (contract, _) = fixtures();
        let contract = contract
            .with_current_price(9.0)
            .and_then(|c| c.with_implied_volatility(0.4))
            .expect("contract");
        let chain = strategy_chain(Some(0.2), &contract, Some(0.3));
        assert_eq!(
            chain,
            vec![
                VolStrategy::Override(0.2),
                VolStrategy::SolveFromPrice,
                VolStrategy::Stored,
                VolStrategy::Default(0.3),
            ]
        );

        let (bare, _) = fixtures();
        assert!(strategy_chain(None, &bare, None).is_empty());
    }

    #[test]
    fn test_override_wins() {
        let (contract, market) = fixtures();
        let contract = contract.with_current_price(9.0).expect("contract");
        let chain = strategy_chain(Some(0.42), &contract, Some(0.3));
        let res = resolve(&chain, &contract, &market, 0.25, &SolverConfig::default());
        assert_eq!(
            res,
            VolResolution::Resolved {
                value: 0.42,
                source: VolatilitySource::Override
            }
        );
    }

    #[test]
    fn test_solves_from_price() {
        let (contract, market) = fixtures();
        let observed = price(155.0, 150.0, 0.25, 0.05, 0.35, OptionType::Call, 0.0);
        let contract = contract
            .with_current_price(observed)
            .and_then(|c| c.with_implied_volatility(0.9))
            .expect("contract");
        let chain = strategy_chain(None, &contract, Some(0.3));
        match resolve(&chain, &contract, &market, 0.25, &SolverConfig::default()) {
            VolResolution::Resolved { value, source } => {
                assert_eq!(source, VolatilitySource::Solved);
                assert!((value - 0.35).abs() < 1e-4, "solved vol={value}");
            }
            other => panic!("expected solved vol, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_solve_falls_through() {
        let (contract, market) = fixtures();
        // Unreachable premium: the solver gives up, stored IV takes over.
        let contract = contract
            .with_current_price(1_000.0)
            .and_then(|c| c.with_implied_volatility(0.55))
            .expect("contract");
        let chain = strategy_chain(None, &contract, Some(0.3));
        let res = resolve(&chain, &contract, &market, 0.25, &SolverConfig::default());
        assert_eq!(
            res,
            VolResolution::Resolved {
                value: 0.55,
                source: VolatilitySource::Stored
            }
        );

        let (contract, _) = fixtures();
        let contract = contract.with_current_price(1_000.0).expect("contract");
        let chain = strategy_chain(None, &contract, Some(0.3));
        let res = resolve(&chain, &contract, &market, 0.25, &SolverConfig::default());
        assert_eq!(
            res,
            VolResolution::Resolved {
                value: 0.3,
                source: VolatilitySource::Default
            }
        );
    }

    #[test]
    fn test_unresolved_without_default() {
        let (contract, market) = fixtures();
        let contract = contract.with_current_price(1_000.0).expect("contract");
        let chain = strategy_chain(None, &contract, None);
        let res = resolve(&chain, &contract, &market, 0.25, &SolverConfig::default());
        assert_eq!(res, VolResolution::Unresolved);
    }

    #[test]
    fn test_non_positive_override_skipped() {
        let (contract, market) = fixtures();
        let chain = strategy_chain(Some(0.0), &contract, Some(0.3));
        let res = resolve(&chain, &contract, &market, 0.25, &SolverConfig::default());
        assert_eq!(
            res,
            VolResolution::Resolved {
                value: 0.3,
                source: VolatilitySource::Default
            }
        );
    }
}
