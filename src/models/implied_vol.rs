use crate::models::black_scholes::BsParams;
use crate::types::OptionType;

/// Starting point for every solve.
const INITIAL_VOL: f64 = 0.30;

/// Newton steps are clamped into this band before the next iteration.
const MIN_VOL: f64 = 0.001;
const MAX_VOL: f64 = 5.0;

/// Iteration cap and price tolerance for the Newton-Raphson solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub max_iterations: u32,
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Solve `price(sigma) = observed_price` for sigma by Newton-Raphson.
///
/// Returns `None` when the contract has no time left, when vega vanishes,
/// or when `max_iterations` pass without the price landing within
/// `tolerance`. Never returns a stale estimate.
///
/// The clamp alone does not guarantee convergence (deep ITM/OTM contracts can
/// bounce between the bounds where vega underflows); the iteration cap does.
#[allow(clippy::too_many_arguments)]
pub fn implied_volatility(
    observed_price: f64,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    option_type: OptionType,
    dividend_yield: f64,
    config: &SolverConfig,
) -> Option<f64> {
    if time <= 0.0 {
        return None;
    }

    let mut sigma = INITIAL_VOL;

    for iteration in 0..config.max_iterations {
        let params = BsParams::new(spot, strike, time, rate, sigma, dividend_yield);
        let diff = params.price(option_type) - observed_price;

        if diff.abs() < config.tolerance {
            tracing::debug!(iteration, sigma, "implied volatility converged");
            return Some(sigma);
        }

        let vega = params.vega_raw();
        if vega == 0.0 {
            tracing::debug!(iteration, sigma, "vega vanished, implied volatility not found");
            return None;
        }

        sigma = (sigma - diff / vega).clamp(MIN_VOL, MAX_VOL);
    }

    tracing::debug!(
        max_iterations = config.max_iterations,
        sigma,
        "implied volatility did not converge"
    );
    None
}
