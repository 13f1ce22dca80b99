//! European Black-Scholes-Merton pricing with continuous dividend yield.
//!
//! S' = S * exp(-q*T)
//! d1 = (ln(S'/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
//! d2 = d1 - sigma * sqrt(T)
//!
//! Every public function checks `time <= 0` first and returns the
//! closed-form expiry value without touching ln/sqrt/division.
//! For `time > 0` the caller must supply `vol > 0`.

use crate::types::OptionType;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Calendar days per year, used for both year fractions and daily theta.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Greeks reported per 1 percentage point rather than per unit.
const PCT_POINT: f64 = 100.0;

/// Shared intermediate terms for one (spot, strike, time, rate, vol, q) tuple.
/// Built once per call site; the same inputs always yield bit-identical d1/d2.
#[derive(Debug, Clone, Copy)]
pub struct BsParams {
    pub spot: f64,
    pub strike: f64,
    pub time: f64,
    pub rate: f64,
    pub vol: f64,
    pub dividend_yield: f64,
    // Precomputed
    pub sqrt_t: f64,
    pub div_factor: f64,
    pub adjusted_spot: f64,
    pub discount: f64,
    pub d1: f64,
    pub d2: f64,
}

impl BsParams {
    /// Only valid for `time > 0` and `vol > 0`.
    #[inline]
    pub fn new(
        spot: f64,
        strike: f64,
        time: f64,
        rate: f64,
        vol: f64,
        dividend_yield: f64,
    ) -> Self {
        let sqrt_t = time.sqrt();
        let sigma_sqrt_t = vol * sqrt_t;
        let div_factor = (-dividend_yield * time).exp();
        let adjusted_spot = spot * div_factor;
        let discount = (-rate * time).exp();
        let d1 = ((adjusted_spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;
        Self {
            spot,
            strike,
            time,
            rate,
            vol,
            dividend_yield,
            sqrt_t,
            div_factor,
            adjusted_spot,
            discount,
            d1,
            d2,
        }
    }

    #[inline]
    pub fn price(&self, option_type: OptionType) -> f64 {
        match option_type {
            OptionType::Call => {
                self.adjusted_spot * norm_cdf(self.d1)
                    - self.strike * self.discount * norm_cdf(self.d2)
            }
            OptionType::Put => {
                self.strike * self.discount * norm_cdf(-self.d2)
                    - self.adjusted_spot * norm_cdf(-self.d1)
            }
        }
    }

    #[inline]
    pub fn delta(&self, option_type: OptionType) -> f64 {
        match option_type {
            OptionType::Call => self.div_factor * norm_cdf(self.d1),
            OptionType::Put => -self.div_factor * norm_cdf(-self.d1),
        }
    }

    #[inline]
    pub fn gamma(&self) -> f64 {
        self.div_factor * norm_pdf(self.d1) / (self.spot * self.vol * self.sqrt_t)
    }

    /// Per calendar day.
    #[inline]
    pub fn theta(&self, option_type: OptionType) -> f64 {
        let decay = -self.adjusted_spot * norm_pdf(self.d1) * self.vol / (2.0 * self.sqrt_t);
        let annual = match option_type {
            OptionType::Call => {
                decay + self.dividend_yield * self.adjusted_spot * norm_cdf(self.d1)
                    - self.rate * self.strike * self.discount * norm_cdf(self.d2)
            }
            OptionType::Put => {
                decay - self.dividend_yield * self.adjusted_spot * norm_cdf(-self.d1)
                    + self.rate * self.strike * self.discount * norm_cdf(-self.d2)
            }
        };
        annual / DAYS_PER_YEAR
    }

    /// dPrice/dSigma per unit of volatility. The Newton step needs this form.
    #[inline]
    pub fn vega_raw(&self) -> f64 {
        self.adjusted_spot * norm_pdf(self.d1) * self.sqrt_t
    }

    /// Per 1 percentage point of volatility.
    #[inline]
    pub fn vega(&self) -> f64 {
        self.vega_raw() / PCT_POINT
    }

    /// Per 1 percentage point of rate.
    #[inline]
    pub fn rho(&self, option_type: OptionType) -> f64 {
        let scale = self.strike * self.time * self.discount;
        let raw = match option_type {
            OptionType::Call => scale * norm_cdf(self.d2),
            OptionType::Put => -scale * norm_cdf(-self.d2),
        };
        raw / PCT_POINT
    }
}

/// The five sensitivities, in the same units as `PricingResult`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

/// Standard normal CDF.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal PDF.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    Normal::standard().pdf(x)
}

pub fn price(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
    dividend_yield: f64,
) -> f64 {
    if time <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }
    BsParams::new(spot, strike, time, rate, vol, dividend_yield).price(option_type)
}

pub fn delta(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
    dividend_yield: f64,
) -> f64 {
    if time <= 0.0 {
        return expiry_delta(spot, strike, option_type);
    }
    BsParams::new(spot, strike, time, rate, vol, dividend_yield).delta(option_type)
}

pub fn gamma(spot: f64, strike: f64, time: f64, rate: f64, vol: f64, dividend_yield: f64) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    BsParams::new(spot, strike, time, rate, vol, dividend_yield).gamma()
}

pub fn theta(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
    dividend_yield: f64,
) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    BsParams::new(spot, strike, time, rate, vol, dividend_yield).theta(option_type)
}

pub fn vega(spot: f64, strike: f64, time: f64, rate: f64, vol: f64, dividend_yield: f64) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    BsParams::new(spot, strike, time, rate, vol, dividend_yield).vega()
}

pub fn rho(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
    dividend_yield: f64,
) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    BsParams::new(spot, strike, time, rate, vol, dividend_yield).rho(option_type)
}

/// All five Greeks from a single `BsParams`. Matches the individual functions exactly.
pub fn greeks(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
    dividend_yield: f64,
) -> Greeks {
    if time <= 0.0 {
        return Greeks {
            delta: expiry_delta(spot, strike, option_type),
            gamma: 0.0,
            theta: 0.0,
            vega: 0.0,
            rho: 0.0,
        };
    }
    let p = BsParams::new(spot, strike, time, rate, vol, dividend_yield);
    Greeks {
        delta: p.delta(option_type),
        gamma: p.gamma(),
        theta: p.theta(option_type),
        vega: p.vega(),
        rho: p.rho(option_type),
    }
}

#[inline]
fn expiry_delta(spot: f64, strike: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => {
            if spot > strike { 1.0 } else { 0.0 }
        }
        OptionType::Put => {
            if spot < strike { -1.0 } else { 0.0 }
        }
    }
}
