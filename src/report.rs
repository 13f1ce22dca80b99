use crate::errors::EngineResult;
use crate::models::black_scholes::Greeks;
use crate::types::{PricingResult, RiskMetrics, TradingSignal, VolatilitySource};
use std::fmt::Write;

const RULE: &str = "============================================================";

#[derive(Debug, serde::Serialize)]
struct ReportJson<'a> {
    theoretical_price: f64,
    greeks: Greeks,
    implied_volatility: f64,
    volatility_source: VolatilitySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    trading_signal: Option<&'a TradingSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_metrics: Option<&'a RiskMetrics>,
}

pub fn render_json(
    result: &PricingResult,
    signal: Option<&TradingSignal>,
    risk: Option<&RiskMetrics>,
) -> EngineResult<String> {
    let report = ReportJson {
        theoretical_price: result.theoretical_price,
        greeks: Greeks {
            delta: result.delta,
            gamma: result.gamma,
            theta: result.theta,
            vega: result.vega,
            rho: result.rho,
        },
        implied_volatility: result.volatility,
        volatility_source: result.volatility_source,
        trading_signal: signal,
        risk_metrics: risk,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render_text(
    result: &PricingResult,
    signal: Option<&TradingSignal>,
    risk: Option<&RiskMetrics>,
) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "BLACK-SCHOLES ANALYSIS RESULTS");
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "\nTHEORETICAL PRICING:");
    let _ = writeln!(out, "  Fair Value:          ${:.2}", result.theoretical_price);
    let _ = writeln!(
        out,
        "  Volatility:          {:.1}% ({})",
        result.volatility * 100.0,
        result.volatility_source
    );

    let _ = writeln!(out, "\nTHE GREEKS:");
    let _ = writeln!(out, "  Delta:               {:.4}", result.delta);
    let _ = writeln!(out, "  Gamma:               {:.4}", result.gamma);
    let _ = writeln!(out, "  Theta:               ${:.2}/day", result.theta);
    let _ = writeln!(out, "  Vega:                ${:.2}/1% vol", result.vega);
    let _ = writeln!(out, "  Rho:                 ${:.2}/1% rate", result.rho);

    if let Some(s) = signal {
        let _ = writeln!(out, "\nTRADING RECOMMENDATION:");
        let _ = writeln!(out, "  Action:              {}", s.action);
        let _ = writeln!(out, "  Confidence:          {:.1}%", s.confidence * 100.0);
        let _ = writeln!(out, "  Edge:                {:.1}%", s.edge * 100.0);
        let _ = writeln!(out, "  Market Price:        ${:.2}", s.market_price);
        let _ = writeln!(out, "  Fair Value:          ${:.2}", s.fair_value);
        let _ = writeln!(out, "\n  Analysis:");
        for line in s.reasoning.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }

    if let Some(r) = risk {
        let _ = writeln!(out, "\nRISK METRICS:");
        for (name, value) in r.to_map() {
            let _ = writeln!(out, "  {name:<20} {value:.4}");
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    out
}
