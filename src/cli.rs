//! Command-line front end: flag parsing and the date / option-type formats
//! the analyzer accepts. Produces validated engine inputs, nothing more.

use crate::errors::{EngineError, EngineResult};
use crate::types::{MarketSnapshot, OptionContract, OptionType};
use chrono::{DateTime, NaiveDate, Utc};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d"];

pub const USAGE: &str = "\
Black-Scholes options trading analysis

USAGE:
  bsm_signal --symbol AAPL --strike 150 --expiry 2024-01-20 --type call \\
             --underlying-price 155 --risk-free-rate 0.05 [OPTIONS]

REQUIRED:
  --symbol <SYM>              underlying symbol
  --strike <PRICE>            strike price
  --expiry <DATE>             YYYY-MM-DD, MM/DD/YYYY, MM-DD-YYYY or YYYY/MM/DD
  --type <call|put|c|p>       option type
  --underlying-price <PRICE>  spot price of the underlying
  --risk-free-rate <RATE>     annualized, decimal (0.05 = 5%)

OPTIONS:
  --current-price <PRICE>     observed option price (enables the trading signal)
  --dividend-yield <RATE>     annualized, decimal (default 0)
  --volatility <VOL>          volatility estimate, decimal (0.25 = 25%)
  --edge-threshold <EDGE>     edge needed for BUY/SELL (default from EDGE_THRESHOLD or 0.10)
  --exposure <SIZE>           position size for risk metrics (default from PORTFOLIO_EXPOSURE)
  --output-format <text|json> default text
  -h, --help                  print this message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything the binary needs for one analysis run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliArgs {
    pub symbol: Option<String>,
    pub strike: Option<f64>,
    pub expiry: Option<String>,
    pub option_type: Option<String>,
    pub current_price: Option<f64>,
    pub underlying_price: Option<f64>,
    pub risk_free_rate: Option<f64>,
    pub dividend_yield: f64,
    pub volatility: Option<f64>,
    pub edge_threshold: Option<f64>,
    pub exposure: Option<f64>,
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Analyze(CliArgs),
}

/// Parse `--flag value` pairs (also `--flag=value`). The program name must
/// already be stripped.
pub fn parse_args<I>(args: I) -> EngineResult<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "-h" || arg == "--help" {
            return Ok(Command::Help);
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) => (f.to_string(), Some(v.to_string())),
            None => (arg.clone(), None),
        };
        if !flag.starts_with("--") {
            return Err(EngineError::Parse(format!("unexpected argument: {flag}")));
        }

        let value = match inline {
            Some(v) => v,
            None => iter
                .next()
                .ok_or_else(|| EngineError::Parse(format!("{flag} needs a value")))?,
        };

        match flag.as_str() {
            "--symbol" => out.symbol = Some(value),
            "--strike" => out.strike = Some(parse_number(&flag, &value)?),
            "--expiry" => out.expiry = Some(value),
            "--type" => out.option_type = Some(value),
            "--current-price" => out.current_price = Some(parse_number(&flag, &value)?),
            "--underlying-price" => out.underlying_price = Some(parse_number(&flag, &value)?),
            "--risk-free-rate" => out.risk_free_rate = Some(parse_number(&flag, &value)?),
            "--dividend-yield" => out.dividend_yield = parse_number(&flag, &value)?,
            "--volatility" => out.volatility = Some(parse_number(&flag, &value)?),
            "--edge-threshold" => out.edge_threshold = Some(parse_number(&flag, &value)?),
            "--exposure" => out.exposure = Some(parse_number(&flag, &value)?),
            "--output-format" => {
                out.output_format = match value.to_lowercase().as_str() {
                    "text" => OutputFormat::Text,
                    "json" => OutputFormat::Json,
                    other => {
                        return Err(EngineError::Parse(format!(
                            "invalid output format: {other}. Use 'text' or 'json'"
                        )))
                    }
                }
            }
            other => return Err(EngineError::Parse(format!("unknown flag: {other}"))),
        }
    }

    Ok(Command::Analyze(out))
}

fn parse_number(flag: &str, value: &str) -> EngineResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| EngineError::Parse(format!("{flag} {value:?}: {e}")))
}

/// Accepts YYYY-MM-DD, MM/DD/YYYY, MM-DD-YYYY and YYYY/MM/DD. Midnight UTC.
pub fn parse_date(input: &str) -> EngineResult<DateTime<Utc>> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            EngineError::Parse(format!(
                "invalid date format: {input}. Use YYYY-MM-DD or MM/DD/YYYY"
            ))
        })
}

/// `call`/`c` and `put`/`p`, case-insensitive.
pub fn parse_option_type(input: &str) -> EngineResult<OptionType> {
    match input.trim().to_lowercase().as_str() {
        "call" | "c" => Ok(OptionType::Call),
        "put" | "p" => Ok(OptionType::Put),
        _ => Err(EngineError::Parse(format!(
            "invalid option type: {input}. Use 'call' or 'put'"
        ))),
    }
}

impl CliArgs {
    /// Names of the required flags that were not supplied.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.symbol.is_none() {
            missing.push("--symbol");
        }
        if self.strike.is_none() {
            missing.push("--strike");
        }
        if self.expiry.is_none() {
            missing.push("--expiry");
        }
        if self.option_type.is_none() {
            missing.push("--type");
        }
        if self.underlying_price.is_none() {
            missing.push("--underlying-price");
        }
        if self.risk_free_rate.is_none() {
            missing.push("--risk-free-rate");
        }
        missing
    }

    /// Validated engine inputs, observed at `as_of`.
    pub fn to_inputs(
        &self,
        as_of: DateTime<Utc>,
    ) -> EngineResult<(OptionContract, MarketSnapshot)> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "missing required arguments: {}",
                missing.join(", ")
            )));
        }

        // All present after the check above.
        let (Some(symbol), Some(strike), Some(expiry), Some(kind), Some(spot), Some(rate)) = (
            self.symbol.as_deref(),
            self.strike,
            self.expiry.as_deref(),
            self.option_type.as_deref(),
            self.underlying_price,
            self.risk_free_rate,
        ) else {
            return Err(EngineError::InvalidInput("missing required arguments".into()));
        };

        let mut contract = OptionContract::new(
            symbol.trim().to_uppercase(),
            strike,
            parse_date(expiry)?,
            parse_option_type(kind)?,
        )?;
        if let Some(price) = self.current_price {
            contract = contract.with_current_price(price)?;
        }

        let market =
            MarketSnapshot::new(spot, rate, as_of)?.with_dividend_yield(self.dividend_yield)?;

        Ok((contract, market))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_date_formats() {
        for input in ["2024-01-20", "01/20/2024", "01-20-2024", "2024/01/20"] {
            let dt = parse_date(input).unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 20), "{input}");
        }
        assert!(parse_date("20 Jan 2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_option_type_tokens() {
        for t in ["call", "C", "Call", "c"] {
            assert_eq!(parse_option_type(t).expect("call"), OptionType::Call);
        }
        for t in ["put", "P", "PUT", "p"] {
            assert_eq!(parse_option_type(t).expect("put"), OptionType::Put);
        }
        assert!(parse_option_type("straddle").is_err());
    }

    #[test]
    fn test_full_command_line() {
        let cmd = parse_args(args(&[
            "--symbol", "aapl", "--strike", "150", "--expiry", "2024-01-20", "--type", "c",
            "--underlying-price", "155", "--risk-free-rate", "0.05", "--current-price=5.50",
            "--output-format", "json",
        ]))
        .expect("parse");
        let Command::Analyze(cli) = cmd else {
            panic!("expected analyze command");
        };
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert_eq!(cli.current_price, Some(5.5));

        let as_of = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).single().expect("valid date");
        let (contract, market) = cli.to_inputs(as_of).expect("inputs");
        assert_eq!(contract.symbol, "AAPL");
        assert_eq!(contract.option_type, OptionType::Call);
        assert_eq!(contract.current_price, Some(5.5));
        assert_eq!(market.dividend_yield, 0.0);
        assert_eq!(market.timestamp, as_of);
    }

    #[test]
    fn test_missing_required_reported_together() {
        let cmd = parse_args(args(&["--symbol", "TSLA", "--strike", "200"])).expect("parse");
        let Command::Analyze(cli) = cmd else {
            panic!("expected analyze command");
        };
        assert_eq!(
            cli.missing(),
            vec!["--expiry", "--type", "--underlying-price", "--risk-free-rate"]
        );
        let err = cli.to_inputs(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("--underlying-price"), "{err}");
    }

    #[test]
    fn test_help_and_bad_flags() {
        assert_eq!(parse_args(args(&["--strike", "1", "-h"])).expect("parse"), Command::Help);
        assert!(parse_args(args(&["--strike"])).is_err());
        assert!(parse_args(args(&["--strike", "abc"])).is_err());
        assert!(parse_args(args(&["--bogus", "1"])).is_err());
        assert!(parse_args(args(&["positional"])).is_err());
        assert!(parse_args(args(&["--output-format", "xml"])).is_err());
    }
}
