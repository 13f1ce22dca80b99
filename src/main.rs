use bsm_signal::cli::{self, Command, OutputFormat};
use bsm_signal::config::AppConfig;
use bsm_signal::errors::EngineResult;
use bsm_signal::execution::signal;
use bsm_signal::models;
use bsm_signal::report;
use bsm_signal::risk::exposure;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Use --help for usage information.");
            std::process::exit(1);
        }
    };

    let args = match command {
        Command::Help => {
            println!("{}", cli::USAGE);
            return;
        }
        Command::Analyze(args) => args,
    };

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    match run(&args, &cfg) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// One analysis pass: price, optional signal, optional risk projection.
fn run(args: &cli::CliArgs, cfg: &AppConfig) -> EngineResult<String> {
    let (contract, market) = args.to_inputs(chrono::Utc::now())?;
    let engine = cfg.engine();

    let signal_cfg = cfg.signal_with_threshold(args.edge_threshold)?;

    tracing::info!(
        symbol = %contract.symbol,
        strike = contract.strike,
        option_type = %contract.option_type,
        spot = market.spot,
        "analyzing option"
    );

    let result = models::analyze(&contract, &market, args.volatility, &engine)?;

    let trading_signal = contract
        .current_price
        .map(|_| signal::evaluate(&contract, &market, args.volatility, &signal_cfg, &engine));

    let exposure_size = args.exposure.unwrap_or(cfg.portfolio_exposure);
    let risk = if exposure_size != 0.0 {
        Some(exposure::risk_metrics(&contract, &market, exposure_size, &engine)?)
    } else {
        None
    };

    let (trading_signal, risk) = (trading_signal.as_ref(), risk.as_ref());
    match args.output_format {
        OutputFormat::Json => report::render_json(&result, trading_signal, risk),
        OutputFormat::Text => Ok(report::render_text(&result, trading_signal, risk)),
    }
}
