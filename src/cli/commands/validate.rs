//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::load_config;

pub async fn run(config_path: &Path, verbose: bool) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    let setup = config.strategy.setup();
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!(
        "Market: {} {} ({:?} feed)",
        config.exchange.symbol, config.exchange.interval, config.exchange.feed
    );
    println!("Selection: {:?}", setup.selection);
    for overlay in &setup.overlays {
        println!("Overlay: {}", overlay);
    }
    println!(
        "Sizing: strong buy {}, buy {}, strong sell {}, sell {}, min notional {}",
        config.sizing.strong_buy_fraction,
        config.sizing.buy_fraction,
        config.sizing.strong_sell_fraction,
        config.sizing.sell_fraction,
        config.sizing.min_notional
    );
    println!(
        "Paper wallet: {} quote, {} base",
        config.paper.initial_quote, config.paper.initial_base
    );

    if verbose {
        println!();
        println!("Effective configuration:");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}
