//! List strategies command.

use anyhow::Result;
use trading_risk::{BreakoutOverlay, OverlayKind};
use trading_strategies::StrategyRegistry;

pub async fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} [{}]", info.name, info.kind);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  defaults: {}", info.default_config);
        println!();
    }

    println!("Overlays (stack with --overlay, innermost first)");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!(
        "  {}  crash:<drop>     sell on a sharp drop, hold if oversold",
        OverlayKind::CrashProtection {
            drop_threshold: 0.05
        }
    );
    for overlay in [BreakoutOverlay::high_risk(), BreakoutOverlay::low_risk()] {
        let profile = overlay.profile();
        println!(
            "  {}  lookback {}, volume x{}, RSI {}-{}, pump +{}% over EMA({})",
            profile.name,
            profile.lookback,
            profile.volume_multiplier,
            profile.rsi_low,
            profile.rsi_high,
            profile.pump_threshold * 100.0,
            profile.pump_ema_period
        );
    }
    println!();
    println!("Use --strategy adaptive to let the ADX regime selector choose.");

    Ok(())
}
