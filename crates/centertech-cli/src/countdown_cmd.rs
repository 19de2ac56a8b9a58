//! Countdown subcommand.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use tracing::info;

use centertech_core::{Countdown, CountdownSnapshot, CountdownTicker};

fn render(snapshot: &CountdownSnapshot) -> String {
    if snapshot.finished {
        "Sorteio encerrado.".to_string()
    } else {
        format!("Faltam {snapshot}")
    }
}

/// Print the countdown to `target`, once or on every tick until it finishes
/// or the user interrupts.
pub async fn run(target: &str, once: bool) -> anyhow::Result<()> {
    let countdown = Countdown::parse(target)?;
    let mut out = io::stdout();

    let mut ticker = CountdownTicker::start_default(countdown);
    let mut snapshot = ticker.snapshot();
    writeln!(out, "{}", render(&snapshot))?;
    if once || snapshot.finished {
        ticker.stop().await;
        return Ok(());
    }

    loop {
        tokio::select! {
            next = ticker.changed() => {
                let Some(next) = next else { break };
                snapshot = next;
                writeln!(out, "{}", render(&snapshot))?;
                if snapshot.finished {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Countdown interrupted");
                break;
            }
        }
    }
    ticker.stop().await;
    Ok(())
}
