//! `mealwise reset` command: erase the durable progress history.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use mealwise_core::progress::ProgressLog;
use mealwise_core::wizard::{ResetKind, Wizard};

/// Ask `prompt` on `out` and read a yes/no answer from `input`.
fn confirm(prompt: &str, mut input: impl BufRead, mut out: impl Write) -> Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Perform a full reset once confirmed. Returns whether anything was erased.
pub fn reset_history(
    log: &mut ProgressLog,
    yes: bool,
    input: impl BufRead,
    out: impl Write,
) -> Result<bool> {
    let mut wizard = Wizard::new();
    wizard.request_reset(ResetKind::Full);

    if !yes && !confirm(ResetKind::Full.confirmation_prompt(), input, out)? {
        wizard.cancel_reset();
        return Ok(false);
    }

    let entries = log.len();
    wizard
        .confirm_reset(log)
        .context("failed to erase progress history")?;
    tracing::info!(entries, "progress history erased");
    Ok(true)
}

pub fn run_reset(log: &mut ProgressLog, yes: bool) -> Result<()> {
    let erased = reset_history(
        log,
        yes,
        std::io::stdin().lock(),
        std::io::stdout().lock(),
    )?;
    if erased {
        println!("Plan and history reset.");
    } else {
        println!("Nothing was changed.");
    }
    Ok(())
}
