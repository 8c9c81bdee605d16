use super::{alerts, rates, ui};
use crate::core::alert::AlertBook;
use crate::core::poller::{PollState, Poller};
use anyhow::{Context, Result};
use chrono::Local;
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub fn render_frame(
    state: &PollState,
    book: &AlertBook,
    palette: &ui::Palette,
    refetch_interval: Duration,
) -> String {
    let mut output = match (&state.snapshot, &state.error) {
        (Some(snapshot), error) => {
            let mut output = rates::render(snapshot, error.as_ref(), palette);
            for line in alerts::render_triggered(book, snapshot) {
                output.push('\n');
                output.push_str(&line);
            }
            output
        }
        (None, Some(err)) => ui::style_text(
            &format!("Could not load rates: {err}"),
            ui::StyleType::Error,
        ),
        (None, None) => ui::style_text("Loading rates...", ui::StyleType::Subtle),
    };

    let last_checked = state
        .polled_at
        .map(|at| format!(" Last checked {}.", at.with_timezone(&Local).format("%H:%M:%S")))
        .unwrap_or_default();
    output.push_str("\n\n");
    output.push_str(&ui::style_text(
        &format!(
            "Refreshing every {}s.{} Type r + Enter to refresh now, q + Enter to quit.",
            refetch_interval.as_secs(),
            last_checked
        ),
        ui::StyleType::Subtle,
    ));
    output
}

/// Forwards stdin lines from a detached thread. The runtime does not wait on it at exit.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Resolves once `q` is typed, dropping any other line. Never resolves after
/// stdin closes.
async fn quit_requested(input: &mut mpsc::UnboundedReceiver<String>) {
    while let Some(line) = input.recv().await {
        if line.trim() == "q" {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// Redraws the rates on every tick until the user quits or hits Ctrl-C.
pub async fn run(
    poller: &mut Poller,
    book: &AlertBook,
    palette: &ui::Palette,
    refetch_interval: Duration,
) -> Result<()> {
    let term = console::Term::stdout();
    let mut ticker = poller.ticker();
    let mut input = spawn_input_reader();
    let mut input_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let force = tokio::select! {
            _ = ticker.tick() => false,
            line = input.recv(), if input_open => match line {
                Some(line) => match line.trim() {
                    "q" => break,
                    "r" => {
                        ticker.reset();
                        true
                    }
                    _ => continue,
                },
                None => {
                    debug!("Input closed, refreshing on timer only");
                    input_open = false;
                    continue;
                }
            },
            _ = &mut ctrl_c => break,
        };

        // A slow or retrying poll must still honour quit requests
        let state = tokio::select! {
            state = poller.poll(force) => state,
            _ = quit_requested(&mut input) => break,
            _ = &mut ctrl_c => break,
        };
        term.clear_screen().context("Failed to clear terminal")?;
        println!("{}", render_frame(state, book, palette, refetch_interval));
    }

    Ok(())
}
