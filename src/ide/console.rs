//! Console implementation of [`HostBridge`] for the `wpilib-prefs` binary.

use super::{HostBridge, InputValidator, PickItem};
use async_trait::async_trait;
use std::io::{self, Write};
use tracing::debug;

/// Prompts on stdout, answers from stdin. EOF on stdin counts as a dismissal.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        Self
    }
}

fn read_line() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input),
        Err(_) => None,
    }
}

#[async_trait]
impl HostBridge for ConsoleHost {
    async fn show_message(&self, message: &str, actions: &[&str]) -> Option<String> {
        println!("{message}");
        for (i, action) in actions.iter().enumerate() {
            println!("  [{i}] {action}");
        }
        print!(
            "Pick an option [0-{}], or Enter to cancel: ",
            actions.len().saturating_sub(1)
        );
        io::stdout().flush().ok()?;

        let line = read_line()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let index: usize = trimmed.parse().ok()?;
        actions.get(index).map(|action| action.to_string())
    }

    async fn request_input(&self, prompt: &str, validate: &InputValidator) -> Option<String> {
        loop {
            print!("{prompt}: ");
            io::stdout().flush().ok()?;

            let line = read_line()?;
            let entry = line.trim().to_string();
            if entry.is_empty() {
                return None;
            }
            match validate(&entry) {
                Some(message) => println!("{message}"),
                None => return Some(entry),
            }
        }
    }

    async fn pick_many(&self, items: Vec<PickItem>) -> Option<Vec<PickItem>> {
        for (i, item) in items.iter().enumerate() {
            let mark = if item.picked { "x" } else { " " };
            println!("  [{mark}] [{i}] {}  ({})", item.label, item.description);
        }
        print!("Numbers to select (comma-separated, blank for none, q to cancel): ");
        io::stdout().flush().ok()?;

        let line = read_line()?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("q") {
            return None;
        }

        let mut picked = Vec::new();
        for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let index: usize = part.parse().ok()?;
            picked.push(items.get(index)?.clone());
        }
        Some(picked)
    }

    async fn set_context_flag(&self, key: &str, value: bool) {
        // No UI conditionals on a terminal; keep the flag visible in logs.
        debug!(key, value, "context flag");
    }
}
