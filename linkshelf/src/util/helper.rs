// src/util/helper.rs
use std::io::{self, IsTerminal, Write};

/// Interactive confirmation prompt; anything but y/yes declines
pub fn confirm(prompt: &str) -> bool {
    eprint!("{} (y/N): ", prompt);
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut user_input = String::new();
    if io::stdin().read_line(&mut user_input).is_err() {
        return false;
    }
    is_yes(&user_input)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn is_stdout_piped() -> bool {
    !io::stdout().is_terminal()
}

/// Shorten `text` to `max_length` characters, marking the cut with "..."
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(3);
    format!("{}...", text.chars().take(keep).collect::<String>())
}
