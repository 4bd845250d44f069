use std::fmt::Display;

use console::{style, StyledObject};

// Step states
pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn done(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn failed(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

/// Project names and indexes in the picker.
pub fn highlight(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn title(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Tag printed in front of a notification.
pub fn level_tag(level: &str) -> StyledObject<String> {
    let tag = style(format!("[{level}]")).bold();
    match level {
        "error" => tag.red(),
        "warn" => tag.yellow(),
        _ => tag.green(),
    }
}
