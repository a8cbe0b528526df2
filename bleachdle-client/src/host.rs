use std::fmt::Write;
use std::str::FromStr;

use tokio::sync::mpsc;
use tracing::debug;

use bleachdle_core::{
    CellKind, CellView, GameVariant, NavIndicator, NavStyle, PageView, SessionEvent,
    SessionEventHandler,
};

use crate::error::ClientError;

const HIDDEN_CELL: &str = "???";

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text goes to the search box; empty text hides the list
    Query(String),
    /// Zero-based index into the visible suggestions
    Pick(usize),
    Go(String),
    /// Click outside the search box
    Dismiss,
    Close,
    Dump,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ClientError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let Some(rest) = line.trim().strip_prefix(':') else {
            return Ok(Command::Query(line.trim().to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (name, arg) {
            ("pick" | "p", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::Pick(n - 1)),
                _ => Err(ClientError::Command(format!(
                    "suggestion number must be 1 or more, got {:?}",
                    n
                ))),
            },
            ("pick" | "p", None) => Err(ClientError::Command("usage: :pick <n>".to_string())),
            ("go" | "g", Some(path)) => Ok(Command::Go(path.to_string())),
            ("go" | "g", None) => Err(ClientError::Command("usage: :go <path>".to_string())),
            ("clear", _) => Ok(Command::Dismiss),
            ("close", _) => Ok(Command::Close),
            ("dump", _) => Ok(Command::Dump),
            ("help" | "h", _) => Ok(Command::Help),
            ("quit" | "q", _) => Ok(Command::Quit),
            (other, _) => Err(ClientError::Command(format!("unknown command :{}", other))),
        }
    }
}

pub const HELP: &str = "\
type a name to search
:pick <n>   guess suggestion n
:go <path>  open another page (/character, /bankai, /schrift)
:clear      clear the search box and hide suggestions
:close      close the congratulations panel
:dump       print the page state as JSON
:quit       exit";

/// Forwards alert text to the terminal loop.
pub struct AlertForwarder {
    sender: mpsc::UnboundedSender<String>,
}

impl AlertForwarder {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

impl SessionEventHandler for AlertForwarder {
    fn handle_event(&mut self, event: SessionEvent) {
        debug!("Session event: {:?}", event);
        if let Some(alert) = event.alert() {
            // The terminal loop may already be gone during shutdown
            let _ = self.sender.send(alert.to_string());
        }
    }
}

fn cell_text(cell: &CellView) -> String {
    if !cell.visible {
        return HIDDEN_CELL.to_string();
    }

    let mut text = cell.text.clone();
    if let Some(hint) = cell.hint {
        text.push_str(hint.arrow());
    }
    if let Some(tone) = cell.tone {
        let _ = write!(text, " ({})", tone.css_class());
    }
    text
}

/// Plain-text drawing of a game page.
pub fn render_page(view: &PageView, variant: &GameVariant) -> String {
    let mut out = String::new();

    if view.search_box.visible {
        let state = if view.search_box.enabled { "" } else { " (disabled)" };
        let _ = writeln!(out, "search: [{}]{}", view.search_box.value, state);
    }

    if view.suggestions.visible {
        for (i, item) in view.suggestions.items.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, item.name);
        }
    }

    if view.attribute_titles_visible {
        let titles: Vec<&str> = std::iter::once("Name")
            .chain(variant.attribute_titles())
            .collect();
        let _ = writeln!(out, "{}", titles.join(" | "));
    }

    for row in &view.rows {
        let cells: Vec<String> = row
            .view
            .cells
            .iter()
            .filter(|c| !matches!(c.kind, CellKind::Portrait { .. }))
            .map(cell_text)
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }

    if view.congratulations_visible {
        let countdown = view.countdown_text.as_deref().unwrap_or("--:--:--");
        let _ = writeln!(out, "Congratulations! Next puzzle in {}", countdown);
    }

    out
}

pub fn render_indicators(indicators: &[NavIndicator]) -> String {
    indicators
        .iter()
        .map(|i| match i.style {
            NavStyle::GoldGlow => format!("({})", i.href),
            NavStyle::GrayBorder => i.href.clone(),
        })
        .collect::<Vec<_>>()
        .join("  ")
}
