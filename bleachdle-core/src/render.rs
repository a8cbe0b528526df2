use std::sync::LazyLock;

use bleachdle_types::{CharacterSummary, GuessResult};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::{AttributeKind, GameVariant};

/// Static host serving the character portraits.
pub const DEFAULT_ASSET_HOST: &str = "https://bleach-web.s3.eu-north-1.amazonaws.com/static/images";

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Portrait address: lower-cased name with every whitespace run (leading and
/// trailing ones included) replaced by `_`, then `.png`.
pub fn portrait_url(asset_host: &str, name: &str) -> String {
    let lowered = name.to_lowercase();
    let file_stem = WHITESPACE_RE.replace_all(&lowered, "_");
    format!("{}/{}.png", asset_host.trim_end_matches('/'), file_stem)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Correct,
    Incorrect,
}

impl Tone {
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct { Tone::Correct } else { Tone::Incorrect }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Correct => "green",
            Tone::Incorrect => "red",
        }
    }
}

/// Direction from the guessed height towards the target height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeightHint {
    Up,
    Down,
}

impl HeightHint {
    pub fn arrow(&self) -> &'static str {
        match self {
            HeightHint::Up => "↑",
            HeightHint::Down => "↓",
        }
    }
}

/// `Up` iff target > guess, `Down` iff target < guess, nothing when equal or
/// when either side is not a number.
pub fn height_hint(target: Option<f64>, guess: Option<f64>) -> Option<HeightHint> {
    let (target, guess) = (target?, guess?);
    if target > guess {
        Some(HeightHint::Up)
    } else if target < guess {
        Some(HeightHint::Down)
    } else {
        None
    }
}

pub fn flag_text(value: Option<&Value>) -> &'static str {
    let set = match value {
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::Bool(b)) => *b,
        _ => false,
    };
    if set { "Yes" } else { "No" }
}

pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CellKind {
    Portrait { url: String },
    Name,
    Attribute { key: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub kind: CellKind,
    pub text: String,
    pub tone: Option<Tone>,
    pub hint: Option<HeightHint>,
    pub visible: bool,
}

impl CellView {
    fn hidden(kind: CellKind, text: String, tone: Option<Tone>) -> Self {
        Self {
            kind,
            text,
            tone,
            hint: None,
            visible: false,
        }
    }
}

/// Description of one result row; cells are in reveal order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub name: String,
    pub is_correct: bool,
    pub cells: Vec<CellView>,
}

impl RowView {
    pub fn cell(&self, index: usize) -> Option<&CellView> {
        self.cells.get(index)
    }

    pub fn attribute_cells(&self) -> impl Iterator<Item = &CellView> {
        self.cells
            .iter()
            .filter(|c| matches!(c.kind, CellKind::Attribute { .. }))
    }

    pub fn reveal(&mut self, index: usize) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) if !cell.visible => {
                cell.visible = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.cells.iter().all(|c| c.visible)
    }
}

/// Build the row for one guess. Every cell starts hidden.
pub fn render_row(variant: &GameVariant, result: &GuessResult, asset_host: &str) -> RowView {
    let name = result.character_data.name().unwrap_or_default().to_string();

    let mut cells = Vec::with_capacity(2 + variant.tracked_attributes.len());
    cells.push(CellView::hidden(
        CellKind::Portrait {
            url: portrait_url(asset_host, &name),
        },
        name.clone(),
        None,
    ));
    cells.push(CellView::hidden(
        CellKind::Name,
        name.clone(),
        Some(Tone::from_correct(result.is_correct)),
    ));

    for attribute in &variant.tracked_attributes {
        let value = result.character_data.get(&attribute.key);
        let tone = Tone::from_correct(result.is_attribute_correct(&attribute.key));

        let mut cell = match attribute.kind {
            AttributeKind::Flag => CellView::hidden(
                CellKind::Attribute {
                    key: attribute.key.clone(),
                },
                flag_text(value).to_string(),
                Some(tone),
            ),
            AttributeKind::Text | AttributeKind::Height => CellView::hidden(
                CellKind::Attribute {
                    key: attribute.key.clone(),
                },
                value_text(value),
                Some(tone),
            ),
        };

        if attribute.kind == AttributeKind::Height {
            cell.hint = height_hint(
                result.todays_character.number(&attribute.key),
                result.character_data.number(&attribute.key),
            );
        }

        cells.push(cell);
    }

    RowView {
        name,
        is_correct: result.is_correct,
        cells,
    }
}

/// One clickable entry in the suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionItem {
    pub name: String,
    pub portrait_url: String,
}

pub fn render_suggestions<'a>(
    results: impl IntoIterator<Item = &'a CharacterSummary>,
    asset_host: &str,
) -> Vec<SuggestionItem> {
    results
        .into_iter()
        .map(|summary| SuggestionItem {
            name: summary.name.clone(),
            portrait_url: portrait_url(asset_host, &summary.name),
        })
        .collect()
}
