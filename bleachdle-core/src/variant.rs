use serde::Serialize;
use std::str::FromStr;

use crate::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Character, // attribute comparison
    Bankai,    // name only
    Schrift,   // name only
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Character => "character",
            VariantKind::Bankai => "bankai",
            VariantKind::Schrift => "schrift",
        }
    }
}

impl FromStr for VariantKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/').to_lowercase().as_str() {
            "character" => Ok(VariantKind::Character),
            "bankai" => Ok(VariantKind::Bankai),
            "schrift" => Ok(VariantKind::Schrift),
            _ => Err(SessionError::UnknownVariant(s.to_string())),
        }
    }
}

/// How a tracked attribute is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeKind {
    /// Plain value
    Text,
    /// Numeric value with an up/down hint towards the target
    Height,
    /// 1/0 coded flag shown as Yes/No
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedAttribute {
    pub key: String,
    pub title: String,
    pub kind: AttributeKind,
}

impl TrackedAttribute {
    pub fn new(key: impl Into<String>, title: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind,
        }
    }
}

/// One game page: which endpoint to compare against and which attributes
/// get a cell in the result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameVariant {
    pub kind: VariantKind,
    pub page_path: String,
    pub compare_endpoint: String,
    pub tracked_attributes: Vec<TrackedAttribute>,
}

impl GameVariant {
    pub fn character() -> Self {
        use AttributeKind::*;

        Self {
            kind: VariantKind::Character,
            page_path: "/character".to_string(),
            compare_endpoint: "/compare_character".to_string(),
            tracked_attributes: vec![
                TrackedAttribute::new("chr_gender", "Gender", Text),
                TrackedAttribute::new("chr_race", "Race", Text),
                TrackedAttribute::new("chr_location", "Location", Text),
                TrackedAttribute::new("chr_affiliation", "Affiliation", Text),
                TrackedAttribute::new("chr_division", "Division", Text),
                TrackedAttribute::new("chr_height", "Height", Height),
                TrackedAttribute::new("chr_arc", "Arc", Text),
                TrackedAttribute::new("chr_power", "Power", Flag),
            ],
        }
    }

    pub fn bankai() -> Self {
        Self::name_only(VariantKind::Bankai)
    }

    pub fn schrift() -> Self {
        Self::name_only(VariantKind::Schrift)
    }

    fn name_only(kind: VariantKind) -> Self {
        Self {
            kind,
            page_path: format!("/{}", kind.as_str()),
            compare_endpoint: format!("/compare_{}", kind.as_str()),
            tracked_attributes: Vec::new(),
        }
    }

    pub fn from_kind(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Character => Self::character(),
            VariantKind::Bankai => Self::bankai(),
            VariantKind::Schrift => Self::schrift(),
        }
    }

    /// Variant served at a page path, ignoring query string, fragment and
    /// trailing slash. Pages without a game (e.g. `/`) yield `None`.
    pub fn for_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return None;
        }
        path.parse::<VariantKind>().ok().map(Self::from_kind)
    }

    pub fn with_attribute(mut self, attribute: TrackedAttribute) -> Self {
        self.tracked_attributes.push(attribute);
        self
    }

    /// The attribute titles header only exists for attribute-comparison pages
    pub fn has_attribute_titles(&self) -> bool {
        !self.tracked_attributes.is_empty()
    }

    pub fn attribute_titles(&self) -> impl Iterator<Item = &str> {
        self.tracked_attributes.iter().map(|a| a.title.as_str())
    }
}
