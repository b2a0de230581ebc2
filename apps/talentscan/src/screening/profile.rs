//! Profile Parser — turns a free-text job description into required/desired attribute lists.
//!
//! The format is line oriented:
//!
//! ```text
//! ATRIBUTOS REQUERIDOS
//! - Python
//! - SQL
//! ATRIBUTOS DESEJÁVEIS
//! - Docker
//! ```
//!
//! A header switches the active section; `-` bullets under an active section
//! become attributes. Everything else is ignored.

use serde::{Deserialize, Serialize};

/// A named qualification evaluated against every candidate.
pub type AttributeName = String;

/// Substrings (lowercase) that mark the start of the required section.
const REQUIRED_MARKERS: &[&str] = &[
    "requeridos",
    "requerido",
    "obrigatórios",
    "obrigatorios",
    "required",
    "requirements",
];

/// Substrings (lowercase) that mark the start of the desired section.
const DESIRED_MARKERS: &[&str] = &[
    "desejáveis",
    "desejaveis",
    "desejável",
    "desejavel",
    "diferencial",
    "diferenciais",
    "desired",
    "nice to have",
    "preferred",
];

const BULLET: char = '-';

/// Structured job profile. Built once per run and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    #[serde(rename = "requeridos")]
    pub required: Vec<AttributeName>,
    #[serde(rename = "desejaveis")]
    pub desired: Vec<AttributeName>,
}

impl JobProfile {
    /// Builds a profile, dropping desired entries that are also required.
    pub fn new(required: Vec<AttributeName>, desired: Vec<AttributeName>) -> Self {
        let desired = desired
            .into_iter()
            .filter(|attr| !required.contains(attr))
            .collect();
        Self { required, desired }
    }

    /// Required attributes followed by desired ones, in profile order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeName> {
        self.required.iter().chain(self.desired.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.desired.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Required,
    Desired,
}

fn classify_header(line: &str) -> Option<Section> {
    let lower = line.to_lowercase();
    if REQUIRED_MARKERS.iter().any(|m| lower.contains(m)) {
        Some(Section::Required)
    } else if DESIRED_MARKERS.iter().any(|m| lower.contains(m)) {
        Some(Section::Desired)
    } else {
        None
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    if !line.starts_with(BULLET) {
        return None;
    }
    let text = line.trim_start_matches(|c: char| c == BULLET || c.is_whitespace());
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

/// Parses profile text into a `JobProfile`. Never fails: text without headers
/// or bullets produces an empty profile.
pub fn parse_profile(profile_text: &str) -> JobProfile {
    let mut required = Vec::new();
    let mut desired = Vec::new();
    let mut section = Section::None;

    for line in profile_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(next) = classify_header(line) {
            section = next;
            continue;
        }

        let Some(attribute) = bullet_text(line) else {
            continue;
        };

        match section {
            Section::Required => required.push(attribute.to_string()),
            Section::Desired => desired.push(attribute.to_string()),
            Section::None => {}
        }
    }

    JobProfile::new(required, desired)
}
