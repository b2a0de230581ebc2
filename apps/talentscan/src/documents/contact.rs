//! Contact heuristics — best-effort name / e-mail / phone extraction from résumé text.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Only the first few lines are considered when looking for the candidate's name.
const NAME_SCAN_LINES: usize = 5;
const MIN_NAME_LEN: usize = 4;
const HEADER_WORDS: &[&str] = &["curriculum", "curriculo", "currículo", "cv", "resume"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern is valid")
    })
}

/// Brazilian format: `(11) 99999-9999`, `11 3333-4444`, `11999998888`.
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\(?\d{2}\)?\s?\d{4,5}-?\d{4}").expect("phone pattern is valid")
    })
}

pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        name: extract_name(text),
        email: email_pattern()
            .find(text)
            .map(|m| m.as_str().to_string()),
        phone: phone_pattern()
            .find(text)
            .map(|m| m.as_str().to_string()),
    }
}

/// First line among the opening lines that looks like a person's name:
/// no digits, no `@`, not a "Curriculum Vitae" style header.
fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            line.chars().count() >= MIN_NAME_LEN
                && !line.chars().any(|c| c.is_ascii_digit() || c == '@')
                && !HEADER_WORDS.iter().any(|w| lower.contains(w))
        })
        .map(str::to_string)
}
