//! Attribute Scorer — rates one candidate against the job profile via the text-analysis capability.
//!
//! Every call ends in an `Analysis`; failures degrade through three tiers:
//!
//! 1. `Primary`: the reply parses as `{"pontuacoes": {...}, "resumo": "..."}`.
//! 2. `RegexFallback`: the reply arrived but is malformed. Ratings are
//!    recovered with an `<attribute>: <digit>` search, missing ones default to 1.
//! 3. `Default`: the call itself failed. Every attribute is rated 1.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::llm_client::prompts::{SCREENING_PROMPT_TEMPLATE, SCREENING_SYSTEM};
use crate::llm_client::{strip_json_fences, ModelParams, TextAnalyzer};
use crate::screening::analysis::{Analysis, Rating, ScoringTier};
use crate::screening::profile::{AttributeName, JobProfile};

/// Rating given to an attribute the scorer could not rate.
pub const FALLBACK_RATING: Rating = 1;

pub const FALLBACK_SUMMARY: &str =
    "Análise automática realizada. Verifique manualmente para detalhes.";
pub const DEFAULT_SUMMARY: &str = "Erro na análise automática. Verificação manual necessária.";

/// Wire shape of a well-formed reply. Unknown fields are ignored; a missing
/// summary is read as empty, a missing rating map is a structural failure.
/// Individual ratings stay loosely typed so one odd value does not sink the reply.
#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    pontuacoes: BTreeMap<AttributeName, Value>,
    #[serde(default)]
    resumo: String,
}

#[derive(Clone)]
pub struct AttributeScorer {
    analyzer: Arc<dyn TextAnalyzer>,
    params: ModelParams,
    max_cv_length: usize,
}

impl AttributeScorer {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>, params: ModelParams, max_cv_length: usize) -> Self {
        Self {
            analyzer,
            params,
            max_cv_length,
        }
    }

    /// Scores one candidate. Never fails; see the module docs for the tiers.
    pub async fn score(&self, candidate_text: &str, profile: &JobProfile) -> Analysis {
        let prompt = build_prompt(candidate_text, profile, self.max_cv_length);

        match self
            .analyzer
            .complete(SCREENING_SYSTEM, &prompt, &self.params)
            .await
        {
            Ok(reply) => interpret_reply(&reply, profile),
            Err(e) => {
                error!("Text analysis call failed, using default ratings: {e}");
                default_analysis(profile)
            }
        }
    }
}

/// Builds the user prompt with both attribute lists and the truncated candidate text.
pub fn build_prompt(candidate_text: &str, profile: &JobProfile, max_cv_length: usize) -> String {
    SCREENING_PROMPT_TEMPLATE
        .replace("{required_attrs}", &bullet_list(&profile.required))
        .replace("{desired_attrs}", &bullet_list(&profile.desired))
        .replace("{cv_text}", truncate_chars(candidate_text, max_cv_length))
}

fn bullet_list(attrs: &[AttributeName]) -> String {
    attrs
        .iter()
        .map(|a| format!("- {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Tiers 1 and 2: parse the reply, recovering by pattern search when it is malformed.
pub fn interpret_reply(reply: &str, profile: &JobProfile) -> Analysis {
    match parse_primary(reply) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Reply is not valid analysis JSON ({e}), recovering ratings from text");
            debug!("Unparsed reply: {reply}");
            regex_fallback(reply, profile)
        }
    }
}

fn parse_primary(reply: &str) -> Result<Analysis, serde_json::Error> {
    let payload: AnalysisPayload = serde_json::from_str(strip_json_fences(reply))?;
    let scores = payload
        .pontuacoes
        .into_iter()
        .filter_map(|(attr, value)| match rating_from_value(&value) {
            Some(rating) => Some((attr, rating)),
            None => {
                warn!("Ignoring non-numeric rating for '{attr}': {value}");
                None
            }
        })
        .collect();

    Ok(Analysis {
        scores,
        summary: payload.resumo,
        tier: ScoringTier::Primary,
    })
}

/// Integers pass through as-is; finite fractions and numeric strings are rounded.
fn rating_from_value(value: &Value) -> Option<Rating> {
    let number = match value {
        Value::Number(n) => {
            if let Some(rating) = n.as_i64() {
                return Some(rating);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then(|| number.round() as Rating)
}

fn regex_fallback(reply: &str, profile: &JobProfile) -> Analysis {
    let scores = profile
        .attributes()
        .map(|attr| (attr.clone(), find_rating(reply, attr).unwrap_or(FALLBACK_RATING)))
        .collect();

    Analysis {
        scores,
        summary: find_summary(reply).unwrap_or_else(|| FALLBACK_SUMMARY.to_string()),
        tier: ScoringTier::RegexFallback,
    }
}

/// Finds `<attribute>: N` or `<attribute>- N` (case-insensitive), returning the digit.
fn find_rating(reply: &str, attribute: &str) -> Option<Rating> {
    let pattern = format!(r"{}[:\-]\s*(\d)", regex::escape(attribute));
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            warn!("Cannot build rating pattern for '{attribute}': {e}");
            return None;
        }
    };
    re.captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn summary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)resumo"?\s*[:\-]\s*(.+?)(?:\n|$)"#).expect("summary pattern is valid")
    })
}

fn find_summary(reply: &str) -> Option<String> {
    let caps = summary_pattern().captures(reply)?;
    let summary = caps
        .get(1)?
        .as_str()
        .trim_end_matches(|c: char| c == '}' || c == ',' || c.is_whitespace())
        .trim_matches('"')
        .trim();
    (!summary.is_empty()).then(|| summary.to_string())
}

/// Tier 3: every profile attribute rated 1.
pub fn default_analysis(profile: &JobProfile) -> Analysis {
    Analysis {
        scores: profile
            .attributes()
            .map(|attr| (attr.clone(), FALLBACK_RATING))
            .collect(),
        summary: DEFAULT_SUMMARY.to_string(),
        tier: ScoringTier::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Reply {
        Text(String),
        Unauthorized,
        Empty,
    }

    /// Returns a canned reply and records every prompt it receives.
    struct StubAnalyzer {
        reply: Reply,
        prompts: Mutex<Vec<String>>,
    }

    impl StubAnalyzer {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextAnalyzer for StubAnalyzer {
        async fn complete(
            &self,
            _system: &str,
            prompt: &str,
            _params: &ModelParams,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Reply::Text(text) => Ok(text.clone()),
                Reply::Unauthorized => Err(LlmError::Api {
                    status: 401,
                    message: "Incorrect API key provided".to_string(),
                }),
                Reply::Empty => Err(LlmError::EmptyContent),
            }
        }
    }

    fn params() -> ModelParams {
        ModelParams {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.3,
        }
    }

    fn profile() -> JobProfile {
        JobProfile::new(
            vec!["Python".to_string(), "SQL".to_string()],
            vec!["Docker".to_string()],
        )
    }

    fn scorer(analyzer: Arc<StubAnalyzer>) -> AttributeScorer {
        AttributeScorer::new(analyzer, params(), 3000)
    }

    #[tokio::test]
    async fn test_primary_tier_parses_schema() {
        let stub = StubAnalyzer::new(Reply::Text(
            r#"{"pontuacoes": {"Python": 4, "SQL": 2}, "resumo": "ok"}"#.to_string(),
        ));
        let analysis = scorer(stub).score("cv", &profile()).await;
        assert_eq!(analysis.tier, ScoringTier::Primary);
        assert_eq!(analysis.scores.get("Python"), Some(&4));
        assert_eq!(analysis.scores.get("SQL"), Some(&2));
        assert!(!analysis.scores.contains_key("Docker"));
        assert_eq!(analysis.summary, "ok");
    }

    #[tokio::test]
    async fn test_primary_tier_strips_code_fences() {
        let stub = StubAnalyzer::new(Reply::Text(
            "```json\n{\"pontuacoes\": {\"Docker\": 5}, \"resumo\": \"forte em infra\"}\n```"
                .to_string(),
        ));
        let analysis = scorer(stub).score("cv", &profile()).await;
        assert_eq!(analysis.tier, ScoringTier::Primary);
        assert_eq!(analysis.scores.get("Docker"), Some(&5));
    }

    #[test]
    fn test_primary_ratings_are_not_clamped() {
        // Out-of-range values from the service pass through as reported.
        let analysis = interpret_reply(
            r#"{"pontuacoes": {"Python": 9, "SQL": 0}, "resumo": "?"}"#,
            &profile(),
        );
        assert_eq!(analysis.tier, ScoringTier::Primary);
        assert_eq!(analysis.scores.get("Python"), Some(&9));
        assert_eq!(analysis.scores.get("SQL"), Some(&0));
    }

    #[test]
    fn test_primary_keeps_valid_ratings_next_to_fractional_one() {
        let analysis = interpret_reply(
            r#"{"pontuacoes": {"Python": 4.5, "SQL": 4}, "resumo": "forte"}"#,
            &profile(),
        );
        assert_eq!(analysis.tier, ScoringTier::Primary);
        assert_eq!(analysis.scores.get("Python"), Some(&5));
        assert_eq!(analysis.scores.get("SQL"), Some(&4));
        assert_eq!(analysis.summary, "forte");
    }

    #[test]
    fn test_primary_skips_non_numeric_ratings() {
        let analysis = interpret_reply(
            r#"{"pontuacoes": {"Python": "alto", "SQL": "3", "Docker": null}, "resumo": "ok"}"#,
            &profile(),
        );
        assert_eq!(analysis.tier, ScoringTier::Primary);
        assert!(!analysis.scores.contains_key("Python"));
        assert!(!analysis.scores.contains_key("Docker"));
        assert_eq!(analysis.scores.get("SQL"), Some(&3));
    }

    #[test]
    fn test_fallback_summary_drops_closing_brace_on_single_line() {
        assert_eq!(
            find_summary(r#"{"pontuacoes": {"Python": 4}, "resumo": "forte"}"#).as_deref(),
            Some("forte")
        );
    }

    #[test]
    fn test_primary_missing_summary_defaults_to_empty() {
        let analysis = interpret_reply(r#"{"pontuacoes": {"SQL": 3}, "extra": true}"#, &profile());
        assert_eq!(analysis.tier, ScoringTier::Primary);
        assert_eq!(analysis.summary, "");
    }

    #[test]
    fn test_regex_fallback_recovers_digit() {
        let profile = JobProfile::new(vec!["Python".to_string()], vec![]);
        let analysis = interpret_reply("Sorry, here you go: Python: 4 overall good", &profile);
        assert_eq!(analysis.tier, ScoringTier::RegexFallback);
        assert_eq!(analysis.scores.len(), 1);
        assert_eq!(analysis.scores.get("Python"), Some(&4));
    }

    #[test]
    fn test_regex_fallback_is_case_insensitive_and_accepts_hyphen() {
        let analysis = interpret_reply("python-5\nsql:   3\nnada sobre containers", &profile());
        assert_eq!(analysis.scores.get("Python"), Some(&5));
        assert_eq!(analysis.scores.get("SQL"), Some(&3));
        assert_eq!(analysis.scores.get("Docker"), Some(&FALLBACK_RATING));
    }

    #[test]
    fn test_regex_fallback_escapes_attribute_names() {
        let profile = JobProfile::new(vec!["C++ (STL)".to_string()], vec![]);
        let analysis = interpret_reply("C++ (STL): 3 -- not json", &profile);
        assert_eq!(analysis.scores.get("C++ (STL)"), Some(&3));
    }

    #[test]
    fn test_regex_fallback_summary_from_label() {
        let reply = "Python: 4\nSQL: 2\nResumo: Candidato sólido em dados\nfim";
        let analysis = interpret_reply(reply, &profile());
        assert_eq!(analysis.summary, "Candidato sólido em dados");
    }

    #[test]
    fn test_regex_fallback_summary_on_following_line() {
        let reply = "notas quebradas\nRESUMO:\nBoa comunicação e SQL";
        let analysis = interpret_reply(reply, &profile());
        assert_eq!(analysis.summary, "Boa comunicação e SQL");
    }

    #[test]
    fn test_regex_fallback_summary_from_truncated_json() {
        let reply = "{\"pontuacoes\": {\"Python\": 4, \"SQL\": 3},\n\"resumo\": \"Perfil aderente\",\n";
        let analysis = interpret_reply(reply, &profile());
        assert_eq!(analysis.tier, ScoringTier::RegexFallback);
        // A quoted key is not followed directly by a separator, so it is not recovered.
        assert_eq!(analysis.scores.get("Python"), Some(&FALLBACK_RATING));
        assert_eq!(analysis.summary, "Perfil aderente");
    }

    #[test]
    fn test_regex_fallback_placeholder_summary() {
        let analysis = interpret_reply("garbage", &profile());
        assert_eq!(analysis.summary, FALLBACK_SUMMARY);
        assert!(analysis.scores.values().all(|r| *r == FALLBACK_RATING));
        assert_eq!(analysis.scores.len(), 3);
    }

    #[tokio::test]
    async fn test_transport_failure_uses_default_tier() {
        let stub = StubAnalyzer::new(Reply::Unauthorized);
        let analysis = scorer(stub).score("cv", &profile()).await;
        assert_eq!(analysis.tier, ScoringTier::Default);
        assert_eq!(analysis.summary, DEFAULT_SUMMARY);
        assert_eq!(analysis.scores.len(), 3);
        assert!(analysis.scores.values().all(|r| *r == 1));
    }

    #[tokio::test]
    async fn test_empty_content_uses_default_tier() {
        let stub = StubAnalyzer::new(Reply::Empty);
        let analysis = scorer(stub).score("cv", &profile()).await;
        assert_eq!(analysis.tier, ScoringTier::Default);
    }

    #[tokio::test]
    async fn test_prompt_contains_attributes_and_truncated_text() {
        let stub = StubAnalyzer::new(Reply::Text("{}".to_string()));
        let cv = format!("{}{}", "a".repeat(600), "TAIL_MARKER");
        let scorer = AttributeScorer::new(stub.clone(), params(), 600);
        scorer.score(&cv, &profile()).await;

        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- Python\n- SQL"));
        assert!(prompts[0].contains("- Docker"));
        assert!(prompts[0].contains(&"a".repeat(600)));
        assert!(!prompts[0].contains("TAIL_MARKER"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("curto", 100), "curto");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_default_analysis_covers_whole_profile() {
        let analysis = default_analysis(&profile());
        let keys: Vec<_> = analysis.scores.keys().cloned().collect();
        assert_eq!(keys, vec!["Docker", "Python", "SQL"]);
    }
}
