//! Forbidden-term screening for user text.
//!
//! Terms match case-insensitively on whole words and are masked with a run of
//! `*` of the same length. [`ContentModerator::moderate`] adds a fixed delay
//! before answering so the UI can show a "checking" state; the result itself
//! only depends on the input text.

use std::time::Duration;

use regex::{Captures, Regex, RegexBuilder};

use crate::config::PulseConfig;
use crate::error::ConfigError;

const MASK: char = '*';

/// Outcome of screening a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moderation {
    pub clean: String,
    pub flagged: bool,
}

#[derive(Debug, Clone)]
pub struct ContentModerator {
    pattern: Option<Regex>,
    latency: Duration,
}

impl ContentModerator {
    pub fn new(terms: &[String], latency: Duration) -> Result<Self, ConfigError> {
        let mut terms = terms
            .iter()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| {
                let usable = is_word_bounded(term);
                if !usable && !term.is_empty() {
                    tracing::warn!("Skipping moderation term that does not start and end with a letter or digit");
                }
                usable
            })
            .collect::<Vec<_>>();
        // Longest first so phrases win over the words inside them.
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        terms.dedup();

        let pattern = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|term| regex::escape(term))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .case_insensitive(true)
                .build()
                .map_err(|error| ConfigError::Invalid(format!("moderation terms: {error}")))?;
            Some(pattern)
        };

        Ok(Self { pattern, latency })
    }

    pub fn from_config(config: &PulseConfig) -> Result<Self, ConfigError> {
        Self::new(&config.moderation_terms, config.moderation_latency())
    }

    /// Screen text after the configured processing delay.
    pub async fn moderate(&self, text: &str) -> Moderation {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.check(text)
    }

    /// Screen text immediately.
    pub fn check(&self, text: &str) -> Moderation {
        let Some(pattern) = &self.pattern else {
            return unflagged(text);
        };
        if !pattern.is_match(text) {
            return unflagged(text);
        }

        let clean = pattern
            .replace_all(text, |captures: &Captures<'_>| {
                MASK.to_string().repeat(captures[0].chars().count())
            })
            .into_owned();
        tracing::debug!("Masked forbidden terms in submitted text");
        Moderation {
            clean,
            flagged: true,
        }
    }

    pub fn contains_forbidden(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

fn unflagged(text: &str) -> Moderation {
    Moderation {
        clean: text.to_string(),
        flagged: false,
    }
}

fn is_word_bounded(term: &str) -> bool {
    let first = term.chars().next();
    let last = term.chars().last();
    matches!((first, last), (Some(first), Some(last)) if first.is_alphanumeric() && last.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderator() -> ContentModerator {
        let terms = ["damn", "crap", "free money", "kill"].map(String::from);
        ContentModerator::new(&terms, Duration::ZERO).unwrap()
    }

    #[test]
    fn masks_whole_words_case_insensitively() {
        let result = moderator().check("Damn this CRAP traffic");
        assert!(result.flagged);
        assert_eq!(result.clean, "**** this **** traffic");
    }

    #[test]
    fn ignores_terms_inside_longer_words() {
        let result = moderator().check("Skills and scrapbooks");
        assert!(!result.flagged);
        assert_eq!(result.clean, "Skills and scrapbooks");
    }

    #[test]
    fn masks_phrases_with_equal_length() {
        let result = moderator().check("Get FREE MONEY now");
        assert_eq!(result.clean, "Get ********** now");
    }

    #[test]
    fn moderation_is_idempotent() {
        let moderator = moderator();
        for text in [
            "damn damn-crap",
            "free money, free  money",
            "kill.kill",
            "nothing to see",
            "",
        ] {
            let once = moderator.check(text).clean;
            let twice = moderator.check(&once).clean;
            assert_eq!(once, twice, "input: {text:?}");
        }
    }

    #[test]
    fn same_input_same_output() {
        let moderator = moderator();
        assert_eq!(moderator.check("crap"), moderator.check("crap"));
    }

    #[test]
    fn empty_term_list_flags_nothing() {
        let moderator = ContentModerator::new(&[], Duration::ZERO).unwrap();
        assert!(!moderator.check("anything at all").flagged);
    }

    #[test]
    fn terms_without_word_edges_are_skipped() {
        let terms = ["!!".to_string(), "crap".to_string()];
        let moderator = ContentModerator::new(&terms, Duration::ZERO).unwrap();
        assert_eq!(moderator.check("!! crap").clean, "!! ****");
    }

    #[tokio::test(start_paused = true)]
    async fn moderate_waits_for_configured_latency() {
        let terms = ["crap".to_string()];
        let moderator = ContentModerator::new(&terms, Duration::from_millis(500)).unwrap();
        let started = tokio::time::Instant::now();
        let result = moderator.moderate("crap").await;
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(result.flagged);
    }
}
