//! Prompt values and the deduplicating, capped collection built from a
//! tabular source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of unique prompts kept from the source.
pub const DEFAULT_PROMPT_LIMIT: usize = 20;

/// Default name of the column holding the prompt text.
pub const DEFAULT_PROMPT_COLUMN: &str = "Statement";

/// A non-empty, trimmed statement. Identity is the exact trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    /// Trims `raw` and returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Collects prompts in first-seen order, dropping exact duplicates, until
/// `limit` unique prompts are held.
///
/// Candidates are pulled lazily: once the set is full, the remaining
/// candidates are never looked at.
///
/// # Example
///
/// ```
/// use chatbench_core::prompt::collect_unique;
///
/// let rows = vec![Some(" a "), None, Some("b"), Some("a"), Some("c")];
/// let prompts = collect_unique(rows, 2);
/// let texts: Vec<&str> = prompts.iter().map(|p| p.as_str()).collect();
/// assert_eq!(texts, ["a", "b"]);
/// ```
pub fn collect_unique<I, S>(candidates: I, limit: usize) -> Vec<Prompt>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut prompts: Vec<Prompt> = Vec::new();
    if limit == 0 {
        return prompts;
    }

    for candidate in candidates {
        let Some(prompt) = candidate.and_then(|raw| Prompt::parse(raw.as_ref())) else {
            continue;
        };
        if !prompts.contains(&prompt) {
            prompts.push(prompt);
        }
        if prompts.len() >= limit {
            break;
        }
    }

    prompts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(prompts: &[Prompt]) -> Vec<&str> {
        prompts.iter().map(Prompt::as_str).collect()
    }

    #[test]
    fn duplicates_are_dropped_and_cap_applies() {
        // 25 rows; rows 3 and 7 (1-based) repeat row 1.
        let rows: Vec<String> = (1..=25)
            .map(|i| {
                if i == 3 || i == 7 {
                    "statement 1".to_string()
                } else {
                    format!("statement {i}")
                }
            })
            .collect();

        let prompts = collect_unique(rows.iter().map(|r| Some(r.as_str())), 20);

        assert_eq!(prompts.len(), 20);
        let expected: Vec<String> = (1..=25)
            .filter(|i| *i != 3 && *i != 7)
            .take(20)
            .map(|i| format!("statement {i}"))
            .collect();
        assert_eq!(texts(&prompts), expected);
    }

    #[test]
    fn fewer_unique_values_than_limit_returns_all() {
        let prompts = collect_unique(vec![Some("x"), Some("y"), Some("x")], 20);
        assert_eq!(texts(&prompts), ["x", "y"]);
    }

    #[test]
    fn empty_and_missing_values_do_not_count() {
        let prompts = collect_unique(vec![None, Some(""), Some("   "), Some("real")], 1);
        assert_eq!(texts(&prompts), ["real"]);
    }

    #[test]
    fn comparison_is_exact_after_trimming() {
        let prompts = collect_unique(vec![Some("Hello"), Some("hello"), Some(" Hello\t")], 20);
        assert_eq!(texts(&prompts), ["Hello", "hello"]);
    }

    #[test]
    fn stops_pulling_once_full() {
        let mut pulled = 0;
        let source = (0..100).map(|i| {
            pulled += 1;
            Some(if i % 2 == 0 { "even" } else { "odd" })
        });
        let _ = collect_unique(source, 2);
        assert_eq!(pulled, 2);
    }

    #[test]
    fn zero_limit_yields_nothing() {
        assert!(collect_unique(vec![Some("a")], 0).is_empty());
    }
}
