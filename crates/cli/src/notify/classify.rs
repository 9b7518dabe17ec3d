// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::Event;

/// Keywords that mark an event as critical when none are configured.
pub const DEFAULT_CRITICAL_KEYWORDS: &[&str] =
    &["critical", "urgent", "error", "failed", "out of stock", "low stock"];

/// Flags events whose text mentions an urgency keyword.
///
/// Matching is a case-insensitive substring test over every string the
/// event carries. It is a heuristic: "errorless" matches "error".
#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Classifier { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, event: &Event) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        event.text_fragments().into_iter().any(|text| {
            let text = text.to_lowercase();
            self.keywords.iter().any(|k| text.contains(k.as_str()))
        })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_CRITICAL_KEYWORDS)
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
