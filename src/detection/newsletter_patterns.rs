use super::TextPredicate;
use crate::config::compile_patterns;
use regex::Regex;

/// Automated job-alert phrasing such as "3 autres emplois pour vous".
pub struct PatternSignal {
    pattern: Regex,
    name: String,
}

impl PatternSignal {
    pub fn new(pattern: Regex) -> Self {
        let name = format!("NewsletterPattern({})", pattern.as_str());
        Self { pattern, name }
    }

    pub fn compile_all(patterns: &[String]) -> anyhow::Result<Vec<Self>> {
        Ok(compile_patterns(patterns)?
            .into_iter()
            .map(Self::new)
            .collect())
    }
}

impl TextPredicate for PatternSignal {
    fn evaluate(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
