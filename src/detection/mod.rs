pub mod newsletter_patterns;
pub mod promo_keywords;
pub mod sender_blocklist;

use crate::config::RuleSet;
use crate::text::{self, SPAM_SCAN_CHARS};
use crate::RawEmail;

pub use newsletter_patterns::PatternSignal;
pub use promo_keywords::PromoKeywordDensity;
pub use sender_blocklist::SenderBlocklist;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    pub matched: bool,
    pub reason: String,
    pub rule_name: String,
}

impl DetectionResult {
    pub fn new(matched: bool, reason: String, rule_name: String) -> Self {
        Self {
            matched,
            reason,
            rule_name,
        }
    }

    pub fn no_match(rule_name: String) -> Self {
        Self {
            matched: false,
            reason: "No match".to_string(),
            rule_name,
        }
    }
}

/// A single spam signal evaluated against prepared, lowercased text.
pub trait TextPredicate: Send + Sync {
    fn evaluate(&self, text: &str) -> bool;
    fn name(&self) -> &str;
}

/// Ordered spam heuristic: sender rules first, then content rules.
///
/// The first rule that fires decides the verdict. Content rules see the
/// lowercased subject followed by the first 500 lowercased body characters.
pub struct SpamClassifier {
    sender_rules: Vec<Box<dyn TextPredicate>>,
    content_rules: Vec<Box<dyn TextPredicate>>,
}

impl SpamClassifier {
    pub fn new(rules: &RuleSet) -> anyhow::Result<Self> {
        let mut content_rules: Vec<Box<dyn TextPredicate>> = vec![Box::new(
            PromoKeywordDensity::new(&rules.promo_keywords, rules.promo_threshold),
        )];
        for signal in PatternSignal::compile_all(&rules.newsletter_patterns)? {
            content_rules.push(Box::new(signal));
        }

        Ok(Self {
            sender_rules: vec![Box::new(SenderBlocklist::new(&rules.blocked_senders))],
            content_rules,
        })
    }

    /// Build from explicit rule lists, evaluated in the given order.
    pub fn from_rules(
        sender_rules: Vec<Box<dyn TextPredicate>>,
        content_rules: Vec<Box<dyn TextPredicate>>,
    ) -> Self {
        Self {
            sender_rules,
            content_rules,
        }
    }

    pub fn check(&self, email: &RawEmail) -> DetectionResult {
        let sender = text::lowercase(&email.sender);
        for rule in &self.sender_rules {
            if rule.evaluate(&sender) {
                log::debug!("Spam rule '{}' matched sender '{}'", rule.name(), email.sender);
                return DetectionResult::new(
                    true,
                    format!("sender '{}'", email.sender),
                    rule.name().to_string(),
                );
            }
        }

        let content = text::comparison_text(&email.subject, &email.body, SPAM_SCAN_CHARS);
        for rule in &self.content_rules {
            if rule.evaluate(&content) {
                log::debug!("Spam rule '{}' matched subject '{}'", rule.name(), email.subject);
                return DetectionResult::new(
                    true,
                    format!("content of '{}'", email.subject),
                    rule.name().to_string(),
                );
            }
        }

        DetectionResult::no_match("Spam".to_string())
    }

    pub fn is_spam(&self, email: &RawEmail) -> bool {
        self.check(email).matched
    }

    pub fn rule_count(&self) -> usize {
        self.sender_rules.len() + self.content_rules.len()
    }
}
