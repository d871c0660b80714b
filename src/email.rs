use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A message as handed over by a mailbox connector.
///
/// Connectors may omit any field; a missing field is read as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEmail {
    pub sender: String,
    pub subject: String,
    /// Raw body, possibly HTML.
    pub body: String,
    pub date: String,
    pub account: String,
}

impl RawEmail {
    pub fn new(sender: &str, subject: &str, body: &str) -> Self {
        Self {
            sender: sender.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.account = account.to_string();
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_spam: bool,
    pub category: Option<String>,
    pub matched_keyword: Option<String>,
    /// Name of the spam rule that fired, if any.
    pub spam_signal: Option<String>,
    /// What the spam rule matched on, e.g. the sender address.
    pub spam_reason: Option<String>,
}

/// Per-message output for categorized, non-spam email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub account: String,
    pub sender: String,
    pub subject: String,
    pub date: String,
    pub links: BTreeSet<String>,
    pub company: Option<String>,
}
