use regex::Regex;
use std::collections::BTreeSet;

use crate::config::{compile_patterns, RuleSet};
use crate::links::LinkExtractor;
use crate::text::{self, SPAM_SCAN_CHARS};
use crate::{EmailSummary, RawEmail};

/// Builds the per-message summary handed to report and storage layers.
///
/// Company detection is best effort: any capitalized phrase after "chez",
/// "at" or "@", or before "recrute", is taken as the company name.
pub struct SummaryBuilder {
    company_patterns: Vec<Regex>,
    links: LinkExtractor,
}

impl SummaryBuilder {
    pub fn new(rules: &RuleSet) -> anyhow::Result<Self> {
        Ok(Self {
            company_patterns: compile_patterns(&rules.company_patterns)?,
            links: LinkExtractor::new(rules),
        })
    }

    pub fn extract_company(&self, email: &RawEmail) -> Option<String> {
        let haystack = format!(
            "{} {}",
            email.subject,
            text::prefix(&email.body, SPAM_SCAN_CHARS)
        );
        self.company_patterns.iter().find_map(|pattern| {
            pattern
                .captures(&haystack)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
    }

    pub fn build(&self, email: &RawEmail, links: BTreeSet<String>) -> EmailSummary {
        let company = self.extract_company(email);
        if let Some(name) = &company {
            log::debug!("Company '{}' found in '{}'", name, email.subject);
        }

        EmailSummary {
            account: email.account.clone(),
            sender: email.sender.clone(),
            subject: email.subject.clone(),
            date: email.date.clone(),
            links,
            company,
        }
    }

    /// Extract links from the raw body and build the summary.
    pub fn summarize(&self, email: &RawEmail) -> EmailSummary {
        self.build(email, self.links.extract(&email.body))
    }
}
