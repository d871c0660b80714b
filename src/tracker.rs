//! Run loop over a batch of messages.
//!
//! The classifiers are stateless; numbering and grouping need to see every
//! account's messages, so they live here rather than in the summary builder.

use serde::Serialize;

use crate::category::{CategoryClassifier, CategoryMatch};
use crate::config::RuleSet;
use crate::detection::SpamClassifier;
use crate::links::LinkExtractor;
use crate::normalization::BodyNormalizer;
use crate::summary::SummaryBuilder;
use crate::{ClassificationResult, EmailSummary, RawEmail};

/// Links shown in the detail view.
pub const MAX_DETAIL_LINKS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum TriageOutcome {
    Spam { signal: String },
    Uncategorized,
    Categorized {
        category: CategoryMatch,
        summary: EmailSummary,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedEmail {
    /// 1-based, monotonic across all accounts in input order.
    pub number: usize,
    /// Position of the message in the input batch.
    pub input_index: usize,
    pub category: String,
    pub summary: EmailSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub emails: Vec<TrackedEmail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageReport {
    pub total: usize,
    pub ignored: usize,
    pub uncategorized: usize,
    /// One group per configured category, in table order.
    pub categories: Vec<CategoryGroup>,
}

impl TriageReport {
    pub fn entry(&self, number: usize) -> Option<&TrackedEmail> {
        self.categories
            .iter()
            .flat_map(|group| group.emails.iter())
            .find(|tracked| tracked.number == number)
    }

    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.categories
            .iter()
            .map(|group| (group.name.as_str(), group.emails.len()))
            .collect()
    }

    pub fn total_categorized(&self) -> usize {
        self.categories.iter().map(|group| group.emails.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailDetail {
    pub account: String,
    pub sender: String,
    pub subject: String,
    pub date: String,
    pub body: String,
    pub links: Vec<String>,
}

pub struct JobTracker {
    category_names: Vec<String>,
    spam: SpamClassifier,
    categories: CategoryClassifier,
    links: LinkExtractor,
    bodies: BodyNormalizer,
    summaries: SummaryBuilder,
}

impl JobTracker {
    pub fn new(rules: &RuleSet) -> anyhow::Result<Self> {
        let categories = CategoryClassifier::new(&rules.categories);
        Ok(Self {
            category_names: categories.category_names().map(str::to_string).collect(),
            spam: SpamClassifier::new(rules)?,
            categories,
            links: LinkExtractor::new(rules),
            bodies: BodyNormalizer::new(rules)?,
            summaries: SummaryBuilder::new(rules)?,
        })
    }

    pub fn classify(&self, email: &RawEmail) -> ClassificationResult {
        let spam = self.spam.check(email);
        if spam.matched {
            return ClassificationResult {
                is_spam: true,
                spam_signal: Some(spam.rule_name),
                spam_reason: Some(spam.reason),
                ..Default::default()
            };
        }

        match self.categories.categorize(email) {
            Some(found) => ClassificationResult {
                is_spam: false,
                category: Some(found.category),
                matched_keyword: Some(found.keyword),
                ..Default::default()
            },
            None => ClassificationResult::default(),
        }
    }

    pub fn process(&self, email: &RawEmail) -> TriageOutcome {
        let spam = self.spam.check(email);
        if spam.matched {
            return TriageOutcome::Spam {
                signal: spam.rule_name,
            };
        }

        match self.categories.categorize(email) {
            Some(category) => TriageOutcome::Categorized {
                category,
                summary: self.summaries.summarize(email),
            },
            None => TriageOutcome::Uncategorized,
        }
    }

    pub fn run<'a, I>(&self, emails: I) -> TriageReport
    where
        I: IntoIterator<Item = &'a RawEmail>,
    {
        let mut report = TriageReport {
            total: 0,
            ignored: 0,
            uncategorized: 0,
            categories: self
                .category_names
                .iter()
                .map(|name| CategoryGroup {
                    name: name.clone(),
                    emails: Vec::new(),
                })
                .collect(),
        };
        let mut next_number = 0;

        for (input_index, email) in emails.into_iter().enumerate() {
            report.total += 1;
            match self.process(email) {
                TriageOutcome::Spam { .. } => report.ignored += 1,
                TriageOutcome::Uncategorized => report.uncategorized += 1,
                TriageOutcome::Categorized { category, summary } => {
                    let Some(group) = report
                        .categories
                        .iter_mut()
                        .find(|group| group.name == category.category)
                    else {
                        continue;
                    };
                    next_number += 1;
                    group.emails.push(TrackedEmail {
                        number: next_number,
                        input_index,
                        category: category.category,
                        summary,
                    });
                }
            }
        }

        log::info!(
            "Triaged {} emails: {} categorized, {} promotional ignored, {} uncategorized",
            report.total,
            report.total_categorized(),
            report.ignored,
            report.uncategorized
        );
        report
    }

    /// Cleaned body and the first job links of a message.
    pub fn detail(&self, email: &RawEmail) -> EmailDetail {
        EmailDetail {
            account: email.account.clone(),
            sender: email.sender.clone(),
            subject: email.subject.clone(),
            date: email.date.clone(),
            body: self.bodies.normalize(&email.body),
            links: self
                .links
                .extract(&email.body)
                .into_iter()
                .take(MAX_DETAIL_LINKS)
                .collect(),
        }
    }
}
