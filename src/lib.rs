pub mod category;
pub mod config;
pub mod detection;
pub mod email;
pub mod links;
pub mod normalization;
pub mod summary;
pub mod text;
pub mod tracker;

pub use category::{CategoryClassifier, CategoryMatch};
pub use config::{CategoryRule, RuleSet};
pub use detection::{SpamClassifier, TextPredicate};
pub use email::{ClassificationResult, EmailSummary, RawEmail};
pub use links::LinkExtractor;
pub use normalization::BodyNormalizer;
pub use summary::SummaryBuilder;
pub use tracker::{JobTracker, TriageOutcome, TriageReport};
