//! First-match category assignment.
//!
//! Categories are not mutually exclusive by content, a message can mention
//! both an interview and an application receipt. The earliest declared
//! category with any matching keyword wins, wherever the keyword occurs in
//! the text. `priority` on a rule is never consulted.

use crate::config::CategoryRule;
use crate::text::{self, CATEGORY_SCAN_CHARS};
use crate::RawEmail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: String,
    pub keyword: String,
}

struct PreparedCategory {
    name: String,
    /// (lowercased, as configured)
    keywords: Vec<(String, String)>,
}

pub struct CategoryClassifier {
    categories: Vec<PreparedCategory>,
}

impl CategoryClassifier {
    pub fn new(categories: &[CategoryRule]) -> Self {
        let categories = categories
            .iter()
            .map(|rule| PreparedCategory {
                name: rule.name.clone(),
                keywords: rule
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .map(|k| (k.to_lowercase(), k.clone()))
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn categorize(&self, email: &RawEmail) -> Option<CategoryMatch> {
        let content = text::comparison_text(&email.subject, &email.body, CATEGORY_SCAN_CHARS);

        for category in &self.categories {
            for (lowered, original) in &category.keywords {
                if content.contains(lowered.as_str()) {
                    log::debug!(
                        "Categorized '{}' as {} (keyword '{}')",
                        email.subject,
                        category.name,
                        original
                    );
                    return Some(CategoryMatch {
                        category: category.name.clone(),
                        keyword: original.clone(),
                    });
                }
            }
        }

        log::debug!("No category for '{}'", email.subject);
        None
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;

    fn two_categories() -> CategoryClassifier {
        CategoryClassifier::new(&[
            CategoryRule::new("INTERVIEW", &["entretien", "interview"], 9),
            CategoryRule::new("APPLICATION_RECEIVED", &["candidature bien reçue"], 1),
        ])
    }

    #[test]
    fn test_earlier_category_wins_regardless_of_position() {
        let email = RawEmail::new(
            "rh@acme.fr",
            "Candidature bien reçue",
            "Merci. Nous reviendrons vers vous pour un entretien.",
        );
        let found = two_categories().categorize(&email).unwrap();
        assert_eq!(found.category, "INTERVIEW");
        assert_eq!(found.keyword, "entretien");
    }

    #[test]
    fn test_priority_does_not_reorder() {
        let email = RawEmail::new("rh@acme.fr", "Interview", "candidature bien reçue");
        let found = two_categories().categorize(&email).unwrap();
        assert_eq!(found.category, "INTERVIEW");
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let rules = RuleSet::default();
        let classifier = CategoryClassifier::new(&rules.categories);
        let email = RawEmail::new("rh@acme.fr", "Suivi", "VOTRE CV A BIEN ÉTÉ transmis");
        let found = classifier.categorize(&email).unwrap();
        assert_eq!(found.category, "APPLICATION_RECEIVED");
        assert_eq!(found.keyword, "votre CV a bien été");
    }

    #[test]
    fn test_default_table_order() {
        let rules = RuleSet::default();
        let classifier = CategoryClassifier::new(&rules.categories);
        let email = RawEmail::new(
            "rh@acme.fr",
            "Votre candidature",
            "Malheureusement nous ne pouvons pas donner suite.",
        );
        assert_eq!(classifier.categorize(&email).unwrap().category, "REJECTED");
    }

    #[test]
    fn test_keyword_past_scan_window_is_ignored() {
        let body = format!("{} entretien", "x".repeat(1000));
        let email = RawEmail::new("rh@acme.fr", "Bonjour", &body);
        assert_eq!(two_categories().categorize(&email), None);
    }

    #[test]
    fn test_no_match_is_none() {
        let email = RawEmail::new("ami@example.com", "Dîner samedi ?", "On se voit à 20h.");
        assert_eq!(two_categories().categorize(&email), None);
    }
}
