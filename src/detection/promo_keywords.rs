use super::TextPredicate;

/// Counts distinct promotional phrases in the scanned text.
///
/// A single generic word such as "commande" is not enough; promotional copy
/// repeats offer language, so the default threshold is two.
pub struct PromoKeywordDensity {
    keywords: Vec<String>,
    threshold: usize,
}

impl PromoKeywordDensity {
    pub fn new(keywords: &[String], threshold: usize) -> Self {
        let mut distinct: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = keyword.to_lowercase();
            if !keyword.is_empty() && !distinct.contains(&keyword) {
                distinct.push(keyword);
            }
        }
        Self {
            keywords: distinct,
            threshold,
        }
    }

    pub fn count_distinct(&self, text: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .count()
    }
}

impl TextPredicate for PromoKeywordDensity {
    fn evaluate(&self, text: &str) -> bool {
        // a zero threshold would flag every message
        self.threshold > 0 && self.count_distinct(text) >= self.threshold
    }

    fn name(&self) -> &str {
        "PromoKeywordDensity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn density(keywords: &[&str], threshold: usize) -> PromoKeywordDensity {
        let keywords: Vec<String> = keywords.iter().map(|s| s.to_string()).collect();
        PromoKeywordDensity::new(&keywords, threshold)
    }

    #[test]
    fn test_counts_each_keyword_once() {
        let rule = density(&["soldes", "panier"], 2);
        assert_eq!(rule.count_distinct("soldes soldes soldes"), 1);
        assert!(!rule.evaluate("soldes soldes soldes"));
        assert!(rule.evaluate("soldes et panier"));
    }

    #[test]
    fn test_duplicate_configured_keywords_collapse() {
        let rule = density(&["Soldes", "soldes"], 2);
        assert!(!rule.evaluate("grandes soldes"));
    }

    #[test]
    fn test_overlapping_keywords_count_separately() {
        let rule = density(&["promotion", "meilleur de la promotion"], 2);
        assert!(rule.evaluate("le meilleur de la promotion"));
    }

    #[test]
    fn test_custom_threshold() {
        let rule = density(&["a1", "b2", "c3"], 3);
        assert!(!rule.evaluate("a1 b2"));
        assert!(rule.evaluate("a1 b2 c3"));
    }
}
