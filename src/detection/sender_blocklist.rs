use super::TextPredicate;

/// Free-form substrings that mark a sender as automated or commercial.
///
/// Entries are not parsed as domains: `sony` matches any sender containing
/// that sequence.
pub struct SenderBlocklist {
    entries: Vec<String>,
}

impl SenderBlocklist {
    pub fn new(entries: &[String]) -> Self {
        let entries = entries
            .iter()
            .map(|e| e.to_lowercase())
            .filter(|e| {
                if e.is_empty() {
                    log::warn!("Ignoring empty blocked sender entry");
                }
                !e.is_empty()
            })
            .collect();
        Self { entries }
    }

    /// First entry contained in the already lowercased sender.
    pub fn matching_entry(&self, sender: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| sender.contains(entry.as_str()))
            .map(|entry| entry.as_str())
    }
}

impl TextPredicate for SenderBlocklist {
    fn evaluate(&self, text: &str) -> bool {
        self.matching_entry(text).is_some()
    }

    fn name(&self) -> &str {
        "SenderBlocklist"
    }
}
