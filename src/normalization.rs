//! Turns raw, usually HTML, message bodies into bounded plain text.
//!
//! The conversion is an ordered list of `&str -> String` stages. Each stage
//! assumes the cleanup done by the ones before it, so the order in
//! [`BodyNormalizer::normalize`] is fixed. Every stage is public so it can be
//! exercised on its own.

use regex::Regex;

use crate::config::{compile_patterns, EntityMapping, RuleSet};
use crate::text;

/// Maximum number of characters kept from a cleaned body.
pub const MAX_BODY_CHARS: usize = 3000;

pub const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

pub const EMPTY_BODY: &str = "(no content available)";

/// Upper bound on full stage passes. Only an entity table whose replacements
/// rebuild entities can keep changing the text this long.
const MAX_PASSES: usize = 16;

type Stage = fn(&BodyNormalizer, &str) -> String;

const STAGES: [(&str, Stage); 7] = [
    ("strip_blocks", BodyNormalizer::strip_blocks),
    ("strip_attributes", BodyNormalizer::strip_attributes),
    ("layout_tags", BodyNormalizer::layout_tags),
    ("strip_tags", BodyNormalizer::strip_tags),
    ("decode_entities", BodyNormalizer::decode_entities),
    ("collapse_whitespace", BodyNormalizer::collapse_whitespace),
    ("strip_footers", BodyNormalizer::strip_footers),
];

pub struct BodyNormalizer {
    hidden_blocks: Vec<Regex>,
    presentation_attrs: Vec<Regex>,
    line_break: Regex,
    paragraph_end: Regex,
    block_end: Regex,
    list_item: Regex,
    heading_start: Regex,
    heading_end: Regex,
    any_tag: Regex,
    numeric_entity: Regex,
    horizontal_space: Regex,
    line_leading_space: Regex,
    line_trailing_space: Regex,
    blank_lines: Regex,
    entities: Vec<EntityMapping>,
    footers: Vec<Regex>,
}

impl BodyNormalizer {
    pub fn new(rules: &RuleSet) -> anyhow::Result<Self> {
        Ok(Self {
            hidden_blocks: vec![
                Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap(),
                Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap(),
                Regex::new(r"(?is)<head[^>]*>.*?</head>").unwrap(),
                Regex::new(r"(?s)<!--.*?-->").unwrap(),
            ],
            presentation_attrs: vec![
                Regex::new(r#"(?i)\s+style="[^"]*""#).unwrap(),
                Regex::new(r#"(?i)\s+class="[^"]*""#).unwrap(),
            ],
            line_break: Regex::new(r"(?i)<br\s*/?>").unwrap(),
            paragraph_end: Regex::new(r"(?i)</p>").unwrap(),
            block_end: Regex::new(r"(?i)</(?:div|tr|li)>").unwrap(),
            list_item: Regex::new(r"(?i)<li(?:\s[^>]*)?>").unwrap(),
            heading_start: Regex::new(r"(?i)<h[1-6][^>]*>").unwrap(),
            heading_end: Regex::new(r"(?i)</h[1-6]>").unwrap(),
            any_tag: Regex::new(r"<[^>]+>").unwrap(),
            numeric_entity: Regex::new(r"&#(\d+);").unwrap(),
            horizontal_space: Regex::new(r"[ \t]+").unwrap(),
            line_leading_space: Regex::new(r"\n[ \t]+").unwrap(),
            line_trailing_space: Regex::new(r"[ \t]+\n").unwrap(),
            blank_lines: Regex::new(r"\n{3,}").unwrap(),
            entities: rules.html_entities.clone(),
            footers: compile_patterns(&rules.footer_patterns)?,
        })
    }

    /// Full pipeline: markup removal, entity decoding, whitespace cleanup,
    /// footer removal, then the empty-body sentinel and the length cap.
    ///
    /// Decoding can expose markup or entities (`&lt;b&gt;`, `&amp;amp;`), so
    /// the stages repeat until a pass leaves the text unchanged.
    pub fn normalize(&self, body: &str) -> String {
        let mut text = body.to_string();
        let mut passes = 0;
        loop {
            let cleaned = self.run_stages(&text);
            passes += 1;
            if cleaned == text {
                break;
            }
            text = cleaned;
            if passes == MAX_PASSES {
                log::warn!("Body still changing after {} passes, stopping", passes);
                break;
            }
        }

        let text = text.trim();
        if text.is_empty() {
            return EMPTY_BODY.to_string();
        }
        let result = truncate(text);
        log::debug!(
            "Normalized body from {} to {} bytes",
            body.len(),
            result.len()
        );
        result
    }

    fn run_stages(&self, body: &str) -> String {
        let mut text = body.to_string();
        for (name, stage) in STAGES.iter() {
            text = stage(self, &text);
            log::trace!("{} -> {} bytes", name, text.len());
        }
        text
    }

    /// Remove style, script and head blocks with their content, and comments.
    pub fn strip_blocks(&self, text: &str) -> String {
        replace_each(&self.hidden_blocks, text, "")
    }

    /// Drop inline `style` and `class` attributes, keeping the tag.
    pub fn strip_attributes(&self, text: &str) -> String {
        replace_each(&self.presentation_attrs, text, "")
    }

    /// Map structural tags to line breaks and bullet or heading markers.
    pub fn layout_tags(&self, text: &str) -> String {
        let text = self.line_break.replace_all(text, "\n");
        let text = self.paragraph_end.replace_all(&text, "\n\n");
        let text = self.block_end.replace_all(&text, "\n");
        let text = self.list_item.replace_all(&text, "  • ");
        let text = self.heading_start.replace_all(&text, "\n\n▶ ");
        self.heading_end.replace_all(&text, "\n").into_owned()
    }

    pub fn strip_tags(&self, text: &str) -> String {
        self.any_tag.replace_all(text, " ").into_owned()
    }

    /// Named entities from the configured table, in order, then `&#NNN;`.
    ///
    /// Code points outside the basic multilingual plane, and values that are
    /// not valid characters, decode to nothing.
    pub fn decode_entities(&self, text: &str) -> String {
        let mut decoded = text.to_string();
        for mapping in &self.entities {
            if decoded.contains(&mapping.entity) {
                decoded = decoded.replace(&mapping.entity, &mapping.replacement);
            }
        }

        self.numeric_entity
            .replace_all(&decoded, |caps: &regex::Captures| {
                match caps[1].parse::<u32>() {
                    Ok(code) if code < 0x10000 => {
                        char::from_u32(code).map(String::from).unwrap_or_default()
                    }
                    _ => String::new(),
                }
            })
            .into_owned()
    }

    pub fn collapse_whitespace(&self, text: &str) -> String {
        let text = self.horizontal_space.replace_all(text, " ");
        let text = self.line_leading_space.replace_all(&text, "\n");
        let text = self.line_trailing_space.replace_all(&text, "\n");
        self.blank_lines.replace_all(&text, "\n\n").into_owned()
    }

    /// Remove legal footers and leftover CSS.
    ///
    /// Removing a match can join text into a new match once whitespace is
    /// collapsed again, so this repeats until nothing changes. Every round
    /// shrinks the text.
    pub fn strip_footers(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let stripped = replace_each(&self.footers, &current, "");
            if stripped == current {
                return current;
            }
            current = self.collapse_whitespace(&stripped);
        }
    }
}

fn replace_each(patterns: &[Regex], text: &str, replacement: &str) -> String {
    let mut current = text.to_string();
    for pattern in patterns {
        current = pattern.replace_all(&current, replacement).into_owned();
    }
    current
}

/// Cap the text at [`MAX_BODY_CHARS`] and append the marker.
///
/// Text already carrying the marker after a body within the cap is returned
/// unchanged, so running the pipeline on its own output is a no-op.
fn truncate(cleaned: &str) -> String {
    if let Some(head) = cleaned.strip_suffix(TRUNCATION_MARKER) {
        if head.chars().count() <= MAX_BODY_CHARS {
            return cleaned.to_string();
        }
    }
    if cleaned.chars().count() <= MAX_BODY_CHARS {
        return cleaned.to_string();
    }
    format!(
        "{}{}",
        text::prefix(cleaned, MAX_BODY_CHARS).trim_end(),
        TRUNCATION_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> BodyNormalizer {
        BodyNormalizer::new(&RuleSet::default()).unwrap()
    }

    #[test]
    fn test_script_removed_and_tags_stripped() {
        let body = "<p>Hello <b>World</b></p><script>evil()</script>";
        assert_eq!(normalizer().normalize(body), "Hello World");
    }

    #[test]
    fn test_hidden_blocks_span_lines_and_ignore_case() {
        let body = "<HEAD><title>x</title></HEAD><Style type=\"text/css\">\np { color: red; }\n</STYLE>\
                    <!-- tracking\npixel -->Bonjour";
        assert_eq!(normalizer().strip_blocks(body), "Bonjour");
    }

    #[test]
    fn test_blocks_are_removed_non_greedily() {
        let body = "<script>a()</script>keep<script>b()</script>";
        assert_eq!(normalizer().strip_blocks(body), "keep");
    }

    #[test]
    fn test_presentation_attributes_dropped() {
        let html = r#"<td style="padding:0" class="cell" id="x">Hi</td>"#;
        assert_eq!(normalizer().strip_attributes(html), r#"<td id="x">Hi</td>"#);
    }

    #[test]
    fn test_layout_tags() {
        let n = normalizer();
        assert_eq!(n.layout_tags("a<br>b<BR/>c"), "a\nb\nc");
        assert_eq!(n.layout_tags("<p>x</p>"), "<p>x\n\n");
        assert_eq!(n.layout_tags("<ul><li>one</li></ul>"), "<ul>  • one\n</ul>");
        assert_eq!(n.layout_tags("<h2 id=\"t\">Titre</h2>"), "\n\n▶ Titre\n");
        assert_eq!(n.layout_tags("<link rel=\"x\">"), "<link rel=\"x\">");
    }

    #[test]
    fn test_list_rendering() {
        let body = "<p>Étapes :</p><ul><li>Entretien RH</li><li>Test technique</li></ul>";
        assert_eq!(
            normalizer().normalize(body),
            "Étapes :\n\n• Entretien RH\n• Test technique"
        );
    }

    #[test]
    fn test_heading_marker() {
        let body = "<h1>Offre</h1><div>Data engineer</div>";
        assert_eq!(normalizer().normalize(body), "▶ Offre\nData engineer");
    }

    #[test]
    fn test_named_and_numeric_entities() {
        let n = normalizer();
        assert_eq!(n.decode_entities("a &amp; b"), "a & b");
        assert_eq!(n.decode_entities("l&#39;offre"), "l'offre");
        assert_eq!(n.decode_entities("x&#128512;y"), "xy");
        assert_eq!(n.decode_entities("&#233;t&eacute;"), "ét&eacute;");
        assert_eq!(n.decode_entities("50&euro; &ndash; net"), "50€ – net");
    }

    #[test]
    fn test_entity_table_is_applied_in_order() {
        assert_eq!(normalizer().decode_entities("&amp;lt;"), "<");
    }

    #[test]
    fn test_malformed_numeric_entities_left_alone() {
        let n = normalizer();
        assert_eq!(n.decode_entities("&#abc; &#; &#12"), "&#abc; &#; &#12");
        assert_eq!(n.decode_entities("&#99999999999999999999;"), "");
        assert_eq!(n.decode_entities("&#55296;"), "");
    }

    #[test]
    fn test_whitespace_collapse() {
        let text = "a  \t b \n   c\n\n\n\n d";
        assert_eq!(normalizer().collapse_whitespace(text), "a b\nc\n\nd");
    }

    #[test]
    fn test_footer_removed_to_end() {
        let text = "Merci pour votre candidature.\n\nCommercial Register: HRB 1234\nVAT: DE1";
        assert_eq!(
            normalizer().strip_footers(text),
            "Merci pour votre candidature.\n\n"
        );
    }

    #[test]
    fn test_css_leftovers_removed() {
        let text = "Bonjour @media (max-width: 600px) { .a { x } suite {font-size: 12px}";
        assert_eq!(normalizer().normalize(text), "Bonjour suite");
    }

    #[test]
    fn test_empty_body_sentinel() {
        let n = normalizer();
        assert_eq!(n.normalize(""), EMPTY_BODY);
        assert_eq!(n.normalize("<style>p{}</style>  <br>"), EMPTY_BODY);
    }

    #[test]
    fn test_truncation() {
        let body = "é".repeat(MAX_BODY_CHARS + 10);
        let out = normalizer().normalize(&body);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            out.chars().count(),
            MAX_BODY_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_exactly_at_cap_is_not_truncated() {
        let body = "a".repeat(MAX_BODY_CHARS);
        assert_eq!(normalizer().normalize(&body), body);
    }

    #[test]
    fn test_decoded_markup_is_cleaned_too() {
        let n = normalizer();
        assert_eq!(
            n.normalize("<p>Use &lt;b&gt;bold&lt;/b&gt; tags</p>"),
            "Use bold tags"
        );
        assert_eq!(n.normalize("Tom &amp;amp; Jerry"), "Tom & Jerry");
        assert_eq!(n.normalize("A&amp;nbsp;B"), "A B");
    }

    #[test]
    fn test_self_rebuilding_entity_table_stops() {
        let mut rules = RuleSet::default();
        rules.html_entities = vec![EntityMapping::new("&x;", "&x;&x;")];
        let out = BodyNormalizer::new(&rules).unwrap().normalize("a&x;b");
        assert!(out.starts_with('a') && out.contains("&x;"));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let n = normalizer();
        let long = format!("<p>{}</p>", "mot ".repeat(1200));
        let samples = [
            "<p>Hello <b>World</b></p><script>evil()</script>",
            "<html><head><title>t</title></head><body><h2>Poste</h2>\
             <ul><li>Rust</li><li>SQL</li></ul><p>Salaire&nbsp;: 50&euro;</p>\
             <div>Managing Director: J. Doe</div></body></html>",
            "Plain text\n\n\n\nwith   gaps",
            "<p>Use &lt;b&gt;bold&lt;/b&gt; tags</p>",
            "Tom &amp;amp; Jerry",
            "A&amp;nbsp;B",
            "",
            long.as_str(),
        ];
        for sample in samples {
            let once = n.normalize(sample);
            assert_eq!(n.normalize(&once), once, "not idempotent for {:?}", sample);
            assert!(!once.contains("<p>") && !once.contains("<li>"));
        }
    }
}
