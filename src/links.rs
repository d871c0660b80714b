use regex::Regex;
use std::collections::BTreeSet;

use crate::config::RuleSet;

/// Pulls job-relevant URLs out of a raw body.
pub struct LinkExtractor {
    url_regex: Regex,
    job_domains: Vec<String>,
    path_markers: Vec<String>,
}

impl LinkExtractor {
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            url_regex: Regex::new(r#"https?://[^\s<>"']+"#).unwrap(),
            job_domains: lowered(&rules.job_domains),
            path_markers: lowered(&rules.job_path_markers),
        }
    }

    /// Every URL-shaped token in `body`, in order of appearance.
    pub fn find_urls<'s, 'a: 's>(
        &'s self,
        body: &'a str,
    ) -> impl Iterator<Item = &'a str> + 's {
        self.url_regex
            .find_iter(body)
            .map(|m| trim_closing(m.as_str()))
            .filter(|url| !url.ends_with("://"))
    }

    pub fn is_job_link(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.job_domains.iter().any(|d| url.contains(d.as_str()))
            || self.path_markers.iter().any(|m| url.contains(m.as_str()))
    }

    pub fn extract(&self, body: &str) -> BTreeSet<String> {
        let links: BTreeSet<String> = self
            .find_urls(body)
            .filter(|url| self.is_job_link(url))
            .map(str::to_string)
            .collect();
        log::debug!("Extracted {} job link(s)", links.len());
        links
    }
}

/// Drop trailing `]` and any `)` without a matching `(` inside the URL.
fn trim_closing(url: &str) -> &str {
    let mut url = url;
    loop {
        if let Some(rest) = url.strip_suffix(']') {
            url = rest;
        } else if url.ends_with(')') && url.matches('(').count() < url.matches(')').count() {
            url = &url[..url.len() - 1];
        } else {
            return url;
        }
    }
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
