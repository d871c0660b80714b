use regex::Regex;
use serde::{Deserialize, Serialize};

/// Rule tables driving every classifier in the crate.
///
/// A `RuleSet` is loaded once at startup and only ever borrowed afterwards.
/// Fields missing from a configuration file fall back to the built-in tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub blocked_senders: Vec<String>,
    pub promo_keywords: Vec<String>,
    /// Distinct promo keywords needed before a message counts as promotional.
    pub promo_threshold: usize,
    pub newsletter_patterns: Vec<String>,
    /// Evaluated in declaration order, first match wins.
    pub categories: Vec<CategoryRule>,
    pub job_domains: Vec<String>,
    pub job_path_markers: Vec<String>,
    pub footer_patterns: Vec<String>,
    pub html_entities: Vec<EntityMapping>,
    pub company_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
    /// Informational only. Matching always follows declaration order.
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
    pub entity: String,
    pub replacement: String,
}

impl CategoryRule {
    pub fn new(name: &str, keywords: &[&str], priority: i32) -> Self {
        Self {
            name: name.to_string(),
            keywords: to_strings(keywords),
            priority,
        }
    }
}

impl EntityMapping {
    pub fn new(entity: &str, replacement: &str) -> Self {
        Self {
            entity: entity.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Compile a list of configured patterns, failing on the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> anyhow::Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .map_err(|e| anyhow::anyhow!("Invalid regex pattern '{}': {}", pattern, e))
        })
        .collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            blocked_senders: to_strings(&[
                "michaelkors",
                "zara.com",
                "hm.com",
                "newsletter@",
                "promo@",
                "marketing@",
                "info@linkedin.com",
                "sony",
                "openclassrooms",
                "columbia.edu",
                "brevosend.com",
                "accounts.google.com",
                "etmail.sony",
                "noreply@glassdoor.com",
                "notification@emails.hellowork.com",
                "alerte@emails.hellowork.com",
                "notify-noreply@google.com",
                "jobnotification@",
                "noreply55.jobs2web.com",
                "noreply12.jobs2web.com",
                "ekez.fa.sender@workflow.mail",
            ]),
            promo_keywords: to_strings(&[
                "promotion",
                "soldes",
                "réduction",
                "-50%",
                "-30%",
                "code promo",
                "livraison gratuite",
                "vente flash",
                "black friday",
                "cyber monday",
                "meilleur de la promotion",
                "articles sélectionnés",
                "shopping",
                "panier",
                "commande",
                "achat",
                "boutique",
                "enregistrez votre produit",
                "webinar",
                "campaign",
                "dons",
                "soutien",
                "formation gratuite",
                "alerte offre d'emploi",
                "job alert",
                "nouvelle offre d'emploi",
                "offre pour",
                "emplois pour",
                "postulez maintenant",
                "un poste comme",
                "autres emplois",
                "vous attendent",
                "jobs posted",
                "new jobs",
                "job notification",
            ]),
            promo_threshold: 2,
            newsletter_patterns: to_strings(&[
                r"alerte.*emploi",
                r"job.*alert",
                r"\d+\s+autres?\s+emplois?",
                r"\d+\s+nouveaux?\s+emplois?",
                r"postulez maintenant.*et\s+\d+",
                r"pour\s+\w+\s+vous\s+attendent",
                r"nouvelle[s]?\s+offre[s]?\s+d'emploi\s+rien\s+que\s+pour\s+vous",
                r"jobs?\s+posted\s+from",
                r"new\s+jobs?\s+from",
            ]),
            categories: vec![
                CategoryRule::new(
                    "ACCEPTED",
                    &[
                        "choisi pour le poste",
                        "retenu pour le poste",
                        "sélectionné pour le poste",
                        "félicitations pour votre",
                        "nous avons le plaisir de vous informer",
                        "heureux de vous annoncer",
                        "votre profil a été retenu",
                        "convoqué pour",
                        "invitation à rejoindre notre équipe",
                        "proposition d'embauche",
                        "offre d'emploi acceptée",
                        "votre candidature a été retenue",
                    ],
                    1,
                ),
                CategoryRule::new(
                    "REJECTED",
                    &[
                        "candidature refusée",
                        "non retenu",
                        "pas retenu",
                        "malheureusement",
                        "ne pouvons pas donner suite",
                        "n'a pas été retenue",
                        "sans suite favorable",
                        "au regret",
                        "pas donné suite",
                        "décliné votre candidature",
                        "réponse négative",
                        "défavorable",
                        "pas été sélectionné",
                        "ne correspondant pas au profil",
                    ],
                    2,
                ),
                CategoryRule::new(
                    "ASSESSMENT",
                    &[
                        "test technique",
                        "évaluation technique",
                        "assessment center",
                        "exercice technique",
                        "cas pratique",
                        "test de personnalité",
                        "mise en situation",
                        "test en ligne",
                    ],
                    3,
                ),
                CategoryRule::new(
                    "INTERVIEW",
                    &[
                        "convocation entretien",
                        "invitation entretien",
                        "entretien téléphonique",
                        "entretien visio",
                        "rendez-vous recrutement",
                        "interview",
                        "rencontrer notre équipe",
                    ],
                    4,
                ),
                CategoryRule::new(
                    "APPLICATION_RECEIVED",
                    &[
                        "votre candidature",
                        "candidature bien reçue",
                        "candidature enregistrée",
                        "accusé de réception",
                        "votre CV a bien été",
                    ],
                    5,
                ),
                CategoryRule::new(
                    "JOB_OFFERS",
                    &[
                        "offre d'emploi",
                        "opportunité professionnelle",
                        "recrute un",
                        "poste à pourvoir",
                        "nous recherchons",
                        "nouvelle offre",
                        "postulez maintenant",
                        "emplois pour",
                        "job alert",
                    ],
                    6,
                ),
            ],
            job_domains: to_strings(&[
                "linkedin.com/jobs",
                "indeed.com",
                "glassdoor.com",
                "welcometothejungle.com",
                "hellowork.com",
                "apec.fr",
                "cadremploi.fr",
                "monster.fr",
                "talent.io",
                "jobs2web.com",
                "workday.com",
                "greenhouse.io",
                "lever.co",
                "smartrecruiters.com",
            ]),
            job_path_markers: to_strings(&["/job", "/career", "/emploi"]),
            footer_patterns: to_strings(&[
                r"(?is)Commercial Register.*$",
                r"(?is)Managing Directors?:.*$",
                r"(?is)District Court.*$",
                r"(?is)@media\s*\([^)]+\)\s*\{[^}]+\}",
                r"(?is)\{[^}]*font-size[^}]*\}",
            ]),
            html_entities: vec![
                EntityMapping::new("&nbsp;", " "),
                EntityMapping::new("&amp;", "&"),
                EntityMapping::new("&lt;", "<"),
                EntityMapping::new("&gt;", ">"),
                EntityMapping::new("&quot;", "\""),
                EntityMapping::new("&#39;", "'"),
                EntityMapping::new("&apos;", "'"),
                EntityMapping::new("&euro;", "€"),
                EntityMapping::new("&copy;", "©"),
                EntityMapping::new("&reg;", "®"),
                EntityMapping::new("&#160;", " "),
                EntityMapping::new("&#8217;", "'"),
                EntityMapping::new("&#8220;", "\""),
                EntityMapping::new("&#8221;", "\""),
                EntityMapping::new("&rsquo;", "'"),
                EntityMapping::new("&lsquo;", "'"),
                EntityMapping::new("&rdquo;", "\""),
                EntityMapping::new("&ldquo;", "\""),
                EntityMapping::new("&ndash;", "–"),
                EntityMapping::new("&mdash;", "—"),
                EntityMapping::new("&bull;", "•"),
            ],
            company_patterns: to_strings(&[
                r"(?:chez|at|@)\s+([A-Z][A-Za-z\s&]+?)(?:\s+recrute|\s+recherche|\.|,)",
                r"([A-Z][A-Za-z\s&]+?)\s+recrute",
            ]),
        }
    }
}

impl RuleSet {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let rules: RuleSet = serde_yaml::from_str(&content)?;
        Ok(rules)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Compile every configured regex and report the first invalid one.
    pub fn validate(&self) -> anyhow::Result<usize> {
        let mut total = 0;
        for patterns in [
            &self.newsletter_patterns,
            &self.footer_patterns,
            &self.company_patterns,
        ] {
            total += compile_patterns(patterns)?.len();
        }
        Ok(total)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        let rules = RuleSet::default();
        assert_eq!(rules.validate().unwrap(), 9 + 5 + 2);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let rules = RuleSet {
            newsletter_patterns: vec!["job(".to_string()],
            ..Default::default()
        };
        let err = rules.validate().unwrap_err().to_string();
        assert!(err.contains("Invalid regex pattern 'job('"));
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let path = std::env::temp_dir().join("job-triage-rules-test.yaml");
        let path = path.to_str().unwrap();

        let rules = RuleSet::default();
        rules.to_file(path).unwrap();
        let loaded = RuleSet::from_file(path).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(loaded, rules);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = r#"
blocked_senders:
  - "spam@"
categories:
  - name: "INTERVIEW"
    keywords: ["interview"]
"#;
        let rules: RuleSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.blocked_senders, vec!["spam@".to_string()]);
        assert_eq!(rules.categories.len(), 1);
        assert_eq!(rules.categories[0].priority, 0);
        assert_eq!(rules.promo_threshold, 2);
        assert_eq!(rules.job_domains, RuleSet::default().job_domains);
    }

    #[test]
    fn test_category_order_is_declaration_order() {
        let rules = RuleSet::default();
        assert_eq!(
            rules.category_names(),
            vec![
                "ACCEPTED",
                "REJECTED",
                "ASSESSMENT",
                "INTERVIEW",
                "APPLICATION_RECEIVED",
                "JOB_OFFERS"
            ]
        );
    }
}
