use job_triage::{JobTracker, RawEmail, RuleSet, TriageOutcome};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing triage with a small custom rule set...");

    let rules_yaml = r#"
blocked_senders:
  - "newsletter@"
promo_keywords:
  - "soldes"
  - "code promo"
categories:
  - name: "INTERVIEW"
    keywords: ["entretien", "interview"]
    priority: 2
  - name: "APPLICATION_RECEIVED"
    keywords: ["candidature bien reçue"]
    priority: 1
"#;

    let rules: RuleSet = serde_yaml::from_str(rules_yaml)?;
    let tracker = JobTracker::new(&rules)?;

    let emails = vec![
        RawEmail::new("newsletter@example.com", "Entretien avec nos experts", ""),
        RawEmail::new(
            "boutique@example.com",
            "Soldes",
            "Utilisez le code promo HIVER",
        ),
        RawEmail::new(
            "rh@acme.fr",
            "Candidature bien reçue",
            "<p>Nous vous proposons un <b>entretien</b> chez Acme.</p>\
             <p>https://acme.example/careers/42</p>",
        )
        .with_account("Pro"),
    ];

    for email in &emails {
        println!();
        println!("From: {}", email.sender);
        println!("Subject: {}", email.subject);
        match tracker.process(email) {
            TriageOutcome::Spam { signal } => println!("❌ Ignored as promotional ({signal})"),
            TriageOutcome::Uncategorized => println!("➖ No category"),
            TriageOutcome::Categorized { category, summary } => {
                println!(
                    "✅ {} via '{}', company {:?}, {} link(s)",
                    category.category,
                    category.keyword,
                    summary.company,
                    summary.links.len()
                );
                println!("{}", tracker.detail(email).body);
            }
        }
    }

    // Table order decides, not priority: the third email is an INTERVIEW.
    let report = tracker.run(&emails);
    println!();
    println!("Counts: {:?}", report.counts());

    Ok(())
}
