use anyhow::Context;
use clap::{Arg, Command};
use job_triage::tracker::{EmailDetail, TriageReport};
use job_triage::{JobTracker, RawEmail, RuleSet};
use log::LevelFilter;
use std::process;

fn main() {
    let matches = Command::new("job-triage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sort job-search email into categories and skip promotional noise")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Rule set file path")
                .default_value("job-triage.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default rule set file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Check that every pattern in the rule set compiles")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("JSON array of exported email records")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-email")
                .long("test-email")
                .value_name("FILE")
                .help("Classify a single JSON email record and explain the verdict")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the triage report as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .value_name("NUMBER")
                .help("Show the cleaned content of the email with this number")
                .value_parser(clap::value_parser!(usize))
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging of every triage decision")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("job-triage.yaml");
    let rules = match load_rules(config_path) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Error loading rule set: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("🔍 Testing rule set...");
        println!();
        println!("Blocked senders: {}", rules.blocked_senders.len());
        println!(
            "Promo keywords: {} (threshold {})",
            rules.promo_keywords.len(),
            rules.promo_threshold
        );
        println!("Categories ({}):", rules.categories.len());
        for (i, category) in rules.categories.iter().enumerate() {
            println!(
                "  {}. {} ({} keywords)",
                i + 1,
                category.name,
                category.keywords.len()
            );
        }
        match rules.validate() {
            Ok(count) => println!("All {count} regex patterns compiled successfully."),
            Err(e) => {
                println!("❌ Rule set validation failed:");
                println!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let tracker = match JobTracker::new(&rules) {
        Ok(tracker) => tracker,
        Err(e) => {
            eprintln!("Error building classifiers: {e}");
            process::exit(1);
        }
    };

    if let Some(email_file) = matches.get_one::<String>("test-email") {
        if let Err(e) = test_email_file(&tracker, email_file) {
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
        return;
    }

    let Some(input) = matches.get_one::<String>("input") else {
        eprintln!("No input given. Use --input FILE with a JSON array of email records.");
        process::exit(2);
    };

    let emails = match load_emails(input) {
        Ok(emails) => emails,
        Err(e) => {
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    };
    let report = tracker.run(&emails);

    if let Some(&number) = matches.get_one::<usize>("show") {
        match report.entry(number) {
            Some(entry) => print_detail(&tracker.detail(&emails[entry.input_index])),
            None => {
                eprintln!(
                    "❌ Email #{} not found. Valid numbers: 1 to {}",
                    number,
                    report.total_categorized()
                );
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }
}

fn load_rules(path: &str) -> anyhow::Result<RuleSet> {
    let rules = if std::path::Path::new(path).exists() {
        RuleSet::from_file(path).with_context(|| format!("reading rule set '{path}'"))?
    } else {
        log::warn!("Rule set file '{path}' not found, using built-in rules");
        RuleSet::default()
    };
    Ok(rules)
}

fn generate_default_config(path: &str) {
    match RuleSet::default().to_file(path) {
        Ok(()) => {
            println!("Default rule set written to: {path}");
            println!("Please edit the rule set to suit your search.");
        }
        Err(e) => {
            eprintln!("Error writing rule set file: {e}");
            process::exit(1);
        }
    }
}

fn load_emails(path: &str) -> anyhow::Result<Vec<RawEmail>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading input '{path}'"))?;
    let emails: Vec<RawEmail> =
        serde_json::from_str(&content).with_context(|| format!("parsing input '{path}'"))?;
    log::info!("Loaded {} emails from {}", emails.len(), path);
    Ok(emails)
}

fn test_email_file(tracker: &JobTracker, email_file: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(email_file)
        .with_context(|| format!("reading email file '{email_file}'"))?;
    let email: RawEmail = serde_json::from_str(&content)
        .with_context(|| format!("parsing email file '{email_file}'"))?;

    println!("🧪 Testing email file: {}", email_file);
    println!();
    println!("From: {}", email.sender);
    println!("Subject: {}", email.subject);

    let result = tracker.classify(&email);
    if result.is_spam {
        println!(
            "🚫 Promotional, ignored (rule: {}, matched {})",
            result.spam_signal.as_deref().unwrap_or("unknown"),
            result.spam_reason.as_deref().unwrap_or("nothing")
        );
    } else if let Some(category) = &result.category {
        println!(
            "✅ Category: {} (keyword: '{}')",
            category,
            result.matched_keyword.as_deref().unwrap_or("")
        );
        print_detail(&tracker.detail(&email));
    } else {
        println!("➖ No category matched");
    }
    Ok(())
}

fn print_report(report: &TriageReport) {
    println!("📬 {} emails read", report.total);
    println!("🚫 {} promotional emails ignored", report.ignored);
    println!("➖ {} emails without a category", report.uncategorized);

    for group in report.categories.iter().filter(|g| !g.emails.is_empty()) {
        println!();
        println!("{} ({} email(s))", group.name, group.emails.len());
        println!("{}", "─".repeat(70));
        for tracked in &group.emails {
            let summary = &tracked.summary;
            println!("  #{}. [{}]", tracked.number, summary.account);
            println!("     From: {}", summary.sender);
            println!("     Subject: {}", summary.subject);
            if let Some(company) = &summary.company {
                println!("     Company: {}", company);
            }
            if !summary.links.is_empty() {
                println!("     Links: {} found", summary.links.len());
            }
        }
    }

    println!();
    println!("📈 Summary:");
    for (name, count) in report.counts() {
        if count > 0 {
            println!("   {}: {}", name, count);
        }
    }
}

fn print_detail(detail: &EmailDetail) {
    println!("{}", "═".repeat(80));
    println!("Account: [{}]", detail.account);
    println!("From: {}", detail.sender);
    println!("Subject: {}", detail.subject);
    println!("Date: {}", detail.date);
    println!("{}", "─".repeat(80));
    println!("{}", detail.body);
    if !detail.links.is_empty() {
        println!("{}", "─".repeat(80));
        println!("🔗 Links:");
        for (i, link) in detail.links.iter().enumerate() {
            println!("  {}. {}", i + 1, link);
        }
    }
    println!("{}", "═".repeat(80));
}
