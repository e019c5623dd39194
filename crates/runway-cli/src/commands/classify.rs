//! Classification command implementations

use anyhow::Result;
use runway_core::Classifier;

use super::{print_json, truncate};

pub fn cmd_classify(classifier: &Classifier, description: &str, amount: f64, json: bool) -> Result<()> {
    let result = classifier.classify(description, amount);
    if json {
        return print_json(&result);
    }

    let tier = classifier.budget_tier(&result.category, None);

    println!();
    println!("🏷️  {}", description);
    println!("   ─────────────────────────────────────────────");
    println!("   Category:   {}", result.category);
    println!("   Confidence: {:.0}%", result.confidence);
    println!("   Tier:       {}", tier);
    println!("   Reason:     {}", result.reason);

    Ok(())
}

pub fn cmd_rules(classifier: &Classifier, json: bool) -> Result<()> {
    let config = classifier.config();
    if json {
        return print_json(config);
    }

    println!();
    println!("📋 Classifier Rules (checked in this order)");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:3} {:15} │ {:>15} │ {:7} │ Keywords",
        "#", "Category", "Amount", "Tier"
    );
    println!("   ───────────────────┼─────────────────┼─────────┼──────────────");

    for (i, rule) in config.rules.iter().enumerate() {
        let range = match &rule.amount_range {
            Some(r) => format!(
                "{}..{}",
                r.min.map(|v| format!("{:.0}", v)).unwrap_or_default(),
                r.max.map(|v| format!("{:.0}", v)).unwrap_or_default()
            ),
            None => "any".to_string(),
        };
        let tier = config
            .tier_for(&rule.category)
            .map(|t| t.as_str())
            .unwrap_or("-");
        println!(
            "   {:3} {:15} │ {:>15} │ {:7} │ {}",
            i + 1,
            truncate(&rule.category, 15),
            range,
            tier,
            truncate(&rule.keywords.join(", "), 50)
        );
    }

    let f = &config.fallback;
    println!();
    println!("   Unmatched:");
    println!(
        "     ≥ {:.2}  → {} ({:.0}%)",
        f.review_threshold, f.review_category, f.review_confidence
    );
    println!(
        "     < {:.2}  → {} ({:.0}% / {:.0}% / {:.0}% by amount)",
        f.review_threshold,
        f.default_category,
        f.small_confidence,
        f.medium_confidence,
        f.large_confidence
    );

    Ok(())
}
