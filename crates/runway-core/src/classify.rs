//! Budget classification
//!
//! Maps a free-text transaction description and signed amount to the
//! best-fitting category, with a 0-100 confidence and a readable reason.
//!
//! For every rule, in table order:
//! 1. Collect the rule's keywords found verbatim in the lower-cased
//!    description. Multi-word keywords also match with whitespace removed from
//!    both sides (so "ALBERTHEIJN" still hits "albert heijn")
//! 2. Skip the rule when nothing matched or the amount is out of range
//! 3. `confidence = matched / total × 100`, plus 20 (capped at 100) when a
//!    matched keyword is present in the whitespace-stripped description
//!
//! The highest confidence wins; ties keep the rule seen first. Unmatched
//! descriptions fall back to a review bucket (large amounts) or the catch-all
//! category (small amounts, scaled by size).

use serde::Serialize;
use tracing::debug;

use crate::models::{BudgetTier, CategoryClassification, MonthlyProjection, Transaction};
use crate::rules::{CategoryRule, ClassifierConfig};

const COMPACT_MATCH_BONUS: f64 = 20.0;

/// Category of money coming in; never counted against a spending tier
pub const INCOME_CATEGORY: &str = "income";

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Single-word keywords only match verbatim; edge whitespace such as "bp "
/// marks a word boundary and must survive.
fn keyword_matches(keyword: &str, desc: &str, compact_desc: &str) -> bool {
    if desc.contains(keyword) {
        return true;
    }
    keyword.trim().contains(char::is_whitespace) && compact_desc.contains(&compact(keyword))
}

/// Keyword classifier over an injected, immutable rule table
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a description and signed amount (negative = expense)
    pub fn classify(&self, description: &str, amount: f64) -> CategoryClassification {
        let desc = description.to_lowercase();
        let compact_desc = compact(&desc);

        let mut best: Option<(f64, &CategoryRule, Vec<&str>)> = None;
        for rule in &self.config.rules {
            if rule.keywords.is_empty() {
                continue;
            }

            let matched: Vec<&str> = rule
                .keywords
                .iter()
                .filter(|k| keyword_matches(k, &desc, &compact_desc))
                .map(String::as_str)
                .collect();
            if matched.is_empty() {
                continue;
            }
            if let Some(range) = &rule.amount_range {
                if !range.contains(amount) {
                    debug!(
                        "Rule '{}' matched '{}' but {:.2} is out of range",
                        rule.category, description, amount
                    );
                    continue;
                }
            }

            let mut confidence = matched.len() as f64 / rule.keywords.len() as f64 * 100.0;
            if matched.iter().any(|k| compact_desc.contains(&compact(k))) {
                confidence = (confidence + COMPACT_MATCH_BONUS).min(100.0);
            }

            let better = best
                .as_ref()
                .map_or(true, |(current, _, _)| confidence > *current);
            if better {
                best = Some((confidence, rule, matched));
            }
        }

        match best {
            Some((confidence, rule, matched)) => CategoryClassification {
                category: rule.category.clone(),
                confidence,
                reason: format!(
                    "Matched {} of {} keywords for {}: {}",
                    matched.len(),
                    rule.keywords.len(),
                    rule.category,
                    matched.join(", ")
                ),
            },
            None => self.fallback(amount),
        }
    }

    /// Category of a transaction, preferring its own label over a guess
    pub fn category_for(&self, transaction: &Transaction) -> String {
        match transaction.category.as_deref() {
            Some(category) if !category.trim().is_empty() => category.to_string(),
            _ => {
                self.classify(&transaction.description, transaction.amount)
                    .category
            }
        }
    }

    fn fallback(&self, amount: f64) -> CategoryClassification {
        let f = &self.config.fallback;
        let magnitude = amount.abs();

        if magnitude >= f.review_threshold {
            return CategoryClassification {
                category: f.review_category.clone(),
                confidence: f.review_confidence,
                reason: format!(
                    "No rule matched; {:.2} is at or above {:.2} and needs review",
                    magnitude, f.review_threshold
                ),
            };
        }

        let confidence = if magnitude < f.small_amount {
            f.small_confidence
        } else if magnitude < f.medium_amount {
            f.medium_confidence
        } else {
            f.large_confidence
        };
        CategoryClassification {
            category: f.default_category.clone(),
            confidence,
            reason: format!(
                "No rule matched; defaulted to {} for {:.2}",
                f.default_category, magnitude
            ),
        }
    }

    /// Budget tier of a category.
    ///
    /// The static category table wins; otherwise essential items are needs and
    /// everything else is a want.
    pub fn budget_tier(&self, category: &str, is_essential: Option<bool>) -> BudgetTier {
        self.config
            .tier_for(category)
            .unwrap_or(match is_essential {
                Some(true) => BudgetTier::Needs,
                _ => BudgetTier::Wants,
            })
    }

    /// 50/30/20 breakdown of a projected month's expenses against its income
    pub fn summarize_tiers(&self, projection: &MonthlyProjection) -> TierSummary {
        let lines = projection
            .expense_breakdown
            .iter()
            .map(|line| (line.category.as_str(), line.amount, line.is_essential));
        self.summarize(projection.configured_income, lines)
    }

    /// 50/30/20 breakdown of `(category, amount, is_essential)` lines
    pub fn summarize<'a>(
        &self,
        income: f64,
        lines: impl IntoIterator<Item = (&'a str, f64, Option<bool>)>,
    ) -> TierSummary {
        let mut amounts = [0.0_f64; 3];
        for (category, amount, is_essential) in lines {
            if category.eq_ignore_ascii_case(INCOME_CATEGORY) {
                continue;
            }
            let slot = match self.budget_tier(category, is_essential) {
                BudgetTier::Needs => 0,
                BudgetTier::Wants => 1,
                BudgetTier::Savings => 2,
            };
            amounts[slot] += amount.abs();
        }

        let tiers = BudgetTier::all()
            .iter()
            .zip(amounts)
            .map(|(tier, amount)| TierTotal {
                tier: *tier,
                amount,
                percent_of_income: if income > 0.0 {
                    amount / income * 100.0
                } else {
                    0.0
                },
                target_percent: tier.target_percent(),
            })
            .collect();

        TierSummary { income, tiers }
    }
}

/// Spending in one budget tier
#[derive(Debug, Clone, Serialize)]
pub struct TierTotal {
    pub tier: BudgetTier,
    pub amount: f64,
    pub percent_of_income: f64,
    pub target_percent: f64,
}

/// Spending split into needs / wants / savings
#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub income: f64,
    pub tiers: Vec<TierTotal>,
}

impl TierSummary {
    pub fn amount(&self, tier: BudgetTier) -> f64 {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .map_or(0.0, |t| t.amount)
    }
}
