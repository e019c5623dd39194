//! Classifier rule tables
//!
//! Rules are an ordered list of `(category, rule)` pairs; the order is the
//! tie-break priority and is preserved from the TOML `[[categories]]` array.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (`--rules`), which must exist
//! 2. The user override (~/.config/runway/categories.toml on Linux)
//! 3. Embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::BudgetTier;

/// Embedded default rules (compiled into binary)
const DEFAULT_RULES: &str = include_str!("../../../config/categories.toml");

/// Inclusive bounds on the absolute transaction amount
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AmountRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AmountRange {
    pub fn contains(&self, amount: f64) -> bool {
        let amount = amount.abs();
        self.min.map_or(true, |min| amount >= min) && self.max.map_or(true, |max| amount <= max)
    }
}

/// Keywords (lower-case) and optional amount filter for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
    pub amount_range: Option<AmountRange>,
}

impl CategoryRule {
    pub fn new(category: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            category: category.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            amount_range: None,
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.amount_range = Some(AmountRange { min, max });
        self
    }
}

/// What to do with descriptions no rule matches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackConfig {
    /// Unmatched amounts at or above this need manual review
    pub review_threshold: f64,
    pub review_category: String,
    pub review_confidence: f64,
    /// Catch-all for smaller unmatched amounts
    pub default_category: String,
    pub small_amount: f64,
    pub small_confidence: f64,
    pub medium_amount: f64,
    pub medium_confidence: f64,
    pub large_confidence: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            review_threshold: 200.0,
            review_category: "unknown".to_string(),
            review_confidence: 20.0,
            default_category: "other".to_string(),
            small_amount: 10.0,
            small_confidence: 30.0,
            medium_amount: 50.0,
            medium_confidence: 40.0,
            large_confidence: 50.0,
        }
    }
}

/// Immutable classifier configuration, injected at construction time
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClassifierConfig {
    pub rules: Vec<CategoryRule>,
    pub fallback: FallbackConfig,
    /// Category -> budget tier, keyed by lower-cased category name
    pub tiers: Vec<(String, BudgetTier)>,
}

impl ClassifierConfig {
    /// The embedded default rule table
    pub fn embedded() -> Result<Self> {
        parse_rules(DEFAULT_RULES)
    }

    /// Load rules using the resolution order described at module level
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Configuration(format!("Failed to read rules {}: {}", path.display(), e))
            })?;
            debug!("Loaded classifier rules from {}", path.display());
            return parse_rules(&content);
        }

        if let Some(path) = default_rules_path() {
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Configuration(format!("Failed to read rules {}: {}", path.display(), e))
                })?;
                debug!("Loaded classifier rules override from {}", path.display());
                return parse_rules(&content);
            }
        }

        Self::embedded()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_rules(content)
    }

    /// Explicit tier for a category, if one is configured
    pub fn tier_for(&self, category: &str) -> Option<BudgetTier> {
        let key = category.to_lowercase();
        self.tiers
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, tier)| *tier)
    }
}

/// Location of the user's rule override
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("runway").join("categories.toml"))
}

/// Raw rule file structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawRules {
    fallback: Option<RawFallback>,
    #[serde(default)]
    tiers: HashMap<String, String>,
    #[serde(default)]
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawFallback {
    review_threshold: Option<f64>,
    review_category: Option<String>,
    review_confidence: Option<f64>,
    default_category: Option<String>,
    small_amount: Option<f64>,
    small_confidence: Option<f64>,
    medium_amount: Option<f64>,
    medium_confidence: Option<f64>,
    large_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    tier: Option<String>,
}

fn parse_tier(category: &str, raw: &str) -> Result<BudgetTier> {
    raw.parse::<BudgetTier>()
        .map_err(|e| Error::Configuration(format!("category '{}': {}", category, e)))
}

/// Parse rules from TOML content
fn parse_rules(content: &str) -> Result<ClassifierConfig> {
    let raw: RawRules = toml::from_str(content)?;
    let mut config = ClassifierConfig::default();

    if let Some(fallback) = raw.fallback {
        let f = &mut config.fallback;
        if let Some(v) = fallback.review_threshold {
            f.review_threshold = v;
        }
        if let Some(v) = fallback.review_category {
            f.review_category = v;
        }
        if let Some(v) = fallback.review_confidence {
            f.review_confidence = v;
        }
        if let Some(v) = fallback.default_category {
            f.default_category = v;
        }
        if let Some(v) = fallback.small_amount {
            f.small_amount = v;
        }
        if let Some(v) = fallback.small_confidence {
            f.small_confidence = v;
        }
        if let Some(v) = fallback.medium_amount {
            f.medium_amount = v;
        }
        if let Some(v) = fallback.medium_confidence {
            f.medium_confidence = v;
        }
        if let Some(v) = fallback.large_confidence {
            f.large_confidence = v;
        }
    }

    for category in raw.categories {
        let name = category.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Configuration(
                "category rule without a name".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (category.min_amount, category.max_amount) {
            if min > max {
                return Err(Error::Configuration(format!(
                    "category '{}' has min_amount {} above max_amount {}",
                    name, min, max
                )));
            }
        }
        let keywords: Vec<String> = category
            .keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.trim().is_empty())
            .collect();
        if keywords.is_empty() {
            warn!("Category '{}' has no keywords and will never match", name);
        }
        if let Some(tier) = category.tier.as_deref() {
            config.tiers.push((name.to_lowercase(), parse_tier(&name, tier)?));
        }
        let amount_range = match (category.min_amount, category.max_amount) {
            (None, None) => None,
            (min, max) => Some(AmountRange { min, max }),
        };
        config.rules.push(CategoryRule {
            category: name,
            keywords,
            amount_range,
        });
    }

    // Sorted so the table is independent of TOML map ordering
    let mut extra: Vec<(String, String)> = raw.tiers.into_iter().collect();
    extra.sort();
    for (name, tier) in extra {
        let key = name.to_lowercase();
        if config.tiers.iter().any(|(existing, _)| *existing == key) {
            continue;
        }
        let tier = parse_tier(&name, &tier)?;
        config.tiers.push((key, tier));
    }

    Ok(config)
}
