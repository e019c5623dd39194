//! Domain models for Runway
//!
//! Input records arrive from an external store and are read-only to the
//! engine. Output records are derived on demand and never persisted here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::month::YearMonth;

fn default_true() -> bool {
    true
}

/// How often a recurring item repeats in its native unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            _ => Err(Error::Configuration(format!(
                "Unknown frequency: {} (valid: weekly, biweekly, monthly, quarterly, yearly)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income source, recurring expense, or debt-derived virtual expense.
///
/// `amount` is always in the item's native frequency unit; the monthly
/// equivalent is computed by the recurrence resolver, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_essential: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_variable: Option<bool>,
}

impl RecurringItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            frequency,
            day_of_month: None,
            start_date,
            end_date: None,
            is_active: true,
            category: category.into(),
            is_essential: None,
            is_variable: None,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::Configuration(format!(
                "item '{}' has invalid amount {}",
                self.id, self.amount
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(Error::Configuration(format!(
                    "item '{}' ends ({}) before it starts ({})",
                    self.id, end, self.start_date
                )));
            }
        }
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(Error::Configuration(format!(
                    "item '{}' has invalid day of month {}",
                    self.id, day
                )));
            }
        }
        Ok(())
    }
}

/// Kind of liability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    Mortgage,
    StudentLoan,
    CreditCard,
    PersonalLoan,
    CarLoan,
    #[default]
    Other,
}

/// An interest-bearing liability snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub debt_type: DebtType,
    pub original_amount: f64,
    pub current_balance: f64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<f64>,
    pub start_date: NaiveDate,
    /// Remaining balance is forgiven from this date on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        current_balance: f64,
        interest_rate: f64,
        monthly_payment: Option<f64>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            debt_type: DebtType::Other,
            original_amount: current_balance,
            current_balance,
            interest_rate,
            monthly_payment,
            start_date,
            end_date: None,
            is_active: true,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.current_balance.is_finite() || self.current_balance < 0.0 {
            return Err(Error::Configuration(format!(
                "debt '{}' has negative balance {}",
                self.id, self.current_balance
            )));
        }
        if !self.interest_rate.is_finite() || self.interest_rate < 0.0 {
            return Err(Error::Configuration(format!(
                "debt '{}' has negative interest rate {}",
                self.id, self.interest_rate
            )));
        }
        if let Some(payment) = self.monthly_payment {
            if !payment.is_finite() || payment < 0.0 {
                return Err(Error::Configuration(format!(
                    "debt '{}' has negative monthly payment {}",
                    self.id, payment
                )));
            }
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(Error::Configuration(format!(
                    "debt '{}' ends ({}) before it starts ({})",
                    self.id, end, self.start_date
                )));
            }
        }
        Ok(())
    }
}

/// A held asset, projected with simple compound growth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub current_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    /// Annual appreciation in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appreciation_rate: Option<f64>,
    /// Annual depreciation in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depreciation_rate: Option<f64>,
}

impl Asset {
    /// Signed annual growth in percent (depreciation is negative)
    pub fn annual_growth_rate(&self) -> f64 {
        match (self.appreciation_rate, self.depreciation_rate) {
            (Some(up), _) => up,
            (None, Some(down)) => -down,
            (None, None) => 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.appreciation_rate.is_some() && self.depreciation_rate.is_some() {
            return Err(Error::Configuration(format!(
                "asset '{}' sets both appreciation and depreciation",
                self.id
            )));
        }
        if !self.current_value.is_finite() || self.current_value < 0.0 {
            return Err(Error::Configuration(format!(
                "asset '{}' has invalid value {}",
                self.id, self.current_value
            )));
        }
        Ok(())
    }
}

/// A single planned expense on a fixed date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneTimeExpense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: String,
}

/// A savings target funded by a fixed monthly contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub monthly_contribution: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// A historical transaction (negative amount = expense)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            date,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// Everything the projection needs, as plain data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialConfiguration {
    #[serde(default)]
    pub starting_balance: f64,
    #[serde(default)]
    pub income_sources: Vec<RecurringItem>,
    #[serde(default)]
    pub recurring_expenses: Vec<RecurringItem>,
    #[serde(default)]
    pub one_time_expenses: Vec<OneTimeExpense>,
    #[serde(default)]
    pub savings_goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub liabilities: Vec<Debt>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Budget bucket for proportional (50/30/20) budgeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Needs,
    Wants,
    Savings,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "needs",
            Self::Wants => "wants",
            Self::Savings => "savings",
        }
    }

    /// Target share of income under the 50/30/20 rule, in percent
    pub fn target_percent(&self) -> f64 {
        match self {
            Self::Needs => 50.0,
            Self::Wants => 30.0,
            Self::Savings => 20.0,
        }
    }

    pub fn all() -> &'static [BudgetTier] {
        &[Self::Needs, Self::Wants, Self::Savings]
    }
}

impl std::str::FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "needs" => Ok(Self::Needs),
            "wants" => Ok(Self::Wants),
            "savings" => Ok(Self::Savings),
            _ => Err(format!("Unknown budget tier: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Best-fit category for a transaction description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryClassification {
    pub category: String,
    /// 0-100
    pub confidence: f64,
    pub reason: String,
}

/// Inferred occurrence class of a spending pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternFrequency {
    Daily,
    Weekly,
    Monthly,
    Irregular,
}

impl PatternFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Irregular => "irregular",
        }
    }
}

impl std::fmt::Display for PatternFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recurring spending inferred from history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpensePattern {
    pub category: String,
    pub average_amount: f64,
    pub frequency: PatternFrequency,
    /// 0.1-0.9
    pub confidence: f64,
    pub last_occurrence: NaiveDate,
    pub predicted_next_amount: f64,
    pub observations: usize,
}

/// Where a projection line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    Recurring,
    OneTime,
    SavingsGoal,
    DebtPayment,
    Predicted,
}

/// One labeled contribution to a month's income or expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionLine {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub source: LineSource,
    /// 0-100
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_essential: Option<bool>,
}

/// Projected cash flow for a single calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub month: YearMonth,
    pub configured_income: f64,
    /// Set only for months that have already begun
    pub actual_income: Option<f64>,
    pub configured_expenses: f64,
    pub actual_expenses: Option<f64>,
    /// Expenses predicted from spending patterns, not configuration
    pub predicted_expenses: f64,
    pub projected_balance: f64,
    pub income_breakdown: Vec<ProjectionLine>,
    pub expense_breakdown: Vec<ProjectionLine>,
    /// 0-100
    pub confidence: f64,
    pub asset_value: f64,
    pub debt_balance: f64,
    pub net_worth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, monthly_item};

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("bi-weekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert_eq!("annual".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!(matches!(
            "fortnightly".parse::<Frequency>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_budget_tier_from_str() {
        assert_eq!("NEEDS".parse::<BudgetTier>().unwrap(), BudgetTier::Needs);
        assert!("luxury".parse::<BudgetTier>().is_err());
        let total: f64 = BudgetTier::all().iter().map(|t| t.target_percent()).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_recurring_item_validate() {
        assert!(monthly_item("ok", 10.0, "2024-01-01", "misc").validate().is_ok());
        assert!(monthly_item("neg", -1.0, "2024-01-01", "misc").validate().is_err());
        let backwards = monthly_item("b", 10.0, "2024-05-01", "misc").with_end_date(date("2024-01-01"));
        assert!(backwards.validate().is_err());
        let mut bad_day = monthly_item("d", 10.0, "2024-01-01", "misc");
        bad_day.day_of_month = Some(32);
        assert!(bad_day.validate().is_err());
    }

    #[test]
    fn test_debt_validate() {
        let debt = Debt::new("d", "Loan", 1000.0, 5.0, Some(50.0), date("2024-01-01"));
        assert!(debt.validate().is_ok());
        let mut negative = debt.clone();
        negative.interest_rate = -1.0;
        assert!(negative.validate().is_err());
        let backwards = debt.with_end_date(date("2023-01-01"));
        assert!(backwards.validate().is_err());
    }

    #[test]
    fn test_asset_growth_rate() {
        let mut asset = Asset {
            id: "car".to_string(),
            name: "Car".to_string(),
            current_value: 10_000.0,
            purchase_price: Some(15_000.0),
            appreciation_rate: None,
            depreciation_rate: Some(12.0),
        };
        assert_eq!(asset.annual_growth_rate(), -12.0);
        asset.appreciation_rate = Some(3.0);
        assert!(asset.validate().is_err());
    }
}
