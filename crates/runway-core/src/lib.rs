//! Runway Core Library
//!
//! Projection and classification engine for the Runway budgeting tool:
//! - Recurrence resolution for income and expenses of any frequency
//! - Debt amortization with interest, payoff and end-date forgiveness
//! - Keyword-based budget classification with 50/30/20 tiers
//! - Expense pattern detection from transaction history
//! - Month-by-month balance and net worth projection
//! - Loaders for configuration (JSON), rules (TOML) and history (CSV/JSON)
//!
//! Every engine entry point is a pure function of its inputs; nothing here
//! performs I/O except the loaders.

pub mod amortization;
pub mod assets;
pub mod classify;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod month;
pub mod patterns;
pub mod projection;
pub mod recurrence;
pub mod rules;

#[cfg(test)]
pub mod test_utils;

pub use amortization::{
    AggregatePoint, AmortizationPoint, DebtReport, DebtSchedule, DebtSimulator, DebtState,
    DebtSummary, Granularity,
};
pub use classify::{Classifier, TierSummary, TierTotal};
pub use error::{Error, Result, Warning};
pub use models::{
    Asset, BudgetTier, CategoryClassification, Debt, DebtType, ExpensePattern,
    FinancialConfiguration, Frequency, LineSource, MonthlyProjection, OneTimeExpense,
    PatternFrequency, ProjectionLine, RecurringItem, SavingsGoal, Transaction,
};
pub use month::YearMonth;
pub use patterns::{PatternAnalyzer, PatternReport};
pub use projection::{ProjectionEngine, ProjectionReport};
pub use rules::{AmountRange, CategoryRule, ClassifierConfig, FallbackConfig};
