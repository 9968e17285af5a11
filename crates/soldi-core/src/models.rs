//! Domain models for Soldi

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2id PHC string, never serialized to API responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 of the bearer token, the plaintext is never stored
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Archived,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Unknown account status: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A money holder: cash, a bank account, a prepaid card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Stored balance, adjusted by each transaction at write time
    pub balance: f64,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// A new account before DB insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub name: String,
    #[serde(default)]
    pub balance: f64,
}

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a transaction touches accounts. Each variant carries exactly the
/// fields its kind needs, so an income row can never hold a destination
/// account and a transfer can never hold a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Posting {
    Income {
        account_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        category_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subcategory_id: Option<i64>,
    },
    Expense {
        account_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        category_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subcategory_id: Option<i64>,
    },
    Transfer {
        from_account_id: i64,
        to_account_id: i64,
    },
}

impl Posting {
    pub fn income(account_id: i64, category_id: Option<i64>, subcategory_id: Option<i64>) -> Self {
        Self::Income {
            account_id,
            category_id,
            subcategory_id,
        }
    }

    pub fn expense(account_id: i64, category_id: Option<i64>, subcategory_id: Option<i64>) -> Self {
        Self::Expense {
            account_id,
            category_id,
            subcategory_id,
        }
    }

    /// Transfers between an account and itself are rejected here, before
    /// anything reaches the database.
    pub fn transfer(from_account_id: i64, to_account_id: i64) -> Result<Self> {
        if from_account_id == to_account_id {
            return Err(Error::InvalidData(
                "Transfer source and destination accounts must differ".into(),
            ));
        }
        Ok(Self::Transfer {
            from_account_id,
            to_account_id,
        })
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Income { .. } => TransactionKind::Income,
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }
}

/// A recorded money movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub description: String,
    /// Always positive, direction lives in the posting kind
    pub amount: f64,
    #[serde(flatten)]
    pub posting: Posting,
    pub created_at: DateTime<Utc>,
}

/// A new transaction before DB insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub posting: Posting,
}

impl NewTransaction {
    /// Validates the amount at construction: magnitudes are always
    /// positive, the posting kind carries the direction.
    pub fn new(date: NaiveDate, description: String, amount: f64, posting: Posting) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                amount
            )));
        }
        Ok(Self {
            date,
            description,
            amount,
            posting,
        })
    }
}

/// A spending/income category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub subcategories: Vec<Subcategory>,
    pub created_at: DateTime<Utc>,
}

/// A subcategory nested under a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

/// Kind of recurring date reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Birthday,
    NameDay,
    Anniversary,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birthday => "birthday",
            Self::NameDay => "nameday",
            Self::Anniversary => "anniversary",
        }
    }
}

impl std::str::FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "birthday" => Ok(Self::Birthday),
            "nameday" | "name_day" => Ok(Self::NameDay),
            "anniversary" => Ok(Self::Anniversary),
            _ => Err(format!("Unknown reminder kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring date (birthday, name day, anniversary)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// The original date, the year is kept for age computation
    pub date: NaiveDate,
    pub kind: ReminderKind,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Month-day ordering key so January entries sort before December
    /// regardless of birth year.
    pub fn month_day(&self) -> (u32, u32) {
        use chrono::Datelike;
        (self.date.month(), self.date.day())
    }
}

/// A new reminder before DB insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewReminder {
    pub name: String,
    pub date: NaiveDate,
    pub kind: ReminderKind,
}

/// Dashboard summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_balance: f64,
    pub active_accounts: i64,
    pub total_transactions: i64,
    pub upcoming_reminders: Vec<Reminder>,
}
