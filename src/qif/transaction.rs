use std::fmt;

use chrono::{NaiveDate, Utc};

use super::account::Account;
use super::amount::{checked_sum, format_minor};
use super::error::QifError;
use super::split::Split;

/// Single QIF transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction<'a> {
    account: &'a Account,
    /// Date of transaction, time is not supported in QIF format
    date: NaiveDate,
    /// Minor currency units
    amount: i64,
    payee: String,
    memo: String,
    /// Category is used when transaction is spent in single piece, otherwise
    /// `splits` is used
    category: String,
    cleared_status: String,
    /// Check or reference number, written as `N` only when set
    number: Option<String>,
    /// Parts of transaction used for description of different categories
    splits: Vec<Split>,
}

impl<'a> Transaction<'a> {
    pub fn new(acc: &'a Account) -> Self {
        Transaction {
            account: acc,
            date: Utc::now().date_naive(),
            amount: 0,
            payee: String::new(),
            memo: String::new(),
            category: String::new(),
            cleared_status: String::new(),
            number: None,
            splits: Vec::new(),
        }
    }

    pub fn date(mut self, val: NaiveDate) -> Self {
        self.date = val;
        self
    }

    pub fn amount(mut self, val: i64) -> Self {
        self.amount = val;
        self
    }

    pub fn payee(mut self, val: &str) -> Self {
        self.payee = String::from(val);
        self
    }

    pub fn memo(mut self, val: &str) -> Self {
        self.memo = String::from(val);
        self
    }

    pub fn category(mut self, val: &str) -> Self {
        self.category = String::from(val);
        self
    }

    pub fn cleared_status(mut self, val: &str) -> Self {
        self.cleared_status = String::from(val);
        self
    }

    pub fn number(mut self, val: &str) -> Self {
        self.number = if val.is_empty() {
            None
        } else {
            Some(String::from(val))
        };
        self
    }

    pub fn splits(mut self, val: Vec<Split>) -> Self {
        self.splits = val;
        self
    }

    /// Checks that splits, when present, add up to the transaction amount.
    pub fn build(self) -> Result<Transaction<'a>, QifError> {
        if self.splits.is_empty() {
            return Ok(self);
        }

        let actual = self.splits_total()?;
        if actual != self.amount {
            return Err(QifError::SplitMismatch {
                expected: self.amount,
                actual,
            });
        }
        Ok(self)
    }

    /// Overflow saturates here and is reported by `build`.
    pub fn with_split(mut self, val: &Split) -> Self {
        self.amount = self.amount.saturating_add(val.amount);
        self.splits.push(val.clone());
        self
    }

    pub fn with_splits(mut self, val: &[Split]) -> Self {
        self.splits = val.to_owned();
        self.amount = self
            .splits
            .iter()
            .fold(0i64, |acc, s| acc.saturating_add(s.amount));
        self
    }

    pub fn sum(&self) -> i64 {
        self.amount
    }

    pub fn account(&self) -> &'a Account {
        self.account
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }

    pub fn get_payee(&self) -> &str {
        &self.payee
    }

    pub fn get_splits(&self) -> &[Split] {
        &self.splits
    }

    fn splits_total(&self) -> Result<i64, QifError> {
        self.splits
            .iter()
            .try_fold(0i64, |acc, s| checked_sum(acc, s.amount))
    }
}

impl fmt::Display for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "!Type:{0}\nD{1}\nP{2}\nM{3}\nL{4}\nC{5}\nT{6}",
            self.account.get_type(),
            self.date.format("%m/%d/%Y"),
            self.payee,
            self.memo,
            self.category,
            self.cleared_status,
            format_minor(self.amount)
        )?;

        if let Some(number) = &self.number {
            writeln!(f, "N{}", number)?;
        }

        for s in self.splits.iter() {
            write!(f, "{}", s)?;
        }
        writeln!(f, "^")
    }
}
