use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw row of a statement export, keyed by trimmed header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// 1-based line in the source, header included
    pub line: usize,
    pub fields: HashMap<String, String>,
}

impl StatementRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A row, or a group of rows sharing a split key, after field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QifEntry {
    pub lines: Vec<usize>,
    pub date: chrono::NaiveDate,
    pub payee: String,
    pub memo: String,
    pub category: String,
    pub cleared_status: String,
    pub number: String,
    /// Minor currency units
    pub amount: i64,
    pub splits: Vec<SplitEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitEntry {
    pub category: String,
    pub memo: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub account_name: String,
    pub account_type: String,
    pub rows_read: usize,
    pub transactions_written: usize,
    pub split_transactions: usize,
    pub rows_rejected: usize,
    /// Minor currency units
    pub total_amount: i64,
    pub first_date: Option<chrono::NaiveDate>,
    pub last_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub entries: Vec<QifEntry>,
    pub rejected: Vec<RejectedRow>,
    pub qif_output: String,
    pub summary: ConversionSummary,
}
