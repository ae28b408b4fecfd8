//! Field mapping from statement rows to QIF entries.
//!
//! Rows that share a `split_key` value are folded into one split
//! transaction, in order of the key's first appearance.

use crate::config::toml_config::MappingConfig;
use crate::domain::model::{QifEntry, RejectedRow, SplitEntry, StatementRow};
use crate::qif::amount::{checked_sum, parse_minor};
use crate::qif::{Account, QifError, Split, Transaction};
use crate::utils::error::Result;
use crate::utils::validation::validate_single_ascii_char;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow {
    pub line: usize,
    pub date: NaiveDate,
    pub amount: i64,
    pub payee: String,
    pub memo: String,
    pub category: String,
    pub cleared_status: String,
    pub number: String,
    pub split_key: Option<String>,
}

pub struct RowMapper<'a> {
    mapping: &'a MappingConfig,
    decimal_separator: char,
}

impl<'a> RowMapper<'a> {
    pub fn new(mapping: &'a MappingConfig) -> Result<Self> {
        let decimal_separator =
            validate_single_ascii_char("mapping.decimal_separator", &mapping.decimal_separator)?;
        Ok(Self {
            mapping,
            decimal_separator,
        })
    }

    pub fn map_row(&self, row: &StatementRow) -> std::result::Result<MappedRow, RejectedRow> {
        let reject = |reason: String| RejectedRow {
            line: row.line,
            reason,
        };

        let raw_date = row
            .get(&self.mapping.date)
            .ok_or_else(|| reject(format!("missing date column '{}'", self.mapping.date)))?;
        let date = NaiveDate::parse_from_str(raw_date, &self.mapping.date_format).map_err(|e| {
            reject(format!(
                "date '{}' does not match '{}': {}",
                raw_date, self.mapping.date_format, e
            ))
        })?;

        let mut amount = self.amount(row).map_err(|e| reject(e.to_string()))?;
        if self.mapping.invert_amounts {
            amount = -amount;
        }

        let column = |name: &Option<String>| {
            name.as_deref()
                .and_then(|c| row.get(c))
                .unwrap_or_default()
                .to_string()
        };

        let mut category = column(&self.mapping.category);
        if category.is_empty() {
            category = self.mapping.default_category.clone().unwrap_or_default();
        }

        let split_key = self
            .mapping
            .split_key
            .as_deref()
            .and_then(|c| row.get(c))
            .map(str::to_string);

        Ok(MappedRow {
            line: row.line,
            date,
            amount,
            payee: column(&self.mapping.payee),
            memo: column(&self.mapping.memo),
            category,
            cleared_status: column(&self.mapping.cleared),
            number: column(&self.mapping.number),
            split_key,
        })
    }

    fn amount(&self, row: &StatementRow) -> std::result::Result<i64, QifError> {
        if let Some(column) = &self.mapping.amount {
            let raw = row.get(column).ok_or_else(|| QifError::InvalidAmount {
                value: String::new(),
                reason: format!("missing amount column '{}'", column),
            })?;
            return parse_minor(raw, self.decimal_separator);
        }

        // 借方為支出，貸方為收入
        let debit = self
            .mapping
            .debit
            .as_deref()
            .and_then(|c| row.get(c))
            .map(|v| parse_minor(v, self.decimal_separator))
            .transpose()?;
        let credit = self
            .mapping
            .credit
            .as_deref()
            .and_then(|c| row.get(c))
            .map(|v| parse_minor(v, self.decimal_separator))
            .transpose()?;

        match (debit, credit) {
            (None, None) => Err(QifError::InvalidAmount {
                value: String::new(),
                reason: "both debit and credit columns are empty".to_string(),
            }),
            (debit, credit) => {
                Ok(credit.map(i64::abs).unwrap_or(0) - debit.map(i64::abs).unwrap_or(0))
            }
        }
    }
}

/// Folds mapped rows into entries, merging rows that share a split key.
pub fn group_entries(rows: Vec<MappedRow>) -> std::result::Result<Vec<QifEntry>, QifError> {
    let mut entries: Vec<QifEntry> = Vec::with_capacity(rows.len());
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(key) = row.split_key.clone() else {
            entries.push(single_entry(row));
            continue;
        };

        match by_key.get(&key) {
            Some(&index) => {
                let entry = &mut entries[index];
                if entry.splits.is_empty() {
                    // 第一筆轉為分拆項目
                    entry.splits.push(SplitEntry {
                        category: std::mem::take(&mut entry.category),
                        memo: std::mem::take(&mut entry.memo),
                        amount: entry.amount,
                    });
                }
                if row.date != entry.date {
                    tracing::debug!(
                        "Split group '{}' line {} dated {} differs from {}, using the first",
                        key,
                        row.line,
                        row.date,
                        entry.date
                    );
                }
                entry.amount = checked_sum(entry.amount, row.amount)?;
                entry.lines.push(row.line);
                entry.splits.push(SplitEntry {
                    category: row.category,
                    memo: row.memo,
                    amount: row.amount,
                });
            }
            None => {
                by_key.insert(key, entries.len());
                entries.push(single_entry(row));
            }
        }
    }

    Ok(entries)
}

fn single_entry(row: MappedRow) -> QifEntry {
    QifEntry {
        lines: vec![row.line],
        date: row.date,
        payee: row.payee,
        memo: row.memo,
        category: row.category,
        cleared_status: row.cleared_status,
        number: row.number,
        amount: row.amount,
        splits: Vec::new(),
    }
}

pub fn build_transaction<'a>(
    entry: &QifEntry,
    account: &'a Account,
) -> std::result::Result<Transaction<'a>, QifError> {
    let transaction = Transaction::new(account)
        .date(entry.date)
        .payee(&entry.payee)
        .memo(&entry.memo)
        .category(&entry.category)
        .cleared_status(&entry.cleared_status)
        .number(&entry.number);

    if entry.splits.is_empty() {
        return transaction.amount(entry.amount).build();
    }

    let splits: Vec<Split> = entry
        .splits
        .iter()
        .map(|s| {
            Split::new()
                .category(&s.category)
                .memo(&s.memo)
                .amount(s.amount)
                .build()
        })
        .collect();

    transaction.amount(entry.amount).splits(splits).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qif::AccountType;

    fn row(line: usize, pairs: &[(&str, &str)]) -> StatementRow {
        StatementRow {
            line,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn mapping() -> MappingConfig {
        MappingConfig {
            category: Some("Category".to_string()),
            number: Some("Ref".to_string()),
            ..MappingConfig::default()
        }
    }

    #[test]
    fn maps_a_complete_row() {
        let config = mapping();
        let mapper = RowMapper::new(&config).unwrap();
        let mapped = mapper
            .map_row(&row(
                2,
                &[
                    ("Date", "2024-03-01"),
                    ("Amount", "-12.50"),
                    ("Payee", "Grocer"),
                    ("Memo", "weekly"),
                    ("Category", "Food"),
                    ("Ref", "77"),
                ],
            ))
            .unwrap();

        assert_eq!(mapped.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(mapped.amount, -1250);
        assert_eq!(mapped.payee, "Grocer");
        assert_eq!(mapped.category, "Food");
        assert_eq!(mapped.number, "77");
        assert_eq!(mapped.split_key, None);
    }

    #[test]
    fn rejects_rows_with_bad_date_or_amount() {
        let config = mapping();
        let mapper = RowMapper::new(&config).unwrap();

        let bad_date = mapper
            .map_row(&row(3, &[("Date", "01/03/2024"), ("Amount", "1.00")]))
            .unwrap_err();
        assert_eq!(bad_date.line, 3);
        assert!(bad_date.reason.contains("01/03/2024"));

        let bad_amount = mapper
            .map_row(&row(4, &[("Date", "2024-03-01"), ("Amount", "n/a")]))
            .unwrap_err();
        assert_eq!(bad_amount.line, 4);
        assert!(bad_amount.reason.contains("n/a"));

        let missing_amount = mapper
            .map_row(&row(5, &[("Date", "2024-03-01")]))
            .unwrap_err();
        assert!(missing_amount.reason.contains("Amount"));
    }

    #[test]
    fn debit_and_credit_columns_and_inversion() {
        let config = MappingConfig {
            amount: None,
            debit: Some("Out".to_string()),
            credit: Some("In".to_string()),
            decimal_separator: ",".to_string(),
            date_format: "%d.%m.%Y".to_string(),
            default_category: Some("Uncategorized".to_string()),
            ..MappingConfig::default()
        };
        let mapper = RowMapper::new(&config).unwrap();

        let debit = mapper
            .map_row(&row(2, &[("Date", "05.02.2024"), ("Out", "1.200,00"), ("In", "")]))
            .unwrap();
        assert_eq!(debit.amount, -120000);
        assert_eq!(debit.category, "Uncategorized");

        let credit = mapper
            .map_row(&row(3, &[("Date", "06.02.2024"), ("In", "15,5")]))
            .unwrap();
        assert_eq!(credit.amount, 1550);

        assert!(mapper.map_row(&row(4, &[("Date", "06.02.2024")])).is_err());

        let inverted = MappingConfig {
            invert_amounts: true,
            ..MappingConfig::default()
        };
        let mapper = RowMapper::new(&inverted).unwrap();
        let card = mapper
            .map_row(&row(2, &[("Date", "2024-02-06"), ("Amount", "42.00")]))
            .unwrap();
        assert_eq!(card.amount, -4200);
    }

    #[test]
    fn groups_rows_sharing_a_split_key() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let mapped = |line: usize, key: Option<&str>, category: &str, amount: i64| MappedRow {
            line,
            date,
            amount,
            payee: format!("payee {}", line),
            memo: format!("memo {}", line),
            category: category.to_string(),
            cleared_status: String::new(),
            number: String::new(),
            split_key: key.map(str::to_string),
        };

        let entries = group_entries(vec![
            mapped(2, Some("R1"), "Food", -1000),
            mapped(3, None, "Salary", 250000),
            mapped(4, Some("R1"), "Household", -500),
            mapped(5, Some("R2"), "Fuel", -3000),
        ])
        .unwrap();

        assert_eq!(entries.len(), 3);

        let receipt = &entries[0];
        assert_eq!(receipt.lines, vec![2, 4]);
        assert_eq!(receipt.amount, -1500);
        assert_eq!(receipt.payee, "payee 2");
        assert!(receipt.category.is_empty());
        assert_eq!(
            receipt.splits,
            vec![
                SplitEntry {
                    category: "Food".to_string(),
                    memo: "memo 2".to_string(),
                    amount: -1000
                },
                SplitEntry {
                    category: "Household".to_string(),
                    memo: "memo 4".to_string(),
                    amount: -500
                },
            ]
        );

        assert_eq!(entries[1].category, "Salary");
        assert!(entries[2].splits.is_empty());
        assert_eq!(entries[2].category, "Fuel");
    }

    #[test]
    fn split_group_overflow_is_an_error() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let huge = |line: usize| MappedRow {
            line,
            date,
            amount: 9_000_000_000_000_000_000,
            payee: String::new(),
            memo: String::new(),
            category: String::new(),
            cleared_status: String::new(),
            number: String::new(),
            split_key: Some("X".to_string()),
        };

        let err = group_entries(vec![huge(2), huge(3)]).unwrap_err();
        assert!(matches!(err, QifError::AmountOverflow { .. }));
    }

    #[test]
    fn builds_split_transactions_that_balance() {
        let account = Account::new().name("Checking").account_type(AccountType::Bank);
        let entry = QifEntry {
            lines: vec![2, 3],
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            payee: "Market".to_string(),
            memo: String::new(),
            category: String::new(),
            cleared_status: "*".to_string(),
            number: String::new(),
            amount: -1500,
            splits: vec![
                SplitEntry {
                    category: "Food".to_string(),
                    memo: String::new(),
                    amount: -1000,
                },
                SplitEntry {
                    category: "Household".to_string(),
                    memo: String::new(),
                    amount: -500,
                },
            ],
        };

        let transaction = build_transaction(&entry, &account).unwrap();
        assert_eq!(transaction.sum(), -1500);
        assert_eq!(
            transaction.to_string(),
            "!Type:Bank\nD01/10/2024\nPMarket\nM\nL\nC*\nT-15.00\n\
SFood\nE\n$-10.00\nSHousehold\nE\n$-5.00\n^\n"
        );
    }
}
