use std::fmt;
use std::io::Write;

use super::account::Account;
use super::amount::checked_sum;
use super::error::QifError;
use super::transaction::Transaction;

/// An account block followed by the transactions posted to it.
#[derive(Debug, Clone)]
pub struct QifDocument<'a> {
    account: &'a Account,
    transactions: Vec<Transaction<'a>>,
}

impl<'a> QifDocument<'a> {
    pub fn new(account: &'a Account) -> Self {
        Self {
            account,
            transactions: Vec::new(),
        }
    }

    pub fn push(&mut self, transaction: Transaction<'a>) -> Result<(), QifError> {
        let expected = self.account.get_type();
        let found = transaction.account().get_type();
        if expected != found {
            return Err(QifError::AccountMismatch { expected, found });
        }
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction<'a>] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn total(&self) -> Result<i64, QifError> {
        self.transactions
            .iter()
            .try_fold(0i64, |acc, t| checked_sum(acc, t.sum()))
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{}", self.account)?;
        for transaction in &self.transactions {
            write!(writer, "{}", transaction)?;
        }
        writer.flush()
    }
}

impl fmt::Display for QifDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.account)?;
        for transaction in &self.transactions {
            write!(f, "{}", transaction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qif::{AccountType, Split};
    use chrono::NaiveDate;

    #[test]
    fn renders_account_then_transactions_in_order() {
        let acc = Account::new().name("Wallet").account_type(AccountType::Cash);
        let date = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();

        let mut doc = QifDocument::new(&acc);
        doc.push(Transaction::new(&acc).date(date).payee("Bakery").amount(-350))
            .unwrap();
        doc.push(
            Transaction::new(&acc)
                .date(date)
                .payee("Market")
                .with_split(&Split::new().category("Food").amount(-1200))
                .build()
                .unwrap(),
        )
        .unwrap();

        let expected = "!Account\nNWallet\nTCash\n^\n\
!Type:Cash\nD01/02/2021\nPBakery\nM\nL\nC\nT-3.50\n^\n\
!Type:Cash\nD01/02/2021\nPMarket\nM\nL\nC\nT-12.00\nSFood\nE\n$-12.00\n^\n";

        assert_eq!(doc.render(), expected);
        assert_eq!(doc.total().unwrap(), -1550);
        assert_eq!(doc.len(), 2);

        let mut buf = Vec::new();
        doc.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn total_reports_overflow() {
        let acc = Account::new();
        let mut doc = QifDocument::new(&acc);
        doc.push(Transaction::new(&acc).amount(i64::MAX)).unwrap();
        doc.push(Transaction::new(&acc).amount(1)).unwrap();

        assert_eq!(
            doc.total(),
            Err(QifError::AmountOverflow {
                left: i64::MAX,
                right: 1
            })
        );
    }

    #[test]
    fn rejects_transaction_for_other_account_type() {
        let bank = Account::new().name("Checking");
        let card = Account::new().account_type(AccountType::CreditCard);

        let mut doc = QifDocument::new(&bank);
        let err = doc.push(Transaction::new(&card).amount(-100)).unwrap_err();

        assert_eq!(
            err,
            QifError::AccountMismatch {
                expected: AccountType::Bank,
                found: AccountType::CreditCard,
            }
        );
        assert!(doc.is_empty());
    }
}
