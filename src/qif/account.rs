use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::QifError;

/// QIF Account
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account name is used during QIF import
    name: String,
    account_type: AccountType,
    /// Free-form comment, never written to the QIF output
    description: String,
}

/// QIF account types.
///
/// QIF has several dialects; this is the subset every importer accepts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccountType {
    #[default]
    Bank,
    Cash,
    CreditCard,
    Investment,
    AssetAccount,
    LiabilityAccount,
}

impl AccountType {
    pub const ALL: [AccountType; 6] = [
        AccountType::Bank,
        AccountType::Cash,
        AccountType::CreditCard,
        AccountType::Investment,
        AccountType::AssetAccount,
        AccountType::LiabilityAccount,
    ];

    /// Header name used after `!Type:` and in the account block.
    pub fn header(&self) -> &'static str {
        match self {
            AccountType::Bank => "Bank",
            AccountType::Cash => "Cash",
            AccountType::CreditCard => "CCard",
            AccountType::Investment => "Invst",
            AccountType::AssetAccount => "Oth A",
            AccountType::LiabilityAccount => "Oth L",
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            AccountType::Bank => "bank",
            AccountType::Cash => "cash",
            AccountType::CreditCard => "creditcard",
            AccountType::Investment => "investment",
            AccountType::AssetAccount => "assetaccount",
            AccountType::LiabilityAccount => "liabilityaccount",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for AccountType {
    type Err = QifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        AccountType::ALL
            .into_iter()
            .find(|t| {
                t.header().eq_ignore_ascii_case(trimmed) || t.variant_name() == normalized
            })
            .ok_or_else(|| QifError::UnknownAccountType(s.to_string()))
    }
}

impl TryFrom<String> for AccountType {
    type Error = QifError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountType> for String {
    fn from(value: AccountType) -> Self {
        value.header().to_string()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "!Account\nN{0}\nT{1}\n^", self.name, self.account_type)
    }
}

impl Account {
    pub fn new() -> Self {
        Account::default()
    }

    pub fn name(mut self, val: &str) -> Self {
        self.name = String::from(val);
        self
    }

    pub fn description(mut self, val: &str) -> Self {
        self.description = String::from(val);
        self
    }

    pub fn account_type(mut self, val: AccountType) -> Self {
        self.account_type = val;
        self
    }

    pub fn get_type(&self) -> AccountType {
        self.account_type
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn build(self) -> Account {
        self
    }
}
