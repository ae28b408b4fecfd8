use std::fmt;

use super::amount::format_minor;

/// Represent a Split, which is basically a portion of a transaction
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Split {
    category: String,
    memo: String,
    /// Minor currency units
    pub(crate) amount: i64,
}

impl Split {
    pub fn new() -> Self {
        Split::default()
    }

    pub fn category(mut self, val: &str) -> Self {
        self.category = String::from(val);
        self
    }

    pub fn memo(mut self, val: &str) -> Self {
        self.memo = String::from(val);
        self
    }

    pub fn amount(mut self, val: i64) -> Self {
        self.amount = val;
        self
    }

    pub fn get_amount(&self) -> i64 {
        self.amount
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn build(self) -> Split {
        self
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "S{0}\nE{1}\n${2}",
            self.category,
            self.memo,
            format_minor(self.amount)
        )
    }
}

#[cfg(test)]
mod split_test {
    use super::*;

    #[test]
    fn split_format() {
        let s = Split::new()
            .amount(-1000)
            .category("testcat")
            .memo("testmemo")
            .build();
        let s2 = Split::new()
            .amount(-1000)
            .category("testcat")
            .memo("")
            .build();

        assert_eq!(s.to_string(), "Stestcat\nEtestmemo\n$-10.00\n");
        assert_eq!(s2.to_string(), "Stestcat\nE\n$-10.00\n");
    }

    #[test]
    fn split_format_sub_unit_amount() {
        let s = Split::new().category("Fees").amount(-5).build();
        assert_eq!(s.to_string(), "SFees\nE\n$-0.05\n");
    }
}
