//! QIF (Quicken Interchange Format) records and their text rendering.

pub mod account;
pub mod amount;
pub mod document;
pub mod error;
pub mod split;
pub mod transaction;

pub use account::{Account, AccountType};
pub use document::QifDocument;
pub use error::QifError;
pub use split::Split;
pub use transaction::Transaction;
