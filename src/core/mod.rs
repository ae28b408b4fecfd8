pub mod etl;
pub mod mapping;
pub mod pipeline;
pub mod statement;

pub use crate::domain::model::{StatementRow, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
