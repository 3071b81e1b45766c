pub mod analysis;
pub mod enums;
pub mod patient;

pub use analysis::*;
pub use enums::*;
pub use patient::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
