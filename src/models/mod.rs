pub mod enums;
pub mod persona;
pub mod prospect;
pub mod research;
pub mod sequence;
pub mod step;

pub use enums::*;
pub use persona::*;
pub use prospect::*;
pub use research::*;
pub use sequence::*;
pub use step::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Persona catalog could not be read: {0}")]
    CatalogIo(#[from] std::io::Error),

    #[error("Persona catalog is malformed: {0}")]
    CatalogFormat(#[from] serde_json::Error),

    #[error("Persona catalog is empty")]
    EmptyCatalog,

    #[error("Duplicate persona id in catalog: {0}")]
    DuplicateLane(String),
}
