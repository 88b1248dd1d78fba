pub mod assembler;
pub mod naming;
pub mod writer;

pub use assembler::*;
pub use naming::*;
pub use writer::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export file could not be written: {0}")]
    Io(#[from] std::io::Error),
}
