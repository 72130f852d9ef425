pub mod batch;
pub mod config;
pub mod conversion;
pub mod decoder;
pub mod errors;
pub mod events;
pub mod inspect;
pub mod msd;
pub mod smf_writer;

pub use conversion::{convert, convert_with};
pub use errors::FormatError;
