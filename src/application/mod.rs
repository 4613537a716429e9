pub mod catalog;
pub mod errors;
pub mod reservation;

pub use errors::{LibraryApplicationError, Result};
