//! Common utilities and types shared by the privacy detector crates.

pub mod error;
pub mod text;

pub use error::{DetectorError, DetectorResult};
pub use text::{contains_any, Vocabulary};
