//! Utility functions for rule implementations.

pub mod text;

#[doc(inline)]
pub use text::{char_column, mask_strings, split_comment};
