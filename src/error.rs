//! Error handling for CompressedBG decoding
//!
//! This module re-exports the error type used throughout the codec. It uses
//! thiserror for ergonomic error handling and separates the recoverable
//! "not this format" case from fatal corruption.

pub use crate::common::CbgError;
pub use crate::common::Result;
