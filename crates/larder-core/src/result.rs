//! Result type aliases for Larder.

use crate::LarderError;

/// A specialized `Result` type for Larder operations.
pub type LarderResult<T> = Result<T, LarderError>;
