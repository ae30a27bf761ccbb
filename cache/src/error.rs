use std::fmt;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The cache was configured with a memory budget of zero, which is not
  /// allowed for a bounded cache.
  ZeroCapacity,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroCapacity => write!(f, "bounded cache capacity cannot be zero"),
    }
  }
}

impl std::error::Error for BuildError {}
