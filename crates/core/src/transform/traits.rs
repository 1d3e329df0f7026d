//! Trait definitions for the transform module.

use super::error::TransformError;
use crate::catalog::AssetKind;

/// Normalizes image bytes for an asset kind.
///
/// Implementations are CPU-bound and synchronous; callers run them on the
/// blocking pool.
pub trait ImageTransformer: Send + Sync {
    /// Returns the name of this transformer implementation.
    fn name(&self) -> &str;

    /// Transforms `bytes` according to the policy of `kind`.
    fn transform(&self, bytes: &[u8], kind: AssetKind) -> Result<Vec<u8>, TransformError>;
}
