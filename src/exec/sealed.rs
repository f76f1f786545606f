// ABOUTME: Sealed trait pattern for exec traits.
// ABOUTME: Prevents external implementations, allowing non-breaking evolution.

/// Sealed trait to prevent external implementations.
pub trait Sealed {}
