//! Unique identities for tests that share a backing store.

use ulid::Ulid;

/// Generate a username that will not collide with other test runs.
///
/// ```
/// use catcard_test_support::unique_helpers::unique_username;
///
/// let a = unique_username("alice");
/// let b = unique_username("alice");
/// assert_ne!(a, b);
/// assert!(a.starts_with("alice-"));
/// ```
pub fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}
