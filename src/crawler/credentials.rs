//! API identity rotation
//!
//! GeoNames rate-limits per username. Spreading the requests of one batch
//! across a pool of usernames multiplies the usable quota.

use crate::ConfigError;

/// An ordered, non-empty pool of API identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPool {
    identities: Vec<String>,
}

impl IdentityPool {
    /// Creates a pool, discarding blank entries
    ///
    /// Fails when no usable identity remains: the pool size is the batch
    /// size, so an empty pool cannot schedule anything.
    pub fn new<I, S>(identities: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identities: Vec<String> = identities
            .into_iter()
            .map(|s| {
                let s: String = s.into();
                s.trim().to_string()
            })
            .filter(|s| !s.is_empty())
            .collect();

        if identities.is_empty() {
            return Err(ConfigError::Validation(
                "identity pool must contain at least one API username".to_string(),
            ));
        }

        Ok(Self { identities })
    }

    /// Identity for the item at `position` within its batch
    ///
    /// Depends only on the position, so identical batch layouts always
    /// reproduce identical assignments.
    pub fn assign(&self, position: usize) -> &str {
        &self.identities[position % self.identities.len()]
    }

    /// Identity used for single, unbatched requests
    pub fn primary(&self) -> &str {
        &self.identities[0]
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_wraps_around_pool() {
        let pool = IdentityPool::new(["a", "b", "c"]).unwrap();

        let assigned: Vec<&str> = (0..7).map(|p| pool.assign(p)).collect();
        assert_eq!(assigned, vec!["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn test_assignment_is_pure() {
        let pool = IdentityPool::new(["a", "b", "c"]).unwrap();

        for position in 0..10 {
            assert_eq!(pool.assign(position), pool.assign(position));
            assert_eq!(pool.assign(position), ["a", "b", "c"][position % 3]);
        }
    }

    #[test]
    fn test_empty_pool_fails_fast() {
        assert!(IdentityPool::new(Vec::<String>::new()).is_err());
        assert!(IdentityPool::new(["", "  "]).is_err());
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let pool = IdentityPool::new(["a", " ", "b "]).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.assign(1), "b");
        assert_eq!(pool.primary(), "a");
    }
}
