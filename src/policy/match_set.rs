//! Hash-prefiltered allow-lists.
//!
//! Lists are configuration-sized, so membership is a linear scan in
//! insertion order. Each entry carries a hash computed when it was added; the
//! scan skips entries whose hash differs from the candidate's and only then
//! pays for the full string comparison. Hash collisions therefore cost a
//! comparison but never produce a false positive.

/// Case convention a [`MatchSet`] was built with.
///
/// The convention is fixed at construction. Entry hashes and lookup hashes
/// are always computed the same way, so a set can never be queried under a
/// different convention than the one its hashes were built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// Byte-exact comparison (origins, methods)
    Sensitive,
    /// ASCII case-insensitive comparison (header names)
    Insensitive,
}

impl CaseMode {
    /// Hash `value` with the `h * 31 + byte` recurrence, lowercasing first in
    /// insensitive mode.
    #[inline]
    #[must_use]
    pub fn hash(self, value: &str) -> u64 {
        value.bytes().fold(0u64, |h, b| {
            let b = match self {
                CaseMode::Sensitive => b,
                CaseMode::Insensitive => b.to_ascii_lowercase(),
            };
            h.wrapping_mul(31).wrapping_add(u64::from(b))
        })
    }

    #[inline]
    fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseMode::Sensitive => a == b,
            CaseMode::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// A configured value together with its precomputed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchEntry {
    /// Digest of `value` under the owning set's [`CaseMode`]
    hash: u64,
    /// Literal value as written in the configuration
    value: String,
}

/// Insertion-ordered allow-list with hash-then-compare membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    mode: CaseMode,
    entries: Vec<MatchEntry>,
}

impl MatchSet {
    /// Create an empty set using the given case convention.
    #[must_use]
    pub fn new(mode: CaseMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
        }
    }

    /// Build a set from literal values, preserving their order.
    pub fn from_values<I, S>(mode: CaseMode, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(mode);
        for value in values {
            set.push(value);
        }
        set
    }

    /// Append a value, hashing it under the set's convention.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        let hash = self.mode.hash(&value);
        self.entries.push(MatchEntry { hash, value });
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|e| keep(&e.value));
    }

    /// Membership test.
    ///
    /// Returns `false` for an empty set or an empty candidate.
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        if self.entries.is_empty() || candidate.is_empty() {
            return false;
        }

        let hash = self.mode.hash(candidate);
        self.entries
            .iter()
            .filter(|e| e.hash == hash)
            .any(|e| self.mode.eq(&e.value, candidate))
    }

    /// Configured values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.entries.iter().map(|e| e.value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_recurrence() {
        assert_eq!(CaseMode::Sensitive.hash("ab"), 97 * 31 + 98);
        assert_eq!(CaseMode::Sensitive.hash(""), 0);
    }

    #[test]
    fn test_insensitive_hash_folds_case() {
        assert_eq!(
            CaseMode::Insensitive.hash("X-Custom"),
            CaseMode::Insensitive.hash("x-custom")
        );
        assert_ne!(
            CaseMode::Sensitive.hash("X-Custom"),
            CaseMode::Sensitive.hash("x-custom")
        );
    }

    #[test]
    fn test_contains_case_sensitive() {
        let set = MatchSet::from_values(CaseMode::Sensitive, ["https://a.com", "https://b.com"]);
        assert!(set.contains("https://a.com"));
        assert!(set.contains("https://b.com"));
        assert!(!set.contains("https://A.com"));
        assert!(!set.contains("https://a.com/"));
        assert!(!set.contains("https://c.com"));
    }

    #[test]
    fn test_contains_case_insensitive() {
        let set = MatchSet::from_values(CaseMode::Insensitive, ["X-Custom", "Authorization"]);
        assert!(set.contains("x-custom"));
        assert!(set.contains("AUTHORIZATION"));
        assert!(!set.contains("X-Custom-2"));
    }

    #[test]
    fn test_empty_set_and_empty_candidate() {
        let empty = MatchSet::new(CaseMode::Sensitive);
        assert!(!empty.contains("GET"));

        let set = MatchSet::from_values(CaseMode::Sensitive, [""]);
        assert!(!set.contains(""));
    }

    #[test]
    fn test_hash_collision_does_not_match() {
        // "Aa" and "BB" collide under h * 31 + b
        assert_eq!(CaseMode::Sensitive.hash("Aa"), CaseMode::Sensitive.hash("BB"));
        let set = MatchSet::from_values(CaseMode::Sensitive, ["Aa"]);
        assert!(set.contains("Aa"));
        assert!(!set.contains("BB"));
    }

    #[test]
    fn test_values_preserve_insertion_order() {
        let set = MatchSet::from_values(CaseMode::Sensitive, ["GET", "DELETE", "PUT"]);
        assert_eq!(set.values().collect::<Vec<_>>(), vec!["GET", "DELETE", "PUT"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_retain() {
        let mut set = MatchSet::from_values(CaseMode::Insensitive, ["X-Custom", "Content-Type"]);
        set.retain(|v| !v.eq_ignore_ascii_case("content-type"));
        assert_eq!(set.values().collect::<Vec<_>>(), vec!["X-Custom"]);
        assert!(!set.contains("Content-Type"));
    }
}
