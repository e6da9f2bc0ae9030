//! EnumRegistry: a frozen bidirectional name <-> integer mapping
//!
//! Built once from an ordered list of distinct names and a starting offset.
//! The first name maps to `starting_index`, the second to
//! `starting_index + 1`, and so on. After construction there is no way to
//! insert, remove or rebind an entry: the type exposes no `&mut self` methods.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Closed, immutable mapping between symbolic names and integer codes.
///
/// ## Example
///
/// ```
/// use kwest_core::EnumRegistry;
///
/// let registry = EnumRegistry::new(["HELLO_WORLD"], 0).unwrap();
/// assert_eq!(registry.value("HELLO_WORLD"), Some(0));
/// assert_eq!(registry.get_key(0).unwrap(), "HELLO_WORLD");
/// assert!(registry.get_key(1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRegistry {
    names: Vec<String>,
    by_name: HashMap<String, i64>,
    starting_index: i64,
}

impl EnumRegistry {
    /// Build a registry from ordered names.
    ///
    /// Fails with `DuplicateEnumName` if a name appears twice and with
    /// `EnumCodeOverflow` if the codes would run past `i64::MAX`.
    pub fn new<I, S>(names: I, starting_index: i64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut by_name = HashMap::with_capacity(names.len());
        for (offset, name) in names.iter().enumerate() {
            let code = i64::try_from(offset)
                .ok()
                .and_then(|offset| starting_index.checked_add(offset))
                .ok_or_else(|| Error::EnumCodeOverflow {
                    name: name.clone(),
                    starting_index,
                })?;
            if by_name.insert(name.clone(), code).is_some() {
                return Err(Error::DuplicateEnumName(name.clone()));
            }
        }
        Ok(Self {
            names,
            by_name,
            starting_index,
        })
    }

    /// Build a registry whose codes start at 0.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, 0)
    }

    /// Integer code for a name (forward lookup).
    pub fn value(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    /// Name for an integer code (reverse lookup), `None` when unregistered.
    pub fn name(&self, value: i64) -> Option<&str> {
        let offset = value.checked_sub(self.starting_index)?;
        let offset = usize::try_from(offset).ok()?;
        self.names.get(offset).map(String::as_str)
    }

    /// Name for an integer code, failing with `InvalidEnumValue` when the
    /// code is not registered.
    pub fn get_key(&self, value: i64) -> Result<&str> {
        self.name(value).ok_or(Error::InvalidEnumValue(value))
    }

    /// Registered names in code order.
    pub fn keys(&self) -> &[String] {
        &self.names
    }

    /// `(name, code)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        // Every code was range-checked in `new`
        self.names
            .iter()
            .map(move |n| (n.as_str(), self.by_name[n.as_str()]))
    }

    /// First assigned code.
    pub fn starting_index(&self) -> i64 {
        self.starting_index
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no names are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True if `value` is a registered code.
    pub fn contains_value(&self, value: i64) -> bool {
        self.name(value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hello_world_scenario() {
        let registry = EnumRegistry::new(["HELLO_WORLD"], 0).unwrap();
        assert_eq!(registry.value("HELLO_WORLD"), Some(0));
        assert_eq!(registry.get_key(0).unwrap(), "HELLO_WORLD");
    }

    #[test]
    fn codes_follow_input_order() {
        let registry = EnumRegistry::new(["A", "B", "C"], 10).unwrap();
        assert_eq!(registry.value("A"), Some(10));
        assert_eq!(registry.value("B"), Some(11));
        assert_eq!(registry.value("C"), Some(12));
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec![("A", 10), ("B", 11), ("C", 12)]
        );
    }

    #[test]
    fn unregistered_value_is_an_error() {
        let registry = EnumRegistry::new(["A", "B"], 0).unwrap();
        assert!(matches!(registry.get_key(2), Err(Error::InvalidEnumValue(2))));
        assert!(matches!(registry.get_key(-1), Err(Error::InvalidEnumValue(-1))));
        assert_eq!(registry.value("Z"), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = EnumRegistry::new(["A", "B", "A"], 0).unwrap_err();
        assert!(matches!(err, Error::DuplicateEnumName(ref n) if n == "A"));
    }

    #[test]
    fn codes_past_i64_max_are_rejected() {
        let err = EnumRegistry::new(["A", "B"], i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            Error::EnumCodeOverflow { ref name, starting_index } if name == "B" && starting_index == i64::MAX
        ));

        let registry = EnumRegistry::new(["LAST"], i64::MAX).unwrap();
        assert_eq!(registry.get_key(i64::MAX).unwrap(), "LAST");
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![("LAST", i64::MAX)]);
        assert!(registry.get_key(i64::MIN).is_err());
    }

    #[test]
    fn negative_starting_index() {
        let registry = EnumRegistry::new(["LOW", "ZERO"], -1).unwrap();
        assert_eq!(registry.get_key(-1).unwrap(), "LOW");
        assert_eq!(registry.get_key(0).unwrap(), "ZERO");
    }

    #[test]
    fn from_names_starts_at_zero() {
        let registry = EnumRegistry::from_names(["A", "B"]).unwrap();
        assert_eq!(registry.starting_index(), 0);
        assert_eq!(registry.get_key(1).unwrap(), "B");
    }

    #[test]
    fn empty_registry() {
        let registry = EnumRegistry::new(Vec::<String>::new(), 0).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get_key(0).is_err());
    }

    proptest! {
        #[test]
        fn reverse_lookup_covers_exactly_the_registered_range(
            names in proptest::collection::hash_set("[A-Z_]{1,12}", 0..16),
            start in -1000i64..1000,
            probe in -2000i64..2000,
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let registry = EnumRegistry::new(names.clone(), start).unwrap();

            for (i, name) in names.iter().enumerate() {
                prop_assert_eq!(registry.get_key(start + i as i64).unwrap(), name.as_str());
                prop_assert_eq!(registry.value(name), Some(start + i as i64));
            }

            let in_range = probe >= start && probe < start + names.len() as i64;
            prop_assert_eq!(registry.get_key(probe).is_ok(), in_range);
        }
    }
}
