// 🪪 Policy Type Entity - dual-keyed catalog entries
//
// A policy type is identified by TWO independent keys, its name and its id.
// Either key alone must be unique across the registry, so (Life, 1) blocks
// both (Life, 2) and (Health, 1).
//
// Lookups and deletions classify every stored entry against the (name, id)
// pair and refuse to guess when only one key lines up.

use crate::error::{BookError, EntityKind};
use crate::values::{Amount, Description, PolicyTypeId, PolicyTypeName};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// POLICY TYPE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyType {
    /// First key: human-readable name (e.g. "Life Shield")
    pub name: PolicyTypeName,

    /// Second key: catalog code (e.g. "1001", "LS-01")
    pub id: PolicyTypeId,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,

    /// Annual premium
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<Amount>,
}

impl PolicyType {
    pub fn new(name: PolicyTypeName, id: PolicyTypeId) -> Self {
        PolicyType {
            name,
            id,
            description: None,
            premium: None,
        }
    }

    pub fn with_details(
        name: PolicyTypeName,
        id: PolicyTypeId,
        description: Option<Description>,
        premium: Option<Amount>,
    ) -> Self {
        PolicyType {
            name,
            id,
            description,
            premium,
        }
    }

    /// Classify this entry against a (name, id) pair
    pub fn classify(&self, name: &PolicyTypeName, id: &PolicyTypeId) -> DualKeyMatch {
        match (&self.name == name, &self.id == id) {
            (true, true) => DualKeyMatch::BothMatch,
            (true, false) => DualKeyMatch::NameMatch,
            (false, true) => DualKeyMatch::IdMatch,
            (false, false) => DualKeyMatch::NoMatch,
        }
    }

    /// Shares either key with `other`
    pub fn conflicts_with(&self, other: &PolicyType) -> bool {
        self.classify(&other.name, &other.id) != DualKeyMatch::NoMatch
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)?;
        if let Some(premium) = &self.premium {
            write!(f, " premium {}", premium)?;
        }
        if let Some(description) = self.description.as_ref().filter(|d| !d.is_empty()) {
            write!(f, " - {}", description)?;
        }
        Ok(())
    }
}

// ============================================================================
// MATCH CLASSIFICATION
// ============================================================================

/// Tri-state (plus miss) result of comparing a stored entry with a (name, id) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualKeyMatch {
    /// Name and id both equal
    BothMatch,

    /// Name equal, id differs
    NameMatch,

    /// Id equal, name differs
    IdMatch,

    NoMatch,
}

impl DualKeyMatch {
    pub fn is_partial(&self) -> bool {
        matches!(self, DualKeyMatch::NameMatch | DualKeyMatch::IdMatch)
    }
}

/// Entry that matched on exactly one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialMatch {
    pub index: usize,
    pub policy_type: PolicyType,
    pub matched_on: DualKeyMatch,
}

/// Outcome of a dual-key removal that did not miss entirely
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// Exactly one entry matched on both keys and was removed
    Removed(PolicyType),

    /// Only half matches were found; nothing was removed
    Ambiguous(Vec<PartialMatch>),
}

// ============================================================================
// POLICY TYPE REGISTRY
// ============================================================================

/// Uniqueness-enforcing store of policy types, owned by the Book
///
/// Insertion order is kept; lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTypeRegistry {
    entries: Vec<PolicyType>,
}

impl PolicyTypeRegistry {
    pub fn new() -> Self {
        PolicyTypeRegistry::default()
    }

    /// Insert unless the name or the id is already taken
    pub fn add(&mut self, policy_type: PolicyType) -> Result<(), BookError> {
        if let Some(existing) = self.entries.iter().find(|e| e.conflicts_with(&policy_type)) {
            return Err(duplicate_error(existing, &policy_type));
        }
        debug!(name = %policy_type.name, id = %policy_type.id, "policy type registered");
        self.entries.push(policy_type);
        Ok(())
    }

    pub fn find_by_name(&self, name: &PolicyTypeName) -> Result<&PolicyType, BookError> {
        self.entries
            .iter()
            .find(|e| &e.name == name)
            .ok_or_else(|| BookError::PolicyTypeMissing(name.to_string()))
    }

    pub fn find_by_id(&self, id: &PolicyTypeId) -> Result<&PolicyType, BookError> {
        self.entries
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| BookError::PolicyTypeMissing(id.to_string()))
    }

    pub fn contains_id(&self, id: &PolicyTypeId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    /// Classification of every stored entry, in storage order
    pub fn resolve_dual_key(
        &self,
        name: &PolicyTypeName,
        id: &PolicyTypeId,
    ) -> Vec<(usize, DualKeyMatch)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| (index, e.classify(name, id)))
            .collect()
    }

    /// The entry matching both keys, if any
    pub fn find_exact(&self, name: &PolicyTypeName, id: &PolicyTypeId) -> Option<&PolicyType> {
        self.entries
            .iter()
            .find(|e| e.classify(name, id) == DualKeyMatch::BothMatch)
    }

    /// Every entry matching exactly one of the two keys
    pub fn partial_matches(&self, name: &PolicyTypeName, id: &PolicyTypeId) -> Vec<PartialMatch> {
        self.resolve_dual_key(name, id)
            .into_iter()
            .filter(|(_, m)| m.is_partial())
            .map(|(index, matched_on)| PartialMatch {
                index,
                policy_type: self.entries[index].clone(),
                matched_on,
            })
            .collect()
    }

    /// Resolve (name, id) to one entry, refusing half matches
    pub fn resolve_exact(
        &self,
        name: &PolicyTypeName,
        id: &PolicyTypeId,
    ) -> Result<&PolicyType, BookError> {
        if let Some(exact) = self.find_exact(name, id) {
            return Ok(exact);
        }
        let partial = self.partial_matches(name, id);
        if partial.is_empty() {
            Err(BookError::PolicyTypeMissing(format!("{} [{}]", name, id)))
        } else {
            Err(BookError::Ambiguous(
                partial.into_iter().map(|m| m.policy_type).collect(),
            ))
        }
    }

    /// Remove the entry matching both keys
    ///
    /// Half matches are reported back untouched; a complete miss is
    /// `PolicyTypeMissing`.
    pub fn remove(
        &mut self,
        name: &PolicyTypeName,
        id: &PolicyTypeId,
    ) -> Result<Removal, BookError> {
        let classified = self.resolve_dual_key(name, id);

        let exact: Vec<usize> = classified
            .iter()
            .filter(|(_, m)| *m == DualKeyMatch::BothMatch)
            .map(|(index, _)| *index)
            .collect();
        if let [index] = exact.as_slice() {
            let removed = self.entries.remove(*index);
            debug!(name = %removed.name, id = %removed.id, "policy type removed");
            return Ok(Removal::Removed(removed));
        }

        let partial = self.partial_matches(name, id);
        if !partial.is_empty() {
            debug!(%name, %id, candidates = partial.len(), "policy type removal ambiguous");
            return Ok(Removal::Ambiguous(partial));
        }

        Err(BookError::PolicyTypeMissing(format!("{} [{}]", name, id)))
    }

    /// Replace `target` in place
    ///
    /// The collision check skips `target` itself, so an entry may be
    /// replaced by an edited copy of itself.
    pub fn set_entry(
        &mut self,
        target: &PolicyType,
        replacement: PolicyType,
    ) -> Result<(), BookError> {
        let index = self
            .entries
            .iter()
            .position(|e| e == target)
            .ok_or_else(|| BookError::PolicyTypeMissing(format!("{} [{}]", target.name, target.id)))?;

        if let Some(other) = self
            .entries
            .iter()
            .enumerate()
            .find(|(i, e)| *i != index && e.conflicts_with(&replacement))
            .map(|(_, e)| e)
        {
            return Err(duplicate_error(other, &replacement));
        }

        debug!(from = %target, to = %replacement, "policy type replaced");
        self.entries[index] = replacement;
        Ok(())
    }

    pub fn filtered<F>(&self, predicate: F) -> Vec<&PolicyType>
    where
        F: Fn(&PolicyType) -> bool,
    {
        self.entries.iter().filter(|e| predicate(e)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyType> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn duplicate_error(existing: &PolicyType, candidate: &PolicyType) -> BookError {
    let key = if existing.name == candidate.name {
        format!("name {}", candidate.name)
    } else {
        format!("id {}", candidate.id)
    };
    BookError::duplicate(EntityKind::PolicyType, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_type(name: &str, id: &str) -> PolicyType {
        PolicyType::new(name.parse().unwrap(), id.parse().unwrap())
    }

    fn keys(name: &str, id: &str) -> (PolicyTypeName, PolicyTypeId) {
        (name.parse().unwrap(), id.parse().unwrap())
    }

    fn registry_with(entries: &[(&str, &str)]) -> PolicyTypeRegistry {
        let mut registry = PolicyTypeRegistry::new();
        for (name, id) in entries {
            registry.add(policy_type(name, id)).unwrap();
        }
        registry
    }

    #[test]
    fn test_classify() {
        let life = policy_type("Life", "1");
        let (name, id) = keys("Life", "1");
        assert_eq!(life.classify(&name, &id), DualKeyMatch::BothMatch);

        let (name, id) = keys("Life", "2");
        assert_eq!(life.classify(&name, &id), DualKeyMatch::NameMatch);

        let (name, id) = keys("Health", "1");
        assert_eq!(life.classify(&name, &id), DualKeyMatch::IdMatch);

        let (name, id) = keys("Health", "2");
        assert_eq!(life.classify(&name, &id), DualKeyMatch::NoMatch);
    }

    #[test]
    fn test_add_rejects_shared_name_or_shared_id() {
        let mut registry = registry_with(&[("X", "1")]);

        let same_name = registry.add(policy_type("X", "2")).unwrap_err();
        assert!(matches!(same_name, BookError::DuplicateIdentity { .. }));
        assert!(same_name.to_string().contains("name X"));

        let same_id = registry.add(policy_type("Y", "1")).unwrap_err();
        assert!(matches!(same_id, BookError::DuplicateIdentity { .. }));
        assert!(same_id.to_string().contains("id 1"));

        registry.add(policy_type("Y", "2")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_find_by_either_key() {
        let registry = registry_with(&[("X", "1"), ("Y", "2")]);
        let (name, _) = keys("Y", "0");
        assert_eq!(registry.find_by_name(&name).unwrap().id.as_str(), "2");

        let (_, id) = keys("Z", "1");
        assert_eq!(registry.find_by_id(&id).unwrap().name.as_str(), "X");

        let (name, id) = keys("Z", "9");
        assert!(registry.find_by_name(&name).unwrap_err().is_not_found());
        assert!(registry.find_by_id(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_exact_match() {
        let mut registry = registry_with(&[("X", "1")]);
        let (name, id) = keys("X", "1");

        let removal = registry.remove(&name, &id).unwrap();
        assert_eq!(removal, Removal::Removed(policy_type("X", "1")));
        assert!(registry.is_empty());
        assert!(matches!(
            registry.find_by_name(&name),
            Err(BookError::PolicyTypeMissing(_))
        ));
    }

    #[test]
    fn test_remove_half_matches_is_ambiguous_and_keeps_entries() {
        let mut registry = registry_with(&[("X", "1"), ("Y", "2")]);
        let (name, id) = keys("X", "2");

        match registry.remove(&name, &id).unwrap() {
            Removal::Ambiguous(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert_eq!(candidates[0].index, 0);
                assert_eq!(candidates[0].matched_on, DualKeyMatch::NameMatch);
                assert_eq!(candidates[1].index, 1);
                assert_eq!(candidates[1].matched_on, DualKeyMatch::IdMatch);
            }
            other => panic!("expected ambiguous removal, got {:?}", other),
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_complete_miss_is_not_found() {
        let mut registry = registry_with(&[("X", "1")]);
        let (name, id) = keys("Z", "9");
        let err = registry.remove(&name, &id).unwrap_err();
        assert!(matches!(err, BookError::PolicyTypeMissing(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_exact_refuses_to_guess() {
        let registry = registry_with(&[("X", "1"), ("Y", "2")]);

        let (name, id) = keys("Y", "2");
        assert_eq!(registry.resolve_exact(&name, &id).unwrap().name.as_str(), "Y");

        let (name, id) = keys("Y", "1");
        match registry.resolve_exact(&name, &id) {
            Err(BookError::Ambiguous(candidates)) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_set_entry_with_itself_is_not_a_conflict() {
        let mut registry = registry_with(&[("X", "1"), ("Y", "2")]);
        let target = policy_type("X", "1");

        let mut edited = target.clone();
        edited.premium = Some("120.00".parse().unwrap());
        registry.set_entry(&target, edited.clone()).unwrap();

        let (name, _) = keys("X", "0");
        assert_eq!(registry.find_by_name(&name).unwrap(), &edited);
    }

    #[test]
    fn test_set_entry_collision_with_other_entry() {
        let mut registry = registry_with(&[("X", "1"), ("Y", "2")]);
        let target = policy_type("X", "1");

        let err = registry
            .set_entry(&target, policy_type("X", "2"))
            .unwrap_err();
        assert!(matches!(err, BookError::DuplicateIdentity { .. }));

        let err = registry
            .set_entry(&policy_type("Q", "7"), policy_type("Q", "8"))
            .unwrap_err();
        assert!(err.is_not_found());

        // Untouched after both failures
        assert_eq!(registry, registry_with(&[("X", "1"), ("Y", "2")]));
    }
}
