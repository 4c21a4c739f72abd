// 📚 Book - root aggregate of clients, portfolios, policies, claims and policy types
//
// Every mutator validates the whole ownership chain before touching anything,
// so a failed call leaves the Book exactly as it was.
//
// Lookups are scoped to their parent: a policy is addressed through its
// client, a claim through its client and policy. Nothing is global by id.

use crate::entities::{Claim, Client, Policy, PolicyType, PolicyTypeRegistry};
use crate::error::{BookError, EntityKind};
use crate::values::{ClaimId, ClientId, PolicyId, PolicyTypeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type Result<T> = std::result::Result<T, BookError>;

// ============================================================================
// BOOK
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookDocument")]
pub struct Book {
    clients: Vec<Client>,
    policy_types: PolicyTypeRegistry,
}

impl Book {
    pub fn new() -> Self {
        Book::default()
    }

    /// Deep-reset this Book's contents to match `other`
    ///
    /// Existing references to this Book stay valid; only the contents change.
    pub fn reset_data(&mut self, other: &Book) {
        self.clone_from(other);
    }

    // ------------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------------

    pub fn has_client(&self, id: &ClientId) -> bool {
        self.clients.iter().any(|c| &c.id == id)
    }

    pub fn client(&self, id: &ClientId) -> Result<&Client> {
        self.clients
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| BookError::ClientMissing(id.clone()))
    }

    fn client_mut(&mut self, id: &ClientId) -> Result<&mut Client> {
        self.clients
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| BookError::ClientMissing(id.clone()))
    }

    /// Add a client; any policies it already holds must reference known
    /// policy types, as `add_policy` requires.
    pub fn add_client(&mut self, client: Client) -> Result<()> {
        if let Some(policy) = client
            .portfolio
            .iter()
            .find(|p| !self.policy_types.contains_id(&p.policy_type_id))
        {
            return Err(BookError::PolicyTypeMissing(policy.policy_type_id.to_string()));
        }
        self.insert_loaded_client(client)
    }

    /// Ownership and uniqueness checks only; dangling policy-type
    /// references are kept so a saved Book always loads.
    pub(crate) fn insert_loaded_client(&mut self, client: Client) -> Result<()> {
        if self.has_client(&client.id) {
            return Err(BookError::duplicate(EntityKind::Client, &client.id));
        }
        check_portfolio(&client)?;
        self.clients.push(client);
        Ok(())
    }

    /// Replace the client `target` with `replacement`
    ///
    /// The replacement may carry a new id; owner ids in the portfolio
    /// subtree are rewritten to follow it.
    pub fn set_client(&mut self, target: &ClientId, mut replacement: Client) -> Result<()> {
        let index = self
            .clients
            .iter()
            .position(|c| &c.id == target)
            .ok_or_else(|| BookError::ClientMissing(target.clone()))?;

        if self
            .clients
            .iter()
            .enumerate()
            .any(|(i, c)| i != index && c.id == replacement.id)
        {
            return Err(BookError::duplicate(EntityKind::Client, &replacement.id));
        }

        if &replacement.id != target {
            let new_id = replacement.id.clone();
            for policy in replacement.portfolio.iter_mut() {
                let policy_id = policy.id.clone();
                policy.reparent(&new_id, &policy_id);
            }
        }
        check_portfolio(&replacement)?;

        self.clients[index] = replacement;
        Ok(())
    }

    /// Remove a client together with its whole portfolio
    pub fn remove_client(&mut self, id: &ClientId) -> Result<Client> {
        let index = self
            .clients
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| BookError::ClientMissing(id.clone()))?;
        Ok(self.clients.remove(index))
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn filtered_clients<F>(&self, predicate: F) -> Vec<&Client>
    where
        F: Fn(&Client) -> bool,
    {
        self.clients.iter().filter(|c| predicate(c)).collect()
    }

    // ------------------------------------------------------------------------
    // Policies
    // ------------------------------------------------------------------------

    /// Resolve a policy inside one client's portfolio
    pub fn policy(&self, client_id: &ClientId, policy_id: &PolicyId) -> Result<&Policy> {
        self.client(client_id)?
            .portfolio
            .policy(policy_id)
            .ok_or_else(|| BookError::PolicyMissing {
                client: client_id.clone(),
                policy: policy_id.clone(),
            })
    }

    fn policy_mut(&mut self, client_id: &ClientId, policy_id: &PolicyId) -> Result<&mut Policy> {
        self.client_mut(client_id)?
            .portfolio
            .policy_mut(policy_id)
            .ok_or_else(|| BookError::PolicyMissing {
                client: client_id.clone(),
                policy: policy_id.clone(),
            })
    }

    pub fn add_policy(
        &mut self,
        policy_id: PolicyId,
        client_id: &ClientId,
        policy_type_id: PolicyTypeId,
        expiry_date: NaiveDate,
    ) -> Result<&Policy> {
        if !self.has_client(client_id) {
            return Err(BookError::ClientMissing(client_id.clone()));
        }
        if !self.policy_types.contains_id(&policy_type_id) {
            return Err(BookError::PolicyTypeMissing(policy_type_id.to_string()));
        }

        let policy = Policy::new(policy_id.clone(), client_id.clone(), policy_type_id, expiry_date);
        let client = self.client_mut(client_id)?;
        client.portfolio.push(policy)?;
        client
            .portfolio
            .policy(&policy_id)
            .ok_or_else(|| BookError::PolicyMissing {
                client: client_id.clone(),
                policy: policy_id,
            })
    }

    /// Replace the policy `target` inside its owner's portfolio
    ///
    /// Claim owner ids follow a policy id change. The replacement must stay
    /// under the same client and reference an existing policy type.
    pub fn set_policy(&mut self, target: &Policy, mut replacement: Policy) -> Result<()> {
        if replacement.client_id != target.client_id {
            return Err(BookError::invalid(
                "policy",
                "an edited policy must stay with the same client",
            ));
        }
        if replacement.policy_type_id != target.policy_type_id
            && !self.policy_types.contains_id(&replacement.policy_type_id)
        {
            return Err(BookError::PolicyTypeMissing(
                replacement.policy_type_id.to_string(),
            ));
        }

        let client = self.client_mut(&target.client_id)?;
        let index = client
            .portfolio
            .position(target)
            .ok_or_else(|| BookError::PolicyMissing {
                client: target.client_id.clone(),
                policy: target.id.clone(),
            })?;
        if client.portfolio.clashes_with(index, &replacement.id) {
            return Err(BookError::duplicate(EntityKind::Policy, &replacement.id));
        }

        let (client_id, policy_id) = (replacement.client_id.clone(), replacement.id.clone());
        replacement.reparent(&client_id, &policy_id);
        check_claims(&replacement)?;
        client.portfolio.replace_at(index, replacement);
        Ok(())
    }

    pub fn remove_policy(&mut self, client_id: &ClientId, policy_id: &PolicyId) -> Result<Policy> {
        self.client_mut(client_id)?
            .portfolio
            .remove(policy_id)
            .ok_or_else(|| BookError::PolicyMissing {
                client: client_id.clone(),
                policy: policy_id.clone(),
            })
    }

    /// Every policy in the Book, flattened in client order
    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.clients.iter().flat_map(|c| c.portfolio.iter())
    }

    pub fn filtered_policies<F>(&self, predicate: F) -> Vec<&Policy>
    where
        F: Fn(&Policy) -> bool,
    {
        self.policies().filter(|p| predicate(p)).collect()
    }

    // ------------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------------

    pub fn claim(
        &self,
        client_id: &ClientId,
        policy_id: &PolicyId,
        claim_id: &ClaimId,
    ) -> Result<&Claim> {
        self.policy(client_id, policy_id)?.claim(claim_id)
    }

    /// Append a claim to the policy named by its owner ids
    pub fn add_claim(&mut self, claim: Claim) -> Result<()> {
        let (client_id, policy_id) = (claim.client_id.clone(), claim.policy_id.clone());
        self.policy_mut(&client_id, &policy_id)?.add_claim(claim)
    }

    pub fn set_claim(&mut self, target: &Claim, replacement: Claim) -> Result<()> {
        self.policy_mut(&target.client_id, &target.policy_id)?
            .set_claim(target, replacement)
    }

    pub fn remove_claim(
        &mut self,
        client_id: &ClientId,
        policy_id: &PolicyId,
        claim_id: &ClaimId,
    ) -> Result<Claim> {
        self.policy_mut(client_id, policy_id)?.remove_claim(claim_id)
    }

    // ------------------------------------------------------------------------
    // Policy types
    // ------------------------------------------------------------------------

    pub fn policy_types(&self) -> &PolicyTypeRegistry {
        &self.policy_types
    }

    pub fn policy_types_mut(&mut self) -> &mut PolicyTypeRegistry {
        &mut self.policy_types
    }

    pub fn add_policy_type(&mut self, policy_type: PolicyType) -> Result<()> {
        self.policy_types.add(policy_type)
    }

    // ------------------------------------------------------------------------
    // Derived queries
    // ------------------------------------------------------------------------

    /// Clients whose next birthday is within `within_days` of `today`
    pub fn birthday_clients(&self, today: NaiveDate, within_days: i64) -> Vec<&Client> {
        let mut clients = self.filtered_clients(|c| c.has_birthday_within(today, within_days));
        clients.sort_by_key(|c| c.next_birthday(today));
        clients
    }

    /// Policies expiring within `within_days` of `today`, soonest first
    pub fn expiring_policies(&self, today: NaiveDate, within_days: i64) -> Vec<&Policy> {
        let mut policies = self.filtered_policies(|p| p.expires_within(today, within_days));
        policies.sort_by_key(|p| p.expiry_date);
        policies
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn policy_count(&self) -> usize {
        self.clients.iter().map(|c| c.portfolio.len()).sum()
    }

    pub fn claim_count(&self) -> usize {
        self.clients.iter().map(|c| c.portfolio.claim_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.policy_types.is_empty()
    }
}

// ============================================================================
// OWNERSHIP CHECKS
// ============================================================================

fn check_portfolio(client: &Client) -> Result<()> {
    let mut seen = HashSet::new();
    for policy in client.portfolio.iter() {
        if policy.client_id != client.id {
            return Err(BookError::invalid(
                "policy",
                format!(
                    "policy {} names client {} but sits under {}",
                    policy.id, policy.client_id, client.id
                ),
            ));
        }
        if !seen.insert(&policy.id) {
            return Err(BookError::duplicate(EntityKind::Policy, &policy.id));
        }
        check_claims(policy)?;
    }
    Ok(())
}

fn check_claims(policy: &Policy) -> Result<()> {
    let mut seen = HashSet::new();
    for claim in &policy.claims {
        if claim.client_id != policy.client_id || claim.policy_id != policy.id {
            return Err(BookError::invalid(
                "claim",
                format!(
                    "claim {} names {}/{} but sits under {}/{}",
                    claim.id, claim.client_id, claim.policy_id, policy.client_id, policy.id
                ),
            ));
        }
        if !seen.insert(&claim.id) {
            return Err(BookError::duplicate(EntityKind::Claim, &claim.id));
        }
    }
    Ok(())
}

// ============================================================================
// VALIDATED DESERIALIZATION
// ============================================================================

/// Wire shape of a Book; turned into a Book only through the same checks
/// the mutators apply.
#[derive(Debug, Deserialize)]
struct BookDocument {
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    policy_types: Vec<PolicyType>,
}

impl TryFrom<BookDocument> for Book {
    type Error = BookError;

    fn try_from(document: BookDocument) -> Result<Self> {
        let mut book = Book::new();
        for policy_type in document.policy_types {
            book.add_policy_type(policy_type)?;
        }
        // Dangling policy-type references are kept: the reference is only
        // checked when a policy is created.
        for client in document.clients {
            book.insert_loaded_client(client)?;
        }
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Amount, Description};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn id<T: std::str::FromStr>(raw: &str) -> T
    where
        T::Err: std::fmt::Debug,
    {
        raw.parse().unwrap()
    }

    fn create_test_client(client_id: &str, name: &str, birthday: NaiveDate) -> Client {
        Client::new(
            id(client_id),
            id(name),
            id("91234567"),
            id("client@example.com"),
            id("10 Anson Road"),
            birthday,
        )
    }

    fn create_test_claim(client: &str, policy: &str, claim: &str, amount: &str) -> Claim {
        Claim::new(
            id(claim),
            id(client),
            id(policy),
            amount.parse::<Amount>().unwrap(),
            date(2025, 5, 5),
            Description::new("accident"),
        )
    }

    /// Two clients (A, B), policy type 1001, A holds P1 with claim X1
    fn create_test_book() -> Book {
        let mut book = Book::new();
        book.add_policy_type(PolicyType::new(id("Life"), id("1001"))).unwrap();
        book.add_client(create_test_client("A", "Alice Tan", date(1990, 4, 2))).unwrap();
        book.add_client(create_test_client("B", "Bernice Yu", date(1985, 12, 25))).unwrap();
        book.add_policy(id("P1"), &id("A"), id("1001"), date(2026, 3, 1)).unwrap();
        book.add_claim(create_test_claim("A", "P1", "X1", "500")).unwrap();
        book
    }

    #[test]
    fn test_add_client_duplicate_id() {
        let mut book = create_test_book();
        let err = book
            .add_client(create_test_client("A", "Someone Else", date(2000, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, BookError::DuplicateIdentity { .. }));
        assert_eq!(book.client_count(), 2);
    }

    #[test]
    fn test_policy_ids_are_scoped_to_portfolio() {
        let mut book = create_test_book();

        assert!(book.policy(&id("A"), &id("P1")).is_ok());
        assert!(matches!(
            book.policy(&id("B"), &id("P1")),
            Err(BookError::PolicyMissing { .. })
        ));

        // Same policy id under another client is fine
        book.add_policy(id("P1"), &id("B"), id("1001"), date(2027, 1, 1)).unwrap();
        assert_eq!(book.policy_count(), 2);
        assert_eq!(book.policy(&id("B"), &id("P1")).unwrap().expiry_date, date(2027, 1, 1));

        let err = book
            .add_policy(id("P1"), &id("A"), id("1001"), date(2027, 1, 1))
            .unwrap_err();
        assert!(matches!(err, BookError::DuplicateIdentity { .. }));
    }

    #[test]
    fn test_add_policy_unknown_policy_type_changes_nothing() {
        let mut book = create_test_book();
        let before = book.clone();

        let err = book
            .add_policy(id("P2"), &id("A"), id("9999"), date(2026, 1, 1))
            .unwrap_err();
        assert!(matches!(err, BookError::PolicyTypeMissing(_)));
        assert_eq!(book.client_count(), 2);
        assert_eq!(book.policy_count(), 1);
        assert_eq!(book, before);
    }

    #[test]
    fn test_add_policy_unknown_client() {
        let mut book = create_test_book();
        let err = book
            .add_policy(id("P2"), &id("Z"), id("1001"), date(2026, 1, 1))
            .unwrap_err();
        assert!(matches!(err, BookError::ClientMissing(_)));
    }

    #[test]
    fn test_claim_lookup_follows_owner_chain() {
        let mut book = create_test_book();
        assert!(book.claim(&id("A"), &id("P1"), &id("X1")).is_ok());
        assert!(matches!(
            book.claim(&id("A"), &id("P1"), &id("X9")),
            Err(BookError::ClaimMissing { .. })
        ));
        assert!(matches!(
            book.add_claim(create_test_claim("B", "P1", "X2", "10")),
            Err(BookError::PolicyMissing { .. })
        ));
        assert!(matches!(
            book.add_claim(create_test_claim("A", "P1", "X1", "10")),
            Err(BookError::DuplicateIdentity { .. })
        ));
        assert_eq!(book.claim_count(), 1);
    }

    #[test]
    fn test_remove_client_cascades() {
        let mut book = create_test_book();
        let removed = book.remove_client(&id("A")).unwrap();
        assert_eq!(removed.portfolio.len(), 1);

        assert_eq!(book.policy_count(), 0);
        assert_eq!(book.claim_count(), 0);
        let a: ClientId = id("A");
        assert!(book.policies().all(|p| p.client_id != a));
        assert!(matches!(
            book.policy(&a, &id("P1")),
            Err(BookError::ClientMissing(_))
        ));
        assert!(book.claim(&a, &id("P1"), &id("X1")).is_err());
    }

    #[test]
    fn test_set_client_renames_subtree() {
        let mut book = create_test_book();
        let mut renamed = book.client(&id("A")).unwrap().clone();
        renamed.id = id("A2");
        book.set_client(&id("A"), renamed).unwrap();

        let policy = book.policy(&id("A2"), &id("P1")).unwrap();
        assert_eq!(policy.client_id.as_str(), "A2");
        assert_eq!(policy.claims[0].client_id.as_str(), "A2");

        let mut clash = book.client(&id("A2")).unwrap().clone();
        clash.id = id("B");
        assert!(matches!(
            book.set_client(&id("A2"), clash),
            Err(BookError::DuplicateIdentity { .. })
        ));
    }

    #[test]
    fn test_set_policy() {
        let mut book = create_test_book();
        book.add_policy(id("P2"), &id("A"), id("1001"), date(2026, 6, 1)).unwrap();
        let target = book.policy(&id("A"), &id("P1")).unwrap().clone();

        let mut clash = target.clone();
        clash.id = id("P2");
        assert!(matches!(
            book.set_policy(&target, clash),
            Err(BookError::DuplicateIdentity { .. })
        ));

        let mut unknown_type = target.clone();
        unknown_type.policy_type_id = id("4242");
        assert!(matches!(
            book.set_policy(&target, unknown_type),
            Err(BookError::PolicyTypeMissing(_))
        ));

        let mut moved = target.clone();
        moved.client_id = id("B");
        assert!(matches!(
            book.set_policy(&target, moved),
            Err(BookError::InvalidArgument { .. })
        ));

        let mut renamed = target.clone();
        renamed.id = id("P9");
        renamed.expiry_date = date(2030, 1, 1);
        book.set_policy(&target, renamed).unwrap();

        let policy = book.policy(&id("A"), &id("P9")).unwrap();
        assert_eq!(policy.expiry_date, date(2030, 1, 1));
        assert_eq!(policy.claims[0].policy_id.as_str(), "P9");

        // The old snapshot of the policy is no longer present
        assert!(matches!(
            book.set_policy(&target, target.clone()),
            Err(BookError::PolicyMissing { .. })
        ));
    }

    #[test]
    fn test_set_and_remove_claim() {
        let mut book = create_test_book();
        let target = book.claim(&id("A"), &id("P1"), &id("X1")).unwrap().clone();
        let mut edited = target.clone();
        edited.description = Description::new("flood damage");
        book.set_claim(&target, edited).unwrap();

        let claim = book.claim(&id("A"), &id("P1"), &id("X1")).unwrap();
        assert_eq!(claim.description.as_str(), "flood damage");

        book.remove_claim(&id("A"), &id("P1"), &id("X1")).unwrap();
        assert_eq!(book.claim_count(), 0);
        assert!(book.remove_claim(&id("A"), &id("P1"), &id("X1")).is_err());
    }

    #[test]
    fn test_birthday_and_expiry_queries() {
        let mut book = create_test_book();
        book.add_policy(id("P2"), &id("B"), id("1001"), date(2026, 2, 20)).unwrap();

        let today = date(2026, 2, 18);
        let expiring: Vec<&str> = book
            .expiring_policies(today, 14)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(expiring, vec!["P2", "P1"]);
        assert!(book.expiring_policies(date(2026, 3, 2), 30).is_empty());

        let birthdays: Vec<&str> = book
            .birthday_clients(date(2026, 3, 30), 7)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(birthdays, vec!["A"]);
    }

    #[test]
    fn test_add_client_checks_policy_types_in_portfolio() {
        let mut book = create_test_book();

        let mut client = create_test_client("C", "Charlotte Oliveiro", date(1978, 11, 3));
        client
            .portfolio
            .push(Policy::new(id("P1"), id("C"), id("9999"), date(2027, 1, 1)))
            .unwrap();
        let err = book.add_client(client.clone()).unwrap_err();
        assert_eq!(err, BookError::PolicyTypeMissing("9999".to_string()));
        assert_eq!(book.client_count(), 2);

        let mut client = create_test_client("C", "Charlotte Oliveiro", date(1978, 11, 3));
        client
            .portfolio
            .push(Policy::new(id("P1"), id("C"), id("1001"), date(2027, 1, 1)))
            .unwrap();
        book.add_client(client).unwrap();
        assert_eq!(book.policy_count(), 2);
    }

    #[test]
    fn test_load_keeps_dangling_policy_type_reference() {
        let mut book = create_test_book();
        book.policy_types_mut().remove(&id("Life"), &id("1001")).unwrap();

        let json = serde_json::to_string(&book).unwrap();
        let loaded: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, book);
        assert_eq!(loaded.policy(&id("A"), &id("P1")).unwrap().policy_type_id, id::<PolicyTypeId>("1001"));
    }

    #[test]
    fn test_reset_data_keeps_reference() {
        let mut book = create_test_book();
        let empty = Book::new();
        let handle: *const Book = &book;

        book.reset_data(&empty);
        assert!(book.is_empty());
        assert!(std::ptr::eq(handle, &book));
    }

    #[test]
    fn test_serde_round_trip_preserves_book() {
        let book = create_test_book();
        let json = serde_json::to_string(&book).unwrap();
        let loaded: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_deserialize_rejects_broken_invariants() {
        let json = r#"{
            "clients": [],
            "policy_types": [
                {"name": "Life", "id": "1"},
                {"name": "Life", "id": "2"}
            ]
        }"#;
        let err = serde_json::from_str::<Book>(json).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let json = r#"{
            "clients": [{
                "id": "A", "name": "Alice", "phone": "123", "email": "a@b.c",
                "address": "x", "birthday": "1990-01-01",
                "portfolio": [
                    {"id": "P1", "client_id": "B", "policy_type_id": "1", "expiry_date": "2026-01-01"}
                ]
            }],
            "policy_types": []
        }"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }
}
