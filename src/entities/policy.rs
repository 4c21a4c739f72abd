// 📄 Policy & Claim Entities
//
// A policy lives inside exactly one client's portfolio and owns its claims.
// Both carry their owners' ids so a detached copy still says where it belongs.

use crate::error::{BookError, EntityKind};
use crate::values::{window_end, Amount, ClaimId, ClientId, Description, PolicyId, PolicyTypeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CLAIM
// ============================================================================

/// Leaf entity, unique by id within its policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub client_id: ClientId,
    pub policy_id: PolicyId,
    pub amount: Amount,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Description,
}

impl Claim {
    pub fn new(
        id: ClaimId,
        client_id: ClientId,
        policy_id: PolicyId,
        amount: Amount,
        date: NaiveDate,
        description: Description,
    ) -> Self {
        Claim {
            id,
            client_id,
            policy_id,
            amount,
            date,
            description,
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Claim {} on {}: {}", self.id, self.date, self.amount)?;
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        Ok(())
    }
}

// ============================================================================
// POLICY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub client_id: ClientId,

    /// Reference by id only; edits to the policy type never reach in here
    pub policy_type_id: PolicyTypeId,

    pub expiry_date: NaiveDate,

    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl Policy {
    pub fn new(
        id: PolicyId,
        client_id: ClientId,
        policy_type_id: PolicyTypeId,
        expiry_date: NaiveDate,
    ) -> Self {
        Policy {
            id,
            client_id,
            policy_type_id,
            expiry_date,
            claims: Vec::new(),
        }
    }

    pub fn claim(&self, id: &ClaimId) -> Result<&Claim, BookError> {
        self.claims
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| self.claim_missing(id))
    }

    pub fn has_claim(&self, id: &ClaimId) -> bool {
        self.claims.iter().any(|c| &c.id == id)
    }

    pub fn add_claim(&mut self, claim: Claim) -> Result<(), BookError> {
        if claim.client_id != self.client_id || claim.policy_id != self.id {
            return Err(BookError::invalid(
                "claim",
                format!(
                    "claim {} belongs to {}/{}, not {}/{}",
                    claim.id, claim.client_id, claim.policy_id, self.client_id, self.id
                ),
            ));
        }
        if self.has_claim(&claim.id) {
            return Err(BookError::duplicate(EntityKind::Claim, &claim.id));
        }
        self.claims.push(claim);
        Ok(())
    }

    /// Replace `target` (by structural equality) with `replacement`
    pub fn set_claim(&mut self, target: &Claim, replacement: Claim) -> Result<(), BookError> {
        let index = self
            .claims
            .iter()
            .position(|c| c == target)
            .ok_or_else(|| self.claim_missing(&target.id))?;

        if replacement.client_id != self.client_id || replacement.policy_id != self.id {
            return Err(BookError::invalid(
                "claim",
                "an edited claim must stay under the same policy",
            ));
        }
        if self
            .claims
            .iter()
            .enumerate()
            .any(|(i, c)| i != index && c.id == replacement.id)
        {
            return Err(BookError::duplicate(EntityKind::Claim, &replacement.id));
        }

        self.claims[index] = replacement;
        Ok(())
    }

    pub fn remove_claim(&mut self, id: &ClaimId) -> Result<Claim, BookError> {
        let index = self
            .claims
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| self.claim_missing(id))?;
        Ok(self.claims.remove(index))
    }

    /// Sum of all claim amounts, saturating
    pub fn total_claimed(&self) -> Amount {
        Amount::from_cents(
            self.claims
                .iter()
                .fold(0u64, |acc, c| acc.saturating_add(c.amount.cents())),
        )
    }

    /// Rewrite owner ids on this policy and every claim below it
    pub(crate) fn reparent(&mut self, client_id: &ClientId, policy_id: &PolicyId) {
        self.client_id = client_id.clone();
        self.id = policy_id.clone();
        for claim in &mut self.claims {
            claim.client_id = client_id.clone();
            claim.policy_id = policy_id.clone();
        }
    }

    /// Expiry falls inside `[today, today + within_days]`
    pub fn expires_within(&self, today: NaiveDate, within_days: i64) -> bool {
        self.expiry_date >= today
            && window_end(today, within_days).map_or(true, |last_day| self.expiry_date <= last_day)
    }

    fn claim_missing(&self, id: &ClaimId) -> BookError {
        BookError::ClaimMissing {
            client: self.client_id.clone(),
            policy: self.id.clone(),
            claim: id.clone(),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Policy {} (type {}) expires {}, {} claim(s)",
            self.id,
            self.policy_type_id,
            self.expiry_date,
            self.claims.len()
        )
    }
}
