// 👤 Client Entity - the owner of a portfolio
//
// Client → Portfolio → Policy → Claim is a chain of owned containers.
// Policy ids are scoped to the portfolio: two clients may both hold "P1".

use crate::entities::policy::Policy;
use crate::error::{BookError, EntityKind};
use crate::values::{window_end, Address, ClientId, Email, Name, Phone, PolicyId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PORTFOLIO
// ============================================================================

/// Ordered policies of one client, unique by policy id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    policies: Vec<Policy>,
}

impl Portfolio {
    pub fn new() -> Self {
        Portfolio::default()
    }

    pub fn policy(&self, id: &PolicyId) -> Option<&Policy> {
        self.policies.iter().find(|p| &p.id == id)
    }

    pub fn policy_mut(&mut self, id: &PolicyId) -> Option<&mut Policy> {
        self.policies.iter_mut().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PolicyId) -> bool {
        self.policy(id).is_some()
    }

    pub(crate) fn push(&mut self, policy: Policy) -> Result<(), BookError> {
        if self.contains(&policy.id) {
            return Err(BookError::duplicate(EntityKind::Policy, &policy.id));
        }
        self.policies.push(policy);
        Ok(())
    }

    pub(crate) fn position(&self, target: &Policy) -> Option<usize> {
        self.policies.iter().position(|p| p == target)
    }

    pub(crate) fn replace_at(&mut self, index: usize, policy: Policy) {
        self.policies[index] = policy;
    }

    pub(crate) fn clashes_with(&self, index: usize, id: &PolicyId) -> bool {
        self.policies
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && &p.id == id)
    }

    pub(crate) fn remove(&mut self, id: &PolicyId) -> Option<Policy> {
        let index = self.policies.iter().position(|p| &p.id == id)?;
        Some(self.policies.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Policy> {
        self.policies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn claim_count(&self) -> usize {
        self.policies.iter().map(|p| p.claims.len()).sum()
    }
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: Name,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
    pub birthday: NaiveDate,

    /// Owned exclusively by this client, dropped with it
    #[serde(default)]
    pub portfolio: Portfolio,
}

impl Client {
    pub fn new(
        id: ClientId,
        name: Name,
        phone: Phone,
        email: Email,
        address: Address,
        birthday: NaiveDate,
    ) -> Self {
        Client {
            id,
            name,
            phone,
            email,
            address,
            birthday,
            portfolio: Portfolio::new(),
        }
    }

    /// Next occurrence of the birthday on or after `today`
    ///
    /// A 29 February birthday is observed on 28 February in common years.
    pub fn next_birthday(&self, today: NaiveDate) -> NaiveDate {
        let this_year = birthday_in_year(self.birthday, today.year());
        if this_year >= today {
            this_year
        } else {
            birthday_in_year(self.birthday, today.year() + 1)
        }
    }

    /// Birthday falls inside `[today, today + within_days]`
    pub fn has_birthday_within(&self, today: NaiveDate, within_days: i64) -> bool {
        match window_end(today, within_days) {
            Some(last_day) => self.next_birthday(today) <= last_day,
            None => true,
        }
    }

    /// Case-insensitive whole-word match of any keyword against the name
    pub fn name_has_any_word(&self, keywords: &[String]) -> bool {
        let words: Vec<String> = self
            .name
            .as_str()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        keywords
            .iter()
            .any(|k| words.iter().any(|w| w == &k.to_lowercase()))
    }
}

fn birthday_in_year(birthday: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(birthday)
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] phone {} email {} address {} birthday {} - {} policies",
            self.name,
            self.id,
            self.phone,
            self.email,
            self.address,
            self.birthday,
            self.portfolio.len()
        )
    }
}
