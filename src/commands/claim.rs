// Claim commands: add, edit, delete under a client's policy

use crate::book::Result;
use crate::commands::{Command, CommandResult, View};
use crate::entities::Claim;
use crate::error::BookError;
use crate::model::Model;
use crate::values::{Amount, ClaimId, ClientId, Description, PolicyId};
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AddClaimCommand {
    pub claim: Claim,
}

impl Command for AddClaimCommand {
    fn name(&self) -> &'static str {
        "add-claim"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.book_mut().add_claim(self.claim.clone())?;
        model.commit_book();
        info!(
            client = %self.claim.client_id,
            policy = %self.claim.policy_id,
            claim = %self.claim.id,
            "claim added"
        );
        Ok(CommandResult::with_view(
            format!(
                "New claim added to policy {} of client {}: {}",
                self.claim.policy_id, self.claim.client_id, self.claim
            ),
            View::ClientDetail(self.claim.client_id.clone()),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditClaimDescriptor {
    pub id: Option<ClaimId>,
    pub amount: Option<Amount>,
    pub date: Option<NaiveDate>,
    pub description: Option<Description>,
}

impl EditClaimDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.id.is_some() || self.amount.is_some() || self.date.is_some() || self.description.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct EditClaimCommand {
    pub client_id: ClientId,
    pub policy_id: PolicyId,
    pub claim_id: ClaimId,
    pub edits: EditClaimDescriptor,
}

impl Command for EditClaimCommand {
    fn name(&self) -> &'static str {
        "edit-claim"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        if !self.edits.is_any_field_edited() {
            return Err(BookError::invalid(
                "edit",
                "at least one field to edit must be provided",
            ));
        }

        let target = model
            .book()
            .claim(&self.client_id, &self.policy_id, &self.claim_id)?
            .clone();
        let mut edited = target.clone();
        if let Some(id) = &self.edits.id {
            edited.id = id.clone();
        }
        if let Some(amount) = self.edits.amount {
            edited.amount = amount;
        }
        if let Some(date) = self.edits.date {
            edited.date = date;
        }
        if let Some(description) = &self.edits.description {
            edited.description = description.clone();
        }

        let feedback = format!("Edited claim: {}", edited);
        model.book_mut().set_claim(&target, edited)?;
        model.commit_book();
        info!(client = %self.client_id, policy = %self.policy_id, claim = %self.claim_id, "claim edited");
        Ok(CommandResult::with_view(
            feedback,
            View::ClientDetail(self.client_id.clone()),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct DeleteClaimCommand {
    pub client_id: ClientId,
    pub policy_id: PolicyId,
    pub claim_id: ClaimId,
}

impl Command for DeleteClaimCommand {
    fn name(&self) -> &'static str {
        "delete-claim"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let removed = model
            .book_mut()
            .remove_claim(&self.client_id, &self.policy_id, &self.claim_id)?;
        model.commit_book();
        info!(client = %self.client_id, policy = %self.policy_id, claim = %removed.id, "claim deleted");
        Ok(CommandResult::with_view(
            format!("Deleted claim: {}", removed),
            View::ClientDetail(self.client_id.clone()),
        ))
    }
}
