// Policy commands: add, edit, delete within one client's portfolio

use crate::book::Result;
use crate::commands::{Command, CommandResult, View};
use crate::error::BookError;
use crate::model::Model;
use crate::values::{ClientId, PolicyId, PolicyTypeId};
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AddPolicyCommand {
    pub client_id: ClientId,
    pub policy_id: PolicyId,
    pub policy_type_id: PolicyTypeId,
    pub expiry_date: NaiveDate,
}

impl Command for AddPolicyCommand {
    fn name(&self) -> &'static str {
        "add-policy"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let feedback = {
            let policy = model.book_mut().add_policy(
                self.policy_id.clone(),
                &self.client_id,
                self.policy_type_id.clone(),
                self.expiry_date,
            )?;
            format!("New policy added to client {}: {}", self.client_id, policy)
        };
        model.commit_book();
        info!(client = %self.client_id, policy = %self.policy_id, "policy added");
        Ok(CommandResult::with_view(
            feedback,
            View::ClientDetail(self.client_id.clone()),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPolicyDescriptor {
    pub id: Option<PolicyId>,
    pub policy_type_id: Option<PolicyTypeId>,
    pub expiry_date: Option<NaiveDate>,
}

impl EditPolicyDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.id.is_some() || self.policy_type_id.is_some() || self.expiry_date.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct EditPolicyCommand {
    pub client_id: ClientId,
    pub policy_id: PolicyId,
    pub edits: EditPolicyDescriptor,
}

impl Command for EditPolicyCommand {
    fn name(&self) -> &'static str {
        "edit-policy"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        if !self.edits.is_any_field_edited() {
            return Err(BookError::invalid(
                "edit",
                "at least one field to edit must be provided",
            ));
        }

        let target = model.book().policy(&self.client_id, &self.policy_id)?.clone();
        let mut edited = target.clone();
        if let Some(id) = &self.edits.id {
            edited.id = id.clone();
        }
        if let Some(policy_type_id) = &self.edits.policy_type_id {
            edited.policy_type_id = policy_type_id.clone();
        }
        if let Some(expiry_date) = self.edits.expiry_date {
            edited.expiry_date = expiry_date;
        }
        let new_id = edited.id.clone();

        model.book_mut().set_policy(&target, edited)?;
        model.commit_book();
        info!(client = %self.client_id, policy = %self.policy_id, now = %new_id, "policy edited");

        let shown = model.book().policy(&self.client_id, &new_id)?;
        Ok(CommandResult::with_view(
            format!("Edited policy: {}", shown),
            View::ClientDetail(self.client_id.clone()),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct DeletePolicyCommand {
    pub client_id: ClientId,
    pub policy_id: PolicyId,
}

impl Command for DeletePolicyCommand {
    fn name(&self) -> &'static str {
        "delete-policy"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let removed = model
            .book_mut()
            .remove_policy(&self.client_id, &self.policy_id)?;
        model.commit_book();
        info!(client = %self.client_id, policy = %removed.id, "policy deleted");
        Ok(CommandResult::with_view(
            format!("Deleted policy: {}", removed),
            View::ClientDetail(self.client_id.clone()),
        ))
    }
}
