// Policy type commands
//
// Targets are named by the (name, id) pair. Anything short of a match on
// both keys is refused and the half matches are shown instead.

use crate::book::Result;
use crate::commands::{Command, CommandResult, View};
use crate::entities::{PolicyType, Removal};
use crate::error::BookError;
use crate::model::{Model, PolicyTypePredicate};
use crate::values::{Amount, Description, PolicyTypeId, PolicyTypeName};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AddPolicyTypeCommand {
    pub policy_type: PolicyType,
}

impl Command for AddPolicyTypeCommand {
    fn name(&self) -> &'static str {
        "add-policy-type"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.book_mut().add_policy_type(self.policy_type.clone())?;
        model.commit_book();
        info!(name = %self.policy_type.name, id = %self.policy_type.id, "policy type added");
        Ok(CommandResult::with_view(
            format!("New policy type added: {}", self.policy_type),
            View::PolicyTypeList,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPolicyTypeDescriptor {
    pub name: Option<PolicyTypeName>,
    pub id: Option<PolicyTypeId>,
    pub description: Option<Description>,
    pub premium: Option<Amount>,
}

impl EditPolicyTypeDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some() || self.id.is_some() || self.description.is_some() || self.premium.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct EditPolicyTypeCommand {
    pub name: PolicyTypeName,
    pub id: PolicyTypeId,
    pub edits: EditPolicyTypeDescriptor,
}

impl Command for EditPolicyTypeCommand {
    fn name(&self) -> &'static str {
        "edit-policy-type"
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
            .policy_types()
            .resolve_exact(&self.name, &self.id)?
            .clone();
        let mut edited = target.clone();
        if let Some(name) = &self.edits.name {
            edited.name = name.clone();
        }
        if let Some(id) = &self.edits.id {
            edited.id = id.clone();
        }
        if let Some(description) = &self.edits.description {
            edited.description = Some(description.clone());
        }
        if let Some(premium) = self.edits.premium {
            edited.premium = Some(premium);
        }

        let feedback = format!("Edited policy type: {}", edited);
        model.book_mut().policy_types_mut().set_entry(&target, edited)?;
        model.commit_book();
        info!(name = %self.name, id = %self.id, "policy type edited");
        Ok(CommandResult::with_view(feedback, View::PolicyTypeList))
    }
}

#[derive(Debug, Clone)]
pub struct DeletePolicyTypeCommand {
    pub name: PolicyTypeName,
    pub id: PolicyTypeId,
}

impl Command for DeletePolicyTypeCommand {
    fn name(&self) -> &'static str {
        "delete-policy-type"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        match model.book_mut().policy_types_mut().remove(&self.name, &self.id)? {
            Removal::Removed(removed) => {
                model.commit_book();
                info!(name = %removed.name, id = %removed.id, "policy type deleted");
                Ok(CommandResult::with_view(
                    format!("Deleted policy type: {}", removed),
                    View::PolicyTypeList,
                ))
            }
            Removal::Ambiguous(candidates) => {
                warn!(name = %self.name, id = %self.id, candidates = candidates.len(), "policy type delete refused");
                let candidates: Vec<PolicyType> =
                    candidates.into_iter().map(|m| m.policy_type).collect();
                model.update_policy_type_filter(PolicyTypePredicate::EitherKey(
                    self.name.clone(),
                    self.id.clone(),
                ));
                Err(BookError::Ambiguous(candidates))
            }
        }
    }
}

/// Search by name, id, or both
///
/// With both keys, exact matches win; failing that, entries sharing either
/// key are listed and flagged as partial.
#[derive(Debug, Clone)]
pub struct FindPolicyTypeCommand {
    pub name: Option<PolicyTypeName>,
    pub id: Option<PolicyTypeId>,
}

impl Command for FindPolicyTypeCommand {
    fn name(&self) -> &'static str {
        "find-policy-type"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let (predicate, partial) = match (&self.name, &self.id) {
            (None, None) => {
                return Err(BookError::invalid(
                    "find-policy-type",
                    "give a name, an id, or both",
                ))
            }
            (Some(name), None) => (PolicyTypePredicate::Name(name.clone()), false),
            (None, Some(id)) => (PolicyTypePredicate::Id(id.clone()), false),
            (Some(name), Some(id)) => {
                if model.book().policy_types().find_exact(name, id).is_some() {
                    (PolicyTypePredicate::BothKeys(name.clone(), id.clone()), false)
                } else {
                    (PolicyTypePredicate::EitherKey(name.clone(), id.clone()), true)
                }
            }
        };

        model.update_policy_type_filter(predicate);
        let shown = model.filtered_policy_types().len();
        let feedback = if partial && shown > 0 {
            format!(
                "No exact match; found {} partial match(es) on name or id instead",
                shown
            )
        } else {
            format!("{} policy type(s) listed!", shown)
        };
        Ok(CommandResult::with_view(feedback, View::PolicyTypeList))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListPolicyTypesCommand;

impl Command for ListPolicyTypesCommand {
    fn name(&self) -> &'static str {
        "list-policy-types"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.update_policy_type_filter(PolicyTypePredicate::All);
        Ok(CommandResult::with_view(
            format!(
                "Listed all {} policy type(s)",
                model.book().policy_types().len()
            ),
            View::PolicyTypeList,
        ))
    }
}
