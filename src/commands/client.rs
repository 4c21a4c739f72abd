// Client commands: add, edit, delete, find, list, view

use crate::book::Result;
use crate::commands::{Command, CommandResult, View};
use crate::entities::Client;
use crate::error::BookError;
use crate::model::{ClientPredicate, Model};
use crate::values::{Address, ClientId, Email, Name, Phone};
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AddClientCommand {
    pub client: Client,
}

impl Command for AddClientCommand {
    fn name(&self) -> &'static str {
        "add-client"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.book_mut().add_client(self.client.clone())?;
        model.commit_book();
        info!(client = %self.client.id, "client added");
        Ok(CommandResult::with_view(
            format!("New client added: {}", self.client),
            View::ClientDetail(self.client.id.clone()),
        ))
    }
}

/// Fields to change on a client; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditClientDescriptor {
    pub id: Option<ClientId>,
    pub name: Option<Name>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub birthday: Option<NaiveDate>,
}

impl EditClientDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.id.is_some()
            || self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.birthday.is_some()
    }

    fn apply_to(&self, client: &Client) -> Client {
        let mut edited = client.clone();
        if let Some(id) = &self.id {
            edited.id = id.clone();
        }
        if let Some(name) = &self.name {
            edited.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            edited.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            edited.email = email.clone();
        }
        if let Some(address) = &self.address {
            edited.address = address.clone();
        }
        if let Some(birthday) = self.birthday {
            edited.birthday = birthday;
        }
        edited
    }
}

#[derive(Debug, Clone)]
pub struct EditClientCommand {
    pub id: ClientId,
    pub edits: EditClientDescriptor,
}

impl Command for EditClientCommand {
    fn name(&self) -> &'static str {
        "edit-client"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        if !self.edits.is_any_field_edited() {
            return Err(BookError::invalid(
                "edit",
                "at least one field to edit must be provided",
            ));
        }
        let edited = self.edits.apply_to(model.book().client(&self.id)?);
        let new_id = edited.id.clone();
        model.book_mut().set_client(&self.id, edited)?;
        model.commit_book();
        info!(client = %self.id, now = %new_id, "client edited");

        let shown = model.book().client(&new_id)?;
        Ok(CommandResult::with_view(
            format!("Edited client: {}", shown),
            View::ClientDetail(new_id),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct DeleteClientCommand {
    pub id: ClientId,
}

impl Command for DeleteClientCommand {
    fn name(&self) -> &'static str {
        "delete-client"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let removed = model.book_mut().remove_client(&self.id)?;
        model.commit_book();
        info!(
            client = %removed.id,
            policies = removed.portfolio.len(),
            claims = removed.portfolio.claim_count(),
            "client deleted"
        );
        Ok(CommandResult::with_view(
            format!("Deleted client: {}", removed),
            View::ClientList,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct FindClientCommand {
    pub keywords: Vec<String>,
}

impl Command for FindClientCommand {
    fn name(&self) -> &'static str {
        "find-client"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.update_client_filter(ClientPredicate::NameKeywords(self.keywords.clone()));
        let shown = model.filtered_clients().len();
        Ok(CommandResult::with_view(
            format!("{} client(s) listed!", shown),
            View::ClientList,
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListClientsCommand;

impl Command for ListClientsCommand {
    fn name(&self) -> &'static str {
        "list-clients"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.update_client_filter(ClientPredicate::All);
        Ok(CommandResult::with_view(
            format!("Listed all {} client(s)", model.book().client_count()),
            View::ClientList,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct ViewClientCommand {
    pub id: ClientId,
}

impl Command for ViewClientCommand {
    fn name(&self) -> &'static str {
        "view-client"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let client = model.book().client(&self.id)?;
        Ok(CommandResult::with_view(
            format!("Viewing client: {} [{}]", client.name, client.id),
            View::ClientDetail(self.id.clone()),
        ))
    }
}

/// Multi-line detail of one client: contact line, then each policy with
/// its claims and claimed total
pub fn describe_client(client: &Client) -> String {
    let mut detail = client.to_string();
    for policy in client.portfolio.iter() {
        detail.push_str(&format!(
            "\n  {}, total claimed {}",
            policy,
            policy.total_claimed()
        ));
        for claim in &policy.claims {
            detail.push_str(&format!("\n    {}", claim));
        }
    }
    detail
}
