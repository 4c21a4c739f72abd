// 🧾 Commands - one struct per user action
//
// A command either succeeds, mutating the Book and returning feedback, or
// fails with a BookError and leaves the Book untouched. Commands that change
// data call `Model::commit_book()` after the change; queries never do.

pub mod claim;
pub mod client;
pub mod general;
pub mod policy;
pub mod policy_type;

use crate::book::Result;
use crate::model::Model;
use crate::values::ClientId;
use std::fmt;

pub use claim::{AddClaimCommand, DeleteClaimCommand, EditClaimCommand, EditClaimDescriptor};
pub use client::{
    describe_client, AddClientCommand, DeleteClientCommand, EditClientCommand,
    EditClientDescriptor, FindClientCommand, ListClientsCommand, ViewClientCommand,
};
pub use general::{ClearCommand, ExitCommand, RemindersCommand, UndoCommand};
pub use policy::{AddPolicyCommand, DeletePolicyCommand, EditPolicyCommand, EditPolicyDescriptor};
pub use policy_type::{
    AddPolicyTypeCommand, DeletePolicyTypeCommand, EditPolicyTypeCommand,
    EditPolicyTypeDescriptor, FindPolicyTypeCommand, ListPolicyTypesCommand,
};

// ============================================================================
// COMMAND TRAIT
// ============================================================================

/// A unit of work executed against the Model
pub trait Command: fmt::Debug {
    /// Primary command word (e.g. "add-client")
    fn name(&self) -> &'static str;

    fn execute(&self, model: &mut Model) -> Result<CommandResult>;
}

// ============================================================================
// COMMAND RESULT
// ============================================================================

/// Which panel the front end should bring forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    ClientList,
    ClientDetail(ClientId),
    PolicyTypeList,
    Reminders,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
    pub view: Option<View>,
    pub exit: bool,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>) -> Self {
        CommandResult {
            feedback: feedback.into(),
            view: None,
            exit: false,
        }
    }

    pub fn with_view(feedback: impl Into<String>, view: View) -> Self {
        CommandResult {
            feedback: feedback.into(),
            view: Some(view),
            exit: false,
        }
    }

    pub fn exit(feedback: impl Into<String>) -> Self {
        CommandResult {
            feedback: feedback.into(),
            view: None,
            exit: true,
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.feedback)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::book::Book;
    use crate::entities::{Claim, Client, PolicyType};
    use crate::model::Model;
    use crate::values::{Amount, Description};
    use chrono::NaiveDate;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn parse<T: std::str::FromStr>(raw: &str) -> T
    where
        T::Err: std::fmt::Debug,
    {
        raw.parse().unwrap()
    }

    pub fn create_test_client(id: &str, name: &str) -> Client {
        Client::new(
            parse(id),
            parse(name),
            parse("94821100"),
            parse("client@example.com"),
            parse("1 Raffles Place"),
            date(1990, 4, 2),
        )
    }

    pub fn create_test_claim(client: &str, policy: &str, claim: &str, amount: &str) -> Claim {
        Claim::new(
            parse(claim),
            parse(client),
            parse(policy),
            amount.parse::<Amount>().unwrap(),
            date(2025, 8, 9),
            Description::new("windscreen"),
        )
    }

    /// Client A with policy P1 (type Life/1) and claim X1; client B empty;
    /// policy types (Life, 1) and (Health, 2). Nothing committed yet.
    pub fn create_test_model() -> Model {
        let mut book = Book::new();
        book.add_policy_type(PolicyType::new(parse("Life"), parse("1"))).unwrap();
        book.add_policy_type(PolicyType::new(parse("Health"), parse("2"))).unwrap();
        book.add_client(create_test_client("A", "Alice Tan")).unwrap();
        book.add_client(create_test_client("B", "Bernice Yu")).unwrap();
        book.add_policy(parse("P1"), &parse("A"), parse("1"), date(2026, 3, 1)).unwrap();
        book.add_claim(create_test_claim("A", "P1", "X1", "300")).unwrap();
        Model::new(book)
    }
}
