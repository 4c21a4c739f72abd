// ⌨️ Command Line Grammar - one typed line → one Command
//
// Lines are tokenized with shlex (so descriptions can be quoted) and parsed
// by clap. Every argument is converted through its validated value type, so
// malformed input never reaches the Book.

use crate::commands::{
    AddClaimCommand, AddClientCommand, AddPolicyCommand, AddPolicyTypeCommand, ClearCommand,
    Command, DeleteClaimCommand, DeleteClientCommand, DeletePolicyCommand,
    DeletePolicyTypeCommand, EditClaimCommand, EditClaimDescriptor, EditClientCommand,
    EditClientDescriptor, EditPolicyCommand, EditPolicyDescriptor, EditPolicyTypeCommand,
    EditPolicyTypeDescriptor, ExitCommand, FindClientCommand, FindPolicyTypeCommand,
    ListClientsCommand, ListPolicyTypesCommand, RemindersCommand, UndoCommand, ViewClientCommand,
};
use crate::entities::{Claim, Client, PolicyType};
use crate::values::{
    parse_date, Address, Amount, ClaimId, ClientId, Description, Email, Name, Phone, PolicyId,
    PolicyTypeId, PolicyTypeName,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unbalanced quotes in command")]
    UnbalancedQuotes,

    #[error("{0}")]
    Invalid(#[from] clap::Error),
}

/// Values the grammar cannot know by itself
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub today: NaiveDate,
    pub reminder_window_days: i64,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "policy-book", disable_version_flag = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: BookCommand,
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    /// Add a client
    AddClient {
        #[arg(long)]
        id: ClientId,
        #[arg(long)]
        name: Name,
        #[arg(long)]
        phone: Phone,
        #[arg(long)]
        email: Email,
        #[arg(long)]
        address: Address,
        #[arg(long, value_parser = parse_date)]
        birthday: NaiveDate,
    },

    /// Edit a client's details
    EditClient {
        id: ClientId,
        #[arg(long)]
        new_id: Option<ClientId>,
        #[arg(long)]
        name: Option<Name>,
        #[arg(long)]
        phone: Option<Phone>,
        #[arg(long)]
        email: Option<Email>,
        #[arg(long)]
        address: Option<Address>,
        #[arg(long, value_parser = parse_date)]
        birthday: Option<NaiveDate>,
    },

    /// Delete a client and everything it owns
    DeleteClient { id: ClientId },

    /// List clients whose name contains any of the words
    FindClient {
        #[arg(required = true)]
        keywords: Vec<String>,
    },

    /// List all clients
    ListClients,

    /// Show one client with policies and claims
    ViewClient { id: ClientId },

    /// Add a policy to a client's portfolio
    AddPolicy {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        id: PolicyId,
        #[arg(long = "type")]
        policy_type: PolicyTypeId,
        #[arg(long, value_parser = parse_date)]
        expiry: NaiveDate,
    },

    /// Edit a policy in a client's portfolio
    EditPolicy {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        id: PolicyId,
        #[arg(long)]
        new_id: Option<PolicyId>,
        #[arg(long = "type")]
        policy_type: Option<PolicyTypeId>,
        #[arg(long, value_parser = parse_date)]
        expiry: Option<NaiveDate>,
    },

    /// Delete a policy and its claims
    DeletePolicy {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        id: PolicyId,
    },

    /// Add a claim to a policy
    AddClaim {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        policy: PolicyId,
        #[arg(long)]
        id: ClaimId,
        #[arg(long)]
        amount: Amount,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        description: Description,
    },

    /// Edit a claim
    EditClaim {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        policy: PolicyId,
        #[arg(long)]
        id: ClaimId,
        #[arg(long)]
        new_id: Option<ClaimId>,
        #[arg(long)]
        amount: Option<Amount>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<Description>,
    },

    /// Delete a claim
    DeleteClaim {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        policy: PolicyId,
        #[arg(long)]
        id: ClaimId,
    },

    /// Add a policy type; name and id must both be unused
    AddPolicyType {
        #[arg(long)]
        name: PolicyTypeName,
        #[arg(long)]
        id: PolicyTypeId,
        #[arg(long)]
        description: Option<Description>,
        #[arg(long)]
        premium: Option<Amount>,
    },

    /// Edit the policy type matching both name and id
    EditPolicyType {
        #[arg(long)]
        name: PolicyTypeName,
        #[arg(long)]
        id: PolicyTypeId,
        #[arg(long)]
        new_name: Option<PolicyTypeName>,
        #[arg(long)]
        new_id: Option<PolicyTypeId>,
        #[arg(long)]
        description: Option<Description>,
        #[arg(long)]
        premium: Option<Amount>,
    },

    /// Delete the policy type matching both name and id
    DeletePolicyType {
        #[arg(long)]
        name: PolicyTypeName,
        #[arg(long)]
        id: PolicyTypeId,
    },

    /// Find policy types by name and/or id
    FindPolicyType {
        #[arg(long)]
        name: Option<PolicyTypeName>,
        #[arg(long)]
        id: Option<PolicyTypeId>,
    },

    /// List all policy types
    ListPolicyTypes,

    /// Upcoming birthdays and policy expiries
    Reminders {
        #[arg(long)]
        days: Option<u32>,
    },

    /// Undo the last data-changing command
    Undo,

    /// Remove all data
    Clear,

    /// Save and quit
    Exit,
}

impl BookCommand {
    pub fn into_command(self, context: &ParseContext) -> Box<dyn Command> {
        match self {
            BookCommand::AddClient {
                id,
                name,
                phone,
                email,
                address,
                birthday,
            } => Box::new(AddClientCommand {
                client: Client::new(id, name, phone, email, address, birthday),
            }),
            BookCommand::EditClient {
                id,
                new_id,
                name,
                phone,
                email,
                address,
                birthday,
            } => Box::new(EditClientCommand {
                id,
                edits: EditClientDescriptor {
                    id: new_id,
                    name,
                    phone,
                    email,
                    address,
                    birthday,
                },
            }),
            BookCommand::DeleteClient { id } => Box::new(DeleteClientCommand { id }),
            BookCommand::FindClient { keywords } => Box::new(FindClientCommand { keywords }),
            BookCommand::ListClients => Box::new(ListClientsCommand),
            BookCommand::ViewClient { id } => Box::new(ViewClientCommand { id }),
            BookCommand::AddPolicy {
                client,
                id,
                policy_type,
                expiry,
            } => Box::new(AddPolicyCommand {
                client_id: client,
                policy_id: id,
                policy_type_id: policy_type,
                expiry_date: expiry,
            }),
            BookCommand::EditPolicy {
                client,
                id,
                new_id,
                policy_type,
                expiry,
            } => Box::new(EditPolicyCommand {
                client_id: client,
                policy_id: id,
                edits: EditPolicyDescriptor {
                    id: new_id,
                    policy_type_id: policy_type,
                    expiry_date: expiry,
                },
            }),
            BookCommand::DeletePolicy { client, id } => Box::new(DeletePolicyCommand {
                client_id: client,
                policy_id: id,
            }),
            BookCommand::AddClaim {
                client,
                policy,
                id,
                amount,
                date,
                description,
            } => Box::new(AddClaimCommand {
                claim: Claim::new(id, client, policy, amount, date, description),
            }),
            BookCommand::EditClaim {
                client,
                policy,
                id,
                new_id,
                amount,
                date,
                description,
            } => Box::new(EditClaimCommand {
                client_id: client,
                policy_id: policy,
                claim_id: id,
                edits: EditClaimDescriptor {
                    id: new_id,
                    amount,
                    date,
                    description,
                },
            }),
            BookCommand::DeleteClaim { client, policy, id } => Box::new(DeleteClaimCommand {
                client_id: client,
                policy_id: policy,
                claim_id: id,
            }),
            BookCommand::AddPolicyType {
                name,
                id,
                description,
                premium,
            } => Box::new(AddPolicyTypeCommand {
                policy_type: PolicyType::with_details(name, id, description, premium),
            }),
            BookCommand::EditPolicyType {
                name,
                id,
                new_name,
                new_id,
                description,
                premium,
            } => Box::new(EditPolicyTypeCommand {
                name,
                id,
                edits: EditPolicyTypeDescriptor {
                    name: new_name,
                    id: new_id,
                    description,
                    premium,
                },
            }),
            BookCommand::DeletePolicyType { name, id } => {
                Box::new(DeletePolicyTypeCommand { name, id })
            }
            BookCommand::FindPolicyType { name, id } => Box::new(FindPolicyTypeCommand { name, id }),
            BookCommand::ListPolicyTypes => Box::new(ListPolicyTypesCommand),
            BookCommand::Reminders { days } => Box::new(RemindersCommand {
                today: context.today,
                within_days: days.map_or(context.reminder_window_days, i64::from),
            }),
            BookCommand::Undo => Box::new(UndoCommand),
            BookCommand::Clear => Box::new(ClearCommand),
            BookCommand::Exit => Box::new(ExitCommand),
        }
    }
}

/// Tokenize and parse one input line
pub fn parse_command(line: &str, context: &ParseContext) -> Result<Box<dyn Command>, ParseError> {
    let tokens = shlex::split(line).ok_or(ParseError::UnbalancedQuotes)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let parsed = CommandLine::try_parse_from(tokens)?;
    Ok(parsed.command.into_command(context))
}
