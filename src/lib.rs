// Policy Book - Core Library
// Clients, their policies and claims, and the policy-type catalogue

pub mod error;
pub mod values;
pub mod entities;
pub mod book;
pub mod history;
pub mod model;
pub mod commands;
pub mod cli;
pub mod logic;
pub mod storage;
pub mod config;
pub mod sample;

// Re-export commonly used types
pub use error::{BookError, EntityKind, ErrorKind};
pub use values::{
    parse_date, Address, Amount, ClaimId, ClientId, Description, Email, Name, Phone, PolicyId,
    PolicyTypeId, PolicyTypeName,
};
pub use entities::{
    Claim, Client, DualKeyMatch, PartialMatch, Policy, PolicyType, PolicyTypeRegistry, Portfolio,
    Removal,
};
pub use book::Book;
pub use history::{History, Snapshot};
pub use model::{ClientPredicate, Model, PolicyTypePredicate};
pub use commands::{Command, CommandResult, View};
pub use cli::{parse_command, ParseContext, ParseError};
pub use logic::{LineError, Logic};
pub use storage::{open_storage, BookStorage, JsonFileStorage, SqliteStorage};
pub use config::{Config, StorageBackend};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
