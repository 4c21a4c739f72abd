// ⚠️ Error Taxonomy - every way a core operation can refuse
//
// Each variant is terminal for the invocation that raised it: the Book
// and the undo timeline are left exactly as they were.

use crate::entities::PolicyType;
use crate::values::{ClaimId, ClientId, PolicyId};
use std::fmt;
use thiserror::Error;

/// What kind of entity a uniqueness conflict was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Client,
    Policy,
    Claim,
    PolicyType,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Policy => "policy",
            EntityKind::Claim => "claim",
            EntityKind::PolicyType => "policy type",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification used by the dispatcher to pick a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateIdentity,
    NotFound,
    Ambiguous,
    NoHistory,
    InvalidArgument,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("{entity} '{key}' already exists")]
    DuplicateIdentity { entity: EntityKind, key: String },

    #[error("client '{0}' does not exist")]
    ClientMissing(ClientId),

    #[error("client '{client}' has no policy '{policy}'")]
    PolicyMissing { client: ClientId, policy: PolicyId },

    #[error("policy '{policy}' of client '{client}' has no claim '{claim}'")]
    ClaimMissing {
        client: ClientId,
        policy: PolicyId,
        claim: ClaimId,
    },

    #[error("policy type '{0}' does not exist")]
    PolicyTypeMissing(String),

    #[error("no policy type matches both name and id; found {} partial match(es) instead", .0.len())]
    Ambiguous(Vec<PolicyType>),

    #[error("no more commands to undo")]
    NoHistory,

    #[error("invalid {field}: {message}")]
    InvalidArgument { field: &'static str, message: String },
}

impl BookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookError::DuplicateIdentity { .. } => ErrorKind::DuplicateIdentity,
            BookError::ClientMissing(_)
            | BookError::PolicyMissing { .. }
            | BookError::ClaimMissing { .. }
            | BookError::PolicyTypeMissing(_) => ErrorKind::NotFound,
            BookError::Ambiguous(_) => ErrorKind::Ambiguous,
            BookError::NoHistory => ErrorKind::NoHistory,
            BookError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn duplicate(entity: EntityKind, key: impl fmt::Display) -> Self {
        BookError::DuplicateIdentity {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        BookError::InvalidArgument {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variants_classify_as_not_found() {
        let client: ClientId = "C1".parse().unwrap();
        let policy: PolicyId = "P1".parse().unwrap();
        let claim: ClaimId = "X1".parse().unwrap();

        let errors = vec![
            BookError::ClientMissing(client.clone()),
            BookError::PolicyMissing {
                client: client.clone(),
                policy: policy.clone(),
            },
            BookError::ClaimMissing {
                client,
                policy,
                claim,
            },
            BookError::PolicyTypeMissing("Life".to_string()),
        ];

        for err in errors {
            assert!(err.is_not_found(), "{err} should be NotFound");
        }
    }

    #[test]
    fn test_messages_name_the_offending_key() {
        let err = BookError::duplicate(EntityKind::PolicyType, "Life");
        assert_eq!(err.to_string(), "policy type 'Life' already exists");
        assert_eq!(err.kind(), ErrorKind::DuplicateIdentity);

        let err = BookError::Ambiguous(Vec::new());
        assert!(err.to_string().contains("0 partial match"));
        assert_eq!(BookError::NoHistory.kind(), ErrorKind::NoHistory);
    }
}
