// ✅ Validated Values - typed arguments handed to the core
//
// Every value here can only be built through FromStr / TryFrom<String>,
// so anything that reaches the Book has already passed its format check.
// Serde goes through the same path: a malformed document is rejected on load.

use crate::error::BookError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_ID_LEN: usize = 32;

// ============================================================================
// IDENTIFIERS
// ============================================================================

fn validate_id(field: &'static str, raw: &str) -> Result<String, BookError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BookError::invalid(field, "must not be blank"));
    }
    if trimmed.len() > MAX_ID_LEN {
        return Err(BookError::invalid(
            field,
            format!("must be at most {} characters", MAX_ID_LEN),
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(BookError::invalid(
            field,
            format!("'{}' may only contain letters, digits and '-'", trimmed),
        ));
    }
    Ok(trimmed.to_string())
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = BookError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_id($field, s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = BookError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id!(
    /// Externally supplied client identifier, unique across the Book
    ClientId,
    "client id"
);
define_id!(
    /// Policy identifier, unique only inside one client's portfolio
    PolicyId,
    "policy id"
);
define_id!(
    /// Claim identifier, unique only inside one policy
    ClaimId,
    "claim id"
);
define_id!(
    /// Numeric or alphanumeric policy-type code, one of the two registry keys
    PolicyTypeId,
    "policy type id"
);

// ============================================================================
// NAMES
// ============================================================================

fn validate_name(field: &'static str, raw: &str) -> Result<String, BookError> {
    let trimmed = raw.trim();
    let first = trimmed
        .chars()
        .next()
        .ok_or_else(|| BookError::invalid(field, "must not be blank"))?;
    if !first.is_alphanumeric() {
        return Err(BookError::invalid(
            field,
            "must start with a letter or digit",
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, ' ' | '\'' | '-' | '.' | '&' | '/');
    if let Some(bad) = trimmed.chars().find(|c| !allowed(*c)) {
        return Err(BookError::invalid(
            field,
            format!("character '{}' is not allowed", bad),
        ));
    }
    Ok(trimmed.to_string())
}

macro_rules! define_name {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = BookError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_name($field, s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = BookError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> String {
                name.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_name!(
    /// Client display name
    Name,
    "name"
);
define_name!(
    /// Policy-type name, the other registry key
    PolicyTypeName,
    "policy type name"
);

// ============================================================================
// CONTACT DETAILS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl FromStr for Phone {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() < 3 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(BookError::invalid(
                "phone",
                "must be at least 3 digits and contain only digits",
            ));
        }
        Ok(Phone(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl FromStr for Email {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = match trimmed.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !trimmed.contains(char::is_whitespace)
                    && domain.split('.').all(|label| !label.is_empty())
            }
            None => false,
        };
        if !valid {
            return Err(BookError::invalid(
                "email",
                format!("'{}' is not of the form local@domain", trimmed),
            ));
        }
        Ok(Email(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl FromStr for Address {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BookError::invalid("address", "must not be blank"));
        }
        Ok(Address(trimmed.to_string()))
    }
}

/// Free text, may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Description(String);

impl Description {
    pub fn new(text: impl Into<String>) -> Self {
        Description(text.into().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Description {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Description::new(s))
    }
}

impl From<String> for Description {
    fn from(value: String) -> Self {
        Description::new(value)
    }
}

macro_rules! impl_string_plumbing {
    ($($name:ident),*) => {
        $(
            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> String {
                    value.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

impl_string_plumbing!(Phone, Email, Address, Description);

macro_rules! impl_try_from_string {
    ($($name:ident),*) => {
        $(
            impl TryFrom<String> for $name {
                type Error = BookError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }
        )*
    };
}

impl_try_from_string!(Phone, Email, Address);

// ============================================================================
// MONEY
// ============================================================================

/// Non-negative amount with cent precision (claim amounts, premiums)
///
/// Stored as integer cents so two amounts compare exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u64);

impl Amount {
    pub fn from_cents(cents: u64) -> Self {
        Amount(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || {
            BookError::invalid(
                "amount",
                format!(
                    "'{}' must be a non-negative number with at most 2 decimal places",
                    trimmed
                ),
            )
        };

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };
        if whole.is_empty()
            || fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || (trimmed.contains('.') && fraction.is_empty())
        {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Amount)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Amount {
    type Error = BookError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> String {
        amount.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// DATES
// ============================================================================

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// Parse a calendar date in `YYYY-MM-DD` or `DD-MM-YYYY`
pub fn parse_date(raw: &str) -> Result<NaiveDate, BookError> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            BookError::invalid(
                "date",
                format!("'{}' is not a valid YYYY-MM-DD or DD-MM-YYYY date", trimmed),
            )
        })
}

/// Last day of the inclusive window `[today, today + within_days]`
///
/// `None` when that day lies past the last representable date: the window
/// then has no upper bound.
pub fn window_end(today: NaiveDate, within_days: i64) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(within_days.max(0).unsigned_abs()))
}
