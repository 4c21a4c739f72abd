// Entity Models
//
// Client → Portfolio → Policy → Claim form an owned tree.
// PolicyType lives beside the tree in its own dual-keyed registry and is
// referenced from policies by id only.

pub mod client;
pub mod policy;
pub mod policy_type;

pub use client::{Client, Portfolio};
pub use policy::{Claim, Policy};
pub use policy_type::{DualKeyMatch, PartialMatch, PolicyType, PolicyTypeRegistry, Removal};
