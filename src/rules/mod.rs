//! Genetic rule table.
//!
//! Rules are declarative TOML definitions that map genotypes at known
//! variants to recommendations. The default table ships inside the binary;
//! a custom table can be loaded from disk.
//!
//! # Example
//!
//! ```ignore
//! use sera::rules::default_rules;
//!
//! let table = default_rules();
//! let warfarin = table.get("VKORC1-WARFARIN-SENSITIVE");
//! ```

mod loader;
mod table;
pub mod types;

pub use loader::{default_rules, load_rules, parse_rules};
pub use table::RuleTable;
pub use types::*;
