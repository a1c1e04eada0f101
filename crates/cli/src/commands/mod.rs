//! Command handlers for the Civic Assistant CLI.

pub mod ask;
pub mod cite;
pub mod search;
pub mod tenants;

pub use ask::AskCommand;
pub use cite::CiteCommand;
pub use search::SearchCommand;
pub use tenants::TenantsCommand;

use chrono::{DateTime, Utc};

/// Evaluation time for the access window: `--at` if given, otherwise now.
pub(crate) fn request_time(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now)
}
