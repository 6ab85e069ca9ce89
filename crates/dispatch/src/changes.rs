//! Changed-path extraction from push payloads.

use crate::{ChangeSet, PushPayload};

/// Collects every path added, modified, or removed by any commit of the push.
///
/// Total and pure: commits without lists contribute nothing, and the result is
/// deduplicated and sorted regardless of commit order.
pub fn extract(payload: &PushPayload) -> ChangeSet {
    payload
        .commits
        .iter()
        .flat_map(|commit| commit.paths())
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
#[path = "changes_tests.rs"]
mod tests;
