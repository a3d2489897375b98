//! Recording and snapshot configuration.

use crate::recording::SnapshotOptions;
use serde::{Deserialize, Serialize};

/// How recorded exchanges are turned into stubs
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    /// Media types besides application/json whose bodies become `jsonBody`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub json_content_types: Vec<String>,

    /// Keep upstream JSON key order (default: keys sorted alphabetically)
    #[serde(default)]
    pub preserve_key_order: bool,

    /// Sort JSON array members for diff-stable snapshots
    #[serde(default)]
    pub sort_array_members: bool,
}

impl RecordingConfig {
    /// Snapshot options for one snapshot request.
    pub fn snapshot_options(&self, repeats_as_scenarios: bool) -> SnapshotOptions {
        SnapshotOptions {
            repeats_as_scenarios,
            json_content_types: self.json_content_types.clone(),
            preserve_key_order: self.preserve_key_order,
            sort_array_members: self.sort_array_members,
        }
    }
}
