//! Converting recorded exchanges into a deterministic set of stubs.

use super::stub_generator::{exchange_to_stub, generate_mapping_name};
use super::types::RecordedExchange;
use crate::mapping::StubMapping;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scenario state every chain starts in.
pub const STARTED_STATE: &str = "Started";

/// Knobs that shape the generated stubs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Chain repeated identical requests into a scenario instead of deduplicating
    pub repeats_as_scenarios: bool,
    /// Extra media types whose bodies are stored as `jsonBody`
    pub json_content_types: Vec<String>,
    /// Keep upstream object key order instead of sorting keys
    pub preserve_key_order: bool,
    /// Sort array members by their canonical form
    pub sort_array_members: bool,
}

/// Body of `POST /__admin/recordings/snapshot`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    #[serde(default)]
    pub filters: SnapshotFilters,
    /// Accepted for compatibility; snapshots are never written to disk
    #[serde(default)]
    pub persist: bool,
    #[serde(default)]
    pub repeats_as_scenarios: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
}

/// Convert exchanges into stubs, sorted by name and then by [`dedup_key`].
pub fn convert_exchanges(
    exchanges: &[RecordedExchange],
    options: &SnapshotOptions,
) -> Vec<StubMapping> {
    let mut mappings = if options.repeats_as_scenarios {
        scenario_mappings(exchanges, options)
    } else {
        deduplicated_mappings(exchanges, options)
    };
    sort_mappings(&mut mappings);
    mappings
}

/// One stub per distinct request; a later duplicate replaces the earlier
/// stub in place so the latest response wins.
fn deduplicated_mappings(
    exchanges: &[RecordedExchange],
    options: &SnapshotOptions,
) -> Vec<StubMapping> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut mappings: Vec<StubMapping> = Vec::new();

    for exchange in exchanges {
        let mapping = exchange_to_stub(exchange, options);
        let key = dedup_key(&mapping);
        match positions.get(&key) {
            Some(&index) => mappings[index] = mapping,
            None => {
                positions.insert(key, mappings.len());
                mappings.push(mapping);
            }
        }
    }
    mappings
}

/// Group by method and raw URI; groups with repeats become scenario chains.
fn scenario_mappings(exchanges: &[RecordedExchange], options: &SnapshotOptions) -> Vec<StubMapping> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<&RecordedExchange>> = Vec::new();

    for exchange in exchanges {
        let key = format!("{} {}", exchange.method, exchange.raw_uri);
        match positions.get(&key) {
            Some(&index) => groups[index].push(exchange),
            None => {
                positions.insert(key, groups.len());
                groups.push(vec![exchange]);
            }
        }
    }

    let mut mappings = Vec::with_capacity(exchanges.len());
    for group in groups {
        if let [single] = group.as_slice() {
            mappings.push(exchange_to_stub(single, options));
            continue;
        }

        let scenario_name = generate_mapping_name(&group[0].raw_uri);
        let last = group.len() - 1;
        for (i, exchange) in group.into_iter().enumerate() {
            let mut mapping = exchange_to_stub(exchange, options);
            mapping.scenario_name = Some(scenario_name.clone());
            mapping.required_scenario_state = Some(if i == 0 {
                STARTED_STATE.to_string()
            } else {
                format!("state_{i}")
            });
            if i < last {
                mapping.new_scenario_state = Some(format!("state_{}", i + 1));
            }
            mappings.push(mapping);
        }
    }
    mappings
}

/// Identity of a generated stub: method, URL, query matchers and body patterns.
pub fn dedup_key(mapping: &StubMapping) -> String {
    let request = &mapping.request;
    let url = request
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or(request.url_path.as_deref())
        .unwrap_or("");

    let mut key = format!("{} {}", request.method, url);
    if !request.query_parameters.is_empty() {
        if let Ok(json) = serde_json::to_string(&request.query_parameters) {
            key.push(' ');
            key.push_str(&json);
        }
    }
    if !request.body_patterns.is_empty() {
        if let Ok(json) = serde_json::to_string(&request.body_patterns) {
            key.push(' ');
            key.push_str(&json);
        }
    }
    key
}

fn sort_mappings(mappings: &mut [StubMapping]) {
    mappings.sort_by_cached_key(|m| (m.display_name().to_string(), dedup_key(m)));
}
