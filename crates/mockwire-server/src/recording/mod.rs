//! Recording of proxied traffic and snapshot export as WireMock stubs.
//!
//! In record mode every forwarded request is captured as a
//! [`RecordedExchange`]. A snapshot drains the exchanges that pass a URL
//! filter and converts them into stubs, either deduplicated (latest response
//! wins) or chained into scenarios for repeated requests.
//!
//! # Module Structure
//!
//! - `types` - Recorded exchange type
//! - `store` - Exchange recorder
//! - `filter` - Snapshot URL filters
//! - `content_type` - JSON content type classification
//! - `stub_generator` - Exchange to stub conversion
//! - `snapshot` - Deduplication, scenario chaining and ordering

mod content_type;
mod filter;
mod snapshot;
mod store;
mod stub_generator;
mod types;

pub use content_type::{is_json_content_type, parse_content_type_list, DEFAULT_JSON_CONTENT_TYPE};
pub use filter::UrlFilter;
pub use snapshot::{
    convert_exchanges, dedup_key, SnapshotFilters, SnapshotOptions, SnapshotRequest,
    STARTED_STATE,
};
pub use store::ExchangeRecorder;
pub use stub_generator::{
    exchange_to_stub, generate_mapping_name, normalize_header_name, normalize_json_value,
};
pub use types::RecordedExchange;
