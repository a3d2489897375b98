//! WireMock-style stub matching.
//!
//! Every stub is evaluated against the request on five criteria (method,
//! URL, query parameters, body patterns, headers). The most specific full
//! match wins; when nothing matches, the closest stub is reported with
//! structured diffs that [`render_mismatch`] turns into a log table.
//!
//! # Module Structure
//!
//! - `request` - Request view and query string decoding
//! - `criteria` - Per-criterion evaluation of a single stub
//! - `engine` - Best-match and near-miss selection
//! - `result` - Match results and diff records
//! - `report` - Mismatch report rendering

mod criteria;
mod engine;
mod report;
mod request;
mod result;

pub use criteria::{evaluate_stub, json_equal};
pub use engine::{find_best_match, specificity};
pub use report::{render_mismatch, render_mismatch_at};
pub use request::{decode_query_component, parse_query_pairs, split_uri, IncomingRequest};
pub use result::{DiffCriterion, DiffKind, Evaluation, MatchDiff, MatchResult};
