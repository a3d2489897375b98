//! JSON canonicalization shared by body matching and snapshot export.
//!
//! - `canonical_string` - compact serialization with sorted keys, used for
//!   byte-equality comparison and as the array sort key
//! - `normalize_arrays` - bottom-up array sorting for diff-stable recordings
//! - `sort_object_keys` - alphabetize object keys when upstream order is not kept

mod normalize;

pub use normalize::{canonical_string, normalize_arrays, sort_object_keys};
