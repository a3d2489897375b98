//! WireMock stub mappings: wire types, the shared repository and file loading.

mod loader;
mod repository;
mod types;

pub use loader::{load_mappings_dir, load_mappings_file};
pub use repository::StubRepository;
pub use types::{
    BodyPattern, EqualToMatcher, HeaderMatcher, HeaderValue, MappingError, MappingsDocument,
    QueryParamMatcher, RequestPattern, ResponseDefinition, StubMapping, UrlMatch, ANY_METHOD,
};
