pub mod mappings;
pub mod recordings;
pub mod system;
