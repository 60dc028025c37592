// Adapters layer: concrete relationship stores behind the domain port.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
