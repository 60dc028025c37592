pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryStore, JsonFileStore};
pub use config::{toml_config::TomlConfig, Settings};
pub use core::engine::FamilyTreeEngine;
pub use domain::model::{
    ConsanguinityFlag, FamilyGraph, FamilyNode, FamilyTree, Identity, LayoutConfig,
    RelationshipEdge, RelationshipKind, RelationshipStatus, TreeLayout,
};
pub use domain::ports::RelationshipStore;
pub use utils::error::{FamilyTreeError, Result};
