pub mod anniversary;
pub mod builder;
pub mod consanguinity;
pub mod engine;
pub mod layout;
pub mod root;
pub mod siblings;

pub use crate::domain::model::{FamilyGraph, FamilyTree, Identity, LayoutConfig, TreeLayout};
pub use crate::domain::ports::RelationshipStore;
pub use crate::utils::error::Result;
