use crate::adapters::memory::InMemoryStore;
use crate::domain::model::{Identity, RelationshipEdge};
use crate::domain::ports::RelationshipStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Relationship records loaded once from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    snapshot: InMemoryStore,
}

impl JsonFileStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path).await?;
        let snapshot = Self::parse(&content)?;
        tracing::debug!("Loaded {} relationship records from {}", snapshot.len(), path.display());
        Ok(Self { path, snapshot })
    }

    pub fn parse(content: &str) -> Result<InMemoryStore> {
        let edges: Vec<RelationshipEdge> = serde_json::from_str(content)?;
        Ok(InMemoryStore::new(edges))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RelationshipStore for JsonFileStore {
    async fn find_accepted_adoption_by_child(
        &self,
        child: &Identity,
    ) -> Result<Option<RelationshipEdge>> {
        self.snapshot.find_accepted_adoption_by_child(child).await
    }

    async fn find_accepted_edges_by_identity(&self, id: &Identity) -> Result<Vec<RelationshipEdge>> {
        self.snapshot.find_accepted_edges_by_identity(id).await
    }

    async fn find_accepted_marriages(&self) -> Result<Vec<RelationshipEdge>> {
        self.snapshot.find_accepted_marriages().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RelationshipKind, RelationshipStatus};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_records() {
        let store = JsonFileStore::parse(
            r#"[
                {"a": "p", "b": "c", "kind": "adoption", "status": "accepted", "created_at": "2024-01-01T00:00:00Z"},
                {"a": "p", "b": "s", "kind": "marriage", "status": "divorced"}
            ]"#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.edges()[0].kind, RelationshipKind::Adoption);
        assert_eq!(store.edges()[1].status, RelationshipStatus::Divorced);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let result = JsonFileStore::parse(r#"[{"a": "p", "b": "c", "kind": "hug", "status": "accepted"}]"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_open_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"a": "ann", "b": "bob", "kind": "marriage", "status": "accepted"}]"#)
            .unwrap();

        let store = JsonFileStore::open(file.path()).await.unwrap();
        assert_eq!(store.path(), file.path());
        assert_eq!(store.find_accepted_marriages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_io_error() {
        let err = JsonFileStore::open("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::FamilyTreeError::IoError(_)));
    }
}
