//! Candidate pools stored as JSON files, one file per category

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{agent_debug, agent_warn, AgentId, Category, ComponentCandidate};

use crate::error::{ProducerError, ProducerResult};
use crate::traits::CandidateSource;
use crate::types::PoolRecord;

/// Reads `<dir>/<category>.json`, each an array of pool records
#[derive(Debug, Clone)]
pub struct JsonPoolSource {
    dir: PathBuf,
    categories: Vec<Category>,
}

impl JsonPoolSource {
    /// Scan a directory for pool files named after known categories
    pub async fn discover(dir: impl Into<PathBuf>) -> ProducerResult<Self> {
        let dir = dir.into();
        let mut categories = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(category) = stem.parse::<Category>() {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }

        categories.sort();
        Ok(Self { dir, categories })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pool_path(&self, category: Category) -> PathBuf {
        self.dir.join(format!("{}.json", category.key()))
    }

    /// Parse a pool document, skipping records that do not deserialize
    pub fn parse_pool(
        category: Category,
        contents: &str,
    ) -> ProducerResult<Vec<ComponentCandidate>> {
        let document: serde_json::Value = serde_json::from_str(contents)?;
        let serde_json::Value::Array(records) = document else {
            return Err(ProducerError::MalformedPool {
                category,
                message: "expected a JSON array of records".to_string(),
            });
        };

        let agent = AgentId::Producer(category);
        let total = records.len();
        let mut candidates = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<PoolRecord>(record) {
                Ok(record) => candidates.push(record.into_candidate(category)),
                Err(e) => {
                    agent_warn!(agent, "Skipping malformed {} record #{}: {}", category, index, e);
                }
            }
        }

        agent_debug!(agent, "Parsed {}/{} {} records", candidates.len(), total, category);
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSource for JsonPoolSource {
    async fn load(&self, category: Category) -> ProducerResult<Vec<ComponentCandidate>> {
        let path = self.pool_path(category);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProducerError::PoolNotFound {
                    category,
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse_pool(category, &contents)
    }

    fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }
}
