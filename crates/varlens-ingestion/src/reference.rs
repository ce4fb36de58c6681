//! Gene and transcript reference tables.
//!
//! Both files are a single JSON object keyed by Ensembl identifier:
//!   gene_db.json       → {"ENSG00000157764": {...}, ...}
//!   transcript_db.json → {"ENST00000288602": {...}, ...}   (unversioned keys)

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use varlens_common::{Result, VarlensError};

/// One identifier-keyed JSON table, held in memory.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    records: Map<String, Value>,
}

impl ReferenceTable {
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str(json)? {
            Value::Object(records) => Ok(Self { records }),
            _ => Err(VarlensError::InvalidInput(
                "reference table must be a JSON object keyed by identifier".to_string(),
            )),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        debug!(path = %path.display(), records = table.len(), "reference table loaded");
        Ok(table)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reference records matching one transcript consequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMatch {
    pub gene: Value,
    pub transcript: Value,
}

impl Default for ReferenceMatch {
    fn default() -> Self {
        Self {
            gene: Value::Object(Map::new()),
            transcript: Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub genes: ReferenceTable,
    pub transcripts: ReferenceTable,
}

impl ReferenceData {
    pub fn load(gene_db: &Path, transcript_db: &Path) -> Result<Self> {
        let data = Self {
            genes: ReferenceTable::from_path(gene_db)?,
            transcripts: ReferenceTable::from_path(transcript_db)?,
        };
        info!(genes = data.genes.len(), transcripts = data.transcripts.len(), "reference data ready");
        Ok(data)
    }

    /// Gene by exact `gene_id`, transcript by `transcript_id` without its
    /// `.N` version. Unknown or absent identifiers give empty objects.
    pub fn lookup_for(&self, consequence: &Value) -> ReferenceMatch {
        let mut found = ReferenceMatch::default();

        if let Some(gene) = consequence["gene_id"].as_str().and_then(|id| self.genes.get(id)) {
            found.gene = gene.clone();
        }

        let transcript = consequence["transcript_id"]
            .as_str()
            .map(unversioned)
            .and_then(|id| self.transcripts.get(id));
        if let Some(transcript) = transcript {
            found.transcript = transcript.clone();
        }

        found
    }
}

fn unversioned(transcript_id: &str) -> &str {
    transcript_id.split('.').next().unwrap_or(transcript_id)
}
