use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Individual,
    Group,
}

/// A participant or group as listed in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Age category for individuals, competition category for groups.
    pub category: String,
    /// Size class; only meaningful for groups.
    pub size: Option<String>,
}

/// Entities sharing a key are ranked against each other and nobody else.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PartitionKey {
    pub size: Option<String>,
    pub category: String,
}

impl PartitionKey {
    pub fn for_entity(entity: &Entity, kind: EntityKind) -> Self {
        let size = match kind {
            EntityKind::Individual => None,
            EntityKind::Group => entity.size.clone(),
        };
        Self {
            size,
            category: entity.category.clone(),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size {
            Some(size) => write!(f, "{} / {}", size, self.category),
            None => f.write_str(&self.category),
        }
    }
}
