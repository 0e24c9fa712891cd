use std::collections::BTreeMap;

use tracing::debug;

use crate::model::entity::{Entity, EntityKind, PartitionKey};

#[derive(Debug, Clone)]
pub struct EntityPartition<'a> {
    pub key: PartitionKey,
    /// Members in directory order.
    pub members: Vec<&'a Entity>,
}

/// Groups entities by their categorical key. Partitions come out in key
/// order; a key without members never appears.
pub fn run_stage2(entities: &[Entity], kind: EntityKind) -> Vec<EntityPartition<'_>> {
    let mut map: BTreeMap<PartitionKey, Vec<&Entity>> = BTreeMap::new();
    for entity in entities {
        map.entry(PartitionKey::for_entity(entity, kind))
            .or_default()
            .push(entity);
    }

    let partitions: Vec<EntityPartition<'_>> = map
        .into_iter()
        .map(|(key, members)| EntityPartition { key, members })
        .collect();

    for p in &partitions {
        debug!(partition = %p.key, members = p.members.len(), "partition built");
    }

    partitions
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_partition.rs"]
mod tests;
