use std::collections::HashSet;

use tracing::warn;

use crate::input::tsv::TsvTable;
use crate::input::{InputAudit, InputError};
use crate::model::entity::{Entity, EntityKind};

pub const UNCATEGORIZED: &str = "uncategorized";

/// Builds the entity directory, keeping file order.
pub fn parse_entities(
    table: &TsvTable,
    kind: EntityKind,
    source: &str,
    audit: &mut InputAudit,
) -> Result<Vec<Entity>, InputError> {
    let id_col = table.require_column(&["id", "entity_id"], source)?;
    let name_col = table.column(&["name", "display_name", "displayname"]);
    let category_col = table.require_column(&["category", "age_category"], source)?;
    let size_col = table.column(&["size", "size_class"]);

    let mut seen: HashSet<String> = HashSet::new();
    let mut entities = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        audit.entities_read += 1;
        let id = row.get(id_col);
        if id.is_empty() {
            warn!(line = row.line_no, "entity row has empty id; skipping");
            audit.entities_skipped += 1;
            continue;
        }
        if !seen.insert(id.to_string()) {
            warn!(
                line = row.line_no,
                entity_id = id,
                "duplicate entity id in directory; keeping first"
            );
            audit.duplicate_entities += 1;
            continue;
        }

        let name = match name_col.map(|c| row.get(c)) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => id.to_string(),
        };

        let category = match row.get(category_col) {
            "" => {
                warn!(
                    line = row.line_no,
                    entity_id = id,
                    "entity has no category; ranking it as `{UNCATEGORIZED}`"
                );
                audit.uncategorized_entities += 1;
                UNCATEGORIZED.to_string()
            }
            c => c.to_string(),
        };

        let size = size_col
            .map(|c| row.get(c))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        if kind == EntityKind::Group && size.is_none() {
            warn!(
                line = row.line_no,
                entity_id = id,
                "group has no size class; partitioning by category only"
            );
        }

        entities.push(Entity {
            id: id.to_string(),
            name,
            category,
            size,
        });
    }

    Ok(entities)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/entities.rs"]
mod tests;
