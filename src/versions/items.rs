//! Item stack walking shared by the legacy and namespaced layouts
//!
//! An item stack carries its nested records inside `tag`: contained items, an entity
//! (spawn eggs, armor stands) and a block entity (chests, signs). Embedded entities often
//! omit their id, so one is inferred from the item for dispatch and removed again afterwards.

use tracing::warn;

use crate::bootstrap::Types;
use crate::error::Result;
use crate::migration::{splice, Migration};
use crate::record::{Compound, Record, IDENTIFIER_KEY};
use crate::registry::TypeHandle;
use crate::rules::{rule, RuleFn};
use crate::version::VersionKey;

/// Picks the id an embedded record should be dispatched with
pub(crate) type InferId = fn(item_id: &str, from: VersionKey) -> Option<String>;

/// Walker for an item stack: its id, then everything nested under `tag`
pub(crate) fn item_stack_walker(types: Types, entity_id: InferId, tile_entity_id: InferId) -> RuleFn {
    rule(move |record: &Record, m: &Migration<'_>| {
        let item = m.expect_compound(record)?;
        let mut changes = Vec::new();

        let converted_id = m.convert_field(types.item_name, item, IDENTIFIER_KEY)?;
        let item_id = converted_id
            .as_ref()
            .and_then(Record::as_str)
            .or_else(|| item.identifier())
            .map(str::to_string);
        if let Some(id) = converted_id {
            changes.push((IDENTIFIER_KEY.to_string(), id));
        }

        if let Some(tag) = item.get_compound("tag") {
            if let Some(tag) = walk_tag(&types, item_id.as_deref(), tag, m, entity_id, tile_entity_id)? {
                changes.push(("tag".to_string(), tag));
            }
        }

        Ok(splice(item, changes))
    })
}

fn walk_tag(
    types: &Types,
    item_id: Option<&str>,
    tag: &Compound,
    m: &Migration<'_>,
    entity_id: InferId,
    tile_entity_id: InferId,
) -> Result<Option<Record>> {
    let mut changes = Vec::new();

    if let Some(items) = m.convert_list(types.item_stack, tag, "Items")? {
        changes.push(("Items".to_string(), items));
    }

    let embedded = [
        ("EntityTag", types.entity, entity_id),
        ("BlockEntityTag", types.tile_entity, tile_entity_id),
    ];
    for (field, target, infer) in embedded {
        let Some(nested) = tag.get(field).filter(|nested| nested.as_compound().is_some()) else {
            continue;
        };
        let inferred = item_id.and_then(|id| infer(id, m.from()));
        if inferred.is_none() && nested.identifier().is_none() && item_id != Some("minecraft:air") {
            warn!(item = ?item_id, field, "unable to resolve nested record type for item stack");
        }
        if let Some(converted) = convert_embedded(m, target, nested, inferred)? {
            changes.push((field.to_string(), converted));
        }
    }

    for field in ["CanDestroy", "CanPlaceOn"] {
        if let Some(names) = m.convert_list(types.block_name, tag, field)? {
            changes.push((field.to_string(), names));
        }
    }

    Ok(splice(tag, changes))
}

/// Convert an embedded record, dispatching with `inferred` when it has no id of its own
fn convert_embedded(
    m: &Migration<'_>,
    target: TypeHandle,
    nested: &Record,
    inferred: Option<String>,
) -> Result<Option<Record>> {
    let compound = match nested.as_compound() {
        Some(compound) if !compound.contains_key(IDENTIFIER_KEY) => compound,
        _ => return m.convert(target, nested),
    };
    let Some(id) = inferred else {
        return m.convert(target, nested);
    };

    let mut dispatched = compound.clone();
    dispatched.insert(IDENTIFIER_KEY, id);
    Ok(m.convert(target, &Record::Compound(dispatched))?.map(|converted| match converted {
        Record::Compound(mut compound) => {
            compound.remove(IDENTIFIER_KEY);
            Record::Compound(compound)
        }
        other => other,
    }))
}
