//! 17w47a: the flattening
//!
//! So much changed in this snapshot that it is split into eight ordered steps. Steps that only
//! move block data into the new state format depend on the block tables and are not carried
//! here; the structural changes are.

use crate::bootstrap::Types;
use crate::error::Result;
use crate::migration::{splice, Migration};
use crate::record::{Compound, Record};
use crate::registry::TypeRegistry;
use crate::rules::{rule, Hook};
use crate::walkers::{all, convert_fields, convert_lists, convert_whole, each, within};

pub(crate) const VERSION: u32 = 1451;

const DISPLAY_STATE_MINECARTS: &[&str] = &[
    "minecraft:chest_minecart",
    "minecraft:commandblock_minecart",
    "minecraft:furnace_minecart",
    "minecraft:hopper_minecart",
    "minecraft:minecart",
    "minecraft:spawner_minecart",
    "minecraft:tnt_minecart",
];

const ITEM_STATS: &[&str] = &[
    "minecraft:crafted",
    "minecraft:used",
    "minecraft:broken",
    "minecraft:picked_up",
    "minecraft:dropped",
];

/// Dye colors were stored inverted before the flattening
fn invert_color(value: &Record) -> Option<Record> {
    value.as_i64().map(|color| Record::Int(15 - color as i32))
}

fn fix_banner(banner: &Compound) -> Option<Compound> {
    let mut fixed = banner.clone();
    let mut changed = false;

    if let Some(base) = banner.get("Base").and_then(invert_color) {
        fixed.insert("Base", base);
        changed = true;
    }
    if let Some(patterns) = fixed.get_list_mut("Patterns") {
        for pattern in patterns.iter_mut().filter_map(Record::as_compound_mut) {
            if let Some(color) = pattern.get("Color").and_then(invert_color) {
                pattern.insert("Color", color);
                changed = true;
            }
        }
    }
    changed.then_some(fixed)
}

fn fix_villager_pumpkins(villager: &Compound) -> Option<Compound> {
    let mut fixed = villager.clone();
    let mut changed = false;
    let recipes = fixed
        .get_compound_mut("Offers")
        .and_then(|offers| offers.get_list_mut("Recipes"));
    for recipe in recipes.into_iter().flatten().filter_map(Record::as_compound_mut) {
        for slot in ["buy", "buyB", "sell"] {
            if let Some(item) = recipe.get_compound_mut(slot) {
                if item.get_str("id") == Some("minecraft:carved_pumpkin") {
                    item.insert("id", "minecraft:pumpkin");
                    changed = true;
                }
            }
        }
    }
    changed.then_some(fixed)
}

/// Split `CriteriaName` ("minecraft.mined:minecraft.stone") into a structured `CriteriaType`
fn unpack_criteria(objective: &Compound) -> Option<Compound> {
    let name = objective.get_str("CriteriaName")?;
    let (kind, id) = match name.split_once(':') {
        Some((kind, id)) => match (unpack_key(kind), unpack_key(id)) {
            (Some(kind), Some(id)) => (kind, id),
            _ => ("_special".to_string(), name.to_string()),
        },
        None => ("_special".to_string(), name.to_string()),
    };

    let mut criteria = Compound::new();
    criteria.insert("type", kind);
    criteria.insert("id", id);
    let mut unpacked = objective.clone();
    unpacked.insert("CriteriaType", criteria);
    Some(unpacked)
}

/// `"minecraft.mined"` → `"minecraft:mined"`
fn unpack_key(packed: &str) -> Option<String> {
    let key = match packed.split_once('.') {
        Some((namespace, path)) => format!("{namespace}:{path}"),
        None => format!("minecraft:{packed}"),
    };
    let valid = key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-.:/".contains(c));
    valid.then_some(key)
}

fn pack_key(key: &str) -> String {
    match key.split_once(':') {
        Some((namespace, path)) => format!("{namespace}.{path}"),
        None => format!("minecraft.{key}"),
    }
}

fn repack_criteria(objective: &Compound) -> Option<Compound> {
    let criteria = objective.get_compound("CriteriaType")?;
    let kind = criteria.get_str("type")?;
    let id = criteria.get_str("id")?;
    let name = if kind == "_special" {
        id.to_string()
    } else {
        format!("{}:{}", pack_key(kind), pack_key(id))
    };

    let mut repacked = objective.clone();
    repacked.remove("CriteriaType");
    repacked.insert("CriteriaName", name);
    Some(repacked)
}

fn on_compound(record: &Record, m: &Migration<'_>, fix: fn(&Compound) -> Option<Compound>) -> Result<Option<Record>> {
    Ok(fix(m.expect_compound(record)?).map(Record::Compound))
}

pub(crate) fn register(registry: &mut TypeRegistry, types: &Types) -> Result<()> {
    let t = *types;

    // step 0
    registry.register_identifier_walker(t.tile_entity, "minecraft:trapped_chest", VERSION, 0, convert_lists(t.item_stack, &["Items"]))?;

    // step 1
    registry.register_walker(
        t.chunk,
        VERSION,
        1,
        within(
            "Level",
            all(vec![
                convert_lists(t.entity, &["Entities"]),
                convert_lists(t.tile_entity, &["TileEntities"]),
                each("TileTicks", convert_fields(t.block_name, &["i"])),
                each("Sections", convert_lists(t.block_state, &["Palette"])),
            ]),
        ),
    )?;

    // step 2
    registry.register_identifier_walker(t.tile_entity, "minecraft:piston", VERSION, 2, convert_fields(t.block_state, &["blockState"]))?;

    // step 3
    registry.register_identifier_converter(
        t.item_stack,
        "minecraft:filled_map",
        VERSION,
        3,
        rule(|record, m| {
            let item = m.expect_compound(record)?;
            let tag = item.get_compound("tag").cloned().unwrap_or_default();
            if tag.get("map").map_or(false, |map| map.kind().is_number()) {
                return Ok(None);
            }
            let mut tag = tag;
            tag.insert("map", item.get_i64("Damage").unwrap_or(0) as i32);
            let mut item = item.clone();
            item.insert("tag", tag);
            Ok(Some(Record::Compound(item)))
        }),
    )?;
    registry.register_identifier_walker(t.entity, "minecraft:potion", VERSION, 3, convert_fields(t.item_stack, &["Potion"]))?;
    for id in ["minecraft:arrow", "minecraft:spectral_arrow"] {
        registry.register_identifier_walker(t.entity, id, VERSION, 3, convert_fields(t.block_state, &["inBlockState"]))?;
    }
    registry.register_identifier_walker(t.entity, "minecraft:enderman", VERSION, 3, convert_lists(t.item_stack, &["ArmorItems", "HandItems"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:enderman", VERSION, 3, convert_fields(t.block_state, &["carriedBlockState"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:falling_block", VERSION, 3, convert_fields(t.block_state, &["BlockState"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:falling_block", VERSION, 3, convert_fields(t.tile_entity, &["TileEntityData"]))?;
    for id in DISPLAY_STATE_MINECARTS {
        registry.register_identifier_walker(t.entity, id, VERSION, 3, convert_fields(t.block_state, &["DisplayState"]))?;
    }
    for id in ["minecraft:chest_minecart", "minecraft:hopper_minecart"] {
        registry.register_identifier_walker(t.entity, id, VERSION, 3, convert_lists(t.item_stack, &["Items"]))?;
    }
    registry.register_identifier_walker(t.entity, "minecraft:spawner_minecart", VERSION, 3, convert_whole(t.untagged_spawner))?;

    // step 5
    registry.register_identifier_converter(
        t.tile_entity,
        "minecraft:banner",
        VERSION,
        5,
        rule(|record, m| on_compound(record, m, fix_banner)),
    )?;

    // step 6
    registry.register_hook(
        t.objective,
        VERSION,
        6,
        Hook::new()
            .with_pre(|record, m| on_compound(record, m, unpack_criteria))
            .with_post(|record, m| on_compound(record, m, repack_criteria)),
    )?;
    registry.register_walker(
        t.objective,
        VERSION,
        6,
        rule(move |record, m| {
            let objective = m.expect_compound(record)?;
            let Some(criteria) = objective.get_compound("CriteriaType") else {
                return Ok(None);
            };
            let target = match criteria.get_str("type") {
                Some("minecraft:mined") => t.block_name,
                Some(kind) if ITEM_STATS.contains(&kind) => t.item_name,
                Some("minecraft:killed" | "minecraft:killed_by") => t.entity_name,
                _ => return Ok(None),
            };
            let Some(id) = m.convert_field(target, criteria, "id")? else {
                return Ok(None);
            };
            let Some(criteria) = splice(criteria, vec![("id".to_string(), id)]) else {
                return Ok(None);
            };
            Ok(splice(objective, vec![("CriteriaType".to_string(), criteria)]))
        }),
    )?;

    // step 7
    registry.register_identifier_converter(
        t.entity,
        "minecraft:villager",
        VERSION,
        7,
        rule(|record, m| on_compound(record, m, fix_villager_pumpkins)),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_round_trip() {
        let mut objective = Compound::new();
        objective.insert("CriteriaName", "minecraft.mined:minecraft.stone");

        let unpacked = unpack_criteria(&objective).unwrap();
        let criteria = unpacked.get_compound("CriteriaType").unwrap();
        assert_eq!(criteria.get_str("type"), Some("minecraft:mined"));
        assert_eq!(criteria.get_str("id"), Some("minecraft:stone"));

        let repacked = repack_criteria(&unpacked).unwrap();
        assert_eq!(repacked.get_str("CriteriaName"), Some("minecraft.mined:minecraft.stone"));
        assert!(!repacked.contains_key("CriteriaType"));
    }

    #[test]
    fn test_special_criteria() {
        let mut objective = Compound::new();
        objective.insert("CriteriaName", "deathCount");
        let unpacked = unpack_criteria(&objective).unwrap();
        let criteria = unpacked.get_compound("CriteriaType").unwrap();
        assert_eq!(criteria.get_str("type"), Some("_special"));
        assert_eq!(criteria.get_str("id"), Some("deathCount"));
        assert_eq!(
            repack_criteria(&unpacked).unwrap().get_str("CriteriaName"),
            Some("deathCount")
        );
    }

    #[test]
    fn test_banner_colors_invert() {
        let mut pattern = Compound::new();
        pattern.insert("Color", 1i32);
        let mut banner = Compound::new();
        banner.insert("Base", 0i32);
        banner.insert("Patterns", vec![Record::Compound(pattern)]);

        let fixed = fix_banner(&banner).unwrap();
        assert_eq!(fixed.get_i64("Base"), Some(15));
        let patterns = fixed.get_list("Patterns").unwrap();
        assert_eq!(patterns[0].as_compound().unwrap().get_i64("Color"), Some(14));

        assert!(fix_banner(&Compound::new()).is_none());
    }
}
