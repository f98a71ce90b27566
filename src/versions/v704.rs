//! 1.10.2 + 192: block entity ids become namespaced

use crate::bootstrap::Types;
use crate::converters::{rename_identifiers, table};
use crate::error::Result;
use crate::hooks::enforce_namespaced_id;
use crate::registry::TypeRegistry;
use crate::version::VersionKey;
use crate::walkers::{convert_fields, convert_lists, convert_whole};

use super::items::item_stack_walker;

pub(crate) const VERSION: u32 = 704;

const TILE_ID_UPDATE: &[(&str, &str)] = &[
    ("Airportal", "minecraft:end_portal"),
    ("Banner", "minecraft:banner"),
    ("Beacon", "minecraft:beacon"),
    ("Cauldron", "minecraft:brewing_stand"),
    ("Chest", "minecraft:chest"),
    ("Comparator", "minecraft:comparator"),
    ("Control", "minecraft:command_block"),
    ("DLDetector", "minecraft:daylight_detector"),
    ("Dropper", "minecraft:dropper"),
    ("EnchantTable", "minecraft:enchanting_table"),
    ("EndGateway", "minecraft:end_gateway"),
    ("EnderChest", "minecraft:ender_chest"),
    ("FlowerPot", "minecraft:flower_pot"),
    ("Furnace", "minecraft:furnace"),
    ("Hopper", "minecraft:hopper"),
    ("MobSpawner", "minecraft:mob_spawner"),
    ("Music", "minecraft:noteblock"),
    ("Piston", "minecraft:piston"),
    ("RecordPlayer", "minecraft:jukebox"),
    ("Sign", "minecraft:sign"),
    ("Skull", "minecraft:skull"),
    ("Structure", "minecraft:structure_block"),
    ("Trap", "minecraft:dispenser"),
];

const ITEM_TO_TILE_ENTITY: &[(&str, &str)] = &[
    ("minecraft:furnace", "minecraft:furnace"),
    ("minecraft:lit_furnace", "minecraft:furnace"),
    ("minecraft:chest", "minecraft:chest"),
    ("minecraft:trapped_chest", "minecraft:chest"),
    ("minecraft:ender_chest", "minecraft:ender_chest"),
    ("minecraft:jukebox", "minecraft:jukebox"),
    ("minecraft:dispenser", "minecraft:dispenser"),
    ("minecraft:dropper", "minecraft:dropper"),
    ("minecraft:sign", "minecraft:sign"),
    ("minecraft:mob_spawner", "minecraft:mob_spawner"),
    ("minecraft:spawner", "minecraft:mob_spawner"),
    ("minecraft:noteblock", "minecraft:noteblock"),
    ("minecraft:brewing_stand", "minecraft:brewing_stand"),
    ("minecraft:enchanting_table", "minecraft:enchanting_table"),
    ("minecraft:command_block", "minecraft:command_block"),
    ("minecraft:beacon", "minecraft:beacon"),
    ("minecraft:skull", "minecraft:skull"),
    ("minecraft:daylight_detector", "minecraft:daylight_detector"),
    ("minecraft:hopper", "minecraft:hopper"),
    ("minecraft:banner", "minecraft:banner"),
    ("minecraft:flower_pot", "minecraft:flower_pot"),
    ("minecraft:comparator", "minecraft:comparator"),
    ("minecraft:shield", "minecraft:banner"),
];

const INVENTORIES: &[&str] = &[
    "minecraft:furnace",
    "minecraft:chest",
    "minecraft:dispenser",
    "minecraft:dropper",
    "minecraft:brewing_stand",
    "minecraft:hopper",
];

/// Entity ids were namespaced one version later, at 705
fn entity_for_item(item_id: &str, from: VersionKey) -> Option<String> {
    let legacy = from.major() < 705;
    match item_id {
        "minecraft:armor_stand" if legacy => Some("ArmorStand".to_string()),
        "minecraft:armor_stand" => Some("minecraft:armor_stand".to_string()),
        "minecraft:item_frame" if legacy => Some("ItemFrame".to_string()),
        "minecraft:item_frame" => Some("minecraft:item_frame".to_string()),
        // flattened spawn eggs carry their entity in the item id
        _ => item_id.find("_spawn_egg").map(|end| item_id[..end].to_string()),
    }
}

fn tile_entity_for_item(item_id: &str, _from: VersionKey) -> Option<String> {
    ITEM_TO_TILE_ENTITY
        .iter()
        .find(|(item, _)| *item == item_id)
        .map(|(_, tile)| tile.to_string())
}

pub(crate) fn register(registry: &mut TypeRegistry, types: &Types) -> Result<()> {
    let t = *types;

    let rename = table(TILE_ID_UPDATE);
    registry.register_converter(t.tile_entity, VERSION, 0, rename_identifiers(rename))?;

    for id in INVENTORIES {
        registry.register_identifier_walker(t.tile_entity, id, VERSION, 0, convert_lists(t.item_stack, &["Items"]))?;
    }
    registry.register_identifier_walker(t.tile_entity, "minecraft:jukebox", VERSION, 0, convert_fields(t.item_stack, &["RecordItem"]))?;
    registry.register_identifier_walker(t.tile_entity, "minecraft:mob_spawner", VERSION, 0, convert_whole(t.untagged_spawner))?;
    registry.register_identifier_walker(t.tile_entity, "minecraft:flower_pot", VERSION, 0, convert_fields(t.item_name, &["Item"]))?;

    registry.register_walker(
        t.item_stack,
        VERSION,
        0,
        item_stack_walker(t, entity_for_item, tile_entity_for_item),
    )?;

    registry.register_hook(t.tile_entity, VERSION, 0, enforce_namespaced_id())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_for_item() {
        let legacy = VersionKey::of(510);
        let namespaced = VersionKey::of(1000);
        assert_eq!(entity_for_item("minecraft:armor_stand", legacy).as_deref(), Some("ArmorStand"));
        assert_eq!(
            entity_for_item("minecraft:armor_stand", namespaced).as_deref(),
            Some("minecraft:armor_stand")
        );
        assert_eq!(
            entity_for_item("minecraft:zombie_spawn_egg", namespaced).as_deref(),
            Some("minecraft:zombie")
        );
        assert_eq!(entity_for_item("minecraft:stick", namespaced), None);
    }
}
