//! 1.13-pre4 + 6: entity, block and item renames ahead of the 1.13 release

use std::sync::Arc;

use crate::bootstrap::Types;
use crate::converters::{rename_identifiers, rename_values, table};
use crate::error::Result;
use crate::registry::TypeRegistry;

pub(crate) const VERSION: u32 = 1510;

const RENAMED_ENTITY_IDS: &[(&str, &str)] = &[
    ("minecraft:commandblock_minecart", "minecraft:command_block_minecart"),
    ("minecraft:ender_crystal", "minecraft:end_crystal"),
    ("minecraft:snowman", "minecraft:snow_golem"),
    ("minecraft:evocation_illager", "minecraft:evoker"),
    ("minecraft:evocation_fangs", "minecraft:evoker_fangs"),
    ("minecraft:illusion_illager", "minecraft:illusioner"),
    ("minecraft:vindication_illager", "minecraft:vindicator"),
    ("minecraft:villager_golem", "minecraft:iron_golem"),
    ("minecraft:xp_orb", "minecraft:experience_orb"),
    ("minecraft:xp_bottle", "minecraft:experience_bottle"),
    ("minecraft:eye_of_ender_signal", "minecraft:eye_of_ender"),
    ("minecraft:fireworks_rocket", "minecraft:firework_rocket"),
];

const RENAMED_BLOCKS: &[(&str, &str)] = &[
    ("minecraft:portal", "minecraft:nether_portal"),
    ("minecraft:oak_bark", "minecraft:oak_wood"),
    ("minecraft:spruce_bark", "minecraft:spruce_wood"),
    ("minecraft:birch_bark", "minecraft:birch_wood"),
    ("minecraft:jungle_bark", "minecraft:jungle_wood"),
    ("minecraft:acacia_bark", "minecraft:acacia_wood"),
    ("minecraft:dark_oak_bark", "minecraft:dark_oak_wood"),
    ("minecraft:stripped_oak_bark", "minecraft:stripped_oak_wood"),
    ("minecraft:stripped_spruce_bark", "minecraft:stripped_spruce_wood"),
    ("minecraft:stripped_birch_bark", "minecraft:stripped_birch_wood"),
    ("minecraft:stripped_jungle_bark", "minecraft:stripped_jungle_wood"),
    ("minecraft:stripped_acacia_bark", "minecraft:stripped_acacia_wood"),
    ("minecraft:stripped_dark_oak_bark", "minecraft:stripped_dark_oak_wood"),
    ("minecraft:mob_spawner", "minecraft:spawner"),
];

/// Renamed on top of [`RENAMED_BLOCKS`], which items follow too
const RENAMED_ITEMS: &[(&str, &str)] = &[
    ("minecraft:clownfish", "minecraft:tropical_fish"),
    ("minecraft:chorus_fruit_popped", "minecraft:popped_chorus_fruit"),
    ("minecraft:evocation_illager_spawn_egg", "minecraft:evoker_spawn_egg"),
    ("minecraft:vindication_illager_spawn_egg", "minecraft:vindicator_spawn_egg"),
];

const BRED_PREFIX: &str = "minecraft:bred_";

pub(crate) fn register(registry: &mut TypeRegistry, types: &Types) -> Result<()> {
    let t = *types;

    let blocks = table(RENAMED_BLOCKS);
    let items = table(RENAMED_ITEMS);
    registry.register_converter(t.block_name, VERSION, 0, rename_values(table(RENAMED_BLOCKS)))?;
    registry.register_converter(
        t.item_name,
        VERSION,
        0,
        rename_values(move |id: &str| items(id).or_else(|| blocks(id))),
    )?;

    let entities = entity_renamer();
    registry.register_converter(t.entity, VERSION, 0, rename_identifiers(entities.clone()))?;
    registry.register_converter(t.entity_name, VERSION, 0, rename_values(entities))?;

    for (from, to) in RENAMED_ENTITY_IDS {
        registry.copy_walkers(t.entity, VERSION, 0, from, to)?;
    }

    Ok(())
}

/// Entity renames, also accepting the `bred_` ids some snapshots wrote for baby mobs
fn entity_renamer() -> impl Fn(&str) -> Option<String> + Clone + Send + Sync + 'static {
    let renamed = Arc::new(table(RENAMED_ENTITY_IDS));
    move |id: &str| {
        let id = match id.strip_prefix(BRED_PREFIX) {
            Some(rest) => format!("minecraft:{rest}"),
            None => id.to_string(),
        };
        (*renamed)(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bred_prefix_is_stripped() {
        let rename = entity_renamer();
        assert_eq!(rename("minecraft:snowman").as_deref(), Some("minecraft:snow_golem"));
        assert_eq!(rename("minecraft:bred_snowman").as_deref(), Some("minecraft:snow_golem"));
        assert_eq!(rename("minecraft:zombie"), None);
        assert_eq!(rename("minecraft:bred_xp_orb").as_deref(), Some("minecraft:experience_orb"));
    }
}
