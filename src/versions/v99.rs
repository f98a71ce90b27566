//! Layout of all data written before versioning (pre 15w32a)
//!
//! No converters here: this version only teaches the walkers where nested records live in
//! the legacy layout, and installs the namespacing hooks for item and block names.

use crate::bootstrap::Types;
use crate::error::Result;
use crate::hooks::{enforce_namespaced_id, enforce_namespaced_value};
use crate::registry::TypeRegistry;
use crate::version::VersionKey;
use crate::walkers::{all, convert_fields, convert_lists, convert_whole, each, within};

use super::items::item_stack_walker;

pub(crate) const VERSION: u32 = 99;

const MOBS: &[&str] = &[
    "ArmorStand", "Creeper", "Skeleton", "Spider", "Giant", "Zombie", "Slime", "Ghast",
    "PigZombie", "CaveSpider", "Silverfish", "Blaze", "LavaSlime", "EnderDragon", "WitherBoss",
    "Bat", "Witch", "Endermite", "Guardian", "Pig", "Sheep", "Cow", "Chicken", "Squid", "Wolf",
    "MushroomCow", "SnowMan", "Ozelot", "VillagerGolem", "Rabbit", "Shulker",
];

const PROJECTILES: &[&str] = &[
    "ThrownEgg", "Arrow", "TippedArrow", "SpectralArrow", "Snowball", "Fireball", "SmallFireball",
    "ThrownEnderpearl", "ThrownPotion", "ThrownExpBottle", "WitherSkull",
];

const MINECARTS: &[&str] = &[
    "Minecart", "MinecartChest", "MinecartFurnace", "MinecartTNT", "MinecartSpawner",
    "MinecartHopper", "MinecartCommandBlock",
];

const INVENTORIES: &[&str] = &["Furnace", "Chest", "Trap", "Dropper", "Cauldron", "Hopper"];

const ITEM_TO_TILE_ENTITY: &[(&str, &str)] = &[
    ("minecraft:furnace", "Furnace"),
    ("minecraft:lit_furnace", "Furnace"),
    ("minecraft:chest", "Chest"),
    ("minecraft:trapped_chest", "Chest"),
    ("minecraft:ender_chest", "EnderChest"),
    ("minecraft:jukebox", "RecordPlayer"),
    ("minecraft:dispenser", "Trap"),
    ("minecraft:dropper", "Dropper"),
    ("minecraft:sign", "Sign"),
    ("minecraft:mob_spawner", "MobSpawner"),
    ("minecraft:noteblock", "Music"),
    ("minecraft:brewing_stand", "Cauldron"),
    ("minecraft:command_block", "CommandBlock"),
    ("minecraft:beacon", "Beacon"),
    ("minecraft:skull", "Skull"),
    ("minecraft:daylight_detector", "DLDetector"),
    ("minecraft:hopper", "Hopper"),
    ("minecraft:banner", "Banner"),
    ("minecraft:flower_pot", "FlowerPot"),
    ("minecraft:structure_block", "Structure"),
    ("minecraft:end_gateway", "EndGateway"),
    ("minecraft:shield", "Banner"),
];

fn entity_for_item(item_id: &str, _from: VersionKey) -> Option<String> {
    match item_id {
        "minecraft:armor_stand" => Some("ArmorStand".to_string()),
        "minecraft:item_frame" => Some("ItemFrame".to_string()),
        _ => None,
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

    // entities
    registry.register_walker(t.entity, VERSION, 0, convert_fields(t.entity, &["Riding"]))?;
    for id in MOBS {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_lists(t.item_stack, &["Equipment"]))?;
    }
    for id in PROJECTILES {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_fields(t.block_name, &["inTile"]))?;
    }
    for id in MINECARTS {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_fields(t.block_name, &["DisplayTile"]))?;
    }
    for id in ["Minecart", "MinecartChest", "MinecartHopper"] {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_lists(t.item_stack, &["Items"]))?;
    }
    for id in ["Minecart", "MinecartSpawner"] {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_whole(t.untagged_spawner))?;
    }
    registry.register_identifier_walker(t.entity, "Item", VERSION, 0, convert_fields(t.item_stack, &["Item"]))?;
    registry.register_identifier_walker(t.entity, "ItemFrame", VERSION, 0, convert_fields(t.item_stack, &["Item"]))?;
    registry.register_identifier_walker(t.entity, "ThrownPotion", VERSION, 0, convert_fields(t.item_stack, &["Potion"]))?;
    registry.register_identifier_walker(t.entity, "FallingSand", VERSION, 0, convert_fields(t.block_name, &["Block"]))?;
    registry.register_identifier_walker(t.entity, "FallingSand", VERSION, 0, convert_fields(t.tile_entity, &["TileEntityData"]))?;
    registry.register_identifier_walker(
        t.entity,
        "FireworksRocketEntity",
        VERSION,
        0,
        convert_fields(t.item_stack, &["FireworksItem"]),
    )?;
    registry.register_identifier_walker(t.entity, "Enderman", VERSION, 0, convert_fields(t.block_name, &["carried"]))?;
    registry.register_identifier_walker(t.entity, "Enderman", VERSION, 0, convert_lists(t.item_stack, &["Equipment"]))?;
    registry.register_identifier_walker(t.entity, "EntityHorse", VERSION, 0, convert_lists(t.item_stack, &["Items", "Equipment"]))?;
    registry.register_identifier_walker(t.entity, "EntityHorse", VERSION, 0, convert_fields(t.item_stack, &["ArmorItem", "SaddleItem"]))?;
    registry.register_identifier_walker(
        t.entity,
        "Villager",
        VERSION,
        0,
        all(vec![
            convert_lists(t.item_stack, &["Inventory", "Equipment"]),
            within("Offers", each("Recipes", convert_fields(t.item_stack, &["buy", "buyB", "sell"]))),
        ]),
    )?;

    // tile entities
    for id in INVENTORIES {
        registry.register_identifier_walker(t.tile_entity, id, VERSION, 0, convert_lists(t.item_stack, &["Items"]))?;
    }
    registry.register_identifier_walker(t.tile_entity, "RecordPlayer", VERSION, 0, convert_fields(t.item_stack, &["RecordItem"]))?;
    registry.register_identifier_walker(t.tile_entity, "MobSpawner", VERSION, 0, convert_whole(t.untagged_spawner))?;
    registry.register_identifier_walker(t.tile_entity, "FlowerPot", VERSION, 0, convert_fields(t.item_name, &["Item"]))?;

    // everything else
    registry.register_walker(
        t.item_stack,
        VERSION,
        0,
        item_stack_walker(t, entity_for_item, tile_entity_for_item),
    )?;
    registry.register_walker(t.player, VERSION, 0, convert_lists(t.item_stack, &["Inventory", "EnderItems"]))?;
    registry.register_walker(
        t.chunk,
        VERSION,
        0,
        within(
            "Level",
            all(vec![
                convert_lists(t.entity, &["Entities"]),
                convert_lists(t.tile_entity, &["TileEntities"]),
                each("TileTicks", convert_fields(t.block_name, &["i"])),
            ]),
        ),
    )?;
    registry.register_walker(t.entity_chunk, VERSION, 0, convert_lists(t.entity, &["Entities"]))?;
    registry.register_walker(
        t.untagged_spawner,
        VERSION,
        0,
        all(vec![
            convert_fields(t.entity, &["SpawnData"]),
            each("SpawnPotentials", convert_fields(t.entity, &["Entity"])),
        ]),
    )?;

    // enforce namespacing for ids
    registry.register_hook(t.block_name, VERSION, 0, enforce_namespaced_value())?;
    registry.register_hook(t.item_name, VERSION, 0, enforce_namespaced_value())?;
    registry.register_hook(t.item_stack, VERSION, 0, enforce_namespaced_id())?;

    Ok(())
}
