//! 1.10.2 + 193: entity ids become namespaced

use crate::bootstrap::Types;
use crate::converters::{rename_identifiers, rename_values, table};
use crate::error::Result;
use crate::hooks::{enforce_namespaced_id, enforce_namespaced_value};
use crate::registry::TypeRegistry;
use crate::walkers::{all, convert_fields, convert_lists, convert_whole, each, within};

pub(crate) const VERSION: u32 = 705;

const ENTITY_ID_UPDATE: &[(&str, &str)] = &[
    ("AreaEffectCloud", "minecraft:area_effect_cloud"),
    ("ArmorStand", "minecraft:armor_stand"),
    ("Arrow", "minecraft:arrow"),
    ("Bat", "minecraft:bat"),
    ("Blaze", "minecraft:blaze"),
    ("Boat", "minecraft:boat"),
    ("CaveSpider", "minecraft:cave_spider"),
    ("Chicken", "minecraft:chicken"),
    ("Cow", "minecraft:cow"),
    ("Creeper", "minecraft:creeper"),
    ("Donkey", "minecraft:donkey"),
    ("DragonFireball", "minecraft:dragon_fireball"),
    ("ElderGuardian", "minecraft:elder_guardian"),
    ("EnderCrystal", "minecraft:ender_crystal"),
    ("EnderDragon", "minecraft:ender_dragon"),
    ("Enderman", "minecraft:enderman"),
    ("Endermite", "minecraft:endermite"),
    ("EyeOfEnderSignal", "minecraft:eye_of_ender_signal"),
    ("FallingSand", "minecraft:falling_block"),
    ("Fireball", "minecraft:fireball"),
    ("FireworksRocketEntity", "minecraft:fireworks_rocket"),
    ("Ghast", "minecraft:ghast"),
    ("Giant", "minecraft:giant"),
    ("Guardian", "minecraft:guardian"),
    ("Horse", "minecraft:horse"),
    ("Husk", "minecraft:husk"),
    ("Item", "minecraft:item"),
    ("ItemFrame", "minecraft:item_frame"),
    ("LavaSlime", "minecraft:magma_cube"),
    ("LeashKnot", "minecraft:leash_knot"),
    ("MinecartChest", "minecraft:chest_minecart"),
    ("MinecartCommandBlock", "minecraft:commandblock_minecart"),
    ("MinecartFurnace", "minecraft:furnace_minecart"),
    ("MinecartHopper", "minecraft:hopper_minecart"),
    ("MinecartRideable", "minecraft:minecart"),
    ("MinecartSpawner", "minecraft:spawner_minecart"),
    ("MinecartTNT", "minecraft:tnt_minecart"),
    ("Mule", "minecraft:mule"),
    ("MushroomCow", "minecraft:mooshroom"),
    ("Ozelot", "minecraft:ocelot"),
    ("Painting", "minecraft:painting"),
    ("Pig", "minecraft:pig"),
    ("PigZombie", "minecraft:zombie_pigman"),
    ("PolarBear", "minecraft:polar_bear"),
    ("PrimedTnt", "minecraft:tnt"),
    ("Rabbit", "minecraft:rabbit"),
    ("Sheep", "minecraft:sheep"),
    ("Shulker", "minecraft:shulker"),
    ("ShulkerBullet", "minecraft:shulker_bullet"),
    ("Silverfish", "minecraft:silverfish"),
    ("Skeleton", "minecraft:skeleton"),
    ("SkeletonHorse", "minecraft:skeleton_horse"),
    ("Slime", "minecraft:slime"),
    ("SmallFireball", "minecraft:small_fireball"),
    ("SnowMan", "minecraft:snowman"),
    ("Snowball", "minecraft:snowball"),
    ("SpectralArrow", "minecraft:spectral_arrow"),
    ("Spider", "minecraft:spider"),
    ("Squid", "minecraft:squid"),
    ("Stray", "minecraft:stray"),
    ("ThrownEgg", "minecraft:egg"),
    ("ThrownEnderpearl", "minecraft:ender_pearl"),
    ("ThrownExpBottle", "minecraft:xp_bottle"),
    ("ThrownPotion", "minecraft:potion"),
    ("Villager", "minecraft:villager"),
    ("VillagerGolem", "minecraft:villager_golem"),
    ("Witch", "minecraft:witch"),
    ("WitherBoss", "minecraft:wither"),
    ("WitherSkeleton", "minecraft:wither_skeleton"),
    ("WitherSkull", "minecraft:wither_skull"),
    ("Wolf", "minecraft:wolf"),
    ("XPOrb", "minecraft:xp_orb"),
    ("Zombie", "minecraft:zombie"),
    ("ZombieHorse", "minecraft:zombie_horse"),
    ("ZombieVillager", "minecraft:zombie_villager"),
];

const MOBS: &[&str] = &[
    "minecraft:armor_stand", "minecraft:bat", "minecraft:blaze", "minecraft:cave_spider",
    "minecraft:chicken", "minecraft:cow", "minecraft:creeper", "minecraft:elder_guardian",
    "minecraft:ender_dragon", "minecraft:enderman", "minecraft:endermite", "minecraft:ghast",
    "minecraft:giant", "minecraft:guardian", "minecraft:husk", "minecraft:magma_cube",
    "minecraft:mooshroom", "minecraft:ocelot", "minecraft:pig", "minecraft:polar_bear",
    "minecraft:rabbit", "minecraft:sheep", "minecraft:shulker", "minecraft:silverfish",
    "minecraft:skeleton", "minecraft:slime", "minecraft:snowman", "minecraft:spider",
    "minecraft:squid", "minecraft:stray", "minecraft:villager_golem", "minecraft:witch",
    "minecraft:wither", "minecraft:wither_skeleton", "minecraft:wolf", "minecraft:zombie",
    "minecraft:zombie_pigman", "minecraft:zombie_villager", "minecraft:evocation_illager",
    "minecraft:vex", "minecraft:vindication_illager",
];

const THROWABLES: &[&str] = &[
    "minecraft:arrow", "minecraft:egg", "minecraft:ender_pearl", "minecraft:fireball",
    "minecraft:small_fireball", "minecraft:snowball", "minecraft:spectral_arrow",
    "minecraft:wither_skull", "minecraft:xp_bottle", "minecraft:potion",
];

const MINECARTS: &[&str] = &[
    "minecraft:minecart", "minecraft:chest_minecart", "minecraft:commandblock_minecart",
    "minecraft:furnace_minecart", "minecraft:hopper_minecart", "minecraft:spawner_minecart",
    "minecraft:tnt_minecart",
];

/// Horses and their kin: `(id, item lists, single items)`
const MOUNTS: &[(&str, &[&str], &[&str])] = &[
    ("minecraft:horse", &["ArmorItems", "HandItems"], &["ArmorItem", "SaddleItem"]),
    ("minecraft:donkey", &["Items", "ArmorItems", "HandItems"], &["SaddleItem"]),
    ("minecraft:mule", &["Items", "ArmorItems", "HandItems"], &["SaddleItem"]),
    ("minecraft:skeleton_horse", &["ArmorItems", "HandItems"], &["SaddleItem"]),
    ("minecraft:zombie_horse", &["ArmorItems", "HandItems"], &["SaddleItem"]),
    ("minecraft:llama", &["Items", "ArmorItems", "HandItems"], &["SaddleItem", "DecorItem"]),
];

pub(crate) fn register(registry: &mut TypeRegistry, types: &Types) -> Result<()> {
    let t = *types;

    registry.register_converter(t.entity, VERSION, 0, rename_identifiers(table(ENTITY_ID_UPDATE)))?;
    registry.register_converter(t.entity_name, VERSION, 0, rename_values(table(ENTITY_ID_UPDATE)))?;

    for id in MOBS {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_lists(t.item_stack, &["ArmorItems", "HandItems"]))?;
    }
    for id in THROWABLES {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_fields(t.block_name, &["inTile"]))?;
    }
    for id in MINECARTS {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_fields(t.block_name, &["DisplayTile"]))?;
    }
    for id in ["minecraft:chest_minecart", "minecraft:hopper_minecart"] {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_lists(t.item_stack, &["Items"]))?;
    }
    for (id, lists, items) in MOUNTS {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_lists(t.item_stack, lists))?;
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_fields(t.item_stack, items))?;
    }

    registry.register_identifier_walker(t.entity, "minecraft:spawner_minecart", VERSION, 0, convert_whole(t.untagged_spawner))?;
    registry.register_identifier_walker(t.entity, "minecraft:enderman", VERSION, 0, convert_fields(t.block_name, &["carried"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:falling_block", VERSION, 0, convert_fields(t.block_name, &["Block"]))?;
    registry.register_identifier_walker(
        t.entity,
        "minecraft:falling_block",
        VERSION,
        0,
        convert_fields(t.tile_entity, &["TileEntityData"]),
    )?;
    registry.register_identifier_walker(t.entity, "minecraft:fireworks_rocket", VERSION, 0, convert_fields(t.item_stack, &["FireworksItem"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:item", VERSION, 0, convert_fields(t.item_stack, &["Item"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:item_frame", VERSION, 0, convert_fields(t.item_stack, &["Item"]))?;
    registry.register_identifier_walker(t.entity, "minecraft:potion", VERSION, 0, convert_fields(t.item_stack, &["Potion"]))?;
    registry.register_identifier_walker(
        t.entity,
        "minecraft:villager",
        VERSION,
        0,
        all(vec![
            convert_lists(t.item_stack, &["Inventory"]),
            within("Offers", each("Recipes", convert_fields(t.item_stack, &["buy", "buyB", "sell"]))),
            convert_lists(t.item_stack, &["ArmorItems", "HandItems"]),
        ]),
    )?;

    registry.register_hook(t.entity, VERSION, 0, enforce_namespaced_id())?;
    registry.register_hook(t.entity_name, VERSION, 0, enforce_namespaced_value())?;

    Ok(())
}
