//! 15w32a: mob equipment splits into hand and armor slots

use crate::bootstrap::Types;
use crate::error::Result;
use crate::record::{Compound, Record};
use crate::registry::TypeRegistry;
use crate::rules::rule;
use crate::walkers::{all, convert_fields, convert_lists, each, within};

pub(crate) const VERSION: u32 = 100;

const MOBS: &[&str] = &[
    "ArmorStand", "Creeper", "Skeleton", "Spider", "Giant", "Zombie", "Slime", "Ghast",
    "PigZombie", "Enderman", "CaveSpider", "Silverfish", "Blaze", "LavaSlime", "EnderDragon",
    "WitherBoss", "Bat", "Witch", "Endermite", "Guardian", "Pig", "Sheep", "Cow", "Chicken",
    "Squid", "Wolf", "MushroomCow", "SnowMan", "Ozelot", "VillagerGolem", "Rabbit", "Shulker",
];

/// `Equipment[0]` is the held item, `Equipment[1..5]` the armor, feet first
fn split_equipment(entity: &mut Compound) {
    let Some(Record::List(equipment)) = entity.remove("Equipment") else {
        return;
    };

    if !equipment.is_empty() && !entity.contains_key("HandItems") {
        entity.insert("HandItems", vec![equipment[0].clone(), Record::compound()]);
    }
    if equipment.len() > 1 && !entity.contains_key("ArmorItems") {
        let armor: Vec<Record> = equipment.iter().skip(1).take(4).cloned().collect();
        entity.insert("ArmorItems", armor);
    }
}

fn split_drop_chances(entity: &mut Compound) {
    let Some(Record::List(chances)) = entity.remove("DropChances") else {
        return;
    };
    let chance = |index: usize| -> Record {
        let value = chances.get(index).and_then(Record::as_f64).unwrap_or(0.0);
        Record::Float(value as f32)
    };

    if !entity.contains_key("HandDropChances") {
        entity.insert("HandDropChances", vec![chance(0), Record::Float(0.0)]);
    }
    if !entity.contains_key("ArmorDropChances") {
        entity.insert("ArmorDropChances", (1..=4).map(chance).collect::<Vec<_>>());
    }
}

pub(crate) fn register(registry: &mut TypeRegistry, types: &Types) -> Result<()> {
    let t = *types;

    registry.register_converter(
        t.entity,
        VERSION,
        0,
        rule(|record, m| {
            let entity = m.expect_compound(record)?;
            if !entity.contains_key("Equipment") && !entity.contains_key("DropChances") {
                return Ok(None);
            }
            let mut entity = entity.clone();
            split_equipment(&mut entity);
            split_drop_chances(&mut entity);
            Ok(Some(Record::Compound(entity)))
        }),
    )?;

    for id in MOBS {
        registry.register_identifier_walker(t.entity, id, VERSION, 0, convert_lists(t.item_stack, &["ArmorItems", "HandItems"]))?;
    }
    registry.register_identifier_walker(t.entity, "Enderman", VERSION, 0, convert_fields(t.block_name, &["carried"]))?;
    registry.register_identifier_walker(
        t.entity,
        "EntityHorse",
        VERSION,
        0,
        convert_lists(t.item_stack, &["Items", "ArmorItems", "HandItems"]),
    )?;
    registry.register_identifier_walker(t.entity, "EntityHorse", VERSION, 0, convert_fields(t.item_stack, &["ArmorItem", "SaddleItem"]))?;
    registry.register_identifier_walker(
        t.entity,
        "Villager",
        VERSION,
        0,
        all(vec![
            convert_lists(t.item_stack, &["Inventory"]),
            within("Offers", each("Recipes", convert_fields(t.item_stack, &["buy", "buyB", "sell"]))),
            convert_lists(t.item_stack, &["ArmorItems", "HandItems"]),
        ]),
    )?;

    registry.register_walker(
        t.structure,
        VERSION,
        0,
        all(vec![
            each("entities", convert_fields(t.entity, &["nbt"])),
            each("blocks", convert_fields(t.tile_entity, &["nbt"])),
            convert_lists(t.block_state, &["palette"]),
        ]),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_split() {
        let mut sword = Compound::new();
        sword.insert("id", "minecraft:iron_sword");
        let mut boots = Compound::new();
        boots.insert("id", "minecraft:iron_boots");

        let mut zombie = Compound::new();
        zombie.insert("Equipment", vec![Record::Compound(sword.clone()), Record::Compound(boots.clone())]);
        zombie.insert("DropChances", vec![Record::Float(0.5), Record::Float(0.25)]);

        split_equipment(&mut zombie);
        split_drop_chances(&mut zombie);

        assert!(!zombie.contains_key("Equipment"));
        assert_eq!(
            zombie.get_list("HandItems").unwrap(),
            &[Record::Compound(sword), Record::compound()][..]
        );
        assert_eq!(zombie.get_list("ArmorItems").unwrap(), &[Record::Compound(boots)][..]);
        assert_eq!(
            zombie.get_list("ArmorDropChances").unwrap(),
            &[Record::Float(0.25), Record::Float(0.0), Record::Float(0.0), Record::Float(0.0)][..]
        );
        assert_eq!(
            zombie.get_list("HandDropChances").unwrap(),
            &[Record::Float(0.5), Record::Float(0.0)][..]
        );
    }
}
