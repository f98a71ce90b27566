//! Standard walkers
//!
//! Walkers recurse into nested records that belong to other types: an entity's held items,
//! a chunk's entity list. Each one hands the child to its own type's `convert` and splices the
//! result back into a copy of the parent only when something changed.

use crate::migration::{splice, Migration};
use crate::record::Record;
use crate::registry::TypeHandle;
use crate::rules::{rule, RuleFn};

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

/// Convert each named field holding a single record of type `target`
pub fn convert_fields(target: TypeHandle, fields: &[&str]) -> RuleFn {
    let fields = owned(fields);
    rule(move |record: &Record, m: &Migration<'_>| {
        let parent = m.expect_compound(record)?;
        let mut changes = Vec::new();
        for field in &fields {
            if let Some(converted) = m.convert_field(target, parent, field)? {
                changes.push((field.clone(), converted));
            }
        }
        Ok(splice(parent, changes))
    })
}

/// Convert every element of each named list field through `target`
pub fn convert_lists(target: TypeHandle, fields: &[&str]) -> RuleFn {
    let fields = owned(fields);
    rule(move |record: &Record, m: &Migration<'_>| {
        let parent = m.expect_compound(record)?;
        let mut changes = Vec::new();
        for field in &fields {
            if let Some(converted) = m.convert_list(target, parent, field)? {
                changes.push((field.clone(), converted));
            }
        }
        Ok(splice(parent, changes))
    })
}

/// Run the whole record through another type, for records that embed another type's fields
/// at top level (a spawner minecart is also a spawner)
pub fn convert_whole(target: TypeHandle) -> RuleFn {
    rule(move |record: &Record, m: &Migration<'_>| m.convert(target, record))
}

/// Apply `walker` to the record stored under `field`
pub fn within(field: &'static str, walker: RuleFn) -> RuleFn {
    rule(move |record: &Record, m: &Migration<'_>| {
        let parent = m.expect_compound(record)?;
        let Some(child) = parent.get(field) else {
            return Ok(None);
        };
        Ok(walker(child, m)?.and_then(|child| splice(parent, vec![(field.to_string(), child)])))
    })
}

/// Apply `walker` to every element of the list stored under `field`
pub fn each(field: &'static str, walker: RuleFn) -> RuleFn {
    rule(move |record: &Record, m: &Migration<'_>| {
        let parent = m.expect_compound(record)?;
        let Some(items) = parent.get_list(field) else {
            return Ok(None);
        };
        let mut converted: Option<Vec<Record>> = None;
        for (index, item) in items.iter().enumerate() {
            if let Some(replacement) = walker(item, m)? {
                converted.get_or_insert_with(|| items.to_vec())[index] = replacement;
            }
        }
        Ok(converted.and_then(|list| splice(parent, vec![(field.to_string(), Record::List(list))])))
    })
}

/// Chain walkers into one, each seeing the previous one's output
pub fn all(walkers: Vec<RuleFn>) -> RuleFn {
    rule(move |record: &Record, m: &Migration<'_>| {
        let mut current: Option<Record> = None;
        for walker in &walkers {
            let input = current.as_ref().unwrap_or(record);
            if let Some(next) = walker(input, m)? {
                current = Some(next);
            }
        }
        Ok(current)
    })
}
