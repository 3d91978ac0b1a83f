use std::cmp::Ordering;

use crate::schema::property::{PropertyConfig, PropertyKind};

/// Effective sort position of a property.
///
/// Composite properties are pushed behind scalar fields regardless of any
/// explicit `order`: objects sort as 15000 and arrays as 10000, so scalars
/// come first, then repeatable arrays, then nested groups.
fn effective_order(config: &PropertyConfig) -> Option<i64> {
    match config.kind() {
        Some(PropertyKind::Object) => Some(15000),
        Some(PropertyKind::Array) => Some(10000),
        _ => config.order,
    }
}

/// Sort `(name, config)` entries into render order.
///
/// Entries without an effective order sort last; ties (including pairs of
/// missing orders) keep their declaration order.
pub(crate) fn sort_properties(entries: &mut [(String, PropertyConfig)]) {
    entries.sort_by(|(_, a), (_, b)| match (effective_order(a), effective_order(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    });
}
