// Class ordering for declaration output: ancestors before descendants

use crate::model::Entity;
use std::cmp::Ordering;

/// Ancestors first, then shallower hierarchies, then by name
///
/// An ancestor's `all_types` is a strict subset of its descendant's, so the
/// ancestry test always agrees with the length test and the order is total.
pub fn compare_classes(a: &Entity, b: &Entity) -> Ordering {
    if a.all_types.iter().any(|t| *t == b.name) {
        return Ordering::Greater;
    }
    if b.all_types.iter().any(|t| *t == a.name) {
        return Ordering::Less;
    }
    a.all_types
        .len()
        .cmp(&b.all_types.len())
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_classes(classes: &mut [&Entity]) {
    classes.sort_by(|a, b| compare_classes(a, b));
}
