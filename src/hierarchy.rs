//! Type-hierarchy resolution
//!
//! Fills `all_types` for every class and interface: the entity itself
//! followed by the `all_types` of each parent. Interfaces follow their
//! extended interfaces, then (like classes) their base type. Parents that
//! are not classes or interfaces of the model are ignored. Names reached
//! twice through diamond inheritance are kept twice. A cyclic
//! inheritance chain is reported and the closing edge is dropped.

use crate::diagnostics::Diagnostics;
use crate::model::EntityModel;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

struct Resolver<'a> {
    model: &'a EntityModel,
    state: HashMap<usize, Visit>,
    resolved: HashMap<usize, Vec<String>>,
    diagnostics: &'a mut Diagnostics,
}

impl Resolver<'_> {
    fn resolve(&mut self, index: usize) -> Vec<String> {
        if let Some(done) = self.resolved.get(&index) {
            return done.clone();
        }
        self.state.insert(index, Visit::InProgress);

        let model = self.model;
        let entity = model.entity(index);
        let mut all_types = vec![entity.name.clone()];
        for parent in parents(model, index) {
            let Some(parent_index) = model.index_of(&parent) else {
                continue;
            };
            if self.state.get(&parent_index) == Some(&Visit::InProgress) {
                self.diagnostics.warning(format!(
                    "Cyclic inheritance: {} -> {}; the edge is ignored",
                    entity.name, parent
                ));
                continue;
            }
            all_types.extend(self.resolve(parent_index));
        }

        self.state.insert(index, Visit::Done);
        self.resolved.insert(index, all_types.clone());
        all_types
    }
}

/// Class or interface parents of an entity, in resolution order
fn parents(model: &EntityModel, index: usize) -> Vec<String> {
    let entity = model.entity(index);
    let mut result = Vec::new();
    if entity.is_interface() {
        result.extend(entity.implements.iter().cloned());
    }
    if let Some(base) = &entity.base_type {
        result.push(base.clone());
    }
    result.retain(|name| {
        model
            .get(name)
            .is_some_and(|parent| parent.is_class() || parent.is_interface())
    });
    result
}

/// Compute `all_types` for every class and interface of the model
pub fn resolve_all_types(model: &mut EntityModel, diagnostics: &mut Diagnostics) {
    let targets: Vec<usize> = model
        .named_indices()
        .into_iter()
        .filter(|&i| {
            let entity = model.entity(i);
            entity.is_class() || entity.is_interface()
        })
        .collect();

    let mut resolver = Resolver {
        model: &*model,
        state: HashMap::new(),
        resolved: HashMap::new(),
        diagnostics,
    };
    let computed: Vec<(usize, Vec<String>)> = targets
        .into_iter()
        .map(|index| (index, resolver.resolve(index)))
        .collect();

    for (index, all_types) in computed {
        model.entity_mut(index).all_types = all_types;
    }
}
