//! The fields demanded of an entity: what the client asked for, plus what federation needs to
//! fetch the rest of the entity elsewhere.

use std::collections::HashSet;
use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::executable::Field;

use crate::collect_fields::collect_fields;
use crate::context::QueryContext;

/// Field nodes grouped by response key, in the order the keys were first seen.
///
/// A key maps to several nodes when several selections (typically from different fragments)
/// request it. Every key has at least one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DemandedFieldSet(IndexMap<Name, Vec<Node<Field>>>);

impl DemandedFieldSet {
    pub(crate) fn push(&mut self, field: Node<Field>) {
        self.0
            .entry(field.response_key().clone())
            .or_default()
            .push(field);
    }

    pub fn get(&self, response_key: &str) -> Option<&[Node<Field>]> {
        self.0.get(response_key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, response_key: &str) -> bool {
        self.0.contains_key(response_key)
    }

    pub fn response_keys(&self) -> impl Iterator<Item = &Name> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &[Node<Field>])> {
        self.0.iter().map(|(key, fields)| (key, fields.as_slice()))
    }

    /// The underlying field name of each response key.
    ///
    /// All nodes sharing a response key select the same field, so the first one is used.
    pub fn field_names(&self) -> impl Iterator<Item = (&Name, &Name)> {
        self.0
            .iter()
            .filter_map(|(key, fields)| Some((key, &fields.first()?.name)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DemandedFieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (response_key, fields) in &self.0 {
            write!(f, "{response_key}")?;
            match fields.first() {
                Some(field) if field.name != *response_key => write!(f, ": {}", field.name)?,
                _ => {}
            }
            if fields.len() > 1 {
                write!(f, " (x{})", fields.len())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Collects every field demanded of an entity of concrete type `type_name`.
///
/// The client's selections come first. Then, for each response key the client requested,
/// selections the metadata requires are merged in: the type-wide selection set (once), and the
/// selection set registered for that key's field. Keys introduced this way are not themselves
/// looked up again.
pub fn collect_demanded_fields(context: &QueryContext<'_>, type_name: &Name) -> DemandedFieldSet {
    let mut fields = DemandedFieldSet::default();
    let mut visited_fragments = HashSet::new();

    for field_node in context.field_nodes {
        collect_fields(
            context,
            type_name,
            &field_node.selection_set,
            &mut fields,
            &mut visited_fragments,
        );
    }

    let Some(metadata) = context.metadata else {
        return fields;
    };

    let requested_field_names: Vec<Name> = fields
        .field_names()
        .map(|(_, field_name)| field_name.clone())
        .collect();
    let mut type_selection_set = metadata.selection_set_for_type(type_name);
    for field_name in requested_field_names {
        if let Some(selection_set) = type_selection_set.take() {
            collect_fields(
                context,
                type_name,
                selection_set,
                &mut fields,
                &mut visited_fragments,
            );
        }
        if let Some(selection_set) = metadata.selection_set_for_field(type_name, &field_name) {
            collect_fields(
                context,
                type_name,
                selection_set,
                &mut fields,
                &mut visited_fragments,
            );
        }
    }

    fields
}
