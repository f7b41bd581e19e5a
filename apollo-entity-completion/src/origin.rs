use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::collections::IndexSet;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::validation::Valid;

use crate::error::CompletionError;

/// A backing service able to resolve part of the federated schema.
pub struct Subgraph {
    pub name: String,
    pub url: String,
    pub schema: Valid<Schema>,
}

impl Subgraph {
    pub fn new(name: impl Into<String>, url: impl Into<String>, schema: Valid<Schema>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            schema,
        }
    }

    pub fn parse_and_validate(
        name: &str,
        url: &str,
        schema_str: &str,
    ) -> Result<Self, CompletionError> {
        let schema =
            Schema::parse_and_validate(schema_str, format!("{name}.graphql")).map_err(|e| {
                CompletionError::InvalidSchema {
                    origin: name.to_owned(),
                    message: e.errors.to_string(),
                }
            })?;
        Ok(Self::new(name, url, schema))
    }
}

impl fmt::Debug for Subgraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, r#"name: {}, url: {}"#, self.name, self.url)
    }
}

/// The origin that produced an entity, or that may be asked to complete it.
///
/// Origins are identified by their registered subgraph name and variant: a direct and a
/// configured handle to the same subgraph are different origins. The metadata builder refuses
/// duplicate names, so a name designates a single registration.
#[derive(Clone, Debug)]
pub enum Origin {
    /// A bare subgraph: its own schema describes which fields it serves.
    Direct(Arc<Subgraph>),
    /// A subgraph registered in a merge group: its view of each merged type is the field map
    /// recorded in [`MergedTypeInfo::type_maps`](crate::MergedTypeInfo::type_maps), which may be
    /// narrower than its schema.
    Configured(Arc<Subgraph>),
}

impl Origin {
    pub fn name(&self) -> &str {
        &self.subgraph().name
    }

    pub fn subgraph(&self) -> &Arc<Subgraph> {
        match self {
            Self::Direct(subgraph) | Self::Configured(subgraph) => subgraph,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

impl PartialEq for Origin {
    fn eq(&self, other: &Self) -> bool {
        self.is_configured() == other.is_configured() && self.name() == other.name()
    }
}

impl Eq for Origin {}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The names of the fields an origin's view of a type exposes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap(IndexSet<Name>);

impl FieldMap {
    /// Reads the fields `type_name` declares in `schema`, if it is an object or interface type.
    pub fn from_schema(schema: &Schema, type_name: &str) -> Option<Self> {
        fields_of(schema, type_name).map(|fields| fields.keys().cloned().collect())
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.0.contains(field_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.0.iter()
    }
}

impl FromIterator<Name> for FieldMap {
    fn from_iter<I: IntoIterator<Item = Name>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub(crate) fn fields_of<'schema>(
    schema: &'schema Schema,
    type_name: &str,
) -> Option<&'schema IndexMap<Name, Component<FieldDefinition>>> {
    match schema.types.get(type_name)? {
        ExtendedType::Object(object) => Some(&object.fields),
        ExtendedType::Interface(interface) => Some(&interface.fields),
        _ => None,
    }
}

/// An origin's view of one type, resolved per [`Origin`] variant.
#[derive(Clone, Copy, Debug)]
pub(crate) enum OriginFields<'a> {
    Schema(&'a IndexMap<Name, Component<FieldDefinition>>),
    Configured(&'a FieldMap),
}

impl OriginFields<'_> {
    pub(crate) fn contains(&self, field_name: &str) -> bool {
        // Meta-fields are served by every origin.
        if field_name == "__typename" {
            return true;
        }
        match self {
            Self::Schema(fields) => fields.contains_key(field_name),
            Self::Configured(fields) => fields.contains(field_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
      type Query { product: Product }
      interface Node { id: ID! }
      type Product implements Node { id: ID! name: String }
      enum Color { RED }
    "#;

    fn subgraph(name: &str) -> Arc<Subgraph> {
        Arc::new(Subgraph::parse_and_validate(name, "http://localhost", SCHEMA).unwrap())
    }

    #[test]
    fn origins_compare_by_name_and_variant() {
        let a = Origin::Direct(subgraph("products"));
        let b = Origin::Configured(subgraph("products"));
        let c = Origin::Direct(subgraph("reviews"));
        assert_eq!(a, Origin::Direct(subgraph("products")));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(b.is_configured());
        assert_eq!(c.to_string(), "reviews");
    }

    #[test]
    fn field_map_from_schema() {
        let subgraph = subgraph("products");
        let fields = FieldMap::from_schema(&subgraph.schema, "Product").unwrap();
        assert_eq!(
            fields.iter().map(|name| name.as_str()).collect::<Vec<_>>(),
            ["id", "name"]
        );
        assert!(FieldMap::from_schema(&subgraph.schema, "Node").is_some());
        assert!(FieldMap::from_schema(&subgraph.schema, "Color").is_none());
        assert!(FieldMap::from_schema(&subgraph.schema, "Missing").is_none());
    }

    #[test]
    fn typename_is_always_served() {
        let fields = FieldMap::default();
        let view = OriginFields::Configured(&fields);
        assert!(view.contains("__typename"));
        assert!(!view.contains("id"));
    }
}
