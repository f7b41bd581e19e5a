//! Schema-wide federation metadata.
//!
//! [`FederationMetadata`] is built once, when the gateway schema is composed, and is read-only
//! from then on: share it by reference (or `Arc`) with every request.

use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::executable::FieldSet;
use apollo_compiler::executable::SelectionSet;
use apollo_compiler::validation::Valid;

use crate::error::CompletionError;
use crate::origin::FieldMap;
use crate::origin::Origin;
use crate::origin::fields_of;

/// What the gateway knows about a type that several origins can serve.
#[derive(Clone, Debug)]
pub struct MergedTypeInfo {
    pub type_name: Name,
    /// The candidate origins, in registration order.
    pub origins: Vec<Origin>,
    /// Each candidate origin's view of the type, keyed by origin name.
    pub type_maps: IndexMap<String, FieldMap>,
}

impl MergedTypeInfo {
    fn new(type_name: Name) -> Self {
        Self {
            type_name,
            origins: Vec::new(),
            type_maps: IndexMap::default(),
        }
    }

    pub fn field_map(&self, origin: &Origin) -> Option<&FieldMap> {
        self.type_maps.get(origin.name())
    }

    /// The candidate origins, except `origin`.
    pub fn other_origins(&self, origin: &Origin) -> Vec<Origin> {
        self.origins
            .iter()
            .filter(|candidate| *candidate != origin)
            .cloned()
            .collect()
    }
}

/// Which origins serve which merged types, and which selections must always be fetched.
#[derive(Clone, Debug, Default)]
pub struct FederationMetadata {
    merged_types: IndexMap<Name, MergedTypeInfo>,
    selection_sets_by_type: IndexMap<Name, SelectionSet>,
    selection_sets_by_field: IndexMap<Name, IndexMap<Name, SelectionSet>>,
}

impl FederationMetadata {
    pub fn builder(schema: &Valid<Schema>) -> FederationMetadataBuilder<'_> {
        FederationMetadataBuilder {
            schema,
            origins: IndexMap::default(),
            metadata: Self::default(),
        }
    }

    pub fn merged_type(&self, type_name: &str) -> Option<&MergedTypeInfo> {
        self.merged_types.get(type_name)
    }

    pub fn merged_types(&self) -> impl Iterator<Item = &MergedTypeInfo> {
        self.merged_types.values()
    }

    /// The selections needed alongside any field of `type_name`.
    pub fn selection_set_for_type(&self, type_name: &str) -> Option<&SelectionSet> {
        self.selection_sets_by_type.get(type_name)
    }

    /// The selections needed alongside `type_name.field_name`.
    pub fn selection_set_for_field(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Option<&SelectionSet> {
        self.selection_sets_by_field
            .get(type_name)?
            .get(field_name)
    }
}

/// Collects merged types and required selections, checking them against the gateway schema.
pub struct FederationMetadataBuilder<'schema> {
    schema: &'schema Valid<Schema>,
    origins: IndexMap<String, Origin>,
    metadata: FederationMetadata,
}

impl FederationMetadataBuilder<'_> {
    /// Registers `origin` as able to serve `type_name`, with the fields its own schema declares.
    pub fn add_origin(
        &mut self,
        type_name: &str,
        origin: Origin,
    ) -> Result<&mut Self, CompletionError> {
        let type_name = self.type_name(type_name)?;
        let fields = FieldMap::from_schema(&origin.subgraph().schema, &type_name).ok_or_else(
            || CompletionError::MissingFieldMap {
                origin: origin.name().to_owned(),
                type_name: type_name.clone(),
            },
        )?;
        self.insert_origin(type_name, origin, fields)
    }

    /// Registers `origin` as able to serve `type_name`, exposing exactly `fields`.
    ///
    /// Only [`Origin::Configured`] origins can be restricted: direct origins are always read
    /// from their schema, so they are rejected here.
    pub fn add_origin_with_fields(
        &mut self,
        type_name: &str,
        origin: Origin,
        fields: FieldMap,
    ) -> Result<&mut Self, CompletionError> {
        let type_name = self.type_name(type_name)?;
        if !origin.is_configured() {
            return Err(CompletionError::invalid_metadata(format!(
                "origin \"{origin}\" serves the fields of its schema \
                 and cannot restrict type \"{type_name}\""
            )));
        }
        self.insert_origin(type_name, origin, fields)
    }

    fn insert_origin(
        &mut self,
        type_name: Name,
        origin: Origin,
        fields: FieldMap,
    ) -> Result<&mut Self, CompletionError> {
        self.register(&origin)?;
        let info = self
            .metadata
            .merged_types
            .entry(type_name.clone())
            .or_insert_with(|| MergedTypeInfo::new(type_name.clone()));
        if info.type_maps.contains_key(origin.name()) {
            return Err(CompletionError::invalid_metadata(format!(
                "origin \"{origin}\" is registered twice for type \"{type_name}\""
            )));
        }
        info.type_maps.insert(origin.name().to_owned(), fields);
        info.origins.push(origin);
        Ok(self)
    }

    /// Requires `selections` whenever any field of `type_name` is requested.
    pub fn type_selection_set(
        &mut self,
        type_name: &str,
        selections: &str,
    ) -> Result<&mut Self, CompletionError> {
        let type_name = self.type_name(type_name)?;
        let selection_set = self.parse_selection_set(&type_name, selections)?;
        self.metadata
            .selection_sets_by_type
            .insert(type_name, selection_set);
        Ok(self)
    }

    /// Requires `selections` whenever `type_name.field_name` is requested.
    pub fn field_selection_set(
        &mut self,
        type_name: &str,
        field_name: &str,
        selections: &str,
    ) -> Result<&mut Self, CompletionError> {
        let type_name = self.type_name(type_name)?;
        let field_name = fields_of(self.schema, &type_name)
            .and_then(|fields| fields.get_key_value(field_name))
            .map(|(name, _)| name.clone())
            .ok_or_else(|| CompletionError::UnknownType {
                type_name: format!("{type_name}.{field_name}"),
            })?;
        let selection_set = self.parse_selection_set(&type_name, selections)?;
        self.metadata
            .selection_sets_by_field
            .entry(type_name)
            .or_default()
            .insert(field_name, selection_set);
        Ok(self)
    }

    pub fn build(self) -> FederationMetadata {
        self.metadata
    }

    fn type_name(&self, type_name: &str) -> Result<Name, CompletionError> {
        self.schema
            .types
            .get_key_value(type_name)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| CompletionError::UnknownType {
                type_name: type_name.to_owned(),
            })
    }

    fn register(&mut self, origin: &Origin) -> Result<(), CompletionError> {
        match self.origins.get(origin.name()) {
            Some(registered)
                if !Arc::ptr_eq(registered.subgraph(), origin.subgraph())
                    || registered.is_configured() != origin.is_configured() =>
            {
                Err(CompletionError::invalid_metadata(format!(
                    "two different origins are named \"{origin}\""
                )))
            }
            Some(_) => Ok(()),
            None => {
                self.origins
                    .insert(origin.name().to_owned(), origin.clone());
                Ok(())
            }
        }
    }

    fn parse_selection_set(
        &self,
        type_name: &Name,
        selections: &str,
    ) -> Result<SelectionSet, CompletionError> {
        let field_set = FieldSet::parse_and_validate(
            self.schema,
            type_name.clone(),
            selections,
            "selection_set.graphql",
        )
        .map_err(|e| CompletionError::InvalidSelectionSet {
            type_name: type_name.clone(),
            message: e.errors.to_string(),
        })?;
        Ok(field_set.into_inner().selection_set)
    }
}
