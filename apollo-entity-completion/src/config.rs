//! Declarative description of [`FederationMetadata`].
//!
//! ```json
//! {
//!   "types": {
//!     "Product": {
//!       "origins": ["products", { "name": "inventory", "fields": ["upc", "inStock"] }],
//!       "selection_set": "upc",
//!       "fields": { "shippingEstimate": "price weight" }
//!     }
//!   }
//! }
//! ```

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CompletionError;
use crate::metadata::FederationMetadata;
use crate::origin::FieldMap;
use crate::origin::Origin;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    /// Merged types, by type name.
    #[serde(default)]
    pub types: IndexMap<String, MergedTypeConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergedTypeConfig {
    /// The origins serving the type, in order of preference.
    pub origins: Vec<OriginConfig>,

    /// Selections to fetch whenever any field of the type is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_set: Option<String>,

    /// Selections to fetch whenever a given field of the type is requested.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginConfig {
    /// An origin exposing every field its schema declares for the type.
    Name(String),
    /// An origin exposing only `fields` of the type.
    Restricted { name: String, fields: Vec<String> },
}

impl OriginConfig {
    fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Restricted { name, .. } => name,
        }
    }
}

impl MetadataConfig {
    pub fn from_json(json: &str) -> Result<Self, CompletionError> {
        serde_json::from_str(json).map_err(|e| CompletionError::invalid_metadata(e.to_string()))
    }

    /// Builds the metadata for `schema`, resolving origin names among `origins`.
    pub fn build(
        &self,
        schema: &Valid<Schema>,
        origins: &[Origin],
    ) -> Result<FederationMetadata, CompletionError> {
        let mut builder = FederationMetadata::builder(schema);
        for (type_name, type_config) in &self.types {
            for origin_config in &type_config.origins {
                let origin = origins
                    .iter()
                    .find(|origin| origin.name() == origin_config.name())
                    .cloned()
                    .ok_or_else(|| {
                        CompletionError::invalid_metadata(format!(
                            "type \"{type_name}\" references unknown origin \"{}\"",
                            origin_config.name()
                        ))
                    })?;
                match origin_config {
                    OriginConfig::Name(_) => builder.add_origin(type_name, origin)?,
                    OriginConfig::Restricted { fields, .. } => {
                        builder.add_origin_with_fields(type_name, origin, field_map(fields)?)?
                    }
                };
            }
            if let Some(selection_set) = &type_config.selection_set {
                builder.type_selection_set(type_name, selection_set)?;
            }
            for (field_name, selection_set) in &type_config.fields {
                builder.field_selection_set(type_name, field_name, selection_set)?;
            }
        }
        Ok(builder.build())
    }
}

fn field_map(fields: &[String]) -> Result<FieldMap, CompletionError> {
    fields
        .iter()
        .map(|field| {
            Name::new(field).map_err(|_| {
                CompletionError::invalid_metadata(format!("invalid field name \"{field}\""))
            })
        })
        .collect()
}
