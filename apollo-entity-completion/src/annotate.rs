//! Annotation of resolved entities, and the decision to complete them from other origins.

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::schema::ExtendedType;

use crate::context::QueryContext;
use crate::entity::Entity;
use crate::error::CompletionError;
use crate::gap::ResidualFields;
use crate::gap::fields_not_in_origin;
use crate::graphql::Error;
use crate::metadata::MergedTypeInfo;
use crate::origin::Origin;

/// Everything needed to fetch the residual fields of an entity from other origins.
#[derive(Debug)]
pub struct MergeRequest<'a> {
    pub type_info: &'a MergedTypeInfo,
    /// The concrete type of the entity.
    pub type_name: Name,
    /// The annotated entity, as produced by its origin.
    pub entity: Entity,
    /// The demanded fields the entity's origin does not serve. Never empty.
    pub residual_fields: ResidualFields,
    /// The origins the entity already went through.
    pub source_origins: Vec<Origin>,
    /// The origins to query, in registration order. Never contains a source origin.
    pub target_origins: Vec<Origin>,
    pub context: QueryContext<'a>,
}

/// Fetches residual fields from other origins and merges them into the entity.
///
/// Whatever this returns, including errors, is handed back to the caller of
/// [`ResultAnnotator::annotate`] untouched.
pub trait MergeFields {
    type Error: From<CompletionError>;

    fn merge_fields(&self, request: MergeRequest<'_>) -> Result<Entity, Self::Error>;
}

/// Entry point of entity completion.
#[derive(Clone, Debug, Default)]
pub struct ResultAnnotator<M> {
    merger: M,
}

impl<M: MergeFields> ResultAnnotator<M> {
    pub fn new(merger: M) -> Self {
        Self { merger }
    }

    pub fn merger(&self) -> &M {
        &self.merger
    }

    /// Attaches `errors` and `origin` to `entity`, then completes it with the fields `origin`
    /// could not serve, if other origins can.
    ///
    /// The errors are sliced to the entity and replace any previously attached; `origin` replaces
    /// any previously recorded. With `skip_completion` set, or whenever there is nothing to
    /// fetch elsewhere, the annotated entity is returned as is.
    pub fn annotate(
        &self,
        declared_type: &Name,
        mut entity: Entity,
        errors: &[Error],
        origin: &Origin,
        context: &QueryContext<'_>,
        skip_completion: bool,
    ) -> Result<Entity, M::Error> {
        entity.set_errors(errors.iter().map(Error::sliced).collect());
        entity.set_origin(origin.clone());

        if skip_completion {
            tracing::trace!(%declared_type, %origin, "completion skipped");
            return Ok(entity);
        }
        let Some(metadata) = context.metadata else {
            tracing::trace!(%declared_type, %origin, "no federation metadata");
            return Ok(entity);
        };

        let type_name = concrete_type_name(context.schema, declared_type, &entity)?;
        let Some(type_info) = metadata.merged_type(&type_name) else {
            tracing::trace!(%type_name, %origin, "type is not merged");
            return Ok(entity);
        };

        let target_origins = type_info.other_origins(origin);
        if target_origins.is_empty() {
            tracing::trace!(%type_name, %origin, "no other origin serves the type");
            return Ok(entity);
        }

        let residual_fields = fields_not_in_origin(context, origin, type_info, &type_name)?;
        if residual_fields.is_empty() {
            tracing::trace!(%type_name, %origin, "origin serves every demanded field");
            return Ok(entity);
        }

        tracing::debug!(
            %type_name,
            %origin,
            residual_fields = residual_fields.len(),
            target_origins = %itertools::join(&target_origins, ", "),
            "completing entity from other origins"
        );
        self.merger.merge_fields(MergeRequest {
            type_info,
            type_name,
            entity,
            residual_fields,
            source_origins: vec![origin.clone()],
            target_origins,
            context: *context,
        })
    }
}

/// The runtime type of `entity`: its reported `__typename` when `declared_type` is abstract.
fn concrete_type_name(
    schema: &Schema,
    declared_type: &Name,
    entity: &Entity,
) -> Result<Name, CompletionError> {
    match schema.types.get(declared_type) {
        Some(ExtendedType::Interface(_) | ExtendedType::Union(_)) => {
            let typename = entity
                .typename()
                .ok_or_else(|| CompletionError::MissingTypename {
                    declared_type: declared_type.clone(),
                })?;
            schema
                .types
                .get_key_value(typename)
                .map(|(name, _)| name.clone())
                .ok_or_else(|| CompletionError::UnknownType {
                    type_name: typename.to_owned(),
                })
        }
        Some(_) => Ok(declared_type.clone()),
        None => Err(CompletionError::UnknownType {
            type_name: declared_type.to_string(),
        }),
    }
}
