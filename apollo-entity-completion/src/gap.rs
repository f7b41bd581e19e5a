use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::executable::Field;

use crate::context::QueryContext;
use crate::demand::collect_demanded_fields;
use crate::error::CompletionError;
use crate::metadata::MergedTypeInfo;
use crate::origin::Origin;
use crate::origin::OriginFields;
use crate::origin::fields_of;

/// Demanded field nodes that the current origin cannot serve, in demand order.
pub type ResidualFields = Vec<Node<Field>>;

/// Returns the demanded fields of `type_name` that `origin` does not expose.
///
/// Every node of a missing response key is returned, so that aliases and repeated selections
/// reach the other origins intact. An empty result means `origin` serves the whole demand.
pub fn fields_not_in_origin(
    context: &QueryContext<'_>,
    origin: &Origin,
    type_info: &MergedTypeInfo,
    type_name: &Name,
) -> Result<ResidualFields, CompletionError> {
    let origin_fields = origin_fields(origin, type_info, type_name)?;
    let demanded = collect_demanded_fields(context, type_name);

    Ok(demanded
        .iter()
        .filter(|(_, fields)| {
            fields
                .first()
                .is_some_and(|field| !origin_fields.contains(&field.name))
        })
        .flat_map(|(_, fields)| fields.iter().cloned())
        .collect())
}

fn origin_fields<'a>(
    origin: &'a Origin,
    type_info: &'a MergedTypeInfo,
    type_name: &Name,
) -> Result<OriginFields<'a>, CompletionError> {
    let fields = match origin {
        Origin::Direct(subgraph) => fields_of(&subgraph.schema, type_name).map(OriginFields::Schema),
        Origin::Configured(_) => type_info.field_map(origin).map(OriginFields::Configured),
    };
    fields.ok_or_else(|| CompletionError::MissingFieldMap {
        origin: origin.name().to_owned(),
        type_name: type_name.clone(),
    })
}
