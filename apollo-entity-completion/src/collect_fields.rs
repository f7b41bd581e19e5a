//! Field collection for one runtime type, as in the
//! [CollectFields](https://spec.graphql.org/October2021/#CollectFields()) algorithm.

use std::collections::HashSet;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::executable::DirectiveList;
use apollo_compiler::executable::Selection;
use apollo_compiler::executable::SelectionSet;
use apollo_compiler::executable::Value;
use apollo_compiler::schema::ExtendedType;

use crate::context::QueryContext;
use crate::demand::DemandedFieldSet;
use crate::json_ext::Object;

/// Expands `selection_set` into `fields`, in document order.
///
/// Each named fragment is expanded at most once across every call sharing `visited_fragments`,
/// which bounds the recursion even when fragments spread each other.
pub(crate) fn collect_fields(
    context: &QueryContext<'_>,
    runtime_type: &Name,
    selection_set: &SelectionSet,
    fields: &mut DemandedFieldSet,
    visited_fragments: &mut HashSet<Name>,
) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                if !should_include(&field.directives, context.variables) {
                    continue;
                }
                fields.push(field.clone());
            }
            Selection::InlineFragment(inline) => {
                if !should_include(&inline.directives, context.variables)
                    || !does_fragment_condition_match(
                        context.schema,
                        inline.type_condition.as_ref(),
                        runtime_type,
                    )
                {
                    continue;
                }
                collect_fields(
                    context,
                    runtime_type,
                    &inline.selection_set,
                    fields,
                    visited_fragments,
                );
            }
            Selection::FragmentSpread(spread) => {
                if visited_fragments.contains(&spread.fragment_name)
                    || !should_include(&spread.directives, context.variables)
                {
                    continue;
                }
                visited_fragments.insert(spread.fragment_name.clone());
                let Some(fragment) = context.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if !does_fragment_condition_match(
                    context.schema,
                    Some(fragment.type_condition()),
                    runtime_type,
                ) {
                    continue;
                }
                collect_fields(
                    context,
                    runtime_type,
                    &fragment.selection_set,
                    fields,
                    visited_fragments,
                );
            }
        }
    }
}

/// Evaluates `@skip` and `@include`. A variable that is missing or not a boolean leaves the
/// selection in.
fn should_include(directives: &DirectiveList, variables: &Object) -> bool {
    let skip = directives
        .get("skip")
        .and_then(|skip| skip.specified_argument_by_name("if"))
        .and_then(|value| eval_condition(value, variables))
        .unwrap_or(false);
    let include = directives
        .get("include")
        .and_then(|include| include.specified_argument_by_name("if"))
        .and_then(|value| eval_condition(value, variables))
        .unwrap_or(true);
    !skip && include
}

fn eval_condition(value: &Value, variables: &Object) -> Option<bool> {
    match value {
        Value::Boolean(value) => Some(*value),
        Value::Variable(name) => variables.get(name.as_str()).and_then(|v| v.as_bool()),
        _ => None,
    }
}

fn does_fragment_condition_match(
    schema: &Schema,
    type_condition: Option<&Name>,
    runtime_type: &Name,
) -> bool {
    let Some(type_condition) = type_condition else {
        return true;
    };
    if type_condition == runtime_type {
        return true;
    }
    match schema.types.get(type_condition) {
        Some(ExtendedType::Interface(_)) => matches!(
            schema.types.get(runtime_type),
            Some(ExtendedType::Object(object))
                if object.implements_interfaces.contains(type_condition)
        ),
        Some(ExtendedType::Union(union_)) => union_.members.contains(runtime_type),
        _ => false,
    }
}
