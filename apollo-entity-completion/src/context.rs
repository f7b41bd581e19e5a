use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::executable::Field;
use apollo_compiler::executable::Fragment;
use apollo_compiler::validation::Valid;

use crate::json_ext::Object;
use crate::metadata::FederationMetadata;

/// What the client asked of one entity, as seen by the gateway while resolving it.
///
/// This is a read-only snapshot owned by the request: nothing in this crate mutates it, so one
/// context can back any number of concurrent completions.
#[derive(Clone, Copy, Debug)]
pub struct QueryContext<'a> {
    /// The gateway schema the operation is executed against.
    pub schema: &'a Valid<Schema>,
    /// The field nodes resolving to the entity. More than one when the field is requested
    /// several times under the same response key.
    pub field_nodes: &'a [Node<Field>],
    /// The named fragments of the operation.
    pub fragments: &'a IndexMap<Name, Node<Fragment>>,
    /// The variable values of the request.
    pub variables: &'a Object,
    /// Federation metadata attached to the gateway schema, if any.
    pub metadata: Option<&'a FederationMetadata>,
}

impl<'a> QueryContext<'a> {
    pub fn new(
        schema: &'a Valid<Schema>,
        field_nodes: &'a [Node<Field>],
        fragments: &'a IndexMap<Name, Node<Fragment>>,
        variables: &'a Object,
    ) -> Self {
        Self {
            schema,
            field_nodes,
            fragments,
            variables,
            metadata: None,
        }
    }

    pub fn with_metadata(self, metadata: &'a FederationMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..self
        }
    }
}
