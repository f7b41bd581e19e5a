use std::cell::RefCell;
use std::sync::Arc;

use apollo_compiler::ExecutableDocument;
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::executable::Field;
use apollo_compiler::validation::Valid;
use apollo_entity_completion::CompletionError;
use apollo_entity_completion::Entity;
use apollo_entity_completion::FederationMetadata;
use apollo_entity_completion::FieldMap;
use apollo_entity_completion::MergeFields;
use apollo_entity_completion::MergeRequest;
use apollo_entity_completion::Origin;
use apollo_entity_completion::QueryContext;
use apollo_entity_completion::Subgraph;
use apollo_entity_completion::json_ext::Object;
use serde_json_bytes::json;

const GATEWAY: &str = r#"
  type Query {
    product(id: ID!): Product
    node(id: ID!): Node
    search: [SearchResult]
    me: User
  }

  interface Node { id: ID! }

  type Product implements Node {
    id: ID!
    upc: String!
    name: String
    price: Int
    weight: Int
    shippingEstimate: Int
    reviews: [Review]
  }

  type Review implements Node {
    id: ID!
    body: String
    product: Product
  }

  type User {
    id: ID!
    username: String
  }

  union SearchResult = Product | Review
"#;

const PRODUCTS: &str = r#"
  type Query { product(id: ID!): Product }
  type Product { id: ID! upc: String! name: String }
"#;

const INVENTORY: &str = r#"
  type Query { inventory: [Product] }
  type Product { id: ID! upc: String! price: Int weight: Int shippingEstimate: Int }
"#;

const REVIEWS: &str = r#"
  type Query { reviews: [Review] }
  type Product { id: ID! reviews: [Review] }
  type Review { id: ID! body: String product: Product }
"#;

const ACCOUNTS: &str = r#"
  type Query { me: User }
  type User { id: ID! username: String }
"#;

fn subgraph(name: &str, schema: &str) -> Arc<Subgraph> {
    Arc::new(
        Subgraph::parse_and_validate(name, &format!("http://{name}.example.com"), schema).unwrap(),
    )
}

/// A gateway over four origins.
///
/// - `products` serves `Product` directly.
/// - `inventory` is configured to expose only `id upc price weight` of `Product`, although its
///   schema also declares `shippingEstimate`.
/// - `reviews` serves `Product` and `Review` directly, and is the only origin for `Review`.
/// - `accounts` serves `User`, which is not a merged type.
///
/// `Product` always needs `id`, and `shippingEstimate` needs `price weight`.
pub(crate) struct Graph {
    pub(crate) schema: Valid<Schema>,
    pub(crate) products: Origin,
    pub(crate) inventory: Origin,
    pub(crate) reviews: Origin,
    pub(crate) accounts: Origin,
    pub(crate) metadata: FederationMetadata,
}

impl Graph {
    pub(crate) fn new() -> Self {
        let schema = Schema::parse_and_validate(GATEWAY, "gateway.graphql").unwrap();
        let products = Origin::Direct(subgraph("products", PRODUCTS));
        let inventory = Origin::Configured(subgraph("inventory", INVENTORY));
        let reviews = Origin::Direct(subgraph("reviews", REVIEWS));
        let accounts = Origin::Direct(subgraph("accounts", ACCOUNTS));

        let mut builder = FederationMetadata::builder(&schema);
        builder
            .add_origin("Product", products.clone())
            .unwrap()
            .add_origin_with_fields(
                "Product",
                inventory.clone(),
                field_map(&["id", "upc", "price", "weight"]),
            )
            .unwrap()
            .add_origin("Product", reviews.clone())
            .unwrap()
            .add_origin("Review", reviews.clone())
            .unwrap()
            .type_selection_set("Product", "id")
            .unwrap()
            .field_selection_set("Product", "shippingEstimate", "price weight")
            .unwrap();
        let metadata = builder.build();

        Self {
            schema,
            products,
            inventory,
            reviews,
            accounts,
            metadata,
        }
    }

    pub(crate) fn request(&self, query: &str) -> Request {
        Request::new(
            ExecutableDocument::parse_and_validate(&self.schema, query, "query.graphql")
                .unwrap(),
        )
    }

    /// Parses `query` without validating it, to allow documents the validation rules reject.
    pub(crate) fn unvalidated_request(&self, query: &str) -> Request {
        Request::new(Valid::assume_valid(
            ExecutableDocument::parse(&self.schema, query, "query.graphql").unwrap(),
        ))
    }
}

/// One operation, resolving the entity returned by its root fields.
pub(crate) struct Request {
    pub(crate) document: Valid<ExecutableDocument>,
    pub(crate) field_nodes: Vec<Node<Field>>,
    pub(crate) variables: Object,
}

impl Request {
    fn new(document: Valid<ExecutableDocument>) -> Self {
        let field_nodes = document
            .operations
            .get(None)
            .unwrap()
            .selection_set
            .selections
            .iter()
            .filter_map(|selection| selection.as_field().cloned())
            .collect();
        Self {
            document,
            field_nodes,
            variables: Object::new(),
        }
    }

    pub(crate) fn with_variables(mut self, variables: serde_json_bytes::Value) -> Self {
        self.variables = variables.as_object().cloned().unwrap_or_default();
        self
    }

    /// A context with the gateway's federation metadata attached.
    pub(crate) fn context<'a>(&'a self, graph: &'a Graph) -> QueryContext<'a> {
        self.context_without_metadata(graph)
            .with_metadata(&graph.metadata)
    }

    pub(crate) fn context_without_metadata<'a>(&'a self, graph: &'a Graph) -> QueryContext<'a> {
        QueryContext::new(
            &graph.schema,
            &self.field_nodes,
            &self.document.fragments,
            &self.variables,
        )
    }
}

fn field_map(fields: &[&str]) -> FieldMap {
    fields
        .iter()
        .map(|field| Name::new(field).unwrap())
        .collect()
}

pub(crate) fn entity(data: serde_json_bytes::Value) -> Entity {
    Entity::from(data.as_object().cloned().unwrap())
}

pub(crate) fn product() -> Entity {
    entity(json!({ "__typename": "Product", "id": "1", "name": "Table" }))
}

/// What a [`Recorder`] was asked to merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RecordedMerge {
    pub(crate) type_name: String,
    pub(crate) residual_fields: Vec<String>,
    pub(crate) source_origins: Vec<String>,
    pub(crate) target_origins: Vec<String>,
}

/// A merge collaborator that records its requests and adds `merged: true` to entities.
#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) merges: RefCell<Vec<RecordedMerge>>,
}

impl MergeFields for Recorder {
    type Error = CompletionError;

    fn merge_fields(&self, request: MergeRequest<'_>) -> Result<Entity, Self::Error> {
        self.merges.borrow_mut().push(RecordedMerge {
            type_name: request.type_name.to_string(),
            residual_fields: request
                .residual_fields
                .iter()
                .map(|field| field.response_key().to_string())
                .collect(),
            source_origins: names(&request.source_origins),
            target_origins: names(&request.target_origins),
        });
        let mut entity = request.entity;
        entity.data.insert("merged", json!(true));
        Ok(entity)
    }
}

fn names(origins: &[Origin]) -> Vec<String> {
    origins
        .iter()
        .map(|origin| origin.name().to_owned())
        .collect()
}
