//! Completion of entities resolved by one origin of a federated graph.
//!
//! When an origin resolves a composite value, the client may have asked for fields that origin
//! does not serve. This crate works out which demanded fields are missing and which other
//! origins can serve the type, and hands that off to a [`MergeFields`] implementation which
//! fetches and merges them:
//!
//! - [`ResultAnnotator`] attaches errors and provenance to the entity and decides whether it
//!   needs completing.
//! - [`collect_demanded_fields`] computes every field demanded of the entity, including the
//!   selections [`FederationMetadata`] requires to re-resolve it elsewhere.
//! - [`fields_not_in_origin`] keeps the demanded fields the entity's origin cannot serve.
//!
//! Nothing here performs I/O or holds state between calls.
//!
//! ## Usage
//!
//! This crate is internal to [Apollo Router](https://www.apollographql.com/docs/router/)
//! and not intended to be used directly.

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

mod annotate;
mod collect_fields;
pub mod config;
mod context;
mod demand;
mod entity;
pub mod error;
mod gap;
pub mod graphql;
pub mod json_ext;
mod metadata;
mod origin;

pub use crate::annotate::MergeFields;
pub use crate::annotate::MergeRequest;
pub use crate::annotate::ResultAnnotator;
pub use crate::context::QueryContext;
pub use crate::demand::DemandedFieldSet;
pub use crate::demand::collect_demanded_fields;
pub use crate::entity::Entity;
pub use crate::error::CompletionError;
pub use crate::gap::ResidualFields;
pub use crate::gap::fields_not_in_origin;
pub use crate::metadata::FederationMetadata;
pub use crate::metadata::FederationMetadataBuilder;
pub use crate::metadata::MergedTypeInfo;
pub use crate::origin::FieldMap;
pub use crate::origin::Origin;
pub use crate::origin::Subgraph;
