//! # NGSI-LD JSON-LD Adapter
//!
//! Glue between the entity codec and whatever transport talks to a Context
//! Broker.
//!
//! ## Wire rules
//!
//! - Request bodies are `application/ld+json` with the context inlined as a
//!   sibling `@context` member of each entity
//! - Entities are validated in strict mode before they are encoded
//! - Error responses are RFC 7807 problem details or batch mixed results

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod payload;
pub mod problem;

pub use context::{LdContext, CORE_CONTEXT};
pub use payload::{batch_body, create_body, with_context, EntityWithContext, PayloadError};
pub use problem::{BatchOperationResult, BrokerError, ProblemDetails};
