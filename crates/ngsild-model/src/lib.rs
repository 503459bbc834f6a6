//! # NGSI-LD Model
//!
//! Typed NGSI-LD entities and a JSON-LD codec that preserves their recursive
//! attribute structure.
//!
//! This crate provides:
//! - Attribute kinds (Property, Relationship, GeoProperty) with nested attributes
//! - The entity aggregate with its well-known geo attributes
//! - Flat-splice encoding and multi-pass decoding of caller-named attributes
//! - Structural and strict validation
//!
//! All operations are synchronous and pure; nothing here performs I/O.
//!
//! ```
//! use ngsild_model::{Codec, Entity, Property, Relationship};
//!
//! let json = r#"{"id":"cabin:4","type":"thing",
//!     "light":{"type":"Property","value":100,
//!              "wall":{"type":"Relationship","object":"wall:right"}}}"#;
//! let entity = Entity::from_json_str(json).unwrap();
//! let light = entity.property("light").unwrap();
//! assert_eq!(light.attributes.relationship("wall").unwrap().object, "wall:right");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod attributes;
pub mod codec;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod validation;

pub use attribute::{Attribute, AttributeKind, GeoProperty, Property, Relationship};
pub use attributes::Attributes;
pub use codec::{decode, decode_attribute, encode, format_timestamp, Codec};
pub use entity::Entity;
pub use error::{Error, Schema};
pub use geometry::{Geometry, GeometryKind, Position};
pub use validation::Validate;
