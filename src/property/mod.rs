//! Typed component properties
//!
//! A property type is a named coercion contract: a default value plus the
//! functions that parse external input, stringify internal values and
//! compare them. The pieces, leaves first:
//!
//! 1. [`coords`] - vector parsing for `vec2`/`vec3`/`vec4`
//! 2. [`types`] - descriptors and the built-in contracts
//! 3. [`registry`] - name -> descriptor table with a sealed phase
//! 4. [`validate`] - shape checks for declared defaults
//! 5. [`schema`] - declared properties parsed from attribute text
//!
//! # Data flow
//!
//! ```text
//! attribute text ──► Schema ──parse──► Properties ──stringify──► text
//!                      │
//!                      └──► TypeRegistry<Sealed> ──► ResourceResolver (host)
//! ```

pub mod coords;
pub mod error;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod types;
pub mod validate;
pub mod value;

pub use coords::Vector;
pub use error::PropertyError;
pub use registry::{Registering, RegistryPhase, Sealed, TypeRegistry};
pub use resource::{
    NoResources, ResourceEntry, ResourceHandle, ResourceKind, ResourceRef, ResourceResolver,
    ResourceTable,
};
pub use schema::{Properties, PropertyDecl, Schema};
pub use types::{ParseContext, PropertyKind, PropertyType};
pub use validate::is_valid_default_value;
pub use value::PropertyValue;
