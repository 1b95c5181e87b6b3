//! The property type registry.
//!
//! Types are registered during start-up while the registry is in the
//! [`Registering`] phase. [`TypeRegistry::seal`] moves it into the
//! [`Sealed`] phase, which is the only phase that can look types up. The
//! registry is therefore never mutated once lookups begin, and a sealed
//! registry can be shared freely between readers.
//!
//! ```text
//! TypeRegistry<Registering> ──seal()──► TypeRegistry<Sealed>
//!   register(), contains()               lookup(), parse(), stringify(), ...
//! ```

use statum::{machine, state};
use std::collections::HashMap;
use tracing::{debug, info};

use super::error::PropertyError;
use super::resource::ResourceResolver;
use super::types::{ParseContext, PropertyKind, PropertyType};
use super::validate::is_valid_default_value;
use super::value::PropertyValue;

// Registry phases
#[state]
#[derive(Debug, Clone)]
pub enum RegistryPhase {
    Registering,
    Sealed,
}

#[machine]
#[derive(Debug)]
pub struct TypeRegistry<S: RegistryPhase> {
    // Descriptors in registration order; built-ins first when present
    types: Vec<PropertyType>,

    // Name -> index into `types`
    by_name: HashMap<String, usize>,
}

// Available in every phase
impl<S: RegistryPhase> TypeRegistry<S> {
    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Type names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(PropertyType::name)
    }
}

impl TypeRegistry<Registering> {
    /// A registry with no types at all.
    pub fn empty() -> Self {
        Self::new(Vec::new(), HashMap::new())
    }

    /// A registry holding the built-in types, ready for host extensions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for kind in PropertyKind::ALL {
            registry.insert(kind.descriptor());
        }
        debug!("Registered {} built-in property types", registry.len());
        registry
    }

    /// Registers a new type.
    ///
    /// Fails with [`PropertyError::DuplicateType`] if the name is taken;
    /// the existing registration is left untouched.
    pub fn register(&mut self, ty: PropertyType) -> Result<(), PropertyError> {
        if self.contains(ty.name()) {
            return Err(PropertyError::DuplicateType(ty.name().to_string()));
        }
        debug!("Registering property type '{}'", ty.name());
        self.insert(ty);
        Ok(())
    }

    fn insert(&mut self, ty: PropertyType) {
        self.by_name.insert(ty.name().to_string(), self.types.len());
        self.types.push(ty);
    }

    /// Ends the registration phase.
    pub fn seal(self) -> TypeRegistry<Sealed> {
        info!("Sealing property type registry with {} types", self.types.len());
        self.transition()
    }
}

impl TypeRegistry<Sealed> {
    /// Looks up a type by name.
    pub fn lookup(&self, name: &str) -> Result<&PropertyType, PropertyError> {
        self.by_name
            .get(name)
            .map(|&index| &self.types[index])
            .ok_or_else(|| PropertyError::UnknownType(name.to_string()))
    }

    /// Direct access to a built-in type, skipping the name lookup when the
    /// built-ins were registered first.
    pub fn builtin(&self, kind: PropertyKind) -> Option<&PropertyType> {
        self.types
            .get(kind as usize)
            .filter(|ty| ty.kind() == Some(kind))
            .or_else(|| self.lookup(kind.name()).ok())
    }

    /// Parses `input` against the type's own default.
    pub fn parse(
        &self,
        type_name: &str,
        input: &PropertyValue,
        resolver: &dyn ResourceResolver,
    ) -> Result<PropertyValue, PropertyError> {
        let ty = self.lookup(type_name)?;
        let ctx = ParseContext {
            default: ty.default_value(),
            resolver,
        };
        Ok(ty.parse_value(input, &ctx))
    }

    pub fn stringify(&self, type_name: &str, value: &PropertyValue) -> Result<String, PropertyError> {
        Ok(self.lookup(type_name)?.stringify_value(value))
    }

    pub fn equals(
        &self,
        type_name: &str,
        a: &PropertyValue,
        b: &PropertyValue,
    ) -> Result<bool, PropertyError> {
        Ok(self.lookup(type_name)?.values_equal(a, b))
    }

    /// Checks a declared default against its type.
    ///
    /// Unknown type names fail here, unlike [`is_valid_default_value`]
    /// which lets them through.
    pub fn validate_default(
        &self,
        property: &str,
        type_name: &str,
        value: &PropertyValue,
    ) -> Result<(), PropertyError> {
        self.lookup(type_name)?;
        if is_valid_default_value(type_name, value) {
            Ok(())
        } else {
            Err(PropertyError::InvalidDefault {
                property: property.to_string(),
                type_name: type_name.to_string(),
                value: value.to_string(),
            })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyType> {
        self.types.iter()
    }
}
