//! Component schemas: named, typed properties with declared defaults.
//!
//! A [`Schema`] is checked against a sealed [`TypeRegistry`] when it is
//! built, so a misconfigured default fails at setup instead of at first use.
//! Attribute text uses the `name: value; other: value` form.

use tracing::{debug, warn};

use super::error::PropertyError;
use super::registry::{Sealed, TypeRegistry};
use super::resource::ResourceResolver;
use super::types::{ParseContext, PropertyType};
use super::value::PropertyValue;

/// Declaration of a single schema property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub type_name: String,
    pub default: PropertyValue,
}

impl PropertyDecl {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        default: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            default: default.into(),
        }
    }
}

/// Parsed property values in schema order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    values: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropertyValue::as_int)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug)]
struct Field<'r> {
    decl: PropertyDecl,
    ty: &'r PropertyType,
}

/// A validated set of property declarations.
#[derive(Debug)]
pub struct Schema<'r> {
    fields: Vec<Field<'r>>,

    // Latest (raw text, parsed value) per field, cacheable types only
    cache: Vec<Option<(String, PropertyValue)>>,
}

impl<'r> Schema<'r> {
    /// Resolves every declaration against `registry`.
    ///
    /// Fails on unknown types, defaults of the wrong shape and repeated
    /// property names.
    pub fn new(
        registry: &'r TypeRegistry<Sealed>,
        decls: impl IntoIterator<Item = PropertyDecl>,
    ) -> Result<Self, PropertyError> {
        let mut fields: Vec<Field<'r>> = Vec::new();
        for decl in decls {
            if fields.iter().any(|field| field.decl.name == decl.name) {
                return Err(PropertyError::DuplicateProperty(decl.name));
            }
            registry.validate_default(&decl.name, &decl.type_name, &decl.default)?;
            let ty = registry.lookup(&decl.type_name)?;
            fields.push(Field { decl, ty });
        }
        debug!("Built schema with {} properties", fields.len());

        Ok(Self {
            cache: vec![None; fields.len()],
            fields,
        })
    }

    pub fn decls(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.fields.iter().map(|field| &field.decl)
    }

    /// Parses `name: value; ...` attribute text.
    ///
    /// Unknown names and segments without a `:` are skipped with a warning.
    pub fn parse_attribute(
        &mut self,
        resolver: &dyn ResourceResolver,
        text: &str,
    ) -> Properties {
        let mut pairs = Vec::new();
        for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            match segment.split_once(':') {
                Some((name, raw)) => pairs.push((name.trim(), PropertyValue::from(raw.trim()))),
                None => warn!("Ignoring malformed attribute segment \"{}\"", segment),
            }
        }
        self.parse_values(resolver, pairs)
    }

    /// Parses structured `(name, value)` input. Properties without input
    /// take their declared default through the type's parse.
    pub fn parse_values<'v>(
        &mut self,
        resolver: &dyn ResourceResolver,
        values: impl IntoIterator<Item = (&'v str, PropertyValue)>,
    ) -> Properties {
        let mut inputs: Vec<Option<PropertyValue>> = vec![None; self.fields.len()];
        for (name, value) in values {
            match self.fields.iter().position(|field| field.decl.name == name) {
                Some(index) => inputs[index] = Some(value),
                None => warn!("Unknown property `{}` ignored", name),
            }
        }

        let mut out = Vec::with_capacity(self.fields.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let value = self.parse_field(index, input, resolver);
            out.push((self.fields[index].decl.name.clone(), value));
        }
        Properties { values: out }
    }

    fn parse_field(
        &mut self,
        index: usize,
        input: Option<PropertyValue>,
        resolver: &dyn ResourceResolver,
    ) -> PropertyValue {
        let field = &self.fields[index];
        let input = input.unwrap_or_else(|| field.decl.default.clone());
        let ctx = ParseContext {
            default: &field.decl.default,
            resolver,
        };

        let raw = match &input {
            PropertyValue::String(raw) if field.ty.is_cacheable() => raw.clone(),
            _ => return field.ty.parse_value(&input, &ctx),
        };
        if let Some((_, hit)) = self.cache[index].as_ref().filter(|(key, _)| *key == raw) {
            return hit.clone();
        }
        let parsed = field.ty.parse_value(&input, &ctx);
        self.cache[index] = Some((raw, parsed.clone()));
        parsed
    }

    /// Renders properties back into attribute text, in schema order.
    pub fn stringify(&self, properties: &Properties) -> String {
        self.fields
            .iter()
            .filter_map(|field| {
                properties
                    .get(&field.decl.name)
                    .map(|value| format!("{}: {}", field.decl.name, field.ty.stringify_value(value)))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Whether two parsed property sets differ in any property, per each
    /// property type's equality.
    pub fn differs(&self, a: &Properties, b: &Properties) -> bool {
        self.fields.iter().any(|field| {
            match (a.get(&field.decl.name), b.get(&field.decl.name)) {
                (Some(a), Some(b)) => !field.ty.values_equal(a, b),
                (None, None) => false,
                _ => true,
            }
        })
    }

    /// Number of memoized parse results.
    pub fn cached(&self) -> usize {
        self.cache.iter().flatten().count()
    }
}
