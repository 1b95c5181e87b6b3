//! Coordinate codec for the `vec2`, `vec3` and `vec4` property types.
//!
//! Coordinates arrive either as text (`"1 2 3"`, `"1, 2, 3"`) or structured
//! (`{ x = 1, y = 2, z = 3 }`). Components missing from the input keep the
//! components of the base vector the caller supplies.

use super::types::parse_float;
use super::value::PropertyValue;

/// Component names in wire order.
pub const AXES: [&str; 4] = ["x", "y", "z", "w"];

/// A 2, 3 or 4 component vector. Arity is part of its identity.
#[derive(Clone, Copy, Debug)]
pub struct Vector {
    components: [f64; 4],
    arity: usize,
}

impl Vector {
    pub const fn vec2(x: f64, y: f64) -> Self {
        Self {
            components: [x, y, 0.0, 0.0],
            arity: 2,
        }
    }

    pub const fn vec3(x: f64, y: f64, z: f64) -> Self {
        Self {
            components: [x, y, z, 0.0],
            arity: 3,
        }
    }

    pub const fn vec4(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self {
            components: [x, y, z, w],
            arity: 4,
        }
    }

    /// Builds a vector from 2 to 4 components.
    pub fn from_slice(components: &[f64]) -> Option<Self> {
        if !(2..=4).contains(&components.len()) {
            return None;
        }
        let mut out = [0.0; 4];
        out[..components.len()].copy_from_slice(components);
        Some(Self {
            components: out,
            arity: components.len(),
        })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn components(&self) -> &[f64] {
        &self.components[..self.arity]
    }

    pub fn x(&self) -> f64 {
        self.components[0]
    }

    pub fn y(&self) -> f64 {
        self.components[1]
    }

    pub fn z(&self) -> Option<f64> {
        self.components().get(2).copied()
    }

    pub fn w(&self) -> Option<f64> {
        self.components().get(3).copied()
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }

    fn set(&mut self, index: usize, value: f64) {
        if index < self.arity {
            self.components[index] = value;
        }
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && self.components() == other.components()
    }
}

/// Parses `input` into a vector with the arity of `base`.
///
/// Null input yields a copy of `base`. Input shapes that carry no
/// coordinates at all also fall back to `base`.
pub fn parse(input: &PropertyValue, base: &Vector) -> PropertyValue {
    let mut out = *base;
    match input {
        PropertyValue::String(text) => {
            let tokens = text
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty());
            for (index, token) in tokens.take(base.arity()).enumerate() {
                out.set(index, parse_float(token));
            }
        }
        PropertyValue::Vector(vector) => {
            for (index, component) in vector.components().iter().enumerate() {
                out.set(index, *component);
            }
        }
        PropertyValue::Object(map) => {
            for (index, axis) in AXES.iter().take(base.arity()).enumerate() {
                if let Some(component) = map.get(*axis).and_then(component_value) {
                    out.set(index, component);
                }
            }
        }
        _ => {}
    }
    PropertyValue::Vector(out)
}

fn component_value(value: &PropertyValue) -> Option<f64> {
    match value {
        PropertyValue::String(text) => Some(parse_float(text)),
        other => other.as_number(),
    }
}

/// Components joined by single spaces, x first.
pub fn stringify(vector: &Vector) -> String {
    vector
        .components()
        .iter()
        .map(|c| PropertyValue::Number(*c).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn equals(a: &PropertyValue, b: &PropertyValue) -> bool {
    match (a, b) {
        (PropertyValue::Vector(a), PropertyValue::Vector(b)) => a == b,
        _ => a == b,
    }
}

/// Whether `value` is a well-formed default for a vector of `arity`
/// components: null, or exactly the named numeric fields, all finite.
pub fn is_coordinates(value: &PropertyValue, arity: usize) -> bool {
    match value {
        PropertyValue::Null => true,
        PropertyValue::Vector(vector) => vector.arity() == arity && vector.is_finite(),
        PropertyValue::Object(map) => {
            map.len() == arity
                && AXES[..arity].iter().all(|axis| {
                    matches!(map.get(*axis), Some(PropertyValue::Int(_)))
                        || matches!(map.get(*axis), Some(PropertyValue::Number(n)) if n.is_finite())
                })
        }
        _ => false,
    }
}

/// Reads `value` as a vector of `arity`, filling unspecified components
/// from `fallback`. Used to turn declared defaults into a parse base.
pub fn to_vector(value: &PropertyValue, fallback: &Vector) -> Vector {
    match parse(value, fallback) {
        PropertyValue::Vector(vector) => vector,
        _ => *fallback,
    }
}
