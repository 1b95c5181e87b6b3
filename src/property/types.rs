//! Property type descriptors and the built-in coercion contracts.

use std::fmt;

use tracing::warn;

use super::coords::{self, Vector};
use super::resource::{ResourceHandle, ResourceResolver};
use super::value::PropertyValue;

/// Everything a parse function may consult besides its input.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    /// Effective default: the declared default of the property being
    /// parsed, or the type's own default.
    pub default: &'a PropertyValue,
    pub resolver: &'a dyn ResourceResolver,
}

impl fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

pub type ParseFn = fn(&PropertyValue, &ParseContext<'_>) -> PropertyValue;
pub type StringifyFn = fn(&PropertyValue) -> String;
pub type EqualsFn = fn(&PropertyValue, &PropertyValue) -> bool;

/// Descriptor of a named property type.
///
/// Built with [`PropertyType::new`] and the chained setters; anything left
/// unset falls back to identity parse, `Display` stringify and value
/// equality.
#[derive(Clone)]
pub struct PropertyType {
    name: String,
    default: PropertyValue,
    parse: ParseFn,
    stringify: StringifyFn,
    equals: EqualsFn,
    cacheable: bool,
    kind: Option<PropertyKind>,
}

impl PropertyType {
    pub fn new(name: impl Into<String>, default: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            parse: default_parse,
            stringify: default_stringify,
            equals: default_equals,
            cacheable: true,
            kind: None,
        }
    }

    #[must_use]
    pub fn parse(mut self, parse: ParseFn) -> Self {
        self.parse = parse;
        self
    }

    #[must_use]
    pub fn stringify(mut self, stringify: StringifyFn) -> Self {
        self.stringify = stringify;
        self
    }

    #[must_use]
    pub fn equals(mut self, equals: EqualsFn) -> Self {
        self.equals = equals;
        self
    }

    #[must_use]
    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &PropertyValue {
        &self.default
    }

    /// Whether a parsed value may be memoized instead of parsing again.
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Built-in kind, `None` for types registered by the host.
    pub fn kind(&self) -> Option<PropertyKind> {
        self.kind
    }

    pub fn parse_value(&self, input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
        (self.parse)(input, ctx)
    }

    pub fn stringify_value(&self, value: &PropertyValue) -> String {
        (self.stringify)(value)
    }

    pub fn values_equal(&self, a: &PropertyValue, b: &PropertyValue) -> bool {
        (self.equals)(a, b)
    }
}

impl fmt::Debug for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyType")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("cacheable", &self.cacheable)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The closed set of built-in property types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Audio,
    Array,
    Asset,
    Boolean,
    Color,
    Int,
    Number,
    Map,
    Model,
    Selector,
    SelectorAll,
    Src,
    String,
    Time,
    Vec2,
    Vec3,
    Vec4,
}

impl PropertyKind {
    pub const ALL: [Self; 17] = [
        Self::Audio,
        Self::Array,
        Self::Asset,
        Self::Boolean,
        Self::Color,
        Self::Int,
        Self::Number,
        Self::Map,
        Self::Model,
        Self::Selector,
        Self::SelectorAll,
        Self::Src,
        Self::String,
        Self::Time,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
    ];

    /// Wire name of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Array => "array",
            Self::Asset => "asset",
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Int => "int",
            Self::Number => "number",
            Self::Map => "map",
            Self::Model => "model",
            Self::Selector => "selector",
            Self::SelectorAll => "selectorAll",
            Self::Src => "src",
            Self::String => "string",
            Self::Time => "time",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Number of vector components, `None` for non-vector kinds.
    pub fn arity(self) -> Option<usize> {
        match self {
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 => Some(4),
            _ => None,
        }
    }

    /// The descriptor this kind registers with.
    pub fn descriptor(self) -> PropertyType {
        let ty = match self {
            Self::Audio | Self::Asset | Self::Map | Self::Model => PropertyType::new(self.name(), "")
                .parse(asset_parse)
                .stringify(asset_stringify),
            Self::Src => PropertyType::new(self.name(), "")
                .parse(src_parse)
                .stringify(asset_stringify),
            Self::Array => PropertyType::new(self.name(), PropertyValue::Array(Vec::new()))
                .parse(array_parse)
                .stringify(array_stringify)
                .equals(array_equals),
            Self::Boolean => PropertyType::new(self.name(), false).parse(bool_parse),
            Self::Color => PropertyType::new(self.name(), "#FFF"),
            Self::String => PropertyType::new(self.name(), ""),
            Self::Int | Self::Time => PropertyType::new(self.name(), 0_i64).parse(int_parse),
            Self::Number => PropertyType::new(self.name(), 0.0).parse(number_parse),
            Self::Selector => PropertyType::new(self.name(), PropertyValue::Null)
                .parse(selector_parse)
                .stringify(selector_stringify)
                .cacheable(false),
            Self::SelectorAll => PropertyType::new(self.name(), PropertyValue::Null)
                .parse(selector_all_parse)
                .stringify(selector_all_stringify)
                .equals(array_equals)
                .cacheable(false),
            Self::Vec2 => PropertyType::new(self.name(), VEC2_ZERO).parse(vec2_parse),
            Self::Vec3 => PropertyType::new(self.name(), VEC3_ZERO).parse(vec3_parse),
            Self::Vec4 => PropertyType::new(self.name(), VEC4_IDENTITY).parse(vec4_parse),
        };
        let ty = if self.arity().is_some() {
            ty.stringify(vec_stringify).equals(coords::equals)
        } else {
            ty
        };
        PropertyType {
            kind: Some(self),
            ..ty
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const VEC2_ZERO: Vector = Vector::vec2(0.0, 0.0);
const VEC3_ZERO: Vector = Vector::vec3(0.0, 0.0, 0.0);
const VEC4_IDENTITY: Vector = Vector::vec4(0.0, 0.0, 0.0, 1.0);

// Structural selector characters; a `#id` containing any of them is a query.
const SELECTOR_STRUCTURE: [char; 8] = [',', '>', ' ', '.', '[', ']', ':', '\t'];

pub fn default_parse(input: &PropertyValue, _ctx: &ParseContext<'_>) -> PropertyValue {
    input.clone()
}

pub fn default_stringify(value: &PropertyValue) -> String {
    value.to_string()
}

pub fn default_equals(a: &PropertyValue, b: &PropertyValue) -> bool {
    a == b
}

fn bool_parse(input: &PropertyValue, _ctx: &ParseContext<'_>) -> PropertyValue {
    let is_false = matches!(input, PropertyValue::Bool(false))
        || matches!(input, PropertyValue::String(s) if s == "false");
    PropertyValue::Bool(!is_false)
}

fn int_parse(input: &PropertyValue, _ctx: &ParseContext<'_>) -> PropertyValue {
    let parsed = match input {
        PropertyValue::Int(i) => Some(*i),
        PropertyValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        PropertyValue::String(s) => parse_int(s),
        _ => None,
    };
    parsed.map_or(PropertyValue::Number(f64::NAN), PropertyValue::Int)
}

fn number_parse(input: &PropertyValue, _ctx: &ParseContext<'_>) -> PropertyValue {
    PropertyValue::Number(match input {
        PropertyValue::Int(i) => *i as f64,
        PropertyValue::Number(n) => *n,
        PropertyValue::String(s) => parse_float(s),
        _ => f64::NAN,
    })
}

fn array_parse(input: &PropertyValue, _ctx: &ParseContext<'_>) -> PropertyValue {
    match input {
        PropertyValue::Array(_) => input.clone(),
        PropertyValue::String(s) if !s.is_empty() => PropertyValue::Array(
            s.split(',')
                .map(|segment| PropertyValue::String(segment.trim().to_string()))
                .collect(),
        ),
        _ => PropertyValue::Array(Vec::new()),
    }
}

fn array_stringify(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Array(items) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => default_stringify(other),
    }
}

/// Element-wise equality for sequences of equal length; anything else
/// compares by value.
pub fn array_equals(a: &PropertyValue, b: &PropertyValue) -> bool {
    match (a, b) {
        (PropertyValue::Array(a), PropertyValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a == b)
        }
        _ => a == b,
    }
}

fn vec_parse(input: &PropertyValue, ctx: &ParseContext<'_>, zero: &Vector) -> PropertyValue {
    let base = coords::to_vector(ctx.default, zero);
    coords::parse(input, &base)
}

fn vec2_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    vec_parse(input, ctx, &VEC2_ZERO)
}

fn vec3_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    vec_parse(input, ctx, &VEC3_ZERO)
}

fn vec4_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    vec_parse(input, ctx, &VEC4_IDENTITY)
}

fn vec_stringify(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Vector(vector) => coords::stringify(vector),
        other => default_stringify(other),
    }
}

// Body of the first `url(...)`, up to the last closing parenthesis.
fn url_body(text: &str) -> Option<&str> {
    let start = text.find("url(")? + "url(".len();
    let rest = &text[start..];
    let close = rest.rfind(')')?;
    (close > 0).then(|| &rest[..close])
}

fn asset_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    let PropertyValue::String(text) = input else {
        return input.clone();
    };

    if let Some(body) = url_body(text) {
        return PropertyValue::String(body.to_string());
    }

    if let Some(id) = text.strip_prefix('#') {
        return match ctx.resolver.element_by_id(id) {
            Some(handle) if handle.kind().is_media_surface() => PropertyValue::Resource(handle),
            Some(handle) => handle
                .resource_location()
                .map_or(PropertyValue::Null, |location| {
                    PropertyValue::String(location.to_string())
                }),
            None => {
                warn!("\"{}\" asset not found.", text);
                PropertyValue::Null
            }
        };
    }

    input.clone()
}

fn asset_stringify(value: &PropertyValue) -> String {
    if let PropertyValue::Resource(handle) = value {
        if let Some(id) = handle.identifier() {
            return format!("#{id}");
        }
        if let Some(location) = handle.resource_location() {
            return location.to_string();
        }
    }
    default_stringify(value)
}

fn src_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    warn!("`src` property type is deprecated. Use `asset` instead.");
    asset_parse(input, ctx)
}

fn selector_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    if input.is_falsy() {
        return PropertyValue::Null;
    }
    let PropertyValue::String(selector) = input else {
        return input.clone();
    };

    if let Some(id) = selector.strip_prefix('#') {
        if !id.contains(SELECTOR_STRUCTURE) {
            return match ctx.resolver.element_by_id(id) {
                Some(handle) => PropertyValue::Resource(handle),
                None => {
                    warn!("\"{}\" selector matched no element.", selector);
                    PropertyValue::Null
                }
            };
        }
    }

    ctx.resolver
        .query_selector(selector)
        .map_or(PropertyValue::Null, PropertyValue::Resource)
}

fn selector_stringify(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Resource(handle) => match handle.identifier() {
            Some(id) => format!("#{id}"),
            None => default_stringify(value),
        },
        other => default_stringify(other),
    }
}

fn selector_all_parse(input: &PropertyValue, ctx: &ParseContext<'_>) -> PropertyValue {
    if input.is_falsy() {
        return PropertyValue::Null;
    }
    match input {
        PropertyValue::String(selector) => PropertyValue::Array(
            ctx.resolver
                .query_selector_all(selector)
                .into_iter()
                .map(PropertyValue::Resource)
                .collect(),
        ),
        other => other.clone(),
    }
}

fn selector_all_stringify(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Array(items) => items
            .iter()
            .map(selector_stringify)
            .collect::<Vec<_>>()
            .join(", "),
        other => default_stringify(other),
    }
}

/// Base-10 integer prefix of `text`, after leading whitespace.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Longest floating-point prefix of `text`, after leading whitespace.
/// `NaN` when there is none.
pub(crate) fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let digits_from = |start: usize| start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(s.starts_with(['+', '-']));
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_end = digits_from(end);
    let mut mantissa = int_end - end;
    end = int_end;
    if end < len && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        mantissa += frac_end - (end + 1);
        if mantissa > 0 {
            end = frac_end;
        }
    }
    if mantissa == 0 {
        return f64::NAN;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < len && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::resource::{NoResources, ResourceEntry, ResourceHandle, ResourceTable};

    fn parse(kind: PropertyKind, input: impl Into<PropertyValue>) -> PropertyValue {
        parse_with(kind, input, &NoResources)
    }

    fn parse_with(
        kind: PropertyKind,
        input: impl Into<PropertyValue>,
        resolver: &dyn ResourceResolver,
    ) -> PropertyValue {
        let ty = kind.descriptor();
        let ctx = ParseContext {
            default: ty.default_value(),
            resolver,
        };
        ty.parse_value(&input.into(), &ctx)
    }

    fn assets() -> ResourceTable {
        ResourceTable::new([
            ResourceEntry {
                id: Some("model".into()),
                tag: "a-asset-item".into(),
                src: Some("tree.glb".into()),
                classes: vec![],
            },
            ResourceEntry {
                id: Some("screen".into()),
                tag: "canvas".into(),
                src: None,
                classes: vec!["ui".into()],
            },
            ResourceEntry {
                id: Some("panel".into()),
                tag: "div".into(),
                src: None,
                classes: vec!["ui".into()],
            },
        ])
    }

    #[test]
    fn boolean_only_false_is_false() {
        assert_eq!(parse(PropertyKind::Boolean, "false"), PropertyValue::Bool(false));
        assert_eq!(parse(PropertyKind::Boolean, false), PropertyValue::Bool(false));
        for input in ["true", "", "anything"] {
            assert_eq!(parse(PropertyKind::Boolean, input), PropertyValue::Bool(true));
        }
        assert_eq!(parse(PropertyKind::Boolean, true), PropertyValue::Bool(true));
    }

    #[test]
    fn int_parses_prefix() {
        assert_eq!(parse(PropertyKind::Int, "-12px"), PropertyValue::Int(-12));
        assert_eq!(parse(PropertyKind::Int, " 7"), PropertyValue::Int(7));
        assert_eq!(parse(PropertyKind::Int, 3.9), PropertyValue::Int(3));
        assert_eq!(parse(PropertyKind::Time, "250"), PropertyValue::Int(250));
        let PropertyValue::Number(n) = parse(PropertyKind::Int, "abc") else {
            panic!("unparseable int should be NaN");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn number_parses_prefix() {
        assert_eq!(parse(PropertyKind::Number, "1.5e2m"), PropertyValue::Number(150.0));
        assert_eq!(parse(PropertyKind::Number, ".5"), PropertyValue::Number(0.5));
        assert_eq!(parse(PropertyKind::Number, "-3."), PropertyValue::Number(-3.0));
        assert_eq!(parse(PropertyKind::Number, 4_i64), PropertyValue::Number(4.0));
        assert!(parse_float("e5").is_nan());
        assert!(parse_float(".").is_nan());
        assert_eq!(parse_float("2e"), 2.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn array_contract() {
        assert_eq!(
            parse(PropertyKind::Array, "a, b ,c"),
            PropertyValue::from(vec!["a", "b", "c"])
        );
        let passthrough = PropertyValue::from(vec![1_i64, 2]);
        assert_eq!(parse(PropertyKind::Array, passthrough.clone()), passthrough);
        assert_eq!(parse(PropertyKind::Array, PropertyValue::Null), PropertyValue::Array(vec![]));
        assert_eq!(parse(PropertyKind::Array, 5_i64), PropertyValue::Array(vec![]));
        assert_eq!(parse(PropertyKind::Array, ""), PropertyValue::Array(vec![]));

        let ty = PropertyKind::Array.descriptor();
        assert_eq!(ty.stringify_value(&PropertyValue::from(vec!["a", "b"])), "a, b");
    }

    #[test]
    fn array_equality() {
        let a = PropertyValue::from(vec!["a", "b"]);
        assert!(array_equals(&a, &PropertyValue::from(vec!["a", "b"])));
        assert!(!array_equals(&a, &PropertyValue::from(vec!["a"])));
        assert!(!array_equals(&a, &PropertyValue::from(vec!["a", "c"])));
        assert!(!array_equals(&a, &PropertyValue::from("a, b")));
        assert!(array_equals(&PropertyValue::Null, &PropertyValue::Null));
    }

    #[test]
    fn vec_parse_uses_declared_default() {
        let ty = PropertyKind::Vec3.descriptor();
        let declared = PropertyValue::Vector(Vector::vec3(1.0, 2.0, 3.0));
        let ctx = ParseContext {
            default: &declared,
            resolver: &NoResources,
        };
        assert_eq!(
            ty.parse_value(&"9".into(), &ctx),
            PropertyValue::Vector(Vector::vec3(9.0, 2.0, 3.0))
        );
        assert_eq!(
            parse(PropertyKind::Vec3, PropertyValue::Null),
            PropertyValue::Vector(Vector::vec3(0.0, 0.0, 0.0))
        );
        assert_eq!(
            parse(PropertyKind::Vec4, "1 2 3"),
            PropertyValue::Vector(Vector::vec4(1.0, 2.0, 3.0, 1.0))
        );
    }

    #[test]
    fn asset_contract() {
        let table = assets();
        assert_eq!(
            parse_with(PropertyKind::Asset, "url(a/b.png)", &table),
            PropertyValue::from("a/b.png")
        );
        assert_eq!(
            parse_with(PropertyKind::Model, "#model", &table),
            PropertyValue::from("tree.glb")
        );
        let screen = parse_with(PropertyKind::Map, "#screen", &table);
        assert_eq!(
            screen.as_resource().and_then(|h| h.identifier()),
            Some("screen")
        );
        assert_eq!(parse_with(PropertyKind::Audio, "#nope", &table), PropertyValue::Null);
        assert_eq!(
            parse_with(PropertyKind::Asset, "plain.mp3", &table),
            PropertyValue::from("plain.mp3")
        );
        assert_eq!(
            parse_with(PropertyKind::Src, "url(x.png)", &table),
            PropertyValue::from("x.png")
        );

        let ty = PropertyKind::Asset.descriptor();
        assert_eq!(ty.stringify_value(&screen), "#screen");
        assert_eq!(ty.stringify_value(&"plain.mp3".into()), "plain.mp3");
    }

    #[test]
    fn selector_contract() {
        let table = assets();
        assert_eq!(parse_with(PropertyKind::Selector, "", &table), PropertyValue::Null);
        let panel = parse_with(PropertyKind::Selector, "#panel", &table);
        assert_eq!(panel.as_resource().and_then(|h| h.identifier()), Some("panel"));
        let first_ui = parse_with(PropertyKind::Selector, ".ui", &table);
        assert_eq!(first_ui.as_resource().and_then(|h| h.identifier()), Some("screen"));
        assert_eq!(parse_with(PropertyKind::Selector, "#gone", &table), PropertyValue::Null);
        assert!(!PropertyKind::Selector.descriptor().is_cacheable());

        let ty = PropertyKind::Selector.descriptor();
        assert_eq!(ty.stringify_value(&panel), "#panel");
        let again = parse_with(PropertyKind::Selector, "#panel", &table);
        assert!(ty.values_equal(&panel, &again));
    }

    #[test]
    fn selector_all_contract() {
        let table = assets();
        let all = parse_with(PropertyKind::SelectorAll, ".ui", &table);
        let ty = PropertyKind::SelectorAll.descriptor();
        assert_eq!(ty.stringify_value(&all), "#screen, #panel");
        assert_eq!(all.as_array().map(<[_]>::len), Some(2));
        assert_eq!(parse_with(PropertyKind::SelectorAll, PropertyValue::Null, &table), PropertyValue::Null);
        assert!(!ty.is_cacheable());
    }

    #[test]
    fn kinds_round_trip_names() {
        for kind in PropertyKind::ALL {
            assert_eq!(PropertyKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.descriptor().kind(), Some(kind));
        }
        assert_eq!(PropertyKind::from_name("selectorall"), None);
    }
}
