//! Host resources behind the `asset` and `selector` property types.
//!
//! The property core never inspects concrete host objects. It sees them
//! through [`ResourceHandle`] and finds them through a [`ResourceResolver`]
//! supplied by the host on every parse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared handle to a host resource.
pub type ResourceRef = Arc<dyn ResourceHandle>;

// Resource kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Canvas,
    Video,
    Image,
    Audio,
    /// A preloaded asset item (model, map, ...).
    Asset,
    Element,
}

impl ResourceKind {
    /// Maps a document tag name onto a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "canvas" => Self::Canvas,
            "video" => Self::Video,
            "img" | "image" => Self::Image,
            "audio" => Self::Audio,
            "a-asset-item" | "asset" => Self::Asset,
            _ => Self::Element,
        }
    }

    /// Surfaces that are consumed as live handles instead of by location.
    pub fn is_media_surface(self) -> bool {
        matches!(self, Self::Canvas | Self::Video | Self::Image)
    }
}

/// Capability view of a host resource.
pub trait ResourceHandle: fmt::Debug + Send + Sync {
    /// Document identifier, if the resource has one.
    fn identifier(&self) -> Option<&str>;

    /// Declared resource location (`src`), if any.
    fn resource_location(&self) -> Option<&str>;

    fn kind(&self) -> ResourceKind;
}

/// Lookup of host resources by identifier or structural query.
///
/// Calls are synchronous. Implementations return `None`/empty on a miss;
/// callers decide whether a miss is worth a warning.
pub trait ResourceResolver {
    fn element_by_id(&self, id: &str) -> Option<ResourceRef>;

    /// First match of a structural selector.
    fn query_selector(&self, selector: &str) -> Option<ResourceRef>;

    /// All matches of a structural selector, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ResourceRef>;
}

/// Resolver for hosts without a document. Every lookup misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResources;

impl ResourceResolver for NoResources {
    fn element_by_id(&self, _id: &str) -> Option<ResourceRef> {
        None
    }

    fn query_selector(&self, _selector: &str) -> Option<ResourceRef> {
        None
    }

    fn query_selector_all(&self, _selector: &str) -> Vec<ResourceRef> {
        Vec::new()
    }
}

/// A resource declared in configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl ResourceHandle for ResourceEntry {
    fn identifier(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn resource_location(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::from_tag(&self.tag)
    }
}

impl ResourceEntry {
    // Matches one simple selector: `#id`, `.class` or a tag name.
    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.identifier() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            !selector.is_empty() && self.tag.eq_ignore_ascii_case(selector)
        }
    }
}

/// In-memory document of [`ResourceEntry`] items.
///
/// Supports selector lists (`"#a, .b, video"`) built from simple
/// selectors; combinators are not supported and match nothing.
#[derive(Clone, Debug, Default)]
pub struct ResourceTable {
    entries: Vec<Arc<ResourceEntry>>,
}

impl ResourceTable {
    pub fn new(entries: impl IntoIterator<Item = ResourceEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matching<'a>(&'a self, selector: &'a str) -> impl Iterator<Item = ResourceRef> + 'a {
        let parts: Vec<&str> = selector.split(',').map(str::trim).collect();
        self.entries
            .iter()
            .filter(move |entry| parts.iter().any(|part| entry.matches(part)))
            .map(|entry| Arc::clone(entry) as ResourceRef)
    }
}

impl ResourceResolver for ResourceTable {
    fn element_by_id(&self, id: &str) -> Option<ResourceRef> {
        self.entries
            .iter()
            .find(|entry| entry.identifier() == Some(id))
            .map(|entry| Arc::clone(entry) as ResourceRef)
    }

    fn query_selector(&self, selector: &str) -> Option<ResourceRef> {
        self.matching(selector).next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ResourceRef> {
        self.matching(selector).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResourceTable {
        ResourceTable::new([
            ResourceEntry {
                id: Some("sky".into()),
                tag: "img".into(),
                src: Some("sky.png".into()),
                classes: vec!["env".into()],
            },
            ResourceEntry {
                id: Some("tree".into()),
                tag: "a-asset-item".into(),
                src: Some("tree.glb".into()),
                classes: vec!["env".into()],
            },
            ResourceEntry {
                id: None,
                tag: "video".into(),
                src: Some("intro.mp4".into()),
                classes: vec![],
            },
        ])
    }

    #[test]
    fn lookup_by_id() {
        let table = table();
        let tree = table.element_by_id("tree").unwrap();
        assert_eq!(tree.resource_location(), Some("tree.glb"));
        assert_eq!(tree.kind(), ResourceKind::Asset);
        assert!(table.element_by_id("missing").is_none());
    }

    #[test]
    fn selector_lists_keep_document_order() {
        let table = table();
        let found = table.query_selector_all("video, #sky");
        let locations: Vec<_> = found.iter().map(|r| r.resource_location()).collect();
        assert_eq!(locations, vec![Some("sky.png"), Some("intro.mp4")]);
        assert_eq!(table.query_selector_all(".env").len(), 2);
        assert!(table.query_selector("div > span").is_none());
    }

    #[test]
    fn media_surfaces() {
        assert!(ResourceKind::from_tag("CANVAS").is_media_surface());
        assert!(ResourceKind::Image.is_media_surface());
        assert!(!ResourceKind::Asset.is_media_surface());
    }
}
