//! Shape Registry
//!
//! Maps a declared `@type` to its shape. Built once, read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::error::{Result, SchemaError};
use crate::schema::Shape;
use crate::shapes;

/// Shapes closed to undeclared keys when no policy says otherwise
pub const DEFAULT_CLOSED_SHAPES: &[&str] = &["FAQPage"];

static DEFAULT_REGISTRY: Lazy<ShapeRegistry> = Lazy::new(ShapeRegistry::new);

/// Declared `@type` -> shape name
const DISPATCH: &[(&str, &str)] = &[
    ("Organization", "Organization"),
    ("Corporation", "Organization"),
    ("Person", "Person"),
    ("Article", "Article"),
    ("BlogPosting", "Article"),
    ("NewsArticle", "Article"),
    ("BreadcrumbList", "BreadcrumbList"),
    ("FAQPage", "FAQPage"),
    ("VideoObject", "VideoObject"),
    ("Product", "Product"),
];

/// Shape a `@type` (or a shape name) dispatches to
fn shape_for_type(name: &str) -> Option<&'static str> {
    DISPATCH
        .iter()
        .find(|(type_name, _)| *type_name == name)
        .map(|(_, shape)| *shape)
}

fn build_shape(shape_name: &str) -> Shape {
    match shape_name {
        "Organization" => shapes::organization(),
        "Person" => shapes::person(),
        "Article" => shapes::article(),
        "BreadcrumbList" => shapes::breadcrumb_list(),
        "FAQPage" => shapes::faq_page(),
        "VideoObject" => shapes::video_object(),
        "Product" => shapes::product(),
        other => unreachable!("no shape named {}", other),
    }
}

/// Type dispatcher over the built-in schema.org shapes
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    /// Declared `@type` -> shape. Aliases share one `Arc`.
    by_type: BTreeMap<&'static str, Arc<Shape>>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeRegistry {
    /// Registry with the default open/closed policy
    pub fn new() -> Self {
        Self::with_closed(DEFAULT_CLOSED_SHAPES.iter().copied())
    }

    /// Process-wide registry with the default policy
    pub fn global() -> &'static ShapeRegistry {
        &DEFAULT_REGISTRY
    }

    /// Registry where the named shapes reject undeclared top-level keys
    ///
    /// A name may be a shape ("Article") or any `@type` that dispatches to it
    /// ("BlogPosting"); either closes the whole shape. Unknown names are logged
    /// and skipped, see [`try_with_closed`](Self::try_with_closed) to reject them.
    pub fn with_closed<I, S>(closed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut closed_shapes = BTreeSet::new();
        for name in closed {
            let name = name.as_ref();
            match shape_for_type(name) {
                Some(shape) => {
                    closed_shapes.insert(shape);
                }
                None => warn!(name, "ignoring closed shape that matches no registered type"),
            }
        }
        Self::build(&closed_shapes)
    }

    /// Like [`with_closed`](Self::with_closed), but an unknown name is an error
    pub fn try_with_closed<I, S>(closed: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut closed_shapes = BTreeSet::new();
        for name in closed {
            let name = name.as_ref();
            let shape =
                shape_for_type(name).ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;
            closed_shapes.insert(shape);
        }
        Ok(Self::build(&closed_shapes))
    }

    fn build(closed: &BTreeSet<&'static str>) -> Self {
        let mut built: BTreeMap<&'static str, Arc<Shape>> = BTreeMap::new();
        let mut by_type = BTreeMap::new();

        for (type_name, shape_name) in DISPATCH {
            let shape = built
                .entry(*shape_name)
                .or_insert_with(|| {
                    let shape = build_shape(shape_name);
                    let open = !closed.contains(shape_name);
                    Arc::new(shape.with_open(open))
                })
                .clone();
            by_type.insert(*type_name, shape);
        }

        Self { by_type }
    }

    /// Exact, case-sensitive lookup
    pub fn resolve(&self, type_name: &str) -> Option<&Shape> {
        self.by_type.get(type_name).map(|s| s.as_ref())
    }

    /// Like [`resolve`](Self::resolve), but as an error for callers that need one
    pub fn require(&self, type_name: &str) -> Result<&Shape> {
        self.resolve(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }

    /// All dispatchable `@type` values, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        self.by_type.keys().copied().collect()
    }

    /// `(type name, shape)` pairs, sorted by type name
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &Shape)> {
        self.by_type.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Closest registered type for an unknown one (e.g. "blogposting")
    pub fn suggest(&self, type_name: &str) -> Option<&'static str> {
        if type_name.is_empty() || self.contains(type_name) {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        self.by_type
            .keys()
            .filter_map(|known| matcher.fuzzy_match(known, type_name).map(|score| (score, *known)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, known)| known)
    }
}
