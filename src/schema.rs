//! Shape and constraint types
//!
//! A [`Shape`] is plain data: a list of fields, each with a [`Constraint`], plus an
//! explicit open/closed flag. [`Constraint::check`] is the single recursive matcher
//! that walks a `serde_json::Value` against that data and collects [`Violation`]s.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::matchers::Matcher;

// =============================================================================
// Constraint tree
// =============================================================================

/// Primitive JSON kind a value must belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    /// Integer or float
    Number,
    Integer,
}

impl ValueKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Integer => write!(f, "integer"),
        }
    }
}

/// One node of a constraint tree
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Constraint {
    /// Exact string literal
    Literal(&'static str),
    /// One of a small set of string literals
    AnyLiteral(&'static [&'static str]),
    /// Primitive kind
    TypeOf(ValueKind),
    /// String matching a primitive matcher
    Pattern(Matcher),
    /// At least one alternative must hold
    OneOf(Vec<Constraint>),
    /// Nested object shape
    Shape(Shape),
    /// Array whose every element satisfies the inner constraint
    ArrayOf(Box<Constraint>),
    /// Unconstrained
    Any,
}

impl Constraint {
    pub fn string() -> Self {
        Constraint::TypeOf(ValueKind::String)
    }

    pub fn number() -> Self {
        Constraint::TypeOf(ValueKind::Number)
    }

    pub fn integer() -> Self {
        Constraint::TypeOf(ValueKind::Integer)
    }

    pub fn url() -> Self {
        Constraint::Pattern(Matcher::Url)
    }

    pub fn date() -> Self {
        Constraint::Pattern(Matcher::Date)
    }

    pub fn context() -> Self {
        Constraint::Pattern(Matcher::Context)
    }

    pub fn array_of(inner: Constraint) -> Self {
        Constraint::ArrayOf(Box::new(inner))
    }

    /// `inner` on its own, or an array of `inner`
    pub fn one_or_many(inner: Constraint) -> Self {
        Constraint::OneOf(vec![inner.clone(), Constraint::array_of(inner)])
    }

    /// Check `value` at `path`, appending every violation found
    pub fn check(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) {
        match self {
            Constraint::Literal(expected) => {
                if value.as_str() != Some(*expected) {
                    violations.push(Violation::new(
                        "LITERAL_MISMATCH",
                        format!("expected \"{}\", got {}", expected, preview(value)),
                        path,
                    ));
                }
            }

            Constraint::AnyLiteral(options) => {
                let ok = value.as_str().map(|s| options.contains(&s)).unwrap_or(false);
                if !ok {
                    violations.push(Violation::new(
                        "LITERAL_MISMATCH",
                        format!("expected one of {:?}, got {}", options, preview(value)),
                        path,
                    ));
                }
            }

            Constraint::TypeOf(kind) => {
                if !kind.accepts(value) {
                    violations.push(Violation::new(
                        "WRONG_KIND",
                        format!("expected {}, got {}", kind, preview(value)),
                        path,
                    ));
                }
            }

            Constraint::Pattern(matcher) => match value.as_str() {
                Some(s) if matcher.is_match(s) => {}
                _ => violations.push(Violation::new(
                    "PATTERN_MISMATCH",
                    format!("expected {}, got {}", matcher.label(), preview(value)),
                    path,
                )),
            },

            Constraint::OneOf(alternatives) => {
                let matched = alternatives.iter().any(|alt| {
                    let mut scratch = Vec::new();
                    alt.check(value, path, &mut scratch);
                    scratch.is_empty()
                });
                if !matched {
                    let described: Vec<String> = alternatives.iter().map(|a| a.to_string()).collect();
                    violations.push(Violation::new(
                        "NO_ALTERNATIVE",
                        format!("expected {}", described.join(" or ")),
                        path,
                    ));
                }
            }

            Constraint::Shape(shape) => shape.check_at(value, path, violations),

            Constraint::ArrayOf(inner) => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        inner.check(item, &format!("{}[{}]", path, i), violations);
                    }
                }
                None => violations.push(Violation::new(
                    "EXPECTED_ARRAY",
                    format!("expected array, got {}", preview(value)),
                    path,
                )),
            },

            Constraint::Any => {}
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Literal(s) => write!(f, "\"{}\"", s),
            Constraint::AnyLiteral(options) => write!(f, "{}", options.join("|")),
            Constraint::TypeOf(kind) => write!(f, "{}", kind),
            Constraint::Pattern(m) => write!(f, "{}", m.label()),
            Constraint::OneOf(alts) => {
                let parts: Vec<String> = alts.iter().map(|a| a.to_string()).collect();
                write!(f, "({})", parts.join(" | "))
            }
            Constraint::Shape(shape) => write!(f, "{}{{..}}", shape.name),
            Constraint::ArrayOf(inner) => write!(f, "[{}]", inner),
            Constraint::Any => write!(f, "any"),
        }
    }
}

// =============================================================================
// Shapes
// =============================================================================

/// A declared field of a shape
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub constraint: Constraint,
}

/// Required/optional fields of one object type
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    /// Display name (e.g. "Article", "ImageObject")
    pub name: &'static str,
    pub fields: Vec<Field>,
    /// Whether undeclared keys are permitted
    pub open: bool,
}

impl Shape {
    /// An open-world shape with no fields yet
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            open: true,
        }
    }

    pub fn required(mut self, name: &'static str, constraint: Constraint) -> Self {
        self.fields.push(Field {
            name,
            required: true,
            constraint,
        });
        self
    }

    pub fn optional(mut self, name: &'static str, constraint: Constraint) -> Self {
        self.fields.push(Field {
            name,
            required: false,
            constraint,
        });
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn closed(self) -> Self {
        self.with_open(false)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Validate a whole candidate, returning every violation
    pub fn validate(&self, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_at(value, "$", &mut violations);
        violations
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_empty()
    }

    fn check_at(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) {
        let Some(object) = value.as_object() else {
            violations.push(Violation::new(
                "EXPECTED_OBJECT",
                format!("expected {} object, got {}", self.name, preview(value)),
                path,
            ));
            return;
        };

        for field in &self.fields {
            let field_path = format!("{}.{}", path, field.name);
            match object.get(field.name) {
                Some(v) => field.constraint.check(v, &field_path, violations),
                None if field.required => violations.push(Violation::new(
                    "MISSING_FIELD",
                    format!("{} requires '{}'", self.name, field.name),
                    &field_path,
                )),
                None => {}
            }
        }

        if !self.open {
            for key in object.keys() {
                if self.field(key).is_none() {
                    violations.push(Violation::new(
                        "UNEXPECTED_FIELD",
                        format!("{} does not allow '{}'", self.name, key),
                        &format!("{}.{}", path, key),
                    ));
                }
            }
        }
    }
}

// =============================================================================
// Violations
// =============================================================================

/// A single failed constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub code: &'static str,
    pub message: String,
    pub path: String,
}

impl Violation {
    fn new(code: &'static str, message: String, path: &str) -> Self {
        Self {
            code,
            message,
            path: path.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.path, self.message)
    }
}

fn preview(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(40).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author() -> Shape {
        Shape::new("Author")
            .required("@type", Constraint::Literal("Person"))
            .required("name", Constraint::string())
            .optional("url", Constraint::url())
    }

    #[test]
    fn test_required_and_optional() {
        let shape = author();
        assert!(shape.is_valid(&json!({"@type": "Person", "name": "Ada"})));
        assert!(shape.is_valid(&json!({"@type": "Person", "name": "Ada", "url": "https://ada.dev"})));

        let v = shape.validate(&json!({"@type": "Person"}));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].code, "MISSING_FIELD");
        assert_eq!(v[0].path, "$.name");
    }

    #[test]
    fn test_optional_field_still_checked() {
        let v = author().validate(&json!({"@type": "Person", "name": "Ada", "url": "ada.dev"}));
        assert_eq!(v[0].code, "PATTERN_MISMATCH");
        assert_eq!(v[0].path, "$.url");
    }

    #[test]
    fn test_open_vs_closed() {
        let candidate = json!({"@type": "Person", "name": "Ada", "extra": 1});
        assert!(author().is_valid(&candidate));

        let v = author().closed().validate(&candidate);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].code, "UNEXPECTED_FIELD");
        assert_eq!(v[0].path, "$.extra");
    }

    #[test]
    fn test_one_or_many() {
        let c = Constraint::one_or_many(Constraint::url());
        let mut v = Vec::new();
        c.check(&json!("https://a.b/1.png"), "$", &mut v);
        c.check(&json!(["https://a.b/1.png", "http://a.b/2.png"]), "$", &mut v);
        assert!(v.is_empty());

        c.check(&json!(["https://a.b/1.png", "nope"]), "$", &mut v);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].code, "NO_ALTERNATIVE");
    }

    #[test]
    fn test_kinds() {
        assert!(ValueKind::Integer.accepts(&json!(3)));
        assert!(!ValueKind::Integer.accepts(&json!(3.5)));
        assert!(!ValueKind::Integer.accepts(&json!("3")));
        assert!(ValueKind::Number.accepts(&json!(3.5)));
        assert!(ValueKind::Number.accepts(&json!(3)));
        assert!(!ValueKind::Number.accepts(&json!(true)));
    }

    #[test]
    fn test_nested_failure_fails_parent() {
        let shape = Shape::new("Post")
            .required("title", Constraint::string())
            .required("author", Constraint::Shape(author()));
        let v = shape.validate(&json!({"title": "x", "author": {"@type": "Robot", "name": "R2"}}));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].path, "$.author.@type");
    }

    #[test]
    fn test_array_of_reports_index() {
        let c = Constraint::array_of(Constraint::integer());
        let mut v = Vec::new();
        c.check(&json!([1, 2, "three"]), "$.xs", &mut v);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].path, "$.xs[2]");

        v.clear();
        c.check(&json!({}), "$.xs", &mut v);
        assert_eq!(v[0].code, "EXPECTED_ARRAY");
    }

    #[test]
    fn test_non_object_candidate() {
        let v = author().validate(&json!("Person"));
        assert_eq!(v[0].code, "EXPECTED_OBJECT");
    }
}
