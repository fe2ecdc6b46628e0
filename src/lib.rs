//! JSON-LD Schema Validator
//!
//! Validates the schema.org structured data that web pages embed in
//! `<script type="application/ld+json">` elements.
//!
//! ## Features
//!
//! - **Shape Registry**: Hand-specified shapes for Organization, Person, Article,
//!   BreadcrumbList, FAQPage, VideoObject and Product
//! - **Open/Closed Shapes**: Undeclared keys are allowed unless a shape is closed
//! - **Tally**: Valid counts per declared type, plus errors and unknown types
//! - **Typed Fetch Errors**: Timeouts, connection failures and HTTP status kept apart
//!
//! ## Architecture
//!
//! ```text
//! page ──fetch──> html ──extract──> [Value] ──Validator──> Tally
//!                                      │
//!                          ShapeRegistry (@type -> Shape)
//!                                      │
//!                        Constraint tree + primitive Matchers
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod matchers;
pub mod registry;
pub mod schema;
pub mod shapes;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::{DecodeError, FetchError, Result, SchemaError};
pub use extract::{extract_candidates, load_page, Extraction};
pub use matchers::Matcher;
pub use registry::ShapeRegistry;
pub use schema::{Constraint, Shape, Violation};
pub use validator::{validate_data, Observation, Outcome, Tally, ValidationReport, Validator};
