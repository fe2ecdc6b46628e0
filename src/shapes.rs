//! schema.org shape definitions
//!
//! One constructor per supported top-level type, plus the nested sub-shapes they
//! share. Every shape is open-world except the FAQPage top level.

use crate::schema::{Constraint, Shape};

// =============================================================================
// Shared sub-shapes
// =============================================================================

/// `{"@type": <literal>, "name": string}`
fn named(type_name: &'static str) -> Shape {
    Shape::new(type_name)
        .required("@type", Constraint::Literal(type_name))
        .required("name", Constraint::string())
}

pub fn image_object() -> Shape {
    Shape::new("ImageObject")
        .required("@type", Constraint::Literal("ImageObject"))
        .required("url", Constraint::url())
        .optional("width", Constraint::number())
        .optional("height", Constraint::number())
}

/// Publisher of an article or video
pub fn publisher() -> Shape {
    named("Organization").optional("logo", Constraint::Shape(image_object()))
}

pub fn review() -> Shape {
    // Rating values are strings in the published markup we check against.
    let rating = Shape::new("Rating")
        .required("@type", Constraint::Literal("Rating"))
        .required("ratingValue", Constraint::string())
        .required("bestRating", Constraint::string())
        .required("worstRating", Constraint::string());

    Shape::new("Review")
        .required("@type", Constraint::Literal("Review"))
        .optional("name", Constraint::string())
        .optional("reviewBody", Constraint::string())
        .required("reviewRating", Constraint::Shape(rating))
        .required("datePublished", Constraint::date())
        .required("author", Constraint::Shape(named("Person")))
        .optional("publisher", Constraint::Shape(named("Organization")))
}

// =============================================================================
// Top-level shapes
// =============================================================================

pub fn organization() -> Shape {
    Shape::new("Organization")
        .required("@context", Constraint::context())
        .required("@type", Constraint::AnyLiteral(&["Corporation", "Organization"]))
        .required("name", Constraint::string())
        .optional("alternateName", Constraint::string())
        .optional("url", Constraint::url())
        .optional("logo", Constraint::url())
        .optional("sameAs", Constraint::one_or_many(Constraint::string()))
}

pub fn person() -> Shape {
    Shape::new("Person")
        .required("@context", Constraint::context())
        .required("@type", Constraint::Literal("Person"))
        .required("name", Constraint::string())
        .optional("url", Constraint::url())
        .optional("image", Constraint::url())
        .optional("sameAs", Constraint::one_or_many(Constraint::url()))
        .optional("jobTitle", Constraint::string())
        .optional("worksFor", Constraint::Shape(named("Organization")))
}

pub fn article() -> Shape {
    let main_entity = Shape::new("WebPage")
        .required("@type", Constraint::Literal("WebPage"))
        .required("@id", Constraint::string());

    let author = Shape::new("Author")
        .required("@type", Constraint::AnyLiteral(&["Person", "Organization"]))
        .required("name", Constraint::string());

    Shape::new("Article")
        .required("@context", Constraint::context())
        .required(
            "@type",
            Constraint::AnyLiteral(&["Article", "BlogPosting", "NewsArticle"]),
        )
        .optional("mainEntityOfPage", Constraint::Shape(main_entity))
        .required("headline", Constraint::string())
        .required("image", Constraint::one_or_many(Constraint::url()))
        .required("author", Constraint::Shape(author))
        .required("publisher", Constraint::Shape(publisher()))
        .required("datePublished", Constraint::date())
        .optional("dateModified", Constraint::date())
}

pub fn breadcrumb_list() -> Shape {
    let item = Shape::new("ListItem")
        .required("@type", Constraint::Literal("ListItem"))
        .required("position", Constraint::integer())
        .required("name", Constraint::string())
        .required("item", Constraint::url());

    Shape::new("BreadcrumbList")
        .required("@context", Constraint::context())
        .required("@type", Constraint::Literal("BreadcrumbList"))
        .required("itemListElement", Constraint::array_of(Constraint::Shape(item)))
}

pub fn faq_page() -> Shape {
    let answer = Shape::new("Answer")
        .required("@type", Constraint::Literal("Answer"))
        .required("text", Constraint::string());

    let question = named("Question").required("acceptedAnswer", Constraint::Shape(answer));

    Shape::new("FAQPage")
        .required("@context", Constraint::context())
        .required("@type", Constraint::Literal("FAQPage"))
        .required("mainEntity", Constraint::array_of(Constraint::Shape(question)))
        .closed()
}

pub fn video_object() -> Shape {
    Shape::new("VideoObject")
        .required("@context", Constraint::context())
        .required("@type", Constraint::Literal("VideoObject"))
        .required("name", Constraint::string())
        .required("description", Constraint::string())
        .required("thumbnailUrl", Constraint::one_or_many(Constraint::url()))
        .required("uploadDate", Constraint::date())
        .optional("contentUrl", Constraint::url())
        .optional("embedUrl", Constraint::url())
        .optional("publisher", Constraint::Shape(publisher()))
}

pub fn product() -> Shape {
    let brand = Constraint::OneOf(vec![Constraint::string(), Constraint::Shape(named("Brand"))]);

    let aggregate_rating = Shape::new("AggregateRating")
        .required(
            "@type",
            Constraint::AnyLiteral(&["AggregateRating", "aggregateRating"]),
        )
        .required("ratingValue", Constraint::string())
        .required("reviewCount", Constraint::string())
        .required("bestRating", Constraint::string())
        .required("worstRating", Constraint::string());

    let offer = Shape::new("Offer")
        .required("@type", Constraint::Literal("Offer"))
        .required("url", Constraint::url())
        .required("priceCurrency", Constraint::string())
        .required("price", Constraint::string())
        .required("priceValidUntil", Constraint::date())
        .required("availability", Constraint::url())
        .required("itemCondition", Constraint::url())
        .optional("seller", Constraint::Shape(named("Organization")));

    Shape::new("Product")
        .required("@context", Constraint::context())
        .required("@type", Constraint::Literal("Product"))
        .required("name", Constraint::string())
        .required("image", Constraint::one_or_many(Constraint::url()))
        .optional("description", Constraint::string())
        .optional("sku", Constraint::string())
        .optional("mpn", Constraint::string())
        .optional("brand", brand)
        .optional("review", Constraint::one_or_many(Constraint::Shape(review())))
        .optional("aggregateRating", Constraint::Shape(aggregate_rating))
        .optional("Offers", Constraint::Shape(offer))
}
