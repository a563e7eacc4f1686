use anyhow::Result;
use clap::Subcommand;
use hypercast::v1::{Error, LongIdentifier, Page, Path, Rendered, RequestContext};
use std::any::Any;

use crate::app::{self, App, RequestArgs};

#[derive(Subcommand, Debug)]
pub enum RenderTarget {
    /// Render a single resource
    Single {
        /// Resource path, e.g. "blogs/7" or "ratings/editors:7"
        #[arg(long)]
        path: String,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Render one page of a collection
    Page {
        /// Resource name, e.g. "blogs"
        #[arg(long)]
        resource: String,

        /// Resource the collection hangs from, e.g. "people/1"
        #[arg(long)]
        parent: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Items per page
        #[arg(long, default_value_t = 5)]
        per_page: usize,

        #[command(flatten)]
        request: RequestArgs,
    },
}

pub fn run(app: &App, target: RenderTarget) -> Result<()> {
    let (result, ctx) = match target {
        RenderTarget::Single { path, request } => {
            let ctx = request.context()?;
            (render_single(app, &path, &ctx), ctx)
        }
        RenderTarget::Page {
            resource,
            parent,
            page,
            per_page,
            request,
        } => {
            let ctx = request.context()?;
            let result = render_page(app, &resource, parent.as_deref(), page, per_page, &ctx);
            (result, ctx)
        }
    };
    match result {
        Ok(rendered) => app::print(&rendered),
        Err(err) => app::fail(app, err, &ctx),
    }
}

pub fn render_single(app: &App, path: &str, ctx: &RequestContext) -> hypercast::v1::Result<Rendered> {
    let path = Path::parse(path)?;
    let identifier = app.renderer.identifier_of(&path)?;
    let model = app
        .library
        .find(&path.name, identifier.as_ref())
        .ok_or_else(|| Error::NotFound(format!("no resource at {path}")))?;
    app.renderer.render_single(&model, ctx)
}

pub fn render_page(
    app: &App,
    resource: &str,
    parent: Option<&str>,
    page: usize,
    per_page: usize,
    ctx: &RequestContext,
) -> hypercast::v1::Result<Rendered> {
    let library = &app.library;
    let Some(parent) = parent.map(Path::parse).transpose()? else {
        return match resource {
            "people" => page_of(app, library.people().to_vec(), page, per_page, None, ctx),
            "blogs" => page_of(app, library.blogs().to_vec(), page, per_page, None, ctx),
            "comments" => page_of(app, library.comments().to_vec(), page, per_page, None, ctx),
            "ratings" => page_of(app, library.ratings().to_vec(), page, per_page, None, ctx),
            _ => Err(Error::NotFound(format!("no resource named {resource}"))),
        };
    };

    let parent_id = long_id(app, &parent)?;
    let parent_name = parent.name.clone();
    match (parent_name.as_str(), resource) {
        ("people", "blogs") => page_of(app, library.blogs_by(parent_id), page, per_page, Some(parent), ctx),
        ("blogs", "comments") => {
            page_of(app, library.comments_on(parent_id), page, per_page, Some(parent), ctx)
        }
        _ => Err(Error::NotFound(format!("{parent} has no {resource} collection"))),
    }
}

fn long_id(app: &App, path: &Path) -> hypercast::v1::Result<i64> {
    let identifier = app.renderer.identifier_of(path)?;
    let id = identifier
        .downcast_ref::<LongIdentifier>()
        .map(LongIdentifier::id)
        .ok_or_else(|| Error::BadRequest(format!("{path} does not have a numeric id")))?;
    if app.library.find(&path.name, identifier.as_ref()).is_none() {
        return Err(Error::NotFound(format!("no resource at {path}")));
    }
    Ok(id)
}

/// Cut page `page` out of `items` and render it.
fn page_of<T: Any + Clone>(
    app: &App,
    items: Vec<T>,
    page: usize,
    per_page: usize,
    parent: Option<Path>,
    ctx: &RequestContext,
) -> hypercast::v1::Result<Rendered> {
    let total = items.len();
    let window = items
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(per_page))
        .take(per_page)
        .collect();
    let page = Page::new(window, total, page, per_page, parent)?;
    app.renderer.render_page(&page, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercast::v1::{Config, ErrorKind, ServerUrl};
    use serde_json::Value;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn ctx() -> RequestContext {
        RequestContext::new(ServerUrl::new("http", "localhost").with_port(8080))
    }

    fn json(rendered: Rendered) -> Value {
        rendered.json().unwrap()
    }

    #[test]
    fn test_blog_posting_as_json_ld() {
        let ctx = ctx()
            .with_media_type("application/ld+json")
            .with_fields("BlogPosting:headline,BlogPosting:author");
        let doc = json(render_single(&app(), "blogs/7", &ctx).unwrap());

        assert_eq!(doc["@id"], "http://localhost:8080/p/blogs/7");
        assert_eq!(doc["headline"], "Notes on the Analytical Engine");
        assert_eq!(doc["author"], "http://localhost:8080/p/people/1");
        assert_eq!(doc["@context"]["author"]["@type"], "@id");
        assert!(doc.get("alternativeHeadline").is_none());
        assert!(doc.get("datePublished").is_none());
    }

    #[test]
    fn test_embedded_rating_uses_composite_id() {
        let ctx = ctx().with_embedded("aggregateRating");
        let doc = json(render_single(&app(), "blogs/7", &ctx).unwrap());
        let rating = &doc["aggregateRating"];
        assert_eq!(rating["self"], "http://localhost:8080/p/ratings/editors:7");
        assert_eq!(rating["ratingValue"], 4.8);
        assert_eq!(doc["comment"], "http://localhost:8080/p/blogs/7/comments");
        assert_eq!(doc["articleBody"], "http://localhost:8080/b/blogs/7/articleBody");
        assert_eq!(doc["datePublished"], "2026-01-08T09:00:00Z");
    }

    #[test]
    fn test_render_rating_by_composite_path() {
        let doc = json(render_single(&app(), "ratings/readers:3", &ctx()).unwrap());
        assert_eq!(doc["reviewCount"], 57);

        let err = render_single(&app(), "ratings/readers", &ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_missing_resources_are_not_found() {
        for path in ["blogs/99", "nope/1"] {
            let err = render_single(&app(), path, &ctx()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{path}");
        }
    }

    #[test]
    fn test_root_page() {
        let doc = json(render_page(&app(), "blogs", None, 2, 5, &ctx()).unwrap());
        assert_eq!(doc["self"], "http://localhost:8080/p/blogs");
        assert_eq!(doc["totalCount"], 12);
        assert_eq!(doc["pageCount"], 5);
        assert_eq!(doc["lastURL"], "http://localhost:8080/p/blogs?page=3&per_page=5");
        assert_eq!(doc["items"][0]["headline"], "The case for compilers");
    }

    #[test]
    fn test_reverse_collection_page() {
        let doc = json(render_page(&app(), "blogs", Some("people/1"), 1, 10, &ctx()).unwrap());
        assert_eq!(doc["self"], "http://localhost:8080/p/people/1/blogs");
        assert_eq!(doc["totalCount"], 4);

        let person = json(render_single(&app(), "people/1", &ctx()).unwrap());
        assert_eq!(person["blogs"], doc["self"]);
    }

    #[test]
    fn test_page_out_of_range_is_client_error() {
        let err = render_page(&app(), "comments", Some("blogs/7"), 3, 2, &ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_huge_page_number_is_client_error() {
        let err = render_page(&app(), "blogs", None, usize::MAX, 2, &ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_unknown_collection() {
        let err = render_page(&app(), "ratings", Some("people/1"), 1, 5, &ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = render_page(&app(), "blogs", Some("people/42"), 1, 5, &ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
