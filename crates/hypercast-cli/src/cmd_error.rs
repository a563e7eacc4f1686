use anyhow::{Context, Result};
use hypercast::v1::{ApiError, RequestContext};

use crate::app::{self, App};

pub fn run(
    app: &App,
    title: String,
    status: u16,
    detail: Option<String>,
    error_type: String,
    accept: &str,
) -> Result<()> {
    let mut error = ApiError::new(title, error_type, status);
    if let Some(detail) = detail {
        error = error.with_description(detail);
    }
    let ctx = RequestContext::default().with_accept_header(accept);
    let rendered = app
        .renderer
        .render_error(&error, &ctx)
        .context("Failed to render error document")?;
    app::print(&rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercast::v1::{Config, PROBLEM_JSON};

    fn render(accept: &str) -> hypercast::v1::Rendered {
        let app = App::new(Config::default()).unwrap();
        let error = ApiError::new("Not allowed", "not-allowed", 403).with_description("read only");
        let ctx = RequestContext::default().with_accept_header(accept);
        app.renderer.render_error(&error, &ctx).unwrap()
    }

    #[test]
    fn test_error_follows_accept_header() {
        let rendered = render("application/ld+json");
        assert_eq!(rendered.content_type, "application/ld+json");
        assert_eq!(rendered.json().unwrap()["statusCode"], 403);

        let rendered = render("application/json");
        assert_eq!(rendered.json().unwrap()["type"], "not-allowed");
    }

    #[test]
    fn test_error_falls_back_to_problem_json() {
        let rendered = render("text/html");
        assert_eq!(rendered.content_type, PROBLEM_JSON);
        assert_eq!(rendered.json().unwrap()["detail"], "read only");
    }
}
