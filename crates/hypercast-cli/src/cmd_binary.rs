use anyhow::{Context, Result};
use hypercast::v1::{Error, Path, RequestContext};
use std::io::Read;

use crate::app::{self, App};

/// Open binary resource `key` of the resource at `path`.
pub fn open(app: &App, path: &str, key: &str) -> hypercast::v1::Result<Box<dyn Read + Send>> {
    let path = Path::parse(path)?;
    let identifier = app.renderer.identifier_of(&path)?;
    let model = app
        .library
        .find(&path.name, identifier.as_ref())
        .ok_or_else(|| Error::NotFound(format!("no resource at {path}")))?;
    app.renderer
        .binary(&model, key)?
        .ok_or_else(|| Error::NotFound(format!("{path} has no binary resource {key}")))
}

pub fn run(app: &App, path: &str, key: &str) -> Result<()> {
    match open(app, path, key) {
        Ok(mut stream) => {
            let mut stdout = std::io::stdout().lock();
            std::io::copy(&mut stream, &mut stdout).context("Failed to copy binary resource")?;
            Ok(())
        }
        Err(err) => app::fail(app, err, &RequestContext::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercast::v1::{Config, ErrorKind};

    #[test]
    fn test_open_article_body() {
        let app = App::new(Config::default()).unwrap();
        let mut body = String::new();
        open(&app, "blogs/7", "articleBody")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "Notes on the Analytical Engine. A short post, number 7.");
    }

    #[test]
    fn test_unknown_binary_is_not_found() {
        let app = App::new(Config::default()).unwrap();
        let err = open(&app, "people/1", "articleBody").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
