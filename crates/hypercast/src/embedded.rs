use std::collections::HashSet;

/// The set of dotted relation paths a request asked to embed.
///
/// Membership is exact: embedding `creator` does not embed
/// `creator.manager`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embedded {
    paths: HashSet<String>,
}

impl Embedded {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn parse(selector: &str) -> Self {
        let paths = selector
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        Self { paths }
    }

    pub fn from_param(selector: Option<&str>) -> Self {
        selector.map(Self::parse).unwrap_or_default()
    }

    pub fn is_embedded(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Embedded {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
