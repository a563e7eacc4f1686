use crate::embedded::Embedded;
use crate::fields::Fields;
use crate::uri::ServerUrl;

/// What the HTTP layer knows about the request being answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Negotiated media type. `None` or a wildcard falls back to the
    /// configured default.
    pub media_type: Option<String>,
    /// Acceptable media types, most preferred first.
    pub accept: Vec<String>,
    /// Raw `fields` selector.
    pub fields: Option<String>,
    /// Raw `embedded` selector.
    pub embedded: Option<String>,
    pub server: ServerUrl,
}

impl RequestContext {
    pub fn new(server: ServerUrl) -> Self {
        Self {
            server,
            ..Self::default()
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Set the accept list from an `Accept` header value.
    pub fn with_accept_header(mut self, header: &str) -> Self {
        self.accept = parse_accept(header);
        self
    }

    pub fn with_fields(mut self, selector: impl Into<String>) -> Self {
        self.fields = Some(selector.into());
        self
    }

    pub fn with_embedded(mut self, selector: impl Into<String>) -> Self {
        self.embedded = Some(selector.into());
        self
    }

    pub fn field_selector(&self) -> Fields {
        Fields::from_param(self.fields.as_deref())
    }

    pub fn embedded_selector(&self) -> Embedded {
        Embedded::from_param(self.embedded.as_deref())
    }
}

pub fn is_wildcard(media_type: &str) -> bool {
    let essence = essence(media_type);
    essence == "*/*" || essence.ends_with("/*")
}

// `type/subtype` without parameters.
fn essence(media_type: &str) -> &str {
    media_type.split(';').next().unwrap_or_default().trim()
}

/// Compare two media types by `type/subtype`, ignoring parameters and case.
pub fn same_media_type(a: &str, b: &str) -> bool {
    essence(a).eq_ignore_ascii_case(essence(b))
}

/// Media types from an `Accept` header, ordered by descending `q`.
///
/// Entries with equal weight keep their header order.
pub fn parse_accept(header: &str) -> Vec<String> {
    let mut weighted: Vec<(f32, String)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';').map(str::trim);
            let media_type = parts.next().filter(|m| !m.is_empty())?;
            let q = parts
                .filter_map(|p| p.strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((q, media_type.to_string()))
        })
        .filter(|(q, _)| *q > 0.0)
        .collect();
    weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
    weighted.into_iter().map(|(_, m)| m).collect()
}
