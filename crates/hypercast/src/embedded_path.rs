use std::fmt;

/// Dotted key sequence addressing a nested relation, e.g. `comment.author`.
///
/// Built one segment at a time while the writer descends into related
/// models. Always holds at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbeddedPath {
    head: String,
    tail: Vec<String>,
}

impl EmbeddedPath {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            head: key.into(),
            tail: Vec::new(),
        }
    }

    /// Extend `parent` with `key`, or start a new path when there is no parent.
    pub fn append(parent: Option<&EmbeddedPath>, key: impl Into<String>) -> Self {
        match parent {
            Some(parent) => {
                let mut tail = parent.tail.clone();
                tail.push(key.into());
                Self {
                    head: parent.head.clone(),
                    tail,
                }
            }
            None => Self::new(key),
        }
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    /// Every segment after the head.
    pub fn tail(&self) -> &[String] {
        &self.tail
    }

    /// Every segment except the last one: head followed by [`middle`](Self::middle).
    pub fn init(&self) -> Vec<&str> {
        let mut init = vec![self.head.as_str()];
        init.extend(self.middle().iter().map(String::as_str));
        init
    }

    /// Last segment, or `None` for a single-segment path.
    pub fn last(&self) -> Option<&str> {
        self.tail.last().map(String::as_str)
    }

    /// Segments strictly between the head and the last one.
    pub fn middle(&self) -> &[String] {
        match self.tail.split_last() {
            Some((_, middle)) => middle,
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.head.as_str()).chain(self.tail.iter().map(String::as_str))
    }

    pub fn joined(&self) -> String {
        self.segments().collect::<Vec<_>>().join(".")
    }
}

impl fmt::Display for EmbeddedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
