use serde_json::{Map, Value};

/// Growing JSON object handed to mapper callbacks.
///
/// Locations are addressed by chains of field names; missing objects along
/// the way are created, and a non-object met on the way is replaced by one.
///
/// ```
/// use hypercast::v1::JsonObjectBuilder;
/// use serde_json::json;
///
/// let mut doc = JsonObjectBuilder::new();
/// doc.field("headline").value("Hi");
/// doc.nested_field("author", &["name"]).value("Ada");
/// doc.field("@type").array_value().add("BlogPosting");
///
/// assert_eq!(
///     doc.build(),
///     json!({"headline": "Hi", "author": {"name": "Ada"}, "@type": ["BlogPosting"]})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonObjectBuilder {
    root: Value,
}

impl Default for JsonObjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonObjectBuilder {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn field(&mut self, name: &str) -> FieldStep<'_> {
        FieldStep {
            slot: &mut self.root,
        }
        .field(name)
    }

    /// Address `head.tail[0].tail[1]...`.
    pub fn nested_field<S: AsRef<str>>(&mut self, head: &str, tail: &[S]) -> FieldStep<'_> {
        self.field(head).fields(tail)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_object().is_none_or(Map::is_empty)
    }

    pub fn build(self) -> Value {
        self.root
    }
}

fn object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot holds an object"),
    }
}

fn array(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot holds an array"),
    }
}

/// A location inside a [`JsonObjectBuilder`].
#[derive(Debug)]
pub struct FieldStep<'a> {
    slot: &'a mut Value,
}

impl<'a> FieldStep<'a> {
    pub fn field(self, name: &str) -> FieldStep<'a> {
        let slot = object(self.slot)
            .entry(name.to_string())
            .or_insert(Value::Null);
        FieldStep { slot }
    }

    pub fn nested_field<S: AsRef<str>>(self, head: &str, tail: &[S]) -> FieldStep<'a> {
        self.field(head).fields(tail)
    }

    fn fields<S: AsRef<str>>(self, names: &[S]) -> FieldStep<'a> {
        names
            .iter()
            .fold(self, |step, name| step.field(name.as_ref()))
    }

    /// Set the value at this location, replacing whatever was there.
    pub fn value(self, value: impl Into<Value>) {
        *self.slot = value.into();
    }

    /// Treat this location as an array, creating it if needed.
    pub fn array_value(self) -> ArrayStep<'a> {
        ArrayStep {
            items: array(self.slot),
        }
    }
}

/// An array location inside a [`JsonObjectBuilder`].
#[derive(Debug)]
pub struct ArrayStep<'a> {
    items: &'a mut Vec<Value>,
}

impl ArrayStep<'_> {
    pub fn add(&mut self, value: impl Into<Value>) -> &mut Self {
        self.items.push(value.into());
        self
    }

    pub fn add_all<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) -> &mut Self {
        self.items.extend(values.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_fields_share_parents() {
        let mut doc = JsonObjectBuilder::new();
        doc.nested_field("comment", &["author", "name"]).value("Ada");
        doc.nested_field("comment", &["text"]).value("Nice");
        doc.field("comment").field("author").field("@id").value("http://h/p/people/1");

        assert_eq!(
            doc.build(),
            json!({
                "comment": {
                    "author": {"name": "Ada", "@id": "http://h/p/people/1"},
                    "text": "Nice"
                }
            })
        );
    }

    #[test]
    fn test_scalar_on_path_is_replaced_by_object() {
        let mut doc = JsonObjectBuilder::new();
        doc.field("author").value("http://h/p/people/1");
        doc.nested_field("author", &["name"]).value("Ada");
        assert_eq!(doc.build(), json!({"author": {"name": "Ada"}}));
    }

    #[test]
    fn test_array_value_appends() {
        let mut doc = JsonObjectBuilder::new();
        doc.field("members").array_value().add(json!({"a": 1}));
        doc.field("members")
            .array_value()
            .add(json!({"a": 2}))
            .add_all(vec![json!(3), json!(4)]);
        assert_eq!(doc.build(), json!({"members": [{"a": 1}, {"a": 2}, 3, 4]}));
    }

    #[test]
    fn test_empty_tail_addresses_head() {
        let mut doc = JsonObjectBuilder::new();
        let tail: &[String] = &[];
        doc.nested_field("author", tail).value("x");
        assert_eq!(doc.get("author"), Some(&json!("x")));
    }

    #[test]
    fn test_is_empty() {
        let mut doc = JsonObjectBuilder::new();
        assert!(doc.is_empty());
        doc.field("a").value(1);
        assert!(!doc.is_empty());
    }
}
