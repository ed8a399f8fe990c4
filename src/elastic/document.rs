//! Documents that can be written to an Elasticsearch index.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A record that can be indexed.
///
/// The whole value is serialized as the document source; [`id`](Document::id) is also used
/// as the Elasticsearch document id.
pub trait Document: Serialize {
    fn id(&self) -> i64;

    fn title(&self) -> &str;
}

/// A parsed Wikipedia page.
///
/// Only the `id` and `title` fields are interpreted; any other field produced by the
/// page parser is kept as-is and indexed along with them. A missing or `null` id or title
/// is read as `0` or `""`, so such pages are later skipped as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl WikiPage {
    pub fn new<T>(id: i64, title: T) -> Self
    where
        T: Into<String>,
    {
        Self { id, title: title.into(), fields: Map::new() }
    }

    /// Adds an extra field to the page.
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl Document for WikiPage {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
