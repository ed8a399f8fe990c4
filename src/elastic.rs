//! Writing parsed pages to Elasticsearch.
//!
//! The entry point is the [`Dispatcher`], which validates documents and forwards them to
//! a [`Store`] while bounding the number of requests in flight.

pub mod completion;
pub mod config;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod store;

pub use completion::{BulkListener, CompletionHandler, DocCreateListener};
pub use config::{DispatcherConfig, IndexConfig};
pub use dispatcher::Dispatcher;
pub use document::{Document, WikiPage};
pub use error::{DispatchError, StoreError};
pub use http::HttpStore;
pub use store::Store;
