pub mod document;
pub mod error;
pub mod query;
pub mod response;
pub mod selector;
pub mod xpath;

pub use document::{BackendKind, Document, Node};
pub use error::{Result, SelectioError};
pub use query::CompiledCss;
pub use response::{HtmlResponse, ParsePolicy, PolicyConfig};
pub use selector::{Selector, SelectorList};
pub use xpath::{Extraction, TranslatedQuery, xpath_to_css};
