mod name_matcher;
mod url_template;

pub use name_matcher::NameMatcher;
pub use url_template::{
    DEFAULT_BUCKET_URL_TEMPLATE, DEFAULT_OBJECT_URL_TEMPLATE, Placeholder, UrlTemplate,
};
