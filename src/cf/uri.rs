//! URI construction
//!
//! [`UriBuilder`] appends path segments and query parameters to a resolved
//! root. Request types describe their query string declaratively through
//! [`QueryParameters`].
//!
//! Multi-valued filters are encoded as follows:
//!
//! - v2: one `q` entry per filtered field, `q=<field>:<value>` for a single
//!   value and `q=<field> IN <a>,<b>` for several.
//! - v3: `<field>=<a>,<b>`.
//!
//! Keys and values are percent-encoded. A comma inside a filter value is
//! indistinguishable from the list separator once the server decodes it.

use url::Url;

/// Maps a request's fields to query parameters
pub trait QueryParameters {
    fn append_query(&self, uri: &mut UriBuilder);
}

/// Builder for a fully-qualified request URI
#[derive(Debug, Clone)]
pub struct UriBuilder {
    url: Url,
    query: Vec<(String, String)>,
}

impl UriBuilder {
    pub fn new(root: Url) -> Self {
        Self {
            url: root,
            query: Vec::new(),
        }
    }

    /// Append one path segment; `/` inside the segment is escaped
    pub fn path_segment(&mut self, segment: impl AsRef<str>) -> &mut Self {
        if let Ok(mut segments) = self.url.path_segments_mut() {
            segments.pop_if_empty().push(segment.as_ref());
        }
        self
    }

    pub fn path_segments<I, S>(&mut self, segments: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for segment in segments {
            self.path_segment(segment);
        }
        self
    }

    /// Append a query parameter
    pub fn query(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present
    pub fn query_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.query(key, value);
        }
        self
    }

    /// v3 list filter: `key=a,b,c`, omitted when empty
    pub fn query_list<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(|v| v.as_ref())
                .collect::<Vec<_>>()
                .join(",");
            self.query(key, joined);
        }
        self
    }

    /// v2 filter: `q=field:value` or `q=field IN a,b`, omitted when empty
    pub fn filter<S: AsRef<str>>(&mut self, field: &str, values: &[S]) -> &mut Self {
        match values {
            [] => {}
            [single] => {
                self.query("q", format!("{}:{}", field, single.as_ref()));
            }
            many => {
                let joined = many
                    .iter()
                    .map(|v| v.as_ref())
                    .collect::<Vec<_>>()
                    .join(",");
                self.query("q", format!("{} IN {}", field, joined));
            }
        }
        self
    }

    pub fn build(self) -> Url {
        let mut url = self.url;
        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://api.example.com/v2").unwrap()
    }

    #[test]
    fn test_path_segments_are_appended_in_order() {
        let mut builder = UriBuilder::new(root());
        builder.path_segments(["service_brokers", "abc-123"]);
        assert_eq!(
            builder.build().as_str(),
            "https://api.example.com/v2/service_brokers/abc-123"
        );
    }

    #[test]
    fn test_trailing_slash_root() {
        let mut builder = UriBuilder::new(Url::parse("https://api.example.com/v3/").unwrap());
        builder.path_segment("service_bindings");
        assert_eq!(
            builder.build().as_str(),
            "https://api.example.com/v3/service_bindings"
        );
    }

    #[test]
    fn test_segment_slash_is_escaped() {
        let mut builder = UriBuilder::new(root());
        builder.path_segment("a/b");
        assert_eq!(builder.build().path(), "/v2/a%2Fb");
    }

    #[test]
    fn test_v2_filters() {
        let mut builder = UriBuilder::new(root());
        builder
            .path_segment("service_keys")
            .filter("name", &["only"])
            .filter("service_instance_guid", &["a", "b"])
            .filter::<&str>("space_guid", &[]);

        let url = builder.build();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "name:only".to_string()),
                ("q".to_string(), "service_instance_guid IN a,b".to_string()),
            ]
        );
        assert_eq!(
            url.query(),
            Some("q=name%3Aonly&q=service_instance_guid%20IN%20a%2Cb")
        );
    }

    #[test]
    fn test_v3_list_and_optional_parameters() {
        let mut builder = UriBuilder::new(root());
        builder
            .query_list("names", &["x", "y"])
            .query_list::<String>("app_guids", &[])
            .query_opt("page", Some(2))
            .query_opt::<u32>("per_page", None);

        assert_eq!(builder.build().query(), Some("names=x%2Cy&page=2"));
    }

    #[test]
    fn test_no_query_leaves_url_bare() {
        let url = UriBuilder::new(root()).build();
        assert_eq!(url.query(), None);
    }
}
