//! Pagination
//!
//! List endpoints return one page envelope at a time, each carrying a link
//! to the next page. [`paginate`] turns that into a single lazy stream of
//! items: pages are fetched only as the consumer drains the previous one,
//! every fetch goes through the regular pipeline, and the first failure ends
//! the stream after the items already yielded.

use super::operations::Operations;
use super::uri::UriBuilder;
use crate::error::{CallSite, Error, ErrorKind, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

/// A list-response envelope
pub trait Page {
    type Item;

    /// Items of this page, in server order, and the raw `next` link if any
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

enum Cursor<F> {
    Start(Result<F>),
    Next(Url),
    Exhausted,
}

/// Resolve a `next` link against the page it came from
///
/// v2 links are host-relative (`/v2/service_keys?page=2`), v3 links are
/// absolute; an empty link means there is no next page. Links to another
/// origin are refused: every page fetch carries the bearer token.
fn next_url(current: &Url, next: Option<String>) -> Result<Option<Url>> {
    let Some(next) = next.filter(|n| !n.trim().is_empty()) else {
        return Ok(None);
    };

    let url = current.join(&next).map_err(|e| ErrorKind::Transport {
        message: format!("invalid next page link {:?}: {}", next, e),
        status: None,
        body: None,
        source: None,
    })?;

    if url.origin() != current.origin() {
        return Err(ErrorKind::Transport {
            message: format!(
                "next page link {} leaves {}",
                url,
                current.origin().ascii_serialization()
            ),
            status: None,
            body: None,
            source: None,
        }
        .into());
    }

    if &url == current {
        return Err(ErrorKind::Transport {
            message: format!("next page link {} points at the current page", url),
            status: None,
            body: None,
            source: None,
        }
        .into());
    }

    Ok(Some(url))
}

pub(crate) fn paginate<P, F>(
    operations: Operations,
    site: CallSite,
    start: Result<F>,
) -> BoxStream<'static, Result<P::Item>>
where
    P: Page + DeserializeOwned + Send + 'static,
    P::Item: Send + 'static,
    F: FnOnce(&mut UriBuilder) + Send + 'static,
{
    stream::try_unfold(Cursor::Start(start), move |cursor| {
        let operations = operations.clone();
        async move {
            let url = match cursor {
                Cursor::Start(uri) => operations.resolve(site, uri?).await?,
                Cursor::Next(url) => url,
                Cursor::Exhausted => return Ok::<_, Error>(None),
            };

            let page: P = operations.execute(site, Method::GET, url.clone(), None).await?;
            let (items, next) = page.into_parts();
            tracing::debug!("Fetched page of {} items from {}", items.len(), url);

            let cursor = match next_url(&url, next).map_err(|e| e.at(site))? {
                Some(next) => Cursor::Next(next),
                None => Cursor::Exhausted,
            };

            Ok::<_, Error>(Some((items, cursor)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, Error>)))
    .try_flatten()
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Url {
        Url::parse("https://api.example.com/v2/service_keys?page=1&results-per-page=2").unwrap()
    }

    #[test]
    fn test_relative_next_link() {
        let next = next_url(&current(), Some("/v2/service_keys?page=2&results-per-page=2".into()))
            .unwrap()
            .unwrap();
        assert_eq!(
            next.as_str(),
            "https://api.example.com/v2/service_keys?page=2&results-per-page=2"
        );
    }

    #[test]
    fn test_absolute_next_link() {
        let next = next_url(
            &current(),
            Some("https://api.example.com/v3/service_bindings?page=2".into()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.path(), "/v3/service_bindings");
        assert_eq!(next.query(), Some("page=2"));
    }

    #[test]
    fn test_next_link_to_another_origin_is_rejected() {
        for link in [
            "https://cc.example.com/v3/service_bindings?page=2",
            "http://api.example.com/v2/service_keys?page=2",
            "https://api.example.com:8443/v2/service_keys?page=2",
        ] {
            let err = next_url(&current(), Some(link.into())).unwrap_err();
            assert!(err.is_transport(), "{} should be refused", link);
        }
    }

    #[test]
    fn test_absent_or_empty_next_link() {
        assert!(next_url(&current(), None).unwrap().is_none());
        assert!(next_url(&current(), Some(String::new())).unwrap().is_none());
    }

    #[test]
    fn test_self_referencing_next_link_is_rejected() {
        let err = next_url(&current(), Some(current().to_string())).unwrap_err();
        assert!(err.is_transport());
    }
}
