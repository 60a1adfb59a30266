//! Shared response envelope types for API handlers.
//!
//! Every list endpoint answers with [`Page`]:
//! `{ "count": N, "next": url|null, "previous": url|null, "results": [...] }`.

use axum::http::Uri;
use folio_core::pagination::PageRequest;
use serde::Serialize;

/// Paginated list envelope.
///
/// `next` and `previous` are request-relative URLs: the request path and
/// query string with only `page` replaced.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(results: Vec<T>, total: i64, page: &PageRequest, uri: &Uri) -> Self {
        let next = page
            .has_next(total)
            .then(|| page_link(uri, page.page + 1));
        let previous = page
            .has_previous()
            .then(|| page_link(uri, page.page - 1));
        Self {
            count: total,
            next,
            previous,
            results,
        }
    }

    /// Paginate an already materialised list in memory.
    pub fn from_vec(mut items: Vec<T>, page: &PageRequest, uri: &Uri) -> Self {
        let total = items.len() as i64;
        let start = (page.offset().min(total)) as usize;
        let end = (page.offset().saturating_add(page.limit()).min(total)) as usize;
        let results: Vec<T> = items.drain(start..end).collect();
        Self::new(results, total, page, uri)
    }
}

/// `{ "message": ... }` body for actions without a resource to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn page_link(uri: &Uri, page: i64) -> String {
    let mut params: Vec<String> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    params.push(format!("page={page}"));
    format!("{}?{}", uri.path(), params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn first_page_links_forward_only() {
        let req = PageRequest::new(None, Some(2)).unwrap();
        let page = Page::new(vec![1, 2], 5, &req, &uri("/api/v1/contacts?ordering=-created_at"));
        assert_eq!(page.count, 5);
        assert_eq!(
            page.next.as_deref(),
            Some("/api/v1/contacts?ordering=-created_at&page=2")
        );
        assert_eq!(page.previous, None);
    }

    #[test]
    fn page_param_is_replaced_not_duplicated() {
        let req = PageRequest::new(Some(2), Some(2)).unwrap();
        let page = Page::new(vec![3, 4], 6, &req, &uri("/x?page=2&page_size=2"));
        assert_eq!(page.next.as_deref(), Some("/x?page_size=2&page=3"));
        assert_eq!(page.previous.as_deref(), Some("/x?page_size=2&page=1"));
    }

    #[test]
    fn page_past_the_end_is_empty_with_count() {
        let req = PageRequest::new(Some(9), Some(12)).unwrap();
        let page = Page::from_vec(vec!["a", "b", "c"], &req, &uri("/y?page=9"));
        assert!(page.results.is_empty());
        assert_eq!(page.count, 3);
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("/y?page=8"));
    }

    #[test]
    fn in_memory_slicing() {
        let req = PageRequest::new(Some(2), Some(2)).unwrap();
        let page = Page::from_vec(vec![1, 2, 3, 4, 5], &req, &uri("/z"));
        assert_eq!(page.results, vec![3, 4]);
        assert_eq!(page.next.as_deref(), Some("/z?page=3"));
    }
}
