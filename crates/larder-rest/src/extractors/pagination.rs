//! Pagination query parameters.

use larder_core::PageRequest;
use serde::Deserialize;
use utoipa::IntoParams;

/// `?page=&size=`; pages are 0-indexed and the size is clamped.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

impl From<PaginationQuery> for PageRequest {
    fn from(query: PaginationQuery) -> Self {
        PageRequest::new(
            query.page.unwrap_or(0),
            query.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let page = PageRequest::from(PaginationQuery::default());
        assert_eq!(page.page, 0);
        assert_eq!(page.size, PageRequest::DEFAULT_SIZE);

        let page = PageRequest::from(PaginationQuery {
            page: Some(3),
            size: Some(10_000),
        });
        assert_eq!(page.page, 3);
        assert_eq!(page.size, PageRequest::MAX_SIZE);
    }
}
