use serde::Deserialize;

use crate::error::ProviderError;

/// Pagination block of a listing response. Tableau sends every number as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDetails {
    /// Current page, 1-based.
    pub page_number: String,
    /// Items per page.
    pub page_size: String,
    /// Items across all pages.
    pub total_available: String,
}

/// Parsed pagination numbers used to drive a listing scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumbers {
    /// Current page, 1-based.
    pub page_number: u32,
    /// Items per page.
    pub page_size: u32,
    /// Items across all pages.
    pub total_available: u64,
    /// `ceil(total_available / page_size)`.
    pub total_pages: u32,
}

impl PaginationDetails {
    /// Parse the string fields and compute the page count.
    ///
    /// A zero page size is only accepted for an empty listing.
    pub fn numbers(&self) -> Result<PageNumbers, ProviderError> {
        let page_number: u32 = parse_field("pageNumber", &self.page_number)?;
        let page_size: u32 = parse_field("pageSize", &self.page_size)?;
        let total_available: u64 = parse_field("totalAvailable", &self.total_available)?;

        let total_pages = match (total_available, page_size) {
            (0, _) => 0,
            (_, 0) => {
                return Err(ProviderError::Pagination(format!(
                    "pageSize is 0 but totalAvailable is {}",
                    total_available
                )))
            },
            (total, size) => total.div_ceil(u64::from(size)),
        };
        let total_pages = u32::try_from(total_pages).map_err(|_| {
            ProviderError::Pagination(format!("page count {} out of range", total_pages))
        })?;

        Ok(PageNumbers {
            page_number,
            page_size,
            total_available,
            total_pages,
        })
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ProviderError> {
    raw.trim()
        .parse()
        .map_err(|_| ProviderError::Pagination(format!("{} is not a number: \"{}\"", name, raw)))
}
