use serde::{Deserialize, Serialize};

/// Page envelope returned by every listing endpoint.
///
/// `total_count` is only present when the counted pagination mode ran; its
/// absence on the wire tells the client that the count query was skipped.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page_number: u64,
    pub current_page_size: u64,
    pub has_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Page produced by the counted strategy.
    pub fn counted(data: Vec<T>, page: u64, page_size: u64, has_next: bool, total: u64) -> Self {
        Self {
            data,
            current_page_number: page,
            current_page_size: page_size,
            has_next,
            total_count: Some(total),
        }
    }

    /// Page produced without a count query.
    pub fn countless(data: Vec<T>, page: u64, page_size: u64, has_next: bool) -> Self {
        Self {
            data,
            current_page_number: page,
            current_page_size: page_size,
            has_next,
            total_count: None,
        }
    }

    /// Map rows while preserving the envelope (row -> DTO mapping convenience)
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page_number: self.current_page_number,
            current_page_size: self.current_page_size,
            has_next: self.has_next,
            total_count: self.total_count,
        }
    }

    pub fn try_map_items<U, Err>(
        self,
        f: impl FnMut(T) -> Result<U, Err>,
    ) -> Result<Page<U>, Err> {
        Ok(Page {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            current_page_number: self.current_page_number,
            current_page_size: self.current_page_size,
            has_next: self.has_next,
            total_count: self.total_count,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
