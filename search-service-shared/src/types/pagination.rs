//! Pagination policy shared by every search operation.

/// Limit applied when the caller passes zero or a negative limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size a search may return.
pub const MAX_LIMIT: usize = 100;

/// Effective page bounds after clamping the caller's limit and offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    /// Normalize raw caller input.
    ///
    /// A limit of zero or less becomes [`DEFAULT_LIMIT`], anything above
    /// [`MAX_LIMIT`] is capped, and a negative offset becomes zero.
    ///
    /// # Example
    ///
    /// ```
    /// use search_service_shared::Pagination;
    ///
    /// let page = Pagination::clamp(500, -3);
    /// assert_eq!(page.limit, 100);
    /// assert_eq!(page.offset, 0);
    /// ```
    pub fn clamp(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_LIMIT
        } else {
            usize::try_from(limit).map_or(MAX_LIMIT, |l| l.min(MAX_LIMIT))
        };
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);

        Self { limit, offset }
    }

    /// Whether results exist beyond a page that returned `returned` hits out of `total`.
    pub fn has_more(&self, returned: usize, total: u64) -> bool {
        (self.offset as u64).saturating_add(returned as u64) < total
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
