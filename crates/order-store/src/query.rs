/// Pagination for order listings. Results are always most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuery {
    limit: u32,
    offset: u32,
}

impl OrderQuery {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 500;

    /// Creates a query returning the first page with the default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size, clamped to `1..=MAX_LIMIT`.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, Self::MAX_LIMIT);
        self
    }

    /// Sets the number of orders to skip.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> u32 {
        self.offset
    }
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
