use serde::Deserialize;

/// `page`/`size` query parameters shared by the list views and list APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub const DEFAULT_SIZE: i64 = 10;
    pub const MAX_SIZE: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn size(&self) -> i64 {
        self.size
            .unwrap_or(Self::DEFAULT_SIZE)
            .clamp(1, Self::MAX_SIZE)
    }

    pub fn limit(&self) -> i64 {
        self.size()
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.size()
    }
}
