use serde::Deserialize;

/// Paginated list as served by the catalog proxy.
///
/// `results` is `None` both when the field is missing and when it is `null`,
/// which is what a degraded response carries.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub page: u32,
    pub results: Option<Vec<T>>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

impl<T> Page<T> {
    /// Items of this page; empty when the upstream sent no data.
    pub fn items(&self) -> &[T] {
        self.results.as_deref().unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn into_items(self) -> Vec<T> {
        self.results.unwrap_or_default()
    }
}
