use serde::Deserialize;

/// Query string of `/search/text`.
///
/// A missing `q` deserialises as empty and gets the same validation error.
#[derive(Debug, Deserialize)]
pub struct TextSearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u64>,
}

/// Query string shared by the visual searches.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<u64>,
}
