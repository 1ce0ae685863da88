//! Google Books `volumes` response.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VolumesResponse {
    #[serde(rename = "totalItems")]
    pub total_items: u64,

    #[serde(default)]
    pub items: Vec<VolumeItem>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeItem {
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeInfo {
    #[serde(rename = "imageLinks", default)]
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl VolumesResponse {
    /// Thumbnail of the last item that has one
    pub fn thumbnail(&self) -> Option<&str> {
        if self.total_items == 0 {
            return None;
        }

        self.items
            .iter()
            .filter_map(|item| item.volume_info.as_ref()?.image_links.as_ref()?.thumbnail.as_deref())
            .last()
    }
}
