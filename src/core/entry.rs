use serde::{Deserialize, Serialize};

/// Kind of media a catalog entry points at.
///
/// The catalog reports this as a free-form `kind` string; only the raster and
/// animated image kinds can be rendered as chat attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaKind {
    /// Still image (`jpeg`, `png`)
    Raster,
    /// Animated GIF (`gif`)
    Gif,
    /// Hosted or converted video (`gifv`, `youtube`, `mp4`, `webm`)
    VideoEmbed,
    /// Anything the catalog reports that we don't know about
    #[default]
    Other,
}

impl MediaKind {
    /// Parse the catalog's `kind` string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" | "png" => MediaKind::Raster,
            "gif" => MediaKind::Gif,
            "gifv" | "youtube" | "mp4" | "webm" => MediaKind::VideoEmbed,
            _ => MediaKind::Other,
        }
    }

    /// Whether entries of this kind can be attached to a chat reply
    #[must_use]
    pub fn is_displayable(self) -> bool {
        matches!(self, MediaKind::Raster | MediaKind::Gif)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raster => write!(f, "image"),
            Self::Gif => write!(f, "gif"),
            Self::VideoEmbed => write!(f, "video"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A single image record from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: i64,

    /// Short display handle used in catalog links
    #[serde(rename = "base62id")]
    pub short_id: String,

    pub title: String,

    /// Raw `kind` string as reported by the catalog
    pub kind: String,

    /// Image path relative to the catalog's base URL
    #[serde(rename = "imageURL")]
    pub image_url: String,

    #[serde(rename = "thumbURL")]
    pub thumb_url: String,

    #[serde(default)]
    pub is_clean: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,

    #[serde(default, rename = "sourceURL", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(default, rename = "redirectToID", skip_serializing_if = "Option::is_none")]
    pub redirect_to_id: Option<i64>,
}

impl CatalogEntry {
    /// Create an entry with the fields matching cares about.
    pub fn new(
        id: i64,
        short_id: impl Into<String>,
        title: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        let short_id = short_id.into();
        Self {
            id,
            image_url: format!("/b/{short_id}"),
            thumb_url: format!("/t/{short_id}"),
            short_id,
            title: title.into(),
            kind: kind.into(),
            is_clean: false,
            submitter: None,
            collection_name: None,
            source_url: None,
            redirect_to_id: None,
        }
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    #[must_use]
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::parse(&self.kind)
    }
}
