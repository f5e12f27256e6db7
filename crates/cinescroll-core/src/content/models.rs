use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry on the Inspirations page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspiration {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub media: Option<MediaRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
}

impl Inspiration {
    /// Image usable as a social preview, if any
    pub fn preview_image(&self) -> Option<&str> {
        self.media
            .as_ref()
            .filter(|m| m.kind == MediaKind::Image)
            .map(|m| m.url.as_str())
    }

    /// First `max_len` bytes of content on a char boundary, with an ellipsis
    /// when truncated
    pub fn excerpt(&self, max_len: usize) -> String {
        let text = self.content.as_str();

        if max_len == 0 {
            return String::new();
        }

        if text.len() <= max_len {
            text.to_string()
        } else {
            let mut end = 0;
            for (idx, ch) in text.char_indices() {
                let next = idx + ch.len_utf8();
                if next > max_len {
                    break;
                }
                end = next;
            }
            format!("{}...", text[..end].trim_end())
        }
    }
}
