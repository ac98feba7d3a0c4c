use crate::errors::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Document,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Document => "document",
        }
    }

    /// Guess the media kind from a file extension
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => MediaType::Image,
            "mp4" | "mov" | "webm" | "avi" => MediaType::Video,
            _ => MediaType::Document,
        }
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "document" => Ok(MediaType::Document),
            other => Err(CoreError::invalid_value("media_type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl News {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsMedia {
    pub id: Uuid,
    pub news_id: Uuid,
    pub media_type: MediaType,
    pub file_path: String,
}

impl NewsMedia {
    pub fn new(news_id: Uuid, file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        Self {
            id: Uuid::new_v4(),
            news_id,
            media_type: MediaType::from_file_name(&file_path),
            file_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_detection() {
        assert_eq!(MediaType::from_file_name("choir.JPG"), MediaType::Image);
        assert_eq!(MediaType::from_file_name("sermon.mp4"), MediaType::Video);
        assert_eq!(MediaType::from_file_name("minutes.pdf"), MediaType::Document);
        assert_eq!(MediaType::from_file_name("noextension"), MediaType::Document);
    }
}
