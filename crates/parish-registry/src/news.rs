//! News posts and their attached media files

use crate::{RegistryError, RegistryResult};
use chrono::Utc;
use parish_core::humanize::format_time_since;
use parish_core::models::{MediaType, News, NewsMedia};
use parish_core::FlashMessage;
use parish_storage::{MediaStorage, NewsStore, NewsWithMedia};
use parish_validation::traits::text;
use parish_validation::{FormData, RequiredValidator, Rules};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const NEWS_NOT_FOUND: &str = "News post not found.";
const NEWS_MEDIA_DIR: &str = "news_media";

/// A file submitted with a news post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    /// Guessed from the extension when not given
    pub media_type: Option<MediaType>,
}

impl NewsUpload {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRow {
    #[serde(flatten)]
    pub item: NewsWithMedia,
    pub time_since_created: String,
}

pub fn news_rules() -> Rules {
    Rules::new()
        .field("title", RequiredValidator::new())
        .field("content", RequiredValidator::new())
}

#[derive(Clone)]
pub struct NewsDesk {
    news: Arc<dyn NewsStore>,
    media: Arc<dyn MediaStorage>,
}

impl std::fmt::Debug for NewsDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsDesk").finish_non_exhaustive()
    }
}

impl NewsDesk {
    pub fn new(news: Arc<dyn NewsStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self { news, media }
    }

    pub async fn create(
        &self,
        form: &FormData,
        uploads: Vec<NewsUpload>,
    ) -> RegistryResult<(NewsWithMedia, FlashMessage)> {
        news_rules().check(form).await?;
        let news = News::new(
            text(form, "title").unwrap_or_default(),
            text(form, "content").unwrap_or_default(),
        );
        let media = self.store_uploads(news.id, uploads).await?;
        let saved = self.news.insert_news(news, media).await?;
        info!(news_id = %saved.news.id, "News post created");
        Ok((saved, FlashMessage::success("News post created successfully!")))
    }

    /// Update the post and replace all of its media with `uploads`
    pub async fn update(
        &self,
        id: Uuid,
        form: &FormData,
        uploads: Vec<NewsUpload>,
    ) -> RegistryResult<(NewsWithMedia, FlashMessage)> {
        let existing = self.get(id).await?;
        news_rules().check(form).await?;

        let mut news = existing.news;
        news.title = text(form, "title").unwrap_or_default().to_string();
        news.content = text(form, "content").unwrap_or_default().to_string();
        news.updated_at = Utc::now();

        let media = self.store_uploads(id, uploads).await?;
        self.news.update_news(&news, Some(media.clone())).await?;
        self.remove_files(&existing.media).await;

        info!(news_id = %id, "News post updated");
        Ok((
            NewsWithMedia { news, media },
            FlashMessage::success("News post updated successfully!"),
        ))
    }

    pub async fn get(&self, id: Uuid) -> RegistryResult<NewsWithMedia> {
        self.news
            .get_news(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(NEWS_NOT_FOUND))
    }

    /// Newest first
    pub async fn list(&self) -> RegistryResult<Vec<NewsRow>> {
        let now = Utc::now();
        Ok(self
            .news
            .list_news()
            .await?
            .into_iter()
            .map(|item| NewsRow {
                time_since_created: format_time_since(Some(item.news.created_at), now),
                item,
            })
            .collect())
    }

    pub async fn count(&self) -> RegistryResult<usize> {
        Ok(self.news.list_news().await?.len())
    }

    pub async fn delete(&self, id: Uuid) -> RegistryResult<FlashMessage> {
        let existing = self.get(id).await?;
        if !self.news.delete_news(id).await? {
            return Err(RegistryError::not_found(NEWS_NOT_FOUND));
        }
        self.remove_files(&existing.media).await;
        info!(news_id = %id, "News post deleted");
        Ok(FlashMessage::success(
            "News post and all associated media deleted successfully!",
        ))
    }

    async fn store_uploads(&self, news_id: Uuid, uploads: Vec<NewsUpload>) -> RegistryResult<Vec<NewsMedia>> {
        let mut media = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let base = upload
                .file_name
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or_default();
            if base.is_empty() || upload.data.is_empty() {
                continue;
            }
            let path = format!("{}/{}_{}", NEWS_MEDIA_DIR, Uuid::new_v4().simple(), base);
            let stored = self.media.put(&path, &upload.data).await?;

            let mut item = NewsMedia::new(news_id, stored);
            if let Some(media_type) = upload.media_type {
                item.media_type = media_type;
            }
            media.push(item);
        }
        Ok(media)
    }

    /// Files are removed after the records; a leftover file is only logged
    async fn remove_files(&self, media: &[NewsMedia]) {
        for item in media {
            if let Err(err) = self.media.delete(&item.file_path).await {
                warn!(path = %item.file_path, "Could not remove news media: {}", err);
            }
        }
    }
}
