//! JSON envelope returned by every successful route

use axum::response::{IntoResponse, Response};
use axum::Json;
use parish_core::FlashMessage;
use serde::Serialize;

/// `data` plus the flash messages to show and, for actions, where the
/// browser goes next
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<FlashMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl<T> Page<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            messages: Vec::new(),
            redirect: None,
        }
    }

    pub fn with_message(mut self, message: FlashMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = FlashMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
