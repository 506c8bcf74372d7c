//! HttpChatApi - REST implementation of the chat and session contracts.
//!
//! Every request carries the bearer token from the credential store. A 401
//! maps to `ParleyError::Unauthorized`; a missing token fails fast with the
//! same error without touching the network.

use async_trait::async_trait;
use parley_core::attachment::FileUpload;
use parley_core::chat::{ChatApi, ChatReply, DocumentStatus};
use parley_core::credential::CredentialStore;
use parley_core::error::{ParleyError, Result};
use parley_core::session::{Session, SessionDetail, SessionStore};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::dto::{
    ChatResponseDto, CreateSessionRequest, FileStatusDto, SessionDetailDto, SessionDto,
    TextChatRequest, UpdateSessionRequest, UploadResponseDto,
};

/// Client for the chat backend.
#[derive(Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpChatApi {
    /// Creates a client rooted at `base_url` (trailing slashes are ignored).
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.credentials.token().ok_or(ParleyError::Unauthorized)?;
        Ok(request.bearer_auth(token))
    }

    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|err| ParleyError::transport(format!("{what} request failed: {err}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("[HttpChatApi] {} rejected the credential", what);
            return Err(ParleyError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::debug!("[HttpChatApi] {} failed with {}: {}", what, status, body);
            return Err(ParleyError::http(status.as_u16(), body));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|err| ParleyError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to parse {what} response: {err}"),
            })
    }
}

fn file_part(file: &FileUpload) -> Result<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(file.mime_type())
        .map_err(|err| ParleyError::internal(format!("invalid content type: {err}")))
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send_text(&self, question: &str, session_id: Option<&str>) -> Result<ChatReply> {
        let request = self.client.post(self.url("/chat/text")).json(&TextChatRequest {
            message: question,
            session_id,
        });
        let response = self.execute(request, "chat/text").await?;
        let dto: ChatResponseDto = Self::read_json(response, "chat/text").await?;
        Ok(dto.into())
    }

    async fn send_image(
        &self,
        question: &str,
        image: &FileUpload,
        session_id: Option<&str>,
    ) -> Result<ChatReply> {
        let mut form = Form::new()
            .text("message", question.to_string())
            .part("image", file_part(image)?);
        if let Some(session_id) = session_id {
            form = form.text("session_id", session_id.to_string());
        }

        let request = self.client.post(self.url("/chat/image")).multipart(form);
        let response = self.execute(request, "chat/image").await?;
        let dto: ChatResponseDto = Self::read_json(response, "chat/image").await?;
        Ok(dto.into())
    }

    async fn upload_document(&self, file: &FileUpload, session_id: Option<&str>) -> Result<String> {
        let mut form = Form::new().part("file", file_part(file)?);
        if let Some(session_id) = session_id {
            form = form.text("session_id", session_id.to_string());
        }

        let request = self.client.post(self.url("/chat/upload")).multipart(form);
        let response = self.execute(request, "chat/upload").await?;
        let dto: UploadResponseDto = Self::read_json(response, "chat/upload").await?;
        Ok(dto.file_id)
    }

    async fn document_status(&self, attachment_id: &str) -> Result<DocumentStatus> {
        let request = self
            .client
            .get(self.url(&format!("/chat/file/{attachment_id}/status")));
        let response = self.execute(request, "chat/file/status").await?;
        let dto: FileStatusDto = Self::read_json(response, "chat/file/status").await?;
        Ok(DocumentStatus::from_wire(&dto.status))
    }
}

#[async_trait]
impl SessionStore for HttpChatApi {
    async fn list(&self) -> Result<Vec<Session>> {
        let request = self.client.get(self.url("/sessions/"));
        let response = self.execute(request, "sessions/list").await?;
        let dtos: Vec<SessionDto> = Self::read_json(response, "sessions/list").await?;
        Ok(dtos.into_iter().map(Session::from).collect())
    }

    async fn load(&self, session_id: &str) -> Result<SessionDetail> {
        let request = self.client.get(self.url(&format!("/sessions/{session_id}")));
        let response = self.execute(request, "sessions/load").await.map_err(|err| {
            if err.is_not_found() {
                ParleyError::not_found("session", session_id)
            } else {
                err
            }
        })?;
        let dto: SessionDetailDto = Self::read_json(response, "sessions/load").await?;
        SessionDetail::try_from(dto)
    }

    async fn create(&self, title: Option<&str>) -> Result<Session> {
        let request = self
            .client
            .post(self.url("/sessions/"))
            .json(&CreateSessionRequest { title });
        let response = self.execute(request, "sessions/create").await?;
        let dto: SessionDto = Self::read_json(response, "sessions/create").await?;
        Ok(dto.into())
    }

    async fn rename(&self, session_id: &str, title: &str) -> Result<()> {
        let request = self
            .client
            .put(self.url(&format!("/sessions/{session_id}")))
            .json(&UpdateSessionRequest { title });
        self.execute(request, "sessions/rename").await?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/sessions/{session_id}")));
        self.execute(request, "sessions/delete").await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let request = self.client.delete(self.url("/sessions/"));
        self.execute(request, "sessions/delete_all").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::credential::MemoryCredentialStore;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpChatApi::new(
            "http://localhost:8000/",
            Arc::new(MemoryCredentialStore::new(Some("t".into()))),
        );
        assert_eq!(api.url("/chat/text"), "http://localhost:8000/chat/text");
    }

    #[tokio::test]
    async fn test_missing_token_fails_fast_with_unauthorized() {
        // Port 9 (discard) would never answer; the call must not get that far.
        let api = HttpChatApi::new("http://127.0.0.1:9", Arc::new(MemoryCredentialStore::new(None)));

        let err = api.send_text("xin chào", None).await.unwrap_err();
        assert!(err.is_unauthorized());

        let err = api.list().await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_file_part_rejects_bad_content_type() {
        let file = FileUpload::new("a.pdf", Some("not a mime".into()), vec![1]);
        assert!(file_part(&file).is_err());
    }
}
