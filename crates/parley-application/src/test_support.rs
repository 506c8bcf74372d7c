//! Scripted collaborators for orchestrator tests.

use async_trait::async_trait;
use chrono::Utc;
use parley_core::attachment::FileUpload;
use parley_core::chat::{ChatApi, ChatReply, DocumentStatus};
use parley_core::config::PollPolicy;
use parley_core::credential::{CredentialStore, MemoryCredentialStore};
use parley_core::error::{ParleyError, Result};
use parley_core::session::{Message, ReasoningStep, Session, SessionDetail, SessionStore};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::context::{ChatContext, NoticeReceiver, OrchestratorSettings};

/// Records one outgoing chat request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SentRequest {
    Text {
        question: String,
        session_id: Option<String>,
    },
    Image {
        question: String,
        image_name: String,
        session_id: Option<String>,
    },
}

/// Mock ChatApi with scripted replies.
///
/// Sends, uploads and status checks can be held open with a gate (a semaphore with
/// zero permits) so tests can observe the in-flight state.
pub(crate) struct MockChatApi {
    reply: Mutex<Result<ChatReply>>,
    upload: Mutex<Result<String>>,
    statuses: Mutex<VecDeque<Result<DocumentStatus>>>,
    pub(crate) sent: Mutex<Vec<SentRequest>>,
    pub(crate) uploads: Mutex<Vec<(String, Option<String>)>>,
    pub(crate) status_checks: Mutex<Vec<String>>,
    send_gate: Option<Arc<Semaphore>>,
    upload_gate: Option<Arc<Semaphore>>,
    status_gate: Option<Arc<Semaphore>>,
}

impl MockChatApi {
    pub(crate) fn new() -> Self {
        Self {
            reply: Mutex::new(Ok(reply("Câu trả lời", Some("s-new")))),
            upload: Mutex::new(Ok("f1".to_string())),
            statuses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            status_checks: Mutex::new(Vec::new()),
            send_gate: None,
            upload_gate: None,
            status_gate: None,
        }
    }

    pub(crate) fn with_reply(self, reply: Result<ChatReply>) -> Self {
        self.set_reply(reply);
        self
    }

    /// Changes the reply for the following sends.
    pub(crate) fn set_reply(&self, reply: Result<ChatReply>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub(crate) fn with_upload(self, upload: Result<String>) -> Self {
        *self.upload.lock().unwrap() = upload;
        self
    }

    /// Statuses returned in order; once exhausted, every check says `uploaded`.
    pub(crate) fn with_statuses(self, statuses: Vec<Result<DocumentStatus>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub(crate) fn with_send_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.send_gate = Some(gate);
        self
    }

    pub(crate) fn with_upload_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    pub(crate) fn with_status_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.status_gate = Some(gate);
        self
    }

    pub(crate) fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub(crate) fn status_check_count(&self) -> usize {
        self.status_checks.lock().unwrap().len()
    }

    async fn pass_gate(gate: &Option<Arc<Semaphore>>) {
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn send_text(&self, question: &str, session_id: Option<&str>) -> Result<ChatReply> {
        self.sent.lock().unwrap().push(SentRequest::Text {
            question: question.to_string(),
            session_id: session_id.map(str::to_string),
        });
        Self::pass_gate(&self.send_gate).await;
        self.reply.lock().unwrap().clone()
    }

    async fn send_image(
        &self,
        question: &str,
        image: &FileUpload,
        session_id: Option<&str>,
    ) -> Result<ChatReply> {
        self.sent.lock().unwrap().push(SentRequest::Image {
            question: question.to_string(),
            image_name: image.name.clone(),
            session_id: session_id.map(str::to_string),
        });
        Self::pass_gate(&self.send_gate).await;
        self.reply.lock().unwrap().clone()
    }

    async fn upload_document(&self, file: &FileUpload, session_id: Option<&str>) -> Result<String> {
        self.uploads
            .lock()
            .unwrap()
            .push((file.name.clone(), session_id.map(str::to_string)));
        Self::pass_gate(&self.upload_gate).await;
        self.upload.lock().unwrap().clone()
    }

    async fn document_status(&self, attachment_id: &str) -> Result<DocumentStatus> {
        self.status_checks
            .lock()
            .unwrap()
            .push(attachment_id.to_string());
        Self::pass_gate(&self.status_gate).await;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(DocumentStatus::Uploaded))
    }
}

/// In-memory SessionStore.
pub(crate) struct MockSessionStore {
    sessions: Mutex<Vec<Session>>,
    histories: Mutex<HashMap<String, Vec<Message>>>,
    fail_with: Mutex<Option<ParleyError>>,
    pub(crate) list_calls: Mutex<usize>,
    load_gate: Option<Arc<Semaphore>>,
}

impl MockSessionStore {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            histories: Mutex::new(HashMap::new()),
            fail_with: Mutex::new(None),
            list_calls: Mutex::new(0),
            load_gate: None,
        }
    }

    pub(crate) fn with_session(self, id: &str, messages: Vec<Message>) -> Self {
        let mut session = Session::new(id);
        session.message_count = messages.len() as u32;
        self.sessions.lock().unwrap().insert(0, session);
        self.histories
            .lock()
            .unwrap()
            .insert(id.to_string(), messages);
        self
    }

    pub(crate) fn with_load_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.load_gate = Some(gate);
        self
    }

    /// Makes every following call fail with `err`.
    pub(crate) fn fail_with(&self, err: ParleyError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub(crate) fn list_call_count(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    fn check(&self) -> Result<()> {
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn list(&self) -> Result<Vec<Session>> {
        *self.list_calls.lock().unwrap() += 1;
        self.check()?;
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn load(&self, session_id: &str) -> Result<SessionDetail> {
        if let Some(gate) = &self.load_gate {
            gate.acquire().await.unwrap().forget();
        }
        self.check()?;
        let session = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or_else(|| ParleyError::not_found("session", session_id))?;
        let messages = self
            .histories
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        Ok(SessionDetail { session, messages })
    }

    async fn create(&self, title: Option<&str>) -> Result<Session> {
        self.check()?;
        let mut session = Session::new(format!("s{}", self.sessions.lock().unwrap().len() + 1));
        session.title = title.map(str::to_string);
        session.created_at = Some(Utc::now());
        self.sessions.lock().unwrap().insert(0, session.clone());
        Ok(session)
    }

    async fn rename(&self, session_id: &str, title: &str) -> Result<()> {
        self.check()?;
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| ParleyError::not_found("session", session_id))?;
        session.title = Some(title.to_string());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.check()?;
        self.sessions.lock().unwrap().retain(|s| s.id != session_id);
        self.histories.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.check()?;
        self.sessions.lock().unwrap().clear();
        self.histories.lock().unwrap().clear();
        Ok(())
    }
}

pub(crate) fn reply(answer: &str, session_id: Option<&str>) -> ChatReply {
    ChatReply {
        answer: answer.to_string(),
        session_id: session_id.map(str::to_string),
        reasoning_steps: Some(vec![ReasoningStep {
            agent: "supervisor".to_string(),
            action: "route".to_string(),
            detail: None,
        }]),
    }
}

pub(crate) fn pdf(name: &str) -> FileUpload {
    FileUpload::new(name, Some("application/pdf".to_string()), vec![b'%', b'P', b'D', b'F'])
}

pub(crate) fn png(name: &str) -> FileUpload {
    FileUpload::new(name, Some("image/png".to_string()), vec![0x89, b'P', b'N', b'G'])
}

pub(crate) fn history(count: usize) -> Vec<Message> {
    (1..=count)
        .map(|i| Message::new(format!("q{i}"), format!("a{i}"), Utc::now()))
        .collect()
}

/// Poll policy with the production numbers: 1s, then every 2s, 60 checks.
pub(crate) fn default_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        poll: PollPolicy {
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(2),
            max_attempts: 60,
        },
        ..OrchestratorSettings::default()
    }
}

pub(crate) struct Harness {
    pub(crate) context: Arc<ChatContext>,
    pub(crate) api: Arc<MockChatApi>,
    pub(crate) store: Arc<MockSessionStore>,
    pub(crate) credentials: Arc<MemoryCredentialStore>,
    pub(crate) notices: NoticeReceiver,
}

impl Harness {
    pub(crate) fn new(api: MockChatApi, store: MockSessionStore) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(store);
        let credentials = Arc::new(MemoryCredentialStore::new(Some("token".to_string())));
        let (context, notices) = ChatContext::new(
            api.clone(),
            store.clone(),
            credentials.clone() as Arc<dyn CredentialStore>,
            default_settings(),
        );
        Self {
            context: Arc::new(context),
            api,
            store,
            credentials,
            notices,
        }
    }

    /// Drains the notices raised so far.
    pub(crate) fn drain_notices(&mut self) -> Vec<parley_core::notice::Notice> {
        let mut drained = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            drained.push(notice);
        }
        drained
    }
}
