//! TranscriptRepository trait definition and its type-erased wrapper.
//!
//! The persistence backend is logically a `chats` collection with
//! insert-one-returning-id and update-by-id. Backends are chosen at runtime
//! from configuration, so `BoxTranscriptRepository` wraps any
//! implementation behind dynamic dispatch:
//! 1. Define an object-safe `TranscriptRepositoryDyn` trait with boxed futures
//! 2. Blanket-impl it for all `T: TranscriptRepository`
//! 3. `BoxTranscriptRepository` wraps `Box<dyn TranscriptRepositoryDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use talentchat_types::chat::{ChatRecord, Message, NewChatRecord, SessionHandle};
use talentchat_types::error::RepositoryError;

/// Repository trait for transcript persistence.
///
/// Implementations live in talentchat-infra (`SqliteTranscriptRepository`,
/// `RestTranscriptRepository`).
pub trait TranscriptRepository: Send + Sync {
    /// Backend name for logs (e.g., "sqlite", "rest").
    fn name(&self) -> &str;

    /// Insert a new transcript and return the backend-assigned id.
    fn create(
        &self,
        record: &NewChatRecord,
    ) -> impl Future<Output = Result<SessionHandle, RepositoryError>> + Send;

    /// Replace the stored conversation of an existing transcript.
    fn update(
        &self,
        handle: &SessionHandle,
        conversation: &[Message],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch a stored transcript by id.
    fn get(
        &self,
        handle: &SessionHandle,
    ) -> impl Future<Output = Result<Option<ChatRecord>, RepositoryError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`TranscriptRepository`] with boxed futures.
pub trait TranscriptRepositoryDyn: Send + Sync {
    fn name(&self) -> &str;

    fn create_boxed<'a>(
        &'a self,
        record: &'a NewChatRecord,
    ) -> BoxFuture<'a, Result<SessionHandle, RepositoryError>>;

    fn update_boxed<'a>(
        &'a self,
        handle: &'a SessionHandle,
        conversation: &'a [Message],
    ) -> BoxFuture<'a, Result<(), RepositoryError>>;

    fn get_boxed<'a>(
        &'a self,
        handle: &'a SessionHandle,
    ) -> BoxFuture<'a, Result<Option<ChatRecord>, RepositoryError>>;
}

impl<T: TranscriptRepository> TranscriptRepositoryDyn for T {
    fn name(&self) -> &str {
        TranscriptRepository::name(self)
    }

    fn create_boxed<'a>(
        &'a self,
        record: &'a NewChatRecord,
    ) -> BoxFuture<'a, Result<SessionHandle, RepositoryError>> {
        Box::pin(self.create(record))
    }

    fn update_boxed<'a>(
        &'a self,
        handle: &'a SessionHandle,
        conversation: &'a [Message],
    ) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.update(handle, conversation))
    }

    fn get_boxed<'a>(
        &'a self,
        handle: &'a SessionHandle,
    ) -> BoxFuture<'a, Result<Option<ChatRecord>, RepositoryError>> {
        Box::pin(self.get(handle))
    }
}

/// Type-erased transcript repository for runtime backend selection.
pub struct BoxTranscriptRepository {
    inner: Box<dyn TranscriptRepositoryDyn>,
}

impl BoxTranscriptRepository {
    /// Wrap a concrete `TranscriptRepository` in a type-erased box.
    pub fn new<T: TranscriptRepository + 'static>(repo: T) -> Self {
        Self {
            inner: Box::new(repo),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn create(&self, record: &NewChatRecord) -> Result<SessionHandle, RepositoryError> {
        self.inner.create_boxed(record).await
    }

    pub async fn update(
        &self,
        handle: &SessionHandle,
        conversation: &[Message],
    ) -> Result<(), RepositoryError> {
        self.inner.update_boxed(handle, conversation).await
    }

    pub async fn get(&self, handle: &SessionHandle) -> Result<Option<ChatRecord>, RepositoryError> {
        self.inner.get_boxed(handle).await
    }
}
