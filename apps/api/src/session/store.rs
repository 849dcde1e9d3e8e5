use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{
    ContractUpload, DraftedNotice, GenerationSnapshot, NoticeSession, PhotoUploadOutcome,
    ProjectInfo, SessionSummary,
};
use crate::models::photo::{EvidencePhoto, PhotoSummary};
use crate::notice::models::NoticeDocument;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("no photo at index {0}")]
    PhotoNotFound(usize),

    #[error("missing required input: {}", .0.join(", "))]
    MissingInputs(Vec<&'static str>),

    #[error("a notice is already being generated for this session")]
    GenerationInFlight,

    #[error("session inputs changed while the notice was being generated")]
    Superseded,

    #[error("no notice has been generated yet")]
    NoNotice,
}

/// Everything the PDF renderer needs, copied out of the session.
#[derive(Debug, Clone)]
pub struct RenderInputs {
    pub project_name: String,
    pub document: NoticeDocument,
    pub photos: Vec<EvidencePhoto>,
}

/// In-memory session map. Each mutation holds the write lock for its whole
/// read-modify-write, so a session never observes a partial update.
///
/// Every access refreshes the session's idle clock. Sessions untouched for
/// longer than `idle_ttl` are gone: lookups treat them as not found and
/// `evict_idle` frees them. A session with a generation in flight never expires.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, NoticeSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    pub async fn create(&self, now: NaiveDateTime) -> SessionSummary {
        let session = NoticeSession::new(now);
        let summary = session.summary();
        self.sessions.write().await.insert(session.id, session);
        info!(session_id = %summary.session_id, "Session created");
        summary
    }

    pub async fn summary(&self, id: Uuid) -> Result<SessionSummary, SessionError> {
        self.mutate(id, |session| Ok(session.summary())).await
    }

    /// Discards the session and everything attached to it.
    pub async fn delete(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!(session_id = %id, "Session discarded"))
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        project: ProjectInfo,
    ) -> Result<SessionSummary, SessionError> {
        self.mutate(id, |session| {
            let project = project.normalized();
            if session.project != project {
                session.project = project;
                session.bump_revision();
            }
            Ok(session.summary())
        })
        .await
    }

    /// Replaces any previous contract.
    pub async fn set_contract(
        &self,
        id: Uuid,
        upload: ContractUpload,
    ) -> Result<SessionSummary, SessionError> {
        self.mutate(id, |session| {
            session.contract = Some(upload);
            session.bump_revision();
            Ok(session.summary())
        })
        .await
    }

    /// Appends photos in order up to the remaining capacity; the rest are dropped.
    pub async fn add_photos(
        &self,
        id: Uuid,
        photos: Vec<EvidencePhoto>,
    ) -> Result<PhotoUploadOutcome, SessionError> {
        self.mutate(id, |session| {
            let offered = photos.len();
            let mut accepted = 0;
            for photo in photos.into_iter().take(session.photos.remaining_capacity()) {
                if session.photos.push(photo).is_ok() {
                    accepted += 1;
                }
            }
            if accepted > 0 {
                session.bump_revision();
            }
            debug!(session_id = %session.id, accepted, offered, "Photos added");
            Ok(PhotoUploadOutcome {
                accepted,
                dropped: offered - accepted,
                photos: session.photos.summaries(),
            })
        })
        .await
    }

    pub async fn remove_photo(
        &self,
        id: Uuid,
        index: usize,
    ) -> Result<Vec<PhotoSummary>, SessionError> {
        self.mutate(id, |session| {
            session
                .photos
                .remove(index)
                .ok_or(SessionError::PhotoNotFound(index))?;
            session.bump_revision();
            Ok(session.photos.summaries())
        })
        .await
    }

    /// Validates inputs, marks the session as generating and returns a copy of
    /// the inputs to draft from.
    pub async fn begin_generation(&self, id: Uuid) -> Result<GenerationSnapshot, SessionError> {
        self.mutate(id, |session| {
            if session.generating {
                return Err(SessionError::GenerationInFlight);
            }
            let missing = session.missing_inputs();
            if !missing.is_empty() {
                return Err(SessionError::MissingInputs(missing));
            }
            session.generating = true;
            Ok(GenerationSnapshot {
                revision: session.revision,
                project: session.project.clone(),
                photos: session.photos.as_slice().to_vec(),
                facts: session.drafting_facts(),
            })
        })
        .await
    }

    /// Commits a drafted notice if the inputs are unchanged since `revision`.
    /// Always clears the generating flag.
    pub async fn finish_generation(
        &self,
        id: Uuid,
        revision: u64,
        document: NoticeDocument,
    ) -> Result<NoticeDocument, SessionError> {
        self.mutate(id, |session| {
            session.generating = false;
            if session.revision != revision {
                info!(
                    session_id = %id,
                    drafted_from = revision,
                    current = session.revision,
                    "Discarding superseded notice"
                );
                return Err(SessionError::Superseded);
            }
            session.notice = Some(DraftedNotice {
                document: document.clone(),
                revision,
            });
            Ok(document)
        })
        .await
    }

    /// Clears the generating flag without committing anything.
    pub async fn abort_generation(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.generating = false;
        }
    }

    pub async fn render_inputs(&self, id: Uuid) -> Result<RenderInputs, SessionError> {
        self.mutate(id, |session| {
            let notice = session.notice.as_ref().ok_or(SessionError::NoNotice)?;
            Ok(RenderInputs {
                project_name: session.project.project_name.clone(),
                document: notice.document.clone(),
                photos: session.photos.as_slice().to_vec(),
            })
        })
        .await
    }

    /// Project name of the drafted notice, for the mail hand-off.
    pub async fn notice_project_name(&self, id: Uuid) -> Result<String, SessionError> {
        self.mutate(id, |session| {
            session.notice.as_ref().ok_or(SessionError::NoNotice)?;
            Ok(session.project.project_name.clone())
        })
        .await
    }

    /// Drops every session idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !is_expired(session, now, self.idle_ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    /// Runs `evict_idle` every `period` for the life of the process.
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        })
    }

    /// Runs `f` against a live session and refreshes its idle clock.
    async fn mutate<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut NoticeSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        if is_expired(session, now, self.idle_ttl) {
            sessions.remove(&id);
            info!(session_id = %id, "Session expired");
            return Err(SessionError::NotFound(id));
        }

        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.touched_at = now;
        f(session)
    }
}

fn is_expired(session: &NoticeSession, now: Instant, idle_ttl: Duration) -> bool {
    !session.generating && now.duration_since(session.touched_at) > idle_ttl
}
