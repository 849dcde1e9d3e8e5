// In-memory notice sessions: form inputs, uploads and the drafted notice.
// Nothing survives a restart.

pub mod handlers;
pub mod models;
pub mod store;

pub use models::{ContractUpload, ProjectInfo, SessionSummary};
pub use store::{RenderInputs, SessionError, SessionStore};
