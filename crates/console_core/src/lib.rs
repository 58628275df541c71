//! Client core for the booking admin console: entity caches, modal editor
//! state machines, the confirmation gate, transient notifications, the REST
//! resource client and the per-view screen controllers. Front ends render
//! snapshots from this crate and forward events into it; nothing here draws.

pub mod cache;
pub mod config;
pub mod confirm;
pub mod editor;
pub mod forms;
pub mod notify;
pub mod resource;
pub mod screens;
pub mod session;

pub use cache::{EntityCache, SearchMatcher};
pub use config::{load_settings, Settings};
pub use confirm::{
    ActivePrompt, ConfirmationGate, ConfirmationRequest, Decision, GateBusy, ModalConfirmationGate,
};
pub use editor::{
    EditorError, EditorMode, EditorSession, FieldError, FieldState, FormModel, SubmitError,
};
pub use notify::{Notification, NotificationChannel, Notifier, Severity};
pub use resource::{Resource, ResourceClient, RestResource};
pub use session::{AuthError, Authenticator, EphemeralSessionStore, FileSessionStore, Session, SessionStore};
