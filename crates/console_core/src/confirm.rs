use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{oneshot, watch, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub title: String,
    pub message: String,
    pub requires_confirmation: bool,
}

impl ConfirmationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            requires_confirmation: true,
        }
    }

    /// A request that resolves `Confirmed` without prompting. Callers still go
    /// through the gate so the decision path stays uniform.
    pub fn silent(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            requires_confirmation: false,
        }
    }
}

/// Explicit "Yes" is `Confirmed`; cancel, backdrop or a vanished prompt all
/// count as `Dismissed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("another confirmation prompt is already open")]
pub struct GateBusy;

/// Yes/no prompt seam. Implementations present at most one prompt at a time
/// and perform no side effects of their own.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, request: ConfirmationRequest) -> Result<Decision, GateBusy>;
}

/// Prompt snapshot published for a rendering front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePrompt {
    pub title: String,
    pub message: String,
}

/// Process-wide modal gate. Concurrent `confirm` calls are rejected with
/// `GateBusy` rather than queued.
pub struct ModalConfirmationGate {
    pending: Mutex<Option<oneshot::Sender<Decision>>>,
    prompt: watch::Sender<Option<ActivePrompt>>,
}

impl ModalConfirmationGate {
    pub fn new() -> Self {
        let (prompt, _) = watch::channel(None);
        Self {
            pending: Mutex::new(None),
            prompt,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ActivePrompt>> {
        self.prompt.subscribe()
    }

    pub fn active_prompt(&self) -> Option<ActivePrompt> {
        self.prompt.borrow().clone()
    }

    /// Resolves the pending prompt, if any. Returns `false` when no prompt
    /// was open.
    pub async fn resolve(&self, decision: Decision) -> bool {
        let responder = self.pending.lock().await.take();
        let _ = self.prompt.send(None);
        match responder {
            Some(tx) => {
                let _ = tx.send(decision);
                true
            }
            None => false,
        }
    }
}

impl Default for ModalConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmationGate for ModalConfirmationGate {
    async fn confirm(&self, request: ConfirmationRequest) -> Result<Decision, GateBusy> {
        if !request.requires_confirmation {
            return Ok(Decision::Confirmed);
        }

        let rx = {
            let mut pending = self.pending.lock().await;
            if pending.is_some() {
                return Err(GateBusy);
            }
            let (tx, rx) = oneshot::channel();
            *pending = Some(tx);
            rx
        };

        let _ = self.prompt.send(Some(ActivePrompt {
            title: request.title,
            message: request.message,
        }));

        match rx.await {
            Ok(decision) => Ok(decision),
            // The responder vanished without answering; treat as dismissal.
            Err(_) => Ok(Decision::Dismissed),
        }
    }
}

#[cfg(test)]
#[path = "tests/confirm_tests.rs"]
mod tests;
