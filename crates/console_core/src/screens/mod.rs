//! Screen controllers: one orchestrator per admin view, wiring a cache, an
//! editor, the confirmation gate and the notifier into the list/edit/delete
//! flow. Rendering stays outside; screens expose snapshots and accept the
//! events a front end forwards.

mod catalog;
mod login;
mod orders;
mod services;

pub use catalog::{CatalogEntry, CatalogScreen};
pub use login::LoginScreen;
pub use orders::{OrderRow, OrdersScreen, UNKNOWN_SERVICE, UNKNOWN_USER};
pub use services::{ServiceRow, ServicesScreen, UNCATEGORIZED};

use std::sync::Arc;

use shared::domain::{Category, User};
use tracing::{debug, warn};

use crate::{
    cache::{EntityCache, SearchMatcher},
    confirm::{ConfirmationGate, ConfirmationRequest, Decision},
    editor::{EditorSession, FieldOf, FieldState, SubmitError},
    notify::{Notifier, Severity},
    resource::{Resource, ResourceClient},
};

/// Case-insensitive containment over a fixed set of fields. The term arrives
/// already trimmed and lowercased from the cache.
pub(crate) fn text_matches(term: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}

fn sentence_label<R: Resource>() -> String {
    let mut chars = R::LABEL.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The recurring admin-view contract: load and search a collection, edit one
/// record in a modal, confirm destructive actions, surface outcomes as
/// notifications. Concrete screens either use this directly or wrap it to
/// add reference data.
pub struct ResourceScreen<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    cache: EntityCache<R>,
    editor: EditorSession<R>,
    gate: Arc<dyn ConfirmationGate>,
    notifier: Arc<dyn Notifier>,
}

impl<R: Resource> ResourceScreen<R> {
    pub fn new(
        client: Arc<dyn ResourceClient<R>>,
        matcher: SearchMatcher<R>,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cache: EntityCache::new(client.clone(), matcher),
            editor: EditorSession::new(client.clone()),
            client,
            gate,
            notifier,
        }
    }

    /// Initial (or repeated) entry into the view. A failed load keeps
    /// whatever was on screen and reports the error.
    pub async fn activate(&self) {
        if let Err(err) = self.cache.load().await {
            self.notifier
                .show(
                    &format!("Failed to load {}: {err}", R::PATH),
                    Severity::Error,
                )
                .await;
        }
    }

    pub async fn search(&self, term: &str) {
        self.cache.set_search_term(term).await;
    }

    pub async fn visible(&self) -> Vec<R> {
        self.cache.visible().await
    }

    pub async fn open_new(&self) {
        if let Err(err) = self.editor.open_for_create().await {
            debug!(resource = R::PATH, error = %err, "screen: open rejected");
        }
    }

    /// Opens the editor for a cached entity. A vanished id is reported and
    /// leaves the editor untouched.
    pub async fn open_edit(&self, id: R::Id) {
        let Some(entity) = self.cache.find_by_id(id).await else {
            self.notifier
                .show(
                    &format!("{} {id} is no longer available", sentence_label::<R>()),
                    Severity::Warning,
                )
                .await;
            return;
        };
        if let Err(err) = self.editor.open_for_edit(&entity).await {
            debug!(resource = R::PATH, error = %err, "screen: open rejected");
        }
    }

    /// Submits the editor draft. Validation failures stay silent at screen
    /// level; remote failures become an error notification and the editor
    /// stays open for another attempt.
    pub async fn submit(&self) {
        let was_creating = matches!(
            self.editor.mode().await,
            crate::editor::EditorMode::Creating
        );
        match self.editor.submit().await {
            Ok(_saved) => {
                let verb = if was_creating { "created" } else { "updated" };
                let message = format!("{} {verb}", sentence_label::<R>());
                self.reload_after_mutation(&message).await;
            }
            Err(SubmitError::Validation(invalid)) => {
                debug!(
                    resource = R::PATH,
                    invalid = invalid.len(),
                    "screen: submit blocked by validation"
                );
            }
            Err(SubmitError::Remote(err)) => {
                self.notifier
                    .show(
                        &format!("Failed to save {}: {err}", R::LABEL),
                        Severity::Error,
                    )
                    .await;
            }
            Err(err) => {
                debug!(resource = R::PATH, error = %err, "screen: submit rejected");
            }
        }
    }

    /// Asks the gate, then deletes. Dismissal does nothing at all; a busy
    /// gate is logged and otherwise ignored.
    pub async fn delete(&self, id: R::Id) {
        let request = ConfirmationRequest::new(
            format!("Delete {}", R::LABEL),
            format!(
                "Are you sure you want to delete this {}? This cannot be undone.",
                R::LABEL
            ),
        );
        let decision = match self.gate.confirm(request).await {
            Ok(decision) => decision,
            Err(busy) => {
                warn!(resource = R::PATH, error = %busy, "screen: delete not prompted");
                return;
            }
        };
        if decision != Decision::Confirmed {
            debug!(resource = R::PATH, "screen: delete dismissed");
            return;
        }

        match self.client.delete(id).await {
            Ok(()) => {
                let message = format!("{} deleted", sentence_label::<R>());
                self.reload_after_mutation(&message).await;
            }
            Err(err) => {
                self.notifier
                    .show(
                        &format!("Failed to delete {}: {err}", R::LABEL),
                        Severity::Error,
                    )
                    .await;
            }
        }
    }

    /// Refresh-after-mutation: the success toast only fires once the reload
    /// settles, so the list on screen matches the announcement.
    async fn reload_after_mutation(&self, success_message: &str) {
        match self.cache.load().await {
            Ok(()) => {
                self.notifier.show(success_message, Severity::Success).await;
            }
            Err(err) => {
                self.notifier
                    .show(
                        &format!("Failed to reload {}: {err}", R::PATH),
                        Severity::Error,
                    )
                    .await;
            }
        }
    }

    pub async fn field_state(&self, field: FieldOf<R>) -> FieldState {
        self.editor.field_state(field).await
    }

    pub fn cache(&self) -> &EntityCache<R> {
        &self.cache
    }

    pub fn editor(&self) -> &EditorSession<R> {
        &self.editor
    }
}

/// Categories need no reference data; the generic screen is the whole view.
pub type CategoriesScreen = ResourceScreen<Category>;

pub fn categories_screen(
    client: Arc<dyn ResourceClient<Category>>,
    gate: Arc<dyn ConfirmationGate>,
    notifier: Arc<dyn Notifier>,
) -> CategoriesScreen {
    let matcher: SearchMatcher<Category> =
        Box::new(|category, term| text_matches(term, &[&category.name, &category.description]));
    ResourceScreen::new(client, matcher, gate, notifier)
}

pub type UsersScreen = ResourceScreen<User>;

pub fn users_screen(
    client: Arc<dyn ResourceClient<User>>,
    gate: Arc<dyn ConfirmationGate>,
    notifier: Arc<dyn Notifier>,
) -> UsersScreen {
    let matcher: SearchMatcher<User> = Box::new(|user, term| {
        text_matches(term, &[&user.name, &user.email, user.role.label()])
    });
    ResourceScreen::new(client, matcher, gate, notifier)
}

#[cfg(test)]
#[path = "../tests/screens_tests.rs"]
mod tests;
