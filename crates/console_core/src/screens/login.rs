use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    editor::{seeded_field_states, FieldState, FormModel},
    forms::{LoginField, LoginForm},
    notify::{Notifier, Severity},
    session::{AuthError, Authenticator},
};

/// Credentials form plus submission flow. Shares the editor's field-state
/// conventions (pristine errors hidden, failed submit touches everything)
/// without being a resource editor.
pub struct LoginScreen {
    auth: Arc<Authenticator>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<LoginState>,
}

struct LoginState {
    form: LoginForm,
    fields: HashMap<LoginField, FieldState>,
    submitting: bool,
}

impl LoginScreen {
    pub fn new(auth: Arc<Authenticator>, notifier: Arc<dyn Notifier>) -> Self {
        let form = LoginForm::default();
        let fields = seeded_field_states(&form);
        Self {
            auth,
            notifier,
            state: Mutex::new(LoginState {
                form,
                fields,
                submitting: false,
            }),
        }
    }

    pub async fn update_email(&self, value: &str) {
        self.update_field(LoginField::Email, |form| form.email = value.to_owned())
            .await;
    }

    pub async fn update_password(&self, value: &str) {
        self.update_field(LoginField::Password, |form| {
            form.password = value.to_owned()
        })
        .await;
    }

    async fn update_field<M: FnOnce(&mut LoginForm)>(&self, field: LoginField, mutate: M) {
        let mut state = self.state.lock().await;
        if state.submitting {
            return;
        }
        mutate(&mut state.form);
        let error = state.form.validate_field(field).err();
        state.fields.insert(field, FieldState { touched: true, error });
    }

    /// Validates locally, then asks the authenticator. Returns whether a
    /// session was established.
    pub async fn submit(&self) -> bool {
        let (email, password) = {
            let mut state = self.state.lock().await;
            if state.submitting {
                debug!("login: submit already in flight");
                return false;
            }
            if !state.form.invalid_fields().is_empty() {
                for field in LoginForm::FIELDS {
                    let error = state.form.validate_field(*field).err();
                    state.fields.insert(*field, FieldState { touched: true, error });
                }
                debug!("login: rejecting invalid form");
                return false;
            }
            state.submitting = true;
            (state.form.email.clone(), state.form.password.clone())
        };

        let outcome = self.auth.login(&email, &password).await;

        let mut state = self.state.lock().await;
        state.submitting = false;
        match outcome {
            Ok(session) => {
                state.form = LoginForm::default();
                state.fields = seeded_field_states(&state.form);
                drop(state);
                self.notifier
                    .show(
                        &format!("Welcome back, {}", session.user.name),
                        Severity::Success,
                    )
                    .await;
                true
            }
            Err(AuthError::InvalidCredentials) => {
                drop(state);
                self.notifier
                    .show("Invalid email or password", Severity::Error)
                    .await;
                false
            }
            Err(AuthError::Remote(err)) => {
                drop(state);
                self.notifier
                    .show(&format!("Login failed: {err}"), Severity::Error)
                    .await;
                false
            }
        }
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
        self.notifier.show("Signed out", Severity::Info).await;
    }

    pub async fn field_state(&self, field: LoginField) -> FieldState {
        self.state
            .lock()
            .await
            .fields
            .get(&field)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn form(&self) -> LoginForm {
        self.state.lock().await.form.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.submitting
    }
}
