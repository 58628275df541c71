use std::{collections::HashMap, fmt::Debug, hash::Hash, sync::Arc};

use shared::error::ResourceError;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::resource::{Resource, ResourceClient};

/// Per-field validation failure, rendered next to the offending input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("this field is required")]
    Required,
    #[error("must be at most {max} characters")]
    MaxLength { max: usize },
    #[error("must be at least {min} characters")]
    MinLength { min: usize },
    #[error("must be {min} or greater")]
    Min { min: f64 },
    #[error("must be a valid email address")]
    Email,
}

pub fn require_text(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(())
    }
}

pub fn require_some<T>(value: &Option<T>) -> Result<(), FieldError> {
    if value.is_none() {
        Err(FieldError::Required)
    } else {
        Ok(())
    }
}

pub fn max_length(value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        Err(FieldError::MaxLength { max })
    } else {
        Ok(())
    }
}

pub fn min_length(value: &str, min: usize) -> Result<(), FieldError> {
    if value.chars().count() < min {
        Err(FieldError::MinLength { min })
    } else {
        Ok(())
    }
}

pub fn min_value(value: f64, min: f64) -> Result<(), FieldError> {
    if value < min {
        Err(FieldError::Min { min })
    } else {
        Ok(())
    }
}

pub fn email_shape(value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return Err(FieldError::Email);
    };
    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || value.contains(char::is_whitespace)
    {
        return Err(FieldError::Email);
    }
    Ok(())
}

/// Typed editor draft: a field enumeration plus one validation rule per
/// field, declared as an explicit `match` rather than a string-keyed map.
pub trait FormModel: Clone + Debug + Send + Sync + 'static {
    type Field: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Every editable field, in display order. Drives the "all fields
    /// touched" transition on a failed submit.
    const FIELDS: &'static [Self::Field];

    fn validate_field(&self, field: Self::Field) -> Result<(), FieldError>;

    fn invalid_fields(&self) -> Vec<(Self::Field, FieldError)> {
        Self::FIELDS
            .iter()
            .filter_map(|field| self.validate_field(*field).err().map(|err| (*field, err)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldState {
    pub touched: bool,
    pub error: Option<FieldError>,
}

impl FieldState {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_pristine(&self) -> bool {
        !self.touched
    }

    /// Error to surface in the form; errors on pristine fields stay hidden.
    pub fn visible_error(&self) -> Option<&FieldError> {
        if self.touched {
            self.error.as_ref()
        } else {
            None
        }
    }
}

/// Field states for a freshly seeded draft: everything pristine, validity
/// already computed.
pub fn seeded_field_states<D: FormModel>(draft: &D) -> HashMap<D::Field, FieldState> {
    D::FIELDS
        .iter()
        .map(|field| {
            (
                *field,
                FieldState {
                    touched: false,
                    error: draft.validate_field(*field).err(),
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode<Id> {
    Closed,
    Creating,
    Editing(Id),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("editor is not open")]
    NotOpen,
    #[error("a submit is already in flight")]
    SubmitInFlight,
}

#[derive(Debug, Error)]
pub enum SubmitError<F: Debug + Send + Sync + 'static> {
    #[error("editor is not open")]
    NotOpen,
    #[error("a submit is already in flight")]
    SubmitInFlight,
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<(F, FieldError)>),
    #[error("remote store rejected the submission: {0}")]
    Remote(#[from] ResourceError),
}

pub type FieldOf<R> = <<R as Resource>::Draft as FormModel>::Field;

enum Dispatch<Id> {
    Create,
    Update(Id),
}

/// Finite-state controller for the create/edit modal of one resource type.
/// Opening seeds a typed draft; `submit` validates locally before touching
/// the remote store and closes only on success.
pub struct EditorSession<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    inner: Mutex<EditorState<R>>,
}

struct EditorState<R: Resource> {
    mode: EditorMode<R::Id>,
    draft: Option<R::Draft>,
    fields: HashMap<FieldOf<R>, FieldState>,
    submit_pending: bool,
}

impl<R: Resource> EditorSession<R> {
    pub fn new(client: Arc<dyn ResourceClient<R>>) -> Self {
        Self {
            client,
            inner: Mutex::new(EditorState {
                mode: EditorMode::Closed,
                draft: None,
                fields: HashMap::new(),
                submit_pending: false,
            }),
        }
    }

    /// Opens with the resource's create defaults. Replaces any prior draft;
    /// rejected while a submit is in flight.
    pub async fn open_for_create(&self) -> Result<(), EditorError> {
        let mut state = self.inner.lock().await;
        if state.submit_pending {
            return Err(EditorError::SubmitInFlight);
        }
        let draft = R::new_draft();
        state.fields = seeded_field_states(&draft);
        state.draft = Some(draft);
        state.mode = EditorMode::Creating;
        Ok(())
    }

    /// Opens with a draft copied from the entity. The cached entity itself is
    /// never mutated through the draft.
    pub async fn open_for_edit(&self, entity: &R) -> Result<(), EditorError> {
        let mut state = self.inner.lock().await;
        if state.submit_pending {
            return Err(EditorError::SubmitInFlight);
        }
        let draft = entity.edit_draft();
        state.fields = seeded_field_states(&draft);
        state.draft = Some(draft);
        state.mode = EditorMode::Editing(entity.id());
        Ok(())
    }

    /// Applies a typed mutation, marks the field touched and revalidates it.
    pub async fn update_field<M>(&self, field: FieldOf<R>, mutate: M) -> Result<(), EditorError>
    where
        M: FnOnce(&mut R::Draft),
    {
        let mut state = self.inner.lock().await;
        if state.submit_pending {
            return Err(EditorError::SubmitInFlight);
        }
        let Some(draft) = state.draft.as_mut() else {
            return Err(EditorError::NotOpen);
        };
        mutate(draft);
        let error = draft.validate_field(field).err();
        state.fields.insert(field, FieldState { touched: true, error });
        Ok(())
    }

    /// Validates the whole draft, then dispatches create or update per mode.
    /// An invalid draft marks every field touched and never reaches the
    /// remote store. On success the session closes; on remote failure the
    /// draft stays intact.
    pub async fn submit(&self) -> Result<R, SubmitError<FieldOf<R>>> {
        let (dispatch, draft) = {
            let mut state = self.inner.lock().await;
            if state.submit_pending {
                return Err(SubmitError::SubmitInFlight);
            }
            let dispatch = match state.mode {
                EditorMode::Closed => return Err(SubmitError::NotOpen),
                EditorMode::Creating => Dispatch::Create,
                EditorMode::Editing(id) => Dispatch::Update(id),
            };
            let Some(draft) = state.draft.clone() else {
                return Err(SubmitError::NotOpen);
            };

            let invalid = draft.invalid_fields();
            if !invalid.is_empty() {
                for field in <R::Draft as FormModel>::FIELDS {
                    let error = draft.validate_field(*field).err();
                    state.fields.insert(*field, FieldState { touched: true, error });
                }
                debug!(
                    resource = R::PATH,
                    invalid = invalid.len(),
                    "editor: rejecting invalid draft"
                );
                return Err(SubmitError::Validation(invalid));
            }

            state.submit_pending = true;
            (dispatch, draft)
        };

        let outcome = match dispatch {
            Dispatch::Create => self.client.create(&draft).await,
            Dispatch::Update(id) => self.client.update(id, &draft).await,
        };

        let mut state = self.inner.lock().await;
        state.submit_pending = false;
        match outcome {
            Ok(saved) => {
                state.mode = EditorMode::Closed;
                state.draft = None;
                state.fields.clear();
                Ok(saved)
            }
            Err(err) => Err(SubmitError::Remote(err)),
        }
    }

    /// Legal from any state; discards the draft without side effects. An
    /// in-flight submit still completes and clears its own pending flag.
    pub async fn close(&self) {
        let mut state = self.inner.lock().await;
        state.mode = EditorMode::Closed;
        state.draft = None;
        state.fields.clear();
    }

    pub async fn mode(&self) -> EditorMode<R::Id> {
        self.inner.lock().await.mode
    }

    pub async fn is_open(&self) -> bool {
        !matches!(self.inner.lock().await.mode, EditorMode::Closed)
    }

    pub async fn draft(&self) -> Option<R::Draft> {
        self.inner.lock().await.draft.clone()
    }

    pub async fn field_state(&self, field: FieldOf<R>) -> FieldState {
        self.inner
            .lock()
            .await
            .fields
            .get(&field)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn submit_pending(&self) -> bool {
        self.inner.lock().await.submit_pending
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
