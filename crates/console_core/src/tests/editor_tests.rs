use std::sync::Arc;

use shared::{
    domain::{Category, CategoryId, Classification, Service, ServiceId},
    error::ResourceError,
};

use super::*;
use crate::forms::{CategoryField, ServiceDraft, ServiceField};

#[path = "support.rs"]
mod support;

use support::{service, RecordingClient};

async fn fill_valid(editor: &EditorSession<Service>) {
    editor
        .update_field(ServiceField::Name, |d| d.name = "Catering".into())
        .await
        .expect("name");
    editor
        .update_field(ServiceField::Description, |d| d.description = "Full menu".into())
        .await
        .expect("description");
    editor
        .update_field(ServiceField::Category, |d| d.category_id = Some(CategoryId(1)))
        .await
        .expect("category");
    editor
        .update_field(ServiceField::Image, |d| d.image_url = "catering.png".into())
        .await
        .expect("image");
    editor
        .update_field(ServiceField::Classification, |d| {
            d.classification = Some(Classification::Plata)
        })
        .await
        .expect("classification");
}

#[tokio::test]
async fn open_for_create_seeds_defaults_with_errors_hidden() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client);

    editor.open_for_create().await.expect("open");
    assert_eq!(editor.mode().await, EditorMode::Creating);
    assert!(editor.is_open().await);

    let draft = editor.draft().await.expect("draft");
    assert_eq!(draft, ServiceDraft::default());

    // Invalid but pristine: the error exists and stays hidden.
    let name = editor.field_state(ServiceField::Name).await;
    assert!(!name.touched);
    assert_eq!(name.error, Some(FieldError::Required));
    assert!(name.visible_error().is_none());
}

#[tokio::test]
async fn open_for_edit_copies_the_entity() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client);
    let entity = service(7, "Catering", Classification::Oro);

    editor.open_for_edit(&entity).await.expect("open");
    assert_eq!(editor.mode().await, EditorMode::Editing(ServiceId(7)));

    let draft = editor.draft().await.expect("draft");
    assert_eq!(draft.name, "Catering");
    assert_eq!(draft.classification, Some(Classification::Oro));
    assert!(editor.field_state(ServiceField::Name).await.is_valid());
}

#[tokio::test]
async fn update_field_marks_touched_and_revalidates() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client);
    editor.open_for_create().await.expect("open");

    editor
        .update_field(ServiceField::Name, |d| d.name = "Catering".into())
        .await
        .expect("set name");
    let state = editor.field_state(ServiceField::Name).await;
    assert!(state.touched);
    assert!(state.is_valid());

    editor
        .update_field(ServiceField::Name, |d| d.name.clear())
        .await
        .expect("clear name");
    let state = editor.field_state(ServiceField::Name).await;
    assert_eq!(state.visible_error(), Some(&FieldError::Required));
}

#[tokio::test]
async fn update_field_requires_an_open_editor() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client);

    let err = editor
        .update_field(ServiceField::Name, |d| d.name = "x".into())
        .await
        .expect_err("closed editor");
    assert_eq!(err, EditorError::NotOpen);
}

#[tokio::test]
async fn invalid_submit_touches_everything_and_never_calls_the_store() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client.clone());
    editor.open_for_create().await.expect("open");

    let err = editor.submit().await.expect_err("invalid draft");
    assert!(matches!(err, SubmitError::Validation(ref fields) if fields.len() == 5));

    // Valid fields are touched too, with no error to show.
    let price = editor.field_state(ServiceField::Price).await;
    assert!(price.touched);
    assert!(price.is_valid());
    let name = editor.field_state(ServiceField::Name).await;
    assert_eq!(name.visible_error(), Some(&FieldError::Required));

    assert!(client.call_names().await.is_empty());
    assert_eq!(editor.mode().await, EditorMode::Creating);
}

#[tokio::test]
async fn category_submit_insists_on_a_description() {
    let client = Arc::new(RecordingClient::<Category>::new());
    let editor = EditorSession::new(client.clone());
    editor.open_for_create().await.expect("open");
    editor
        .update_field(CategoryField::Name, |d| d.name = "Bodas".into())
        .await
        .expect("name");

    let err = editor.submit().await.expect_err("blank description");
    assert!(matches!(
        err,
        SubmitError::Validation(ref fields)
            if fields == &[(CategoryField::Description, FieldError::Required)]
    ));
    assert_eq!(
        editor
            .field_state(CategoryField::Description)
            .await
            .visible_error(),
        Some(&FieldError::Required)
    );
    assert!(client.call_names().await.is_empty());
    assert_eq!(editor.mode().await, EditorMode::Creating);
}

#[tokio::test]
async fn successful_create_closes_the_session() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client.clone());
    editor.open_for_create().await.expect("open");
    fill_valid(&editor).await;

    client
        .script_create(Ok(service(10, "Catering", Classification::Plata)))
        .await;
    let saved = editor.submit().await.expect("submit");
    assert_eq!(saved.id, ServiceId(10));

    assert_eq!(editor.mode().await, EditorMode::Closed);
    assert!(editor.draft().await.is_none());
    assert_eq!(client.call_names().await, vec!["create"]);
    assert_eq!(client.created.lock().await[0].name, "Catering");
}

#[tokio::test]
async fn successful_edit_dispatches_update_with_the_entity_id() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client.clone());
    let entity = service(7, "Catering", Classification::Plata);
    editor.open_for_edit(&entity).await.expect("open");

    editor
        .update_field(ServiceField::Name, |d| d.name = "Catering premium".into())
        .await
        .expect("rename");

    let mut updated = entity.clone();
    updated.name = "Catering premium".into();
    client.script_update(Ok(updated)).await;

    let saved = editor.submit().await.expect("submit");
    assert_eq!(saved.name, "Catering premium");
    assert_eq!(editor.mode().await, EditorMode::Closed);

    let recorded = client.updated.lock().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, ServiceId(7));
    assert_eq!(recorded[0].1.name, "Catering premium");
}

#[tokio::test]
async fn remote_failure_keeps_the_draft_for_a_retry() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client.clone());
    editor.open_for_create().await.expect("open");
    fill_valid(&editor).await;

    client
        .script_create(Err(ResourceError::Server {
            status: 500,
            message: "boom".into(),
        }))
        .await;
    let err = editor.submit().await.expect_err("remote failure");
    assert!(matches!(
        err,
        SubmitError::Remote(ResourceError::Server { status: 500, .. })
    ));

    assert_eq!(editor.mode().await, EditorMode::Creating);
    assert_eq!(editor.draft().await.expect("draft kept").name, "Catering");
    assert!(!editor.submit_pending().await);

    client
        .script_create(Ok(service(11, "Catering", Classification::Plata)))
        .await;
    editor.submit().await.expect("retry succeeds");
    assert_eq!(editor.mode().await, EditorMode::Closed);
}

#[tokio::test]
async fn reopening_replaces_the_previous_draft() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client);
    editor.open_for_create().await.expect("open");
    editor
        .update_field(ServiceField::Name, |d| d.name = "Half typed".into())
        .await
        .expect("type");

    editor.open_for_create().await.expect("reopen");
    assert_eq!(editor.draft().await.expect("draft").name, "");

    let entity = service(3, "Decoración", Classification::Diamante);
    editor.open_for_edit(&entity).await.expect("switch to edit");
    assert_eq!(editor.mode().await, EditorMode::Editing(ServiceId(3)));
    assert_eq!(editor.draft().await.expect("draft").name, "Decoración");
}

#[tokio::test]
async fn everything_is_rejected_while_a_submit_is_in_flight() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = Arc::new(EditorSession::new(client.clone()));
    editor.open_for_create().await.expect("open");
    fill_valid(&editor).await;

    let release = client
        .script_gated_create(Ok(service(12, "Catering", Classification::Plata)))
        .await;

    let task_editor = editor.clone();
    let in_flight = tokio::spawn(async move { task_editor.submit().await });
    client.wait_for_call_count(1).await;
    assert!(editor.submit_pending().await);

    assert_eq!(
        editor.open_for_create().await,
        Err(EditorError::SubmitInFlight)
    );
    let entity = service(1, "Fotografía", Classification::Plata);
    assert_eq!(
        editor.open_for_edit(&entity).await,
        Err(EditorError::SubmitInFlight)
    );
    assert_eq!(
        editor
            .update_field(ServiceField::Name, |d| d.name = "other".into())
            .await,
        Err(EditorError::SubmitInFlight)
    );
    assert!(matches!(
        editor.submit().await,
        Err(SubmitError::SubmitInFlight)
    ));

    let _ = release.send(());
    let saved = in_flight.await.expect("join").expect("submit");
    assert_eq!(saved.id, ServiceId(12));
    assert_eq!(editor.mode().await, EditorMode::Closed);
}

#[tokio::test]
async fn close_discards_draft_and_field_state() {
    let client = Arc::new(RecordingClient::<Service>::new());
    let editor = EditorSession::new(client);
    editor.open_for_create().await.expect("open");
    editor
        .update_field(ServiceField::Name, |d| d.name = "Catering".into())
        .await
        .expect("type");

    editor.close().await;
    assert_eq!(editor.mode().await, EditorMode::Closed);
    assert!(editor.draft().await.is_none());
    assert_eq!(
        editor.field_state(ServiceField::Name).await,
        FieldState::default()
    );
}
