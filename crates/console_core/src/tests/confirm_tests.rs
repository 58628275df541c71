use std::{sync::Arc, time::Duration};

use super::*;

async fn wait_for_prompt(gate: &ModalConfirmationGate) -> ActivePrompt {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if let Some(prompt) = gate.active_prompt() {
                break prompt;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("prompt never appeared")
}

#[tokio::test]
async fn confirmed_resolution_reaches_the_caller() {
    let gate = Arc::new(ModalConfirmationGate::new());

    let task_gate = gate.clone();
    let pending = tokio::spawn(async move {
        task_gate
            .confirm(ConfirmationRequest::new("Delete service", "Sure?"))
            .await
    });

    let prompt = wait_for_prompt(&gate).await;
    assert_eq!(prompt.title, "Delete service");
    assert_eq!(prompt.message, "Sure?");

    assert!(gate.resolve(Decision::Confirmed).await);
    let decision = pending.await.expect("task").expect("not busy");
    assert_eq!(decision, Decision::Confirmed);
    assert!(gate.active_prompt().is_none());
}

#[tokio::test]
async fn dismissal_reaches_the_caller() {
    let gate = Arc::new(ModalConfirmationGate::new());

    let task_gate = gate.clone();
    let pending = tokio::spawn(async move {
        task_gate
            .confirm(ConfirmationRequest::new("Delete order", "Sure?"))
            .await
    });

    wait_for_prompt(&gate).await;
    assert!(gate.resolve(Decision::Dismissed).await);
    let decision = pending.await.expect("task").expect("not busy");
    assert_eq!(decision, Decision::Dismissed);
}

#[tokio::test]
async fn concurrent_prompt_is_rejected_not_queued() {
    let gate = Arc::new(ModalConfirmationGate::new());

    let task_gate = gate.clone();
    let first = tokio::spawn(async move {
        task_gate
            .confirm(ConfirmationRequest::new("Delete user", "Sure?"))
            .await
    });

    wait_for_prompt(&gate).await;

    let second = gate
        .confirm(ConfirmationRequest::new("Delete category", "Sure?"))
        .await;
    assert_eq!(second, Err(GateBusy));

    // The original prompt is untouched by the rejected request.
    assert_eq!(
        gate.active_prompt().expect("still prompting").title,
        "Delete user"
    );

    gate.resolve(Decision::Confirmed).await;
    assert_eq!(
        first.await.expect("task").expect("not busy"),
        Decision::Confirmed
    );
}

#[tokio::test]
async fn silent_requests_skip_the_prompt_entirely() {
    let gate = ModalConfirmationGate::new();

    let decision = gate
        .confirm(ConfirmationRequest::silent("Sync", "refresh data"))
        .await
        .expect("not busy");
    assert_eq!(decision, Decision::Confirmed);
    assert!(gate.active_prompt().is_none());
}

#[tokio::test]
async fn silent_request_passes_while_a_prompt_is_pending() {
    let gate = Arc::new(ModalConfirmationGate::new());

    let task_gate = gate.clone();
    let pending = tokio::spawn(async move {
        task_gate
            .confirm(ConfirmationRequest::new("Delete service", "Sure?"))
            .await
    });
    wait_for_prompt(&gate).await;

    let decision = gate
        .confirm(ConfirmationRequest::silent("Sync", "refresh data"))
        .await
        .expect("silent never competes for the gate");
    assert_eq!(decision, Decision::Confirmed);

    gate.resolve(Decision::Dismissed).await;
    assert_eq!(
        pending.await.expect("task").expect("not busy"),
        Decision::Dismissed
    );
}

#[tokio::test]
async fn resolve_without_a_prompt_reports_false() {
    let gate = ModalConfirmationGate::new();
    assert!(!gate.resolve(Decision::Confirmed).await);
}

#[tokio::test]
async fn gate_is_reusable_after_a_resolution() {
    let gate = Arc::new(ModalConfirmationGate::new());

    for round in 0..2 {
        let task_gate = gate.clone();
        let pending = tokio::spawn(async move {
            task_gate
                .confirm(ConfirmationRequest::new("Delete", "Sure?"))
                .await
        });
        wait_for_prompt(&gate).await;
        gate.resolve(Decision::Confirmed).await;
        assert_eq!(
            pending.await.expect("task").expect("not busy"),
            Decision::Confirmed,
            "round {round}"
        );
    }
}
