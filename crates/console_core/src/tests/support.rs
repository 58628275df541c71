#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shared::{
    domain::{
        Category, CategoryId, Classification, Order, OrderId, OrderStatus, Role, Service,
        ServiceId, User, UserId,
    },
    error::ResourceError,
};
use tokio::sync::{oneshot, Mutex};

use crate::{
    confirm::{ConfirmationGate, ConfirmationRequest, Decision, GateBusy},
    notify::{Notifier, Severity},
    resource::{Resource, ResourceClient},
    session::password_digest,
};

pub fn sample_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
}

pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).expect("date")
}

pub fn service(id: i64, name: &str, classification: Classification) -> Service {
    Service {
        id: ServiceId(id),
        name: name.to_owned(),
        description: format!("{name} description"),
        category_id: CategoryId(1),
        price: 100.0,
        image_url: format!("{}.png", name.to_lowercase()),
        classification,
        active: true,
    }
}

pub fn category(id: i64, name: &str) -> Category {
    Category {
        id: CategoryId(id),
        name: name.to_owned(),
        description: format!("{name} events"),
        icon: "bi-tag".to_owned(),
        active: true,
    }
}

pub fn user(id: i64, name: &str, email: &str) -> User {
    User {
        id: UserId(id),
        name: name.to_owned(),
        email: email.to_owned(),
        password_hash: None,
        role: Role::Client,
        phone: "600000000".to_owned(),
        registered_at: sample_instant(),
        active: true,
    }
}

pub fn user_with_password(id: i64, name: &str, email: &str, password: &str) -> User {
    let mut user = user(id, name, email);
    user.password_hash = Some(password_digest(password));
    user
}

pub fn order(id: i64, user_id: i64, service_id: i64, status: OrderStatus) -> Order {
    Order {
        id: OrderId(id),
        user_id: UserId(user_id),
        service_id: ServiceId(service_id),
        placed_at: sample_instant(),
        event_date: sample_date(),
        total_price: 100.0,
        status,
        notes: None,
        active: true,
    }
}

struct ListReply<R> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<Vec<R>, ResourceError>,
}

struct MutationReply<R> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<R, ResourceError>,
}

/// Scripted [`ResourceClient`]: replies come from per-operation scripts,
/// every call is recorded, and a reply can be gated on a oneshot so a test
/// can hold a request in flight and observe the state in between.
pub struct RecordingClient<R: Resource> {
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    pub created: Arc<Mutex<Vec<R::Draft>>>,
    pub updated: Arc<Mutex<Vec<(R::Id, R::Draft)>>>,
    pub deleted: Arc<Mutex<Vec<R::Id>>>,
    list_queue: Mutex<Vec<ListReply<R>>>,
    list_fallback: Mutex<Result<Vec<R>, ResourceError>>,
    create_reply: Mutex<Option<MutationReply<R>>>,
    update_reply: Mutex<Option<MutationReply<R>>>,
    delete_reply: Mutex<Option<Result<(), ResourceError>>>,
}

impl<R: Resource> RecordingClient<R> {
    pub fn new() -> Self {
        Self::with_list(Vec::new())
    }

    pub fn with_list(entities: Vec<R>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            updated: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            list_queue: Mutex::new(Vec::new()),
            list_fallback: Mutex::new(Ok(entities)),
            create_reply: Mutex::new(None),
            update_reply: Mutex::new(None),
            delete_reply: Mutex::new(None),
        }
    }

    pub async fn set_list_fallback(&self, result: Result<Vec<R>, ResourceError>) {
        *self.list_fallback.lock().await = result;
    }

    /// Queues one list reply consumed before the fallback.
    pub async fn push_list(&self, result: Result<Vec<R>, ResourceError>) {
        self.list_queue.lock().await.push(ListReply { gate: None, result });
    }

    /// Queues a list reply that blocks until the returned sender fires.
    pub async fn push_gated_list(
        &self,
        result: Result<Vec<R>, ResourceError>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_queue.lock().await.push(ListReply {
            gate: Some(rx),
            result,
        });
        tx
    }

    pub async fn script_create(&self, result: Result<R, ResourceError>) {
        *self.create_reply.lock().await = Some(MutationReply { gate: None, result });
    }

    pub async fn script_gated_create(&self, result: Result<R, ResourceError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.create_reply.lock().await = Some(MutationReply {
            gate: Some(rx),
            result,
        });
        tx
    }

    pub async fn script_update(&self, result: Result<R, ResourceError>) {
        *self.update_reply.lock().await = Some(MutationReply { gate: None, result });
    }

    pub async fn script_delete(&self, result: Result<(), ResourceError>) {
        *self.delete_reply.lock().await = Some(result);
    }

    pub async fn call_names(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }

    /// Yields until the client has seen at least `n` calls. Calls are
    /// recorded before any gate is awaited, so this observes in-flight
    /// requests too.
    pub async fn wait_for_call_count(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if self.calls.lock().await.len() >= n {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timed out waiting for client calls");
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for RecordingClient<R> {
    async fn list(&self) -> Result<Vec<R>, ResourceError> {
        self.calls.lock().await.push("list");
        let reply = {
            let mut queue = self.list_queue.lock().await;
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };
        match reply {
            Some(ListReply { gate, result }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => self.list_fallback.lock().await.clone(),
        }
    }

    async fn get(&self, id: R::Id) -> Result<R, ResourceError> {
        self.calls.lock().await.push("get");
        let fallback = self.list_fallback.lock().await.clone()?;
        fallback
            .into_iter()
            .find(|entity| entity.id() == id)
            .ok_or_else(|| ResourceError::NotFound {
                resource: R::LABEL,
                id: id.to_string(),
            })
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, ResourceError> {
        self.calls.lock().await.push("create");
        self.created.lock().await.push(draft.clone());
        let reply = self.create_reply.lock().await.take();
        match reply {
            Some(MutationReply { gate, result }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => panic!("create called without a scripted reply"),
        }
    }

    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<R, ResourceError> {
        self.calls.lock().await.push("update");
        self.updated.lock().await.push((id, draft.clone()));
        let reply = self.update_reply.lock().await.take();
        match reply {
            Some(MutationReply { gate, result }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => panic!("update called without a scripted reply"),
        }
    }

    async fn delete(&self, id: R::Id) -> Result<(), ResourceError> {
        self.calls.lock().await.push("delete");
        self.deleted.lock().await.push(id);
        self.delete_reply.lock().await.take().unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub shown: Mutex<Vec<(String, Severity)>>,
    pub clears: Mutex<u32>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<(String, Severity)> {
        self.shown.lock().await.clone()
    }

    pub async fn last(&self) -> Option<(String, Severity)> {
        self.shown.lock().await.last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, message: &str, severity: Severity) {
        self.shown.lock().await.push((message.to_owned(), severity));
    }

    async fn clear(&self) {
        *self.clears.lock().await += 1;
    }
}

/// Gate that answers every prompt the same way, recording the requests.
pub struct ScriptedGate {
    decision: Decision,
    busy: bool,
    pub requests: Mutex<Vec<ConfirmationRequest>>,
}

impl ScriptedGate {
    pub fn confirming() -> Self {
        Self {
            decision: Decision::Confirmed,
            busy: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn dismissing() -> Self {
        Self {
            decision: Decision::Dismissed,
            busy: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn busy() -> Self {
        Self {
            decision: Decision::Dismissed,
            busy: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn request_titles(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|request| request.title.clone())
            .collect()
    }
}

#[async_trait]
impl ConfirmationGate for ScriptedGate {
    async fn confirm(&self, request: ConfirmationRequest) -> Result<Decision, GateBusy> {
        self.requests.lock().await.push(request.clone());
        if self.busy {
            return Err(GateBusy);
        }
        if !request.requires_confirmation {
            return Ok(Decision::Confirmed);
        }
        Ok(self.decision)
    }
}
