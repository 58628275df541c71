use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use shared::domain::{Order, OrderId, Service, ServiceId, User, UserId};
use tracing::{debug, warn};

use crate::{
    cache::{EntityCache, SearchMatcher},
    confirm::ConfirmationGate,
    editor::EditorSession,
    forms::OrderField,
    notify::Notifier,
    resource::ResourceClient,
};

use super::{text_matches, ResourceScreen};

pub const UNKNOWN_USER: &str = "Unknown user";
pub const UNKNOWN_SERVICE: &str = "Unknown service";

/// One list row with the order's counterparties resolved to names.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub order: Order,
    pub user_name: String,
    pub service_name: String,
}

/// id -> display name maps consulted by the search matcher. The matcher is a
/// sync closure, so this sits behind a std `RwLock` rather than an async one.
#[derive(Default)]
struct NameIndex {
    users: HashMap<UserId, String>,
    services: HashMap<ServiceId, String>,
}

fn read_index(index: &RwLock<NameIndex>) -> std::sync::RwLockReadGuard<'_, NameIndex> {
    match index.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Orders view. An order row is mostly foreign keys, so this screen carries
/// read-only user and service caches and a name index that lets search work
/// over resolved names and status.
pub struct OrdersScreen {
    inner: ResourceScreen<Order>,
    users: EntityCache<User>,
    services: EntityCache<Service>,
    names: Arc<RwLock<NameIndex>>,
}

impl OrdersScreen {
    pub fn new(
        orders: Arc<dyn ResourceClient<Order>>,
        users: Arc<dyn ResourceClient<User>>,
        services: Arc<dyn ResourceClient<Service>>,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let names: Arc<RwLock<NameIndex>> = Arc::new(RwLock::new(NameIndex::default()));
        let matcher_names = names.clone();
        let matcher: SearchMatcher<Order> = Box::new(move |order, term| {
            let index = read_index(&matcher_names);
            let user_name = index.users.get(&order.user_id).map(String::as_str);
            let service_name = index.services.get(&order.service_id).map(String::as_str);
            text_matches(
                term,
                &[
                    user_name.unwrap_or_default(),
                    service_name.unwrap_or_default(),
                    order.status.label(),
                ],
            )
        });
        let user_matcher: SearchMatcher<User> =
            Box::new(|user, term| text_matches(term, &[&user.name]));
        let service_matcher: SearchMatcher<Service> =
            Box::new(|service, term| text_matches(term, &[&service.name]));
        Self {
            inner: ResourceScreen::new(orders, matcher, gate, notifier),
            users: EntityCache::new(users, user_matcher),
            services: EntityCache::new(services, service_matcher),
            names,
        }
    }

    /// Loads orders and both reference collections, then rebuilds the name
    /// index and refilters so an existing term can match the fresh names.
    pub async fn activate(&self) {
        let (_, users, services) = tokio::join!(
            self.inner.activate(),
            self.users.load(),
            self.services.load()
        );
        if let Err(err) = users {
            warn!(error = %err, "orders screen: user names unavailable");
        }
        if let Err(err) = services {
            warn!(error = %err, "orders screen: service names unavailable");
        }
        self.rebuild_name_index().await;
        self.inner.cache().refilter().await;
    }

    async fn rebuild_name_index(&self) {
        let users = self.users.all().await;
        let services = self.services.all().await;
        let mut index = match self.names.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        index.users = users.into_iter().map(|u| (u.id, u.name)).collect();
        index.services = services.into_iter().map(|s| (s.id, s.name)).collect();
    }

    pub async fn search(&self, term: &str) {
        self.inner.search(term).await;
    }

    pub async fn rows(&self) -> Vec<OrderRow> {
        let visible = self.inner.visible().await;
        let index = read_index(&self.names);
        visible
            .into_iter()
            .map(|order| {
                let user_name = index
                    .users
                    .get(&order.user_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER.to_owned());
                let service_name = index
                    .services
                    .get(&order.service_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_SERVICE.to_owned());
                OrderRow {
                    order,
                    user_name,
                    service_name,
                }
            })
            .collect()
    }

    pub async fn user_options(&self) -> Vec<User> {
        self.users.all().await
    }

    pub async fn service_options(&self) -> Vec<Service> {
        self.services.all().await
    }

    /// Editor helper: picking a service also copies its price into the
    /// draft's total, which stays editable afterwards.
    pub async fn service_selected(&self, id: ServiceId) {
        let price = self.services.find_by_id(id).await.map(|s| s.price);
        let editor = self.inner.editor();
        if let Err(err) = editor
            .update_field(OrderField::Service, |draft| draft.service_id = Some(id))
            .await
        {
            debug!(error = %err, "orders screen: service pick ignored");
            return;
        }
        if let Some(price) = price {
            if let Err(err) = editor
                .update_field(OrderField::TotalPrice, |draft| draft.total_price = price)
                .await
            {
                debug!(error = %err, "orders screen: price fill ignored");
            }
        }
    }

    pub async fn open_new(&self) {
        self.inner.open_new().await;
    }

    pub async fn open_edit(&self, id: OrderId) {
        self.inner.open_edit(id).await;
    }

    pub async fn submit(&self) {
        self.inner.submit().await;
    }

    pub async fn delete(&self, id: OrderId) {
        self.inner.delete(id).await;
    }

    pub fn editor(&self) -> &EditorSession<Order> {
        self.inner.editor()
    }

    pub fn cache(&self) -> &EntityCache<Order> {
        self.inner.cache()
    }
}
