use std::sync::Arc;

use shared::domain::{Category, CategoryId, Service};
use tracing::warn;

use crate::{
    cache::{EntityCache, SearchMatcher},
    confirm::ConfirmationGate,
    editor::EditorSession,
    notify::Notifier,
    resource::ResourceClient,
};

use super::{text_matches, ResourceScreen};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// One list row: the service plus its resolved category name.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub service: Service,
    pub category_name: String,
}

/// Services view. Wraps the generic screen and adds a read-only categories
/// cache so rows can show category names instead of ids.
pub struct ServicesScreen {
    inner: ResourceScreen<Service>,
    categories: EntityCache<Category>,
}

impl ServicesScreen {
    pub fn new(
        services: Arc<dyn ResourceClient<Service>>,
        categories: Arc<dyn ResourceClient<Category>>,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let matcher: SearchMatcher<Service> = Box::new(|service, term| {
            text_matches(
                term,
                &[
                    &service.name,
                    &service.description,
                    service.classification.label(),
                ],
            )
        });
        let category_matcher: SearchMatcher<Category> =
            Box::new(|category, term| text_matches(term, &[&category.name]));
        Self {
            inner: ResourceScreen::new(services, matcher, gate, notifier),
            categories: EntityCache::new(categories, category_matcher),
        }
    }

    /// Loads services and categories together. A failed category load only
    /// degrades name resolution, so it is logged rather than surfaced.
    pub async fn activate(&self) {
        let (_, categories) = tokio::join!(self.inner.activate(), self.categories.load());
        if let Err(err) = categories {
            warn!(error = %err, "services screen: category names unavailable");
        }
    }

    pub async fn search(&self, term: &str) {
        self.inner.search(term).await;
    }

    pub async fn rows(&self) -> Vec<ServiceRow> {
        let visible = self.inner.visible().await;
        let mut rows = Vec::with_capacity(visible.len());
        for service in visible {
            let category_name = self.category_name(service.category_id).await;
            rows.push(ServiceRow {
                service,
                category_name,
            });
        }
        rows
    }

    pub async fn category_name(&self, id: CategoryId) -> String {
        match self.categories.find_by_id(id).await {
            Some(category) => category.name,
            None => UNCATEGORIZED.to_owned(),
        }
    }

    pub async fn category_options(&self) -> Vec<Category> {
        self.categories.all().await
    }

    pub async fn open_new(&self) {
        self.inner.open_new().await;
    }

    pub async fn open_edit(&self, id: shared::domain::ServiceId) {
        self.inner.open_edit(id).await;
    }

    pub async fn submit(&self) {
        self.inner.submit().await;
    }

    pub async fn delete(&self, id: shared::domain::ServiceId) {
        self.inner.delete(id).await;
    }

    pub fn editor(&self) -> &EditorSession<Service> {
        self.inner.editor()
    }

    pub fn cache(&self) -> &EntityCache<Service> {
        self.inner.cache()
    }
}
