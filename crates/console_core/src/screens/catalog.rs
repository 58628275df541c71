use std::sync::Arc;

use shared::domain::{Category, Service};
use tracing::warn;

use crate::{
    cache::{EntityCache, SearchMatcher},
    notify::{Notifier, Severity},
    resource::ResourceClient,
};

use super::{services::UNCATEGORIZED, text_matches};

/// One catalog card: an active service with its category resolved and the
/// tier badge precomputed for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub service: Service,
    pub category_name: String,
}

impl CatalogEntry {
    pub fn tier_label(&self) -> &'static str {
        self.service.classification.label()
    }

    pub fn tier_badge(&self) -> &'static str {
        self.service.classification.badge_class()
    }
}

/// Customer-facing browse view: read-only, active services only, same search
/// semantics as the admin services screen but no editor and no gate.
pub struct CatalogScreen {
    services: EntityCache<Service>,
    categories: EntityCache<Category>,
    notifier: Arc<dyn Notifier>,
}

impl CatalogScreen {
    pub fn new(
        services: Arc<dyn ResourceClient<Service>>,
        categories: Arc<dyn ResourceClient<Category>>,
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
            services: EntityCache::new(services, matcher),
            categories: EntityCache::new(categories, category_matcher),
            notifier,
        }
    }

    pub async fn activate(&self) {
        let (services, categories) =
            tokio::join!(self.services.load(), self.categories.load());
        if let Err(err) = services {
            self.notifier
                .show(&format!("Failed to load services: {err}"), Severity::Error)
                .await;
        }
        if let Err(err) = categories {
            warn!(error = %err, "catalog: category names unavailable");
        }
    }

    pub async fn search(&self, term: &str) {
        self.services.set_search_term(term).await;
    }

    /// Visible, active services with category names resolved.
    pub async fn entries(&self) -> Vec<CatalogEntry> {
        let visible = self.services.visible().await;
        let mut entries = Vec::with_capacity(visible.len());
        for service in visible {
            if !service.active {
                continue;
            }
            let category_name = match self.categories.find_by_id(service.category_id).await {
                Some(category) => category.name,
                None => UNCATEGORIZED.to_owned(),
            };
            entries.push(CatalogEntry {
                service,
                category_name,
            });
        }
        entries
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.categories.all().await
    }
}
