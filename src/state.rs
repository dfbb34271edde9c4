use std::sync::Arc;

use crate::{db::MovieStore, services::EnrichmentQueue};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MovieStore>,
    pub enrichment: EnrichmentQueue,
    pub auth_token: Arc<str>,
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MovieStore>,
        enrichment: EnrichmentQueue,
        auth_token: &str,
        base_url: &str,
    ) -> Self {
        Self {
            store,
            enrichment,
            auth_token: Arc::from(auth_token),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }
}
