//! Background box-office enrichment.
//!
//! Newly created titles are pushed onto a bounded queue. A dispatcher drains it and
//! runs at most `workers` lookups at a time. Submitting never blocks the caller: when
//! the queue is full the title is skipped and the movie simply stays unenriched.

use std::sync::Arc;

use tokio::sync::{
    Semaphore,
    mpsc::{self, error::TrySendError},
};

use crate::{db::MovieStore, services::box_office::BoxOfficeProvider};

#[derive(Clone)]
pub struct EnrichmentQueue {
    sender: mpsc::Sender<String>,
}

impl EnrichmentQueue {
    /// Spawns the dispatcher on the current runtime.
    pub fn start(
        store: Arc<dyn MovieStore>,
        provider: Arc<dyn BoxOfficeProvider>,
        capacity: usize,
        workers: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_dispatcher(receiver, store, provider, workers.max(1)));

        tracing::info!(
            "Enrichment queue started (capacity: {}, workers: {})",
            capacity.max(1),
            workers.max(1)
        );

        Self { sender }
    }

    /// Queues `title` for enrichment. Returns `false` when the job was dropped.
    pub fn submit(&self, title: String) -> bool {
        match self.sender.try_send(title) {
            Ok(()) => true,
            Err(TrySendError::Full(title)) => {
                tracing::warn!(
                    "Enrichment queue full, skipping box office lookup for {}",
                    title
                );
                false
            }
            Err(TrySendError::Closed(title)) => {
                tracing::error!("Enrichment queue closed, cannot enrich {}", title);
                false
            }
        }
    }
}

async fn run_dispatcher(
    mut receiver: mpsc::Receiver<String>,
    store: Arc<dyn MovieStore>,
    provider: Arc<dyn BoxOfficeProvider>,
    workers: usize,
) {
    let permits = Arc::new(Semaphore::new(workers));

    while let Some(title) = receiver.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let store = store.clone();
        let provider = provider.clone();

        tokio::spawn(async move {
            enrich_movie(&title, store.as_ref(), provider.as_ref()).await;
            drop(permit);
        });
    }

    tracing::info!("Enrichment dispatcher stopped");
}

/// Fetches box-office data for `title` and stores it. Failures are logged and swallowed.
pub async fn enrich_movie(
    title: &str,
    store: &dyn MovieStore,
    provider: &dyn BoxOfficeProvider,
) {
    let box_office = match provider.get_movie_data(title).await {
        Ok(box_office) => box_office,
        Err(e) => {
            tracing::warn!("Failed to fetch box office data for {}: {}", title, e);
            return;
        }
    };

    match store.update_movie_box_office(title, &box_office).await {
        Ok(()) => tracing::info!(
            "Box office data attached to {} (worldwide: {})",
            title,
            box_office.revenue.worldwide
        ),
        Err(e) => tracing::error!("Failed to update box office data for {}: {}", title, e),
    }
}
