use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::error::{EnrichError, Result};
use crate::images::ImageSource;
use crate::result::{EnrichSummary, Enrichment, FetchStatus};
use crate::trivia::{NoTrivia, TriviaSource};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use visualnotes_core::PositionedNode;

/// Called with `(completed, search_query)` as each node finishes
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Attaches images and trivia to laid-out nodes, concurrently and best-effort
pub struct Enricher<I, T = NoTrivia> {
    images: Arc<I>,
    trivia: Option<Arc<T>>,
    timeout: Duration,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<I: ImageSource + 'static> Enricher<I, NoTrivia> {
    pub fn new(images: I) -> Self {
        Self {
            images: Arc::new(images),
            trivia: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            progress_callback: None,
        }
    }
}

impl<I, T> Enricher<I, T>
where
    I: ImageSource + 'static,
    T: TriviaSource + 'static,
{
    pub fn with_trivia<U: TriviaSource + 'static>(self, trivia: U) -> Enricher<I, U> {
        Enricher {
            images: self.images,
            trivia: Some(Arc::new(trivia)),
            timeout: self.timeout,
            concurrency: self.concurrency,
            progress_callback: self.progress_callback,
        }
    }

    /// Deadline for each fetch, counted after the task gets a slot
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Enrich every node and return them in their original order.
    ///
    /// Each node gets its own task. A failed or timed out image lookup falls
    /// back to the source's placeholder; failed trivia is left empty. A task
    /// that panics leaves its node untouched.
    pub async fn enrich(&self, mut nodes: Vec<PositionedNode>) -> (Vec<PositionedNode>, EnrichSummary) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let completed = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        info!(
            "Enriching {} nodes (concurrency {}, timeout {:?})",
            nodes.len(),
            self.concurrency,
            self.timeout
        );

        let handles: Vec<_> = nodes
            .iter()
            .map(|node| {
                let images = Arc::clone(&self.images);
                let trivia = self.trivia.clone();
                let semaphore = Arc::clone(&semaphore);
                let completed = Arc::clone(&completed);
                let progress = self.progress_callback.clone();
                let timeout = self.timeout;
                let query = node.search_query.clone();
                let label = node.label.clone();

                tokio::spawn(async move {
                    // The semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    let enrichment = enrich_one(images.as_ref(), trivia.as_deref(), &query, &label, timeout).await;

                    let done = completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                    if let Some(callback) = progress {
                        callback(done, query);
                    }
                    enrichment
                })
            })
            .collect();

        let mut summary = EnrichSummary {
            nodes: nodes.len(),
            ..EnrichSummary::default()
        };

        for (node, outcome) in nodes.iter_mut().zip(join_all(handles).await) {
            match outcome {
                Ok(enrichment) => {
                    summary.record(&enrichment);
                    if enrichment.image.is_some() {
                        node.image = enrichment.image;
                    }
                    if enrichment.trivia.is_some() {
                        node.trivia = enrichment.trivia;
                    }
                }
                Err(e) => {
                    warn!("Enrichment task for {} failed: {}", node.id, EnrichError::from(e));
                    summary.panicked += 1;
                }
            }
        }

        info!(
            "Enrichment done: {} images, {} placeholders, {} failures, {} trivia",
            summary.images_found, summary.placeholders, summary.image_failures, summary.trivia_found
        );
        (nodes, summary)
    }
}

/// Images are searched with the full query; trivia is asked about the card label
async fn enrich_one<I, T>(
    images: &I,
    trivia: Option<&T>,
    query: &str,
    label: &str,
    timeout: Duration,
) -> Enrichment
where
    I: ImageSource,
    T: TriviaSource,
{
    let image_lookup = with_deadline(timeout, images.find_image(query));
    let trivia_lookup = async {
        match trivia {
            Some(source) => Some(with_deadline(timeout, source.find_trivia(label)).await),
            None => None,
        }
    };
    let (image_result, trivia_result) = tokio::join!(image_lookup, trivia_lookup);

    let placeholder = images.placeholder(query);
    let (image, image_status) = match image_result {
        Ok(Some(url)) if placeholder.as_deref() == Some(url.as_str()) => (Some(url), FetchStatus::Placeholder),
        Ok(Some(url)) => (Some(url), FetchStatus::Found),
        Ok(None) => (None, FetchStatus::Empty),
        Err(e) => {
            warn!("Image lookup for {} failed: {}", query, e);
            (placeholder, failure_status(&e))
        }
    };

    let (trivia, trivia_status) = match trivia_result {
        None | Some(Ok(None)) => (None, FetchStatus::Empty),
        Some(Ok(Some(text))) => (Some(text), FetchStatus::Found),
        Some(Err(e)) => {
            warn!("Trivia lookup for {} failed: {}", label, e);
            (None, failure_status(&e))
        }
    };

    debug!("Enriched {}: image {:?}, trivia {:?}", query, image_status, trivia_status);
    Enrichment {
        image,
        image_status,
        trivia,
        trivia_status,
    }
}

async fn with_deadline<F, V>(deadline: Duration, fetch: F) -> Result<Option<V>>
where
    F: Future<Output = Result<Option<V>>>,
{
    tokio::time::timeout(deadline, fetch)
        .await
        .unwrap_or(Err(EnrichError::Timeout(deadline)))
}

fn failure_status(error: &EnrichError) -> FetchStatus {
    match error {
        EnrichError::Timeout(_) => FetchStatus::TimedOut,
        _ => FetchStatus::Failed,
    }
}
