use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use newsroom_interfaces::{Analysis, ChunkStream, Item, PipelineStep, Provider, Request, Store, StreamChunk};
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::classification::{parse_classification_response, Headline};
use crate::error::{EngineError, Result};
use crate::top_stories::TopStoriesTracker;

const TOP_STORIES_TIMEOUT: Duration = Duration::from_secs(60);
const SINGLE_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);
const ZINGER_BATCH_TIMEOUT: Duration = Duration::from_secs(45);

/// Metadata returned alongside a [`ChunkStream`] from [`Analyzer::stream_analysis`].
#[derive(Debug, Clone)]
pub struct StreamMeta {
    pub provider: String,
    pub model: String,
}

/// Orchestrates per-item analysis and batch Top-Stories classification.
/// Holds a handle to the store but is never held by it in turn (no
/// cycles); owns the Top-Stories Tracker outright rather than sharing it.
pub struct Analyzer {
    cloud_providers: Vec<Arc<dyn Provider>>,
    local_provider: Option<Arc<dyn Provider>>,
    store: Arc<dyn Store>,
    top_stories: TopStoriesTracker,
    semaphore: Arc<Semaphore>,
    stream_channel_capacity: usize,
    in_flight: Arc<RwLock<HashSet<String>>>,
    cache: Arc<RwLock<HashMap<String, Analysis>>>,
    round_robin: AtomicUsize,
}

impl Analyzer {
    pub fn new(
        cloud_providers: Vec<Arc<dyn Provider>>,
        local_provider: Option<Arc<dyn Provider>>,
        store: Arc<dyn Store>,
        semaphore: Arc<Semaphore>,
        stream_channel_capacity: usize,
        top_stories_min: usize,
        top_stories_max: usize,
        top_stories_ttl_hours: i64,
    ) -> Self {
        Self {
            cloud_providers,
            local_provider,
            store,
            top_stories: TopStoriesTracker::new(top_stories_min, top_stories_max, top_stories_ttl_hours),
            semaphore,
            stream_channel_capacity,
            in_flight: Arc::new(RwLock::new(HashSet::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
            round_robin: AtomicUsize::new(0),
        }
    }

    pub fn top_stories(&self) -> &TopStoriesTracker {
        &self.top_stories
    }

    /// True if an analysis for `item_id` is currently in flight. Callers
    /// use this to silently ignore a duplicate trigger rather than
    /// starting a second analysis.
    pub async fn is_loading(&self, item_id: &str) -> bool {
        self.in_flight.read().await.contains(item_id)
    }

    async fn begin(&self, item_id: &str) -> bool {
        let mut in_flight = self.in_flight.write().await;
        in_flight.insert(item_id.to_string())
    }

    async fn finish(&self, item_id: &str) {
        self.in_flight.write().await.remove(item_id);
    }

    /// Cloud-preferred, non-streaming analysis: tries each registered
    /// cloud provider in priority order, falling back to the next on
    /// failure, until one succeeds or none remain.
    pub async fn analyze_with_context(&self, item: &Item, top_stories_ctx: &[String]) -> Result<Analysis> {
        if !self.begin(&item.id).await {
            return self.cached_or_starting(&item.id).await;
        }
        let result = self.run_single(item, top_stories_ctx, &self.cloud_providers.clone()).await;
        self.finish(&item.id).await;
        result
    }

    /// Local-only two-stage pipeline: an instruct-model pass, then an
    /// optional cleanup pass over the same provider to strip transcript
    /// artifacts a small local model tends to leave behind.
    pub async fn analyze_local_with_context(&self, item: &Item, top_stories_ctx: &[String]) -> Result<Analysis> {
        if !self.begin(&item.id).await {
            return self.cached_or_starting(&item.id).await;
        }

        let Some(local) = self.local_provider.clone() else {
            self.finish(&item.id).await;
            return Ok(Analysis::failed("local", "no local provider available"));
        };

        let permit = self.acquire_permit(&CancellationToken::new()).await;
        if permit.is_none() {
            self.finish(&item.id).await;
            return Err(EngineError::Cancelled);
        }

        let prompt = build_analysis_prompt(item, top_stories_ctx);
        let request = Request::new(prompt.clone()).with_system_prompt(ANALYSIS_SYSTEM_PROMPT);

        let mut pipeline = vec![PipelineStep::new(local.name(), "analyze")];
        let first_pass = tokio::time::timeout(SINGLE_ANALYSIS_TIMEOUT, local.generate(request)).await;

        let analysis = match first_pass {
            Ok(Ok(response)) if response.error.is_none() => {
                let cleanup_request = Request::new(format!(
                    "Clean up this analysis, removing any meta-commentary or stray formatting:\n\n{}",
                    response.content
                ));
                pipeline.push(PipelineStep::new(local.name(), "cleanup"));
                match tokio::time::timeout(SINGLE_ANALYSIS_TIMEOUT, local.generate(cleanup_request)).await {
                    Ok(Ok(cleaned)) if cleaned.error.is_none() => {
                        Analysis::complete(local.name(), cleaned.content).with_pipeline(pipeline)
                    }
                    _ => Analysis::complete(local.name(), response.content).with_pipeline(pipeline),
                }
            }
            Ok(Ok(response)) => Analysis::failed(local.name(), response.error.unwrap_or_default()),
            Ok(Err(err)) => Analysis::failed(local.name(), err.to_string()),
            Err(_) => Analysis::failed(local.name(), "analysis timed out"),
        };

        drop(permit);
        self.persist_and_cache(&item.id, &prompt, &analysis).await;
        self.finish(&item.id).await;
        Ok(analysis)
    }

    /// Round-robins across cloud providers for variety rather than always
    /// preferring the first.
    pub async fn analyze_random_provider(&self, item: &Item, top_stories_ctx: &[String]) -> Result<Analysis> {
        if self.cloud_providers.is_empty() {
            return Ok(Analysis::failed("none", "no provider available"));
        }
        if !self.begin(&item.id).await {
            return self.cached_or_starting(&item.id).await;
        }

        let index = self.round_robin.fetch_add(1, Ordering::Relaxed) % self.cloud_providers.len();
        let mut rotated = self.cloud_providers[index..].to_vec();
        rotated.extend_from_slice(&self.cloud_providers[..index]);

        let result = self.run_single(item, top_stories_ctx, &rotated).await;
        self.finish(&item.id).await;
        result
    }

    async fn run_single(&self, item: &Item, top_stories_ctx: &[String], providers: &[Arc<dyn Provider>]) -> Result<Analysis> {
        let available: Vec<&Arc<dyn Provider>> = providers.iter().filter(|p| p.available()).collect();
        if available.is_empty() {
            let analysis = Analysis::failed("none", "no provider available");
            self.cache.write().await.insert(item.id.clone(), analysis.clone());
            return Ok(analysis);
        }

        let cancel = CancellationToken::new();
        let permit = self.acquire_permit(&cancel).await;
        if permit.is_none() {
            return Err(EngineError::Cancelled);
        }

        let prompt = build_analysis_prompt(item, top_stories_ctx);
        let request = Request::new(prompt.clone()).with_system_prompt(ANALYSIS_SYSTEM_PROMPT);

        let mut last_error = String::from("no provider available");
        let mut analysis = None;
        for provider in available {
            match tokio::time::timeout(SINGLE_ANALYSIS_TIMEOUT, provider.generate(request.clone())).await {
                Ok(Ok(response)) if response.error.is_none() => {
                    analysis = Some(Analysis::complete(provider.name(), response.content));
                    break;
                }
                Ok(Ok(response)) => {
                    last_error = response.error.unwrap_or_default();
                    warn!(provider = provider.name(), error = %last_error, "provider returned an error, trying next");
                }
                Ok(Err(err)) => {
                    last_error = err.to_string();
                    warn!(provider = provider.name(), error = %last_error, "provider request failed, trying next");
                }
                Err(_) => {
                    last_error = "analysis timed out".to_string();
                    warn!(provider = provider.name(), "provider request timed out, trying next");
                }
            }
        }
        drop(permit);

        let analysis = analysis.unwrap_or_else(|| Analysis::failed("none", last_error));
        self.persist_and_cache(&item.id, &prompt, &analysis).await;
        Ok(analysis)
    }

    /// Streams a single-item analysis. Returns immediately with a
    /// consumer-facing channel; a background task drains the provider's
    /// own stream, forwards chunks, and races the cancellation token so a
    /// cancelled stream closes with an error chunk within one poll instead
    /// of dangling. Releases the semaphore on every exit path.
    pub async fn stream_analysis(
        &self,
        item: &Item,
        top_stories_ctx: &[String],
        cancel: CancellationToken,
    ) -> Result<(ChunkStream, StreamMeta)> {
        if !self.begin(&item.id).await {
            return Err(EngineError::AnalysisInProgress { item_id: item.id.clone() });
        }

        let provider = self
            .cloud_providers
            .iter()
            .find(|p| p.available())
            .or(self.local_provider.as_ref())
            .cloned();

        let Some(provider) = provider else {
            self.finish(&item.id).await;
            return Err(EngineError::NoProviderAvailable);
        };

        let permit_guard = self.acquire_permit(&cancel).await;
        if permit_guard.is_none() {
            self.finish(&item.id).await;
            return Err(EngineError::Cancelled);
        }

        let prompt = build_analysis_prompt(item, top_stories_ctx);
        let request = Request::new(prompt.clone()).with_system_prompt(ANALYSIS_SYSTEM_PROMPT).streaming();
        let meta = StreamMeta { provider: provider.name().to_string(), model: String::new() };

        let upstream = provider.generate_stream(request).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(self.stream_channel_capacity);
        let item_id = item.id.clone();
        let store = self.store.clone();
        let provider_name = provider.name().to_string();
        let cache = self.cache_handle();
        let in_flight = self.in_flight_handle();

        tokio::spawn(async move {
            let _permit_guard = permit_guard;
            forward_stream(upstream, tx, cancel, item_id.clone(), prompt, provider_name, store, cache).await;
            in_flight.write().await.remove(&item_id);
        });

        Ok((Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)), meta))
    }

    /// Batch-classifies recent items into Top Stories, enriches them
    /// through the tracker's hit/miss lifecycle, and returns the
    /// breathing list. Empty input returns an empty result without
    /// invoking any provider.
    pub async fn analyze_top_stories(&self, items: &[Item]) -> Result<Vec<newsroom_interfaces::CachedTopStory>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let Some(provider) = self.cloud_providers.iter().find(|p| p.available()).or(self.local_provider.as_ref()) else {
            return Err(EngineError::NoProviderAvailable);
        };

        let headlines: Vec<Headline> = items
            .iter()
            .map(|item| Headline { item_id: item.id.clone(), title: item.title.clone(), source_name: item.source_name.clone() })
            .collect();

        let prompt = build_classification_prompt(&headlines);
        let request = Request::new(prompt).with_system_prompt(CLASSIFICATION_SYSTEM_PROMPT);

        let classification_results = match tokio::time::timeout(TOP_STORIES_TIMEOUT, provider.generate(request)).await {
            Ok(Ok(response)) if response.error.is_none() => parse_classification_response(&response.content, &headlines),
            Ok(Ok(response)) => {
                warn!(error = ?response.error, "top-stories classification returned an error");
                Vec::new()
            }
            Ok(Err(err)) => {
                warn!(error = %err, "top-stories classification request failed");
                Vec::new()
            }
            Err(_) => {
                warn!("top-stories classification timed out");
                Vec::new()
            }
        };

        self.top_stories.update(&classification_results).await;
        let breathing = self.top_stories.breathing_list(&classification_results).await;

        if let Err(err) = self.store.save_top_stories_cache(&self.top_stories.export().await).await {
            warn!(error = %err, "failed to persist top-stories cache");
        }

        Ok(breathing)
    }

    /// Opportunistically fills in zingers for cached entries that lack
    /// one, via a single batched request to the local provider. Failure is
    /// silent; zingers are never load-bearing.
    pub async fn generate_zingers(&self) {
        let Some(local) = &self.local_provider else { return };
        let missing = self.top_stories.missing_zingers().await;
        if missing.is_empty() {
            return;
        }

        let prompt = missing
            .iter()
            .enumerate()
            .map(|(i, (_, title))| format!("{}. {}", i + 1, title))
            .collect::<Vec<_>>()
            .join("\n");
        let request = Request::new(prompt).with_system_prompt(
            "For each numbered headline, write exactly one short, punchy sentence. Reply with 'N. sentence' lines.",
        );

        let response = match tokio::time::timeout(ZINGER_BATCH_TIMEOUT, local.generate(request)).await {
            Ok(Ok(response)) if response.error.is_none() => response,
            _ => return,
        };

        for line in response.content.lines() {
            let Some((number_part, text)) = line.split_once('.') else { continue };
            let Ok(number) = number_part.trim().parse::<usize>() else { continue };
            if number < 1 || number > missing.len() {
                continue;
            }
            let (item_id, _) = &missing[number - 1];
            self.top_stories.set_zinger(item_id, text.trim().to_string()).await;
        }
    }

    /// Looks up a completed analysis: in-memory cache first, falling back
    /// to the durable store and populating the cache on a hit.
    pub async fn analysis(&self, item_id: &str) -> Option<Analysis> {
        if let Some(analysis) = self.cache.read().await.get(item_id).cloned() {
            return Some(analysis);
        }

        let lookup = self.store.get_analysis_content(item_id).await.ok()?;
        if !lookup.found {
            return None;
        }
        let analysis = Analysis::complete(lookup.provider, lookup.content);
        self.cache.write().await.insert(item_id.to_string(), analysis.clone());
        Some(analysis)
    }

    async fn cached_or_starting(&self, item_id: &str) -> Result<Analysis> {
        debug!(item_id, "analysis already in progress, ignoring duplicate trigger");
        Ok(self.cache.read().await.get(item_id).cloned().unwrap_or_else(|| Analysis::starting("pending")))
    }

    async fn persist_and_cache(&self, item_id: &str, prompt: &str, analysis: &Analysis) {
        self.cache.write().await.insert(item_id.to_string(), analysis.clone());
        let record = newsroom_interfaces::AnalysisRecord {
            item_id: item_id.to_string(),
            provider: analysis.provider.clone(),
            model: analysis.provider.clone(),
            prompt: prompt.to_string(),
            raw_response: analysis.content.clone(),
            content: analysis.content.clone(),
            error: analysis.error.clone(),
        };
        if let Err(err) = self.store.save_analysis(record).await {
            warn!(item_id, error = %err, "failed to persist analysis, continuing with in-memory state");
        }
    }

    /// Cancellation-aware semaphore acquisition: races the permit against
    /// the cancellation token so a cancelled waiter abandons promptly
    /// instead of holding up the semaphore indefinitely. Returns `None`
    /// if cancelled before a permit was granted.
    async fn acquire_permit(&self, cancel: &CancellationToken) -> Option<tokio::sync::OwnedSemaphorePermit> {
        tokio::select! {
            permit = self.semaphore.clone().acquire_owned() => permit.ok(),
            _ = cancel.cancelled() => None,
        }
    }

    fn cache_handle(&self) -> Arc<RwLock<HashMap<String, Analysis>>> {
        self.cache.clone()
    }

    fn in_flight_handle(&self) -> Arc<RwLock<HashSet<String>>> {
        self.in_flight.clone()
    }
}

const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a news analyst. Given an item and the current top stories for context, provide a concise, factual analysis.";

const CLASSIFICATION_SYSTEM_PROMPT: &str = "You are classifying news headlines. For each headline worth surfacing, reply with one line in the form LABEL|number|short-reason, where LABEL is one of BREAKING, DEVELOPING, or TOP and number is the 1-indexed headline. Keep reasons under 80 characters and do not quote the headline or source verbatim.";

fn build_analysis_prompt(item: &Item, top_stories_ctx: &[String]) -> String {
    let mut prompt = format!("Title: {}\n", item.title);
    if let Some(summary) = &item.summary {
        prompt.push_str(&format!("Summary: {summary}\n"));
    }
    if let Some(content) = &item.content {
        prompt.push_str(&format!("Content: {content}\n"));
    }
    if !top_stories_ctx.is_empty() {
        prompt.push_str(&format!("\nCurrent top stories for context:\n{}\n", top_stories_ctx.join("\n")));
    }
    prompt
}

fn build_classification_prompt(headlines: &[Headline]) -> String {
    headlines
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}. [{}] {}", i + 1, h.source_name, h.title))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(clippy::too_many_arguments)]
async fn forward_stream(
    mut upstream: ChunkStream,
    tx: tokio::sync::mpsc::Sender<StreamChunk>,
    cancel: CancellationToken,
    item_id: String,
    prompt: String,
    provider_name: String,
    store: Arc<dyn Store>,
    cache: Arc<RwLock<HashMap<String, Analysis>>>,
) {
    use futures::StreamExt;

    let mut accumulated = String::new();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = tx.send(StreamChunk::failed("cancelled")).await;
                info!(item_id, "stream analysis cancelled");
                return;
            }
            next = upstream.next() => {
                let Some(chunk) = next else {
                    let analysis = Analysis::complete(provider_name.clone(), accumulated.clone());
                    cache.write().await.insert(item_id.clone(), analysis);
                    return;
                };
                if !chunk.content.is_empty() {
                    accumulated.push_str(&chunk.content);
                }
                let done = chunk.done || chunk.error.is_some();
                let send_failed = tx.send(chunk).await.is_err();
                if send_failed {
                    debug!(item_id, "stream consumer dropped, stopping forward");
                    return;
                }
                if done {
                    let analysis = if accumulated.is_empty() {
                        Analysis::failed(provider_name.clone(), "empty response")
                    } else {
                        Analysis::complete(provider_name.clone(), accumulated.clone())
                    };
                    cache.write().await.insert(item_id.clone(), analysis.clone());
                    let record = newsroom_interfaces::AnalysisRecord {
                        item_id: item_id.clone(),
                        provider: provider_name.clone(),
                        model: provider_name.clone(),
                        prompt: prompt.clone(),
                        raw_response: accumulated.clone(),
                        content: accumulated.clone(),
                        error: analysis.error.clone(),
                    };
                    if let Err(err) = store.save_analysis(record).await {
                        warn!(item_id, error = %err, "failed to persist streamed analysis");
                    }
                    return;
                }
            }
        }
    }
}
