//! Bounded, paginated, rate-limited lead discovery.
//!
//! A run is a small state machine:
//!
//! ```text
//! Init ──geocode──▶ FetchingPage ──▶ FetchingDetail ──▶ AwaitingPolitenessDelay ─┐
//!   │                   ▲  │              ▲                                      │
//!   │                   │  │              └──────────── next admitted candidate ◀┘
//!   │                   │  ▼
//!   │      AwaitingContinuationDelay ◀── page drained, token present
//!   ▼
//! Done ◀── max results / no token / provider failure / page limit / cancel
//! ```
//!
//! Provider calls are strictly sequential. The only suspension points are
//! the two delays, so a cancellable or concurrent variant only needs to swap
//! how those states wait.
//!
//! Identity dedup runs before the bounds test and the bounds test before the
//! details lookup, so no lookup is ever spent on a place we would discard.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use leadgen_core::{AppConfig, Lead};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::bounds::LocationBounds;
use crate::provider::{DirectoryProvider, SearchRequest};
use crate::types::Candidate;

/// Delay the provider needs before a freshly issued continuation token works.
pub const DEFAULT_PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);
/// Pause after every details lookup.
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(500);
/// Hard cap on search pages per run. The provider itself stops at three.
pub const DEFAULT_MAX_PAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub page_token_delay: Duration,
    pub politeness_delay: Duration,
    pub max_pages: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_token_delay: DEFAULT_PAGE_TOKEN_DELAY,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl DiscoveryConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            page_token_delay: Duration::from_millis(config.page_token_delay_ms),
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
            ..Self::default()
        }
    }
}

/// Why a run stopped. Only `MaxResults` and `Exhausted` are clean finishes;
/// every other reason still carries whatever leads were gathered first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    MaxResults,
    /// The last page carried no continuation token.
    Exhausted,
    LocationNotFound { location: String, detail: String },
    SearchFailed { page: usize, detail: String },
    PageLimit { max_pages: usize },
    /// The provider handed back the token we had just used.
    StalledToken,
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::MaxResults => write!(f, "reached the result cap"),
            StopReason::Exhausted => write!(f, "no more result pages"),
            StopReason::LocationNotFound { detail, .. } => {
                write!(f, "location not found: {detail}")
            }
            StopReason::SearchFailed { page, detail } => {
                write!(f, "search failed on page {page}: {detail}")
            }
            StopReason::PageLimit { max_pages } => write!(f, "page limit of {max_pages} reached"),
            StopReason::StalledToken => write!(f, "continuation token did not advance"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryStats {
    pub pages_fetched: usize,
    pub candidates_seen: usize,
    pub duplicates_skipped: usize,
    pub out_of_bounds: usize,
    pub detail_failures: usize,
    pub not_operational: usize,
}

/// Result of one [`Discoverer::discover`] call.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryRun {
    pub run_id: Uuid,
    pub category: String,
    pub location: String,
    pub bounds: Option<LocationBounds>,
    pub leads: Vec<Lead>,
    pub stop_reason: StopReason,
    pub stats: DiscoveryStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DiscoveryRun {
    /// `true` when the run ended without a provider failure or cancellation.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(
            self.stop_reason,
            StopReason::MaxResults | StopReason::Exhausted
        )
    }
}

#[derive(Debug)]
enum DiscoveryState {
    Init,
    FetchingPage { token: Option<String> },
    AwaitingContinuationDelay { token: String },
    FetchingDetail { candidate: Candidate },
    AwaitingPolitenessDelay,
    Done(StopReason),
}

/// Mutable bookkeeping owned by exactly one run and dropped with it.
struct RunContext<'a> {
    category: &'a str,
    location: &'a str,
    query: String,
    max_results: usize,
    bounds: Option<LocationBounds>,
    seen: HashSet<String>,
    queue: VecDeque<Candidate>,
    current_token: Option<String>,
    pending_token: Option<String>,
    leads: Vec<Lead>,
    stats: DiscoveryStats,
}

impl RunContext<'_> {
    /// Chooses the next state once the previous candidate is settled: the
    /// next admissible candidate on this page, a page turn, or the end.
    fn advance(&mut self) -> DiscoveryState {
        loop {
            if self.leads.len() >= self.max_results {
                return DiscoveryState::Done(StopReason::MaxResults);
            }
            let Some(candidate) = self.queue.pop_front() else {
                return match self.pending_token.take() {
                    None => DiscoveryState::Done(StopReason::Exhausted),
                    Some(token) if self.current_token.as_ref() == Some(&token) => {
                        DiscoveryState::Done(StopReason::StalledToken)
                    }
                    Some(token) => DiscoveryState::AwaitingContinuationDelay { token },
                };
            };
            self.stats.candidates_seen += 1;

            if !self.seen.insert(candidate.place_id.clone()) {
                self.stats.duplicates_skipped += 1;
                tracing::debug!(place_id = %candidate.place_id, "skipping duplicate place");
                continue;
            }

            let inside = self
                .bounds
                .is_some_and(|bounds| bounds.contains(candidate.location));
            if !inside {
                self.stats.out_of_bounds += 1;
                tracing::debug!(
                    place_id = %candidate.place_id,
                    lat = candidate.location.lat,
                    lng = candidate.location.lng,
                    "skipping place outside location bounds"
                );
                continue;
            }

            return DiscoveryState::FetchingDetail { candidate };
        }
    }
}

/// Runs discovery against a [`DirectoryProvider`].
///
/// Holds no state between runs; each call owns its own seen-identity set.
pub struct Discoverer<P> {
    provider: P,
    config: DiscoveryConfig,
}

impl<P: DirectoryProvider> Discoverer<P> {
    #[must_use]
    pub fn new(provider: P, config: DiscoveryConfig) -> Self {
        Self { provider, config }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Discover up to `max_results` operational businesses matching
    /// `category` inside the viewport of `location`.
    ///
    /// Never fails outright: provider trouble ends the run early and is
    /// reported through [`DiscoveryRun::stop_reason`], with every lead
    /// gathered so far kept.
    pub async fn discover(&self, category: &str, location: &str, max_results: usize) -> DiscoveryRun {
        let never = AtomicBool::new(false);
        self.discover_with_cancel(category, location, max_results, &never)
            .await
    }

    /// Like [`Self::discover`], but polls `cancel` at every state transition
    /// and stops with [`StopReason::Cancelled`] once it is set.
    pub async fn discover_with_cancel(
        &self,
        category: &str,
        location: &str,
        max_results: usize,
        cancel: &AtomicBool,
    ) -> DiscoveryRun {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("discover", %run_id, category, location, max_results);
        self.run(run_id, category, location, max_results, cancel)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        run_id: Uuid,
        category: &str,
        location: &str,
        max_results: usize,
        cancel: &AtomicBool,
    ) -> DiscoveryRun {
        let started_at = Utc::now();
        let mut ctx = RunContext {
            category,
            location,
            query: format!("{category} in {location}"),
            max_results,
            bounds: None,
            seen: HashSet::new(),
            queue: VecDeque::new(),
            current_token: None,
            pending_token: None,
            leads: Vec::new(),
            stats: DiscoveryStats::default(),
        };

        let mut state = DiscoveryState::Init;
        let stop_reason = loop {
            state = match state {
                DiscoveryState::Done(reason) => break reason,
                _ if cancel.load(Ordering::Relaxed) => {
                    tracing::info!("discovery cancelled");
                    DiscoveryState::Done(StopReason::Cancelled)
                }
                other => self.step(other, &mut ctx).await,
            };
        };

        match &stop_reason {
            StopReason::LocationNotFound { detail, .. } => {
                tracing::error!(%detail, "could not resolve location bounds");
            }
            StopReason::SearchFailed { page, detail } => {
                tracing::warn!(
                    page,
                    %detail,
                    leads = ctx.leads.len(),
                    "search failed; keeping partial results"
                );
            }
            _ => {}
        }
        tracing::info!(
            leads = ctx.leads.len(),
            pages = ctx.stats.pages_fetched,
            duplicates = ctx.stats.duplicates_skipped,
            out_of_bounds = ctx.stats.out_of_bounds,
            detail_failures = ctx.stats.detail_failures,
            not_operational = ctx.stats.not_operational,
            stop = %stop_reason,
            "discovery finished"
        );

        DiscoveryRun {
            run_id,
            category: category.to_owned(),
            location: location.to_owned(),
            bounds: ctx.bounds,
            leads: ctx.leads,
            stop_reason,
            stats: ctx.stats,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn step(&self, state: DiscoveryState, ctx: &mut RunContext<'_>) -> DiscoveryState {
        match state {
            DiscoveryState::Init => {
                if ctx.max_results == 0 {
                    return DiscoveryState::Done(StopReason::MaxResults);
                }
                match self.provider.geocode(ctx.location).await {
                    Ok(bounds) => {
                        tracing::debug!(center = %bounds.center(), "resolved location bounds");
                        ctx.bounds = Some(bounds);
                        DiscoveryState::FetchingPage { token: None }
                    }
                    Err(e) => DiscoveryState::Done(StopReason::LocationNotFound {
                        location: ctx.location.to_owned(),
                        detail: e.to_string(),
                    }),
                }
            }

            DiscoveryState::FetchingPage { token } => {
                if ctx.stats.pages_fetched >= self.config.max_pages {
                    return DiscoveryState::Done(StopReason::PageLimit {
                        max_pages: self.config.max_pages,
                    });
                }
                ctx.stats.pages_fetched += 1;
                let request = SearchRequest {
                    query: &ctx.query,
                    anchor: ctx.bounds.map(|b| b.center()),
                    page_token: token.as_deref(),
                };
                match self.provider.search_page(request).await {
                    Ok(page) => {
                        tracing::debug!(
                            page = ctx.stats.pages_fetched,
                            candidates = page.candidates.len(),
                            has_next = page.next_page_token.is_some(),
                            "fetched search page"
                        );
                        ctx.queue = page.candidates.into();
                        ctx.pending_token = page.next_page_token;
                        ctx.current_token = token;
                        ctx.advance()
                    }
                    Err(e) => DiscoveryState::Done(StopReason::SearchFailed {
                        page: ctx.stats.pages_fetched,
                        detail: e.to_string(),
                    }),
                }
            }

            DiscoveryState::AwaitingContinuationDelay { token } => {
                pause(self.config.page_token_delay).await;
                DiscoveryState::FetchingPage { token: Some(token) }
            }

            DiscoveryState::FetchingDetail { candidate } => {
                match self.provider.place_details(&candidate.place_id).await {
                    Ok(details) if details.is_operational() => {
                        let lead = Lead::discovered(
                            details.name.unwrap_or_default(),
                            details.formatted_address.unwrap_or_default(),
                            details.formatted_phone_number,
                            details.website,
                            ctx.category,
                        );
                        tracing::info!(company = %lead.company_name, "found lead");
                        ctx.leads.push(lead);
                    }
                    Ok(details) => {
                        ctx.stats.not_operational += 1;
                        tracing::debug!(
                            place_id = %candidate.place_id,
                            status = details.business_status.as_deref().unwrap_or("unknown"),
                            "skipping place that is not operational"
                        );
                    }
                    Err(e) => {
                        ctx.stats.detail_failures += 1;
                        tracing::warn!(
                            place_id = %candidate.place_id,
                            error = %e,
                            "details lookup failed; skipping place"
                        );
                    }
                }
                DiscoveryState::AwaitingPolitenessDelay
            }

            DiscoveryState::AwaitingPolitenessDelay => {
                pause(self.config.politeness_delay).await;
                ctx.advance()
            }

            DiscoveryState::Done(reason) => DiscoveryState::Done(reason),
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
