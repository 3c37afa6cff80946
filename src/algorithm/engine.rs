//! Two-phase search orchestration
//!
//! Phase 1 (index search) runs one task per (orientation, query slice) on the
//! search pool. Each task streams index postings through an [`AreaTracker`]
//! and appends the closed areas to a per-(orientation, target) list, each
//! behind its own mutex. Phase 2 (alignment) runs one task per target with
//! areas on the alignment pool: X-drop extension, segment merging, then the
//! local aligner and statistics.
//!
//! Each phase ends at a `ThreadPool::scope` barrier. Task errors and panics
//! are recorded as [`TaskFailure`]s and raise an abort flag that makes
//! not-yet-started tasks return at once. A phase that recorded failures ends
//! the search: the result carries the failures and no hits.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::extension::extend_area;
use super::orientation::Orientation;
use super::slicing::{split_query, QuerySlice};
use crate::align::LocalAligner;
use crate::common::{compare_hits, Hit, Hsp};
use crate::config::SearchParams;
use crate::core::encoding::EncodedSequence;
use crate::databank::Databank;
use crate::error::{ConfigError, SearchError};
use crate::post::merge::merge_segments;
use crate::seed::area::{AreaTracker, RetrievedArea};
use crate::stats::Statistics;

/// Query positions scanned between two looks at the abort flag.
const ABORT_CHECK_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    IndexSearch,
    Alignment,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::IndexSearch => write!(f, "index search"),
            Phase::Alignment => write!(f, "alignment"),
        }
    }
}

/// A search task that returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub phase: Phase,
    pub task: String,
    pub error: SearchError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task '{}': {}", self.phase, self.task, self.error)
    }
}

/// Outcome of one query. Check [`has_failures`](Self::has_failures) before
/// trusting `hits`.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub query_name: String,
    pub query_length: usize,
    pub hits: Vec<Hit>,
    pub failures: Vec<TaskFailure>,
}

impl SearchResults {
    pub fn empty(query_name: &str, query_length: usize) -> Self {
        Self {
            query_name: query_name.to_string(),
            query_length,
            ..Self::default()
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Sort hits and keep the best `max_hits` (0 keeps all).
    pub fn rank(&mut self, max_hits: usize) {
        self.hits.sort_by(compare_hits);
        if max_hits > 0 {
            self.hits.truncate(max_hits);
        }
    }
}

struct OrientedQuery {
    orientation: Orientation,
    symbols: Vec<u8>,
    encoded: EncodedSequence,
}

/// Per orientation, per target: areas closed during phase 1.
type AreaSlots = Vec<Vec<Mutex<Vec<RetrievedArea>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `task` unless the phase was aborted; record any failure.
fn run_task<F>(
    phase: Phase,
    label: String,
    failures: &Mutex<Vec<TaskFailure>>,
    abort: &AtomicBool,
    task: F,
) where
    F: FnOnce() -> Result<(), SearchError>,
{
    if abort.load(Ordering::Relaxed) {
        return;
    }
    let error = match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(payload) => SearchError::Panic(panic_message(payload)),
    };
    warn!("{} task '{}' failed: {}", phase, label, error);
    abort.store(true, Ordering::Relaxed);
    lock(failures).push(TaskFailure {
        phase,
        task: label,
        error,
    });
}

fn build_pool(threads: usize, name: &'static str) -> Result<ThreadPool, ConfigError> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("kblast-{}-{}", name, i))
        .build()
        .map_err(|e| ConfigError::InvalidParam {
            name: "threads",
            reason: format!("failed to build the {} pool: {}", name, e),
        })
}

pub struct Searcher {
    params: SearchParams,
    aligner: Arc<dyn LocalAligner>,
    search_pool: ThreadPool,
    align_pool: ThreadPool,
}

impl Searcher {
    pub fn new(params: SearchParams, aligner: Arc<dyn LocalAligner>) -> Result<Self, ConfigError> {
        let params = params.resolve()?;
        let search_pool = build_pool(params.threads_index_search, "search")?;
        let align_pool = build_pool(params.threads_extend_align, "align")?;
        Ok(Self {
            params,
            aligner,
            search_pool,
            align_pool,
        })
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Search `query` against `databank`.
    ///
    /// Fails only on configuration problems found before any task starts
    /// (orientation incompatible with the databank, no statistics for the
    /// scoring system). Task failures are reported inside the result.
    pub fn search(
        &self,
        databank: &Databank,
        query_name: &str,
        query: &[u8],
    ) -> Result<SearchResults, ConfigError> {
        self.search_with_space(databank, query_name, query, databank.total_length())
    }

    /// Like [`search`](Self::search), with e-values computed against a
    /// databank of `search_length` symbols.
    pub(crate) fn search_with_space(
        &self,
        databank: &Databank,
        query_name: &str,
        query: &[u8],
        search_length: u64,
    ) -> Result<SearchResults, ConfigError> {
        for orientation in &self.params.orientations {
            orientation.check_compatible(databank.alphabet())?;
        }
        let statistics = Statistics::new(
            databank.alphabet(),
            databank.composition(),
            self.params.match_score,
            self.params.mismatch_score,
            search_length,
        )?;

        let mut results = SearchResults::empty(query_name, query.len());
        let oriented: Vec<OrientedQuery> = self
            .params
            .orientations
            .iter()
            .map(|&orientation| {
                let symbols = orientation.apply(query);
                let encoded = databank.encoder().encode_sequence(&symbols);
                OrientedQuery {
                    orientation,
                    symbols,
                    encoded,
                }
            })
            .collect();

        let targets = databank.store().len();
        let slots: AreaSlots = oriented
            .iter()
            .map(|_| (0..targets).map(|_| Mutex::new(Vec::new())).collect())
            .collect();

        let failures = Mutex::new(Vec::new());
        let abort = AtomicBool::new(false);

        // phase 1
        let mut tasks = 0usize;
        self.search_pool.scope(|scope| {
            for (slot, oq) in oriented.iter().enumerate() {
                let slices = split_query(
                    oq.symbols.len(),
                    self.params.query_split_quantity,
                    self.params.min_query_slice_length,
                    self.params.min_hsp_length,
                    databank.seed_span(),
                );
                for slice in slices {
                    tasks += 1;
                    let (failures, abort, areas) = (&failures, &abort, &slots[slot]);
                    scope.spawn(move |_| {
                        let label = format!("{} {}..{}", oq.orientation, slice.begin, slice.end);
                        run_task(Phase::IndexSearch, label, failures, abort, || {
                            self.search_slice(databank, oq, slice, areas, abort)
                        });
                    });
                }
            }
        });
        results.failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        if results.has_failures() {
            warn!(
                "{}: {} of {} index search tasks failed, skipping alignment",
                query_name,
                results.failures.len(),
                tasks
            );
            return Ok(results);
        }

        let candidates: Vec<u32> = (0..targets)
            .filter(|&t| slots.iter().any(|per_target| !lock(&per_target[t]).is_empty()))
            .map(|t| t as u32)
            .collect();
        info!(
            "{}: {} index search tasks done, {} candidate targets in {}",
            query_name,
            tasks,
            candidates.len(),
            databank.name()
        );

        // phase 2
        let failures = Mutex::new(Vec::new());
        let abort = AtomicBool::new(false);
        let hits = Mutex::new(Vec::new());
        self.align_pool.scope(|scope| {
            for &target in &candidates {
                let (failures, abort, hits) = (&failures, &abort, &hits);
                let (oriented, slots, statistics) = (&oriented, &slots, &statistics);
                scope.spawn(move |_| {
                    run_task(Phase::Alignment, format!("target {}", target), failures, abort, || {
                        let hit = self.align_target(databank, query.len(), oriented, slots, target, statistics)?;
                        if let Some(hit) = hit {
                            lock(hits).push(hit);
                        }
                        Ok(())
                    });
                });
            }
        });
        results.failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        if results.has_failures() {
            warn!(
                "{}: {} alignment tasks failed, discarding hits",
                query_name,
                results.failures.len()
            );
            return Ok(results);
        }

        results.hits = hits.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.rank(self.params.max_hits_results);
        info!("{}: {} hits in {}", query_name, results.hits.len(), databank.name());
        Ok(results)
    }

    /// Phase 1 body: seed one query slice and publish the closed areas.
    fn search_slice(
        &self,
        databank: &Databank,
        oq: &OrientedQuery,
        slice: QuerySlice,
        areas: &[Mutex<Vec<RetrievedArea>>],
        abort: &AtomicBool,
    ) -> Result<(), SearchError> {
        let span = databank.seed_span();
        if slice.len() < span {
            return Ok(());
        }
        let index = databank.index();
        let mut tracker = AreaTracker::new(
            span,
            self.params.max_sub_sequence_distance,
            self.params.min_hsp_length,
        );
        let mut seeds = 0usize;
        for pos in slice.begin..=(slice.end - span) {
            if pos % ABORT_CHECK_INTERVAL == 0 && abort.load(Ordering::Relaxed) {
                return Ok(());
            }
            let key = databank.seed_key(&oq.symbols[pos..pos + span]);
            for &posting in index.lookup(key) {
                tracker.add_hit(pos, posting);
                seeds += 1;
            }
        }

        let closed = tracker.finish();
        debug!(
            "{} slice {}..{}: {} seeds, {} targets with areas",
            oq.orientation,
            slice.begin,
            slice.end,
            seeds,
            closed.len()
        );
        for (target, found) in closed {
            let slot = areas
                .get(target as usize)
                .ok_or(SearchError::MissingSequence(target))?;
            lock(slot).extend(found);
        }
        Ok(())
    }

    /// Phase 2 body: extend, merge, align and score one target.
    fn align_target(
        &self,
        databank: &Databank,
        query_length: usize,
        oriented: &[OrientedQuery],
        slots: &AreaSlots,
        target: u32,
        statistics: &Statistics,
    ) -> Result<Option<Hit>, SearchError> {
        let stored = databank
            .store()
            .get_encoded_sequence(target)
            .ok_or(SearchError::MissingSequence(target))?;
        let encoder = databank.encoder();
        let mut hsps = Vec::new();

        for (slot, oq) in oriented.iter().enumerate() {
            let areas = std::mem::take(&mut *lock(&slots[slot][target as usize]));
            if areas.is_empty() {
                continue;
            }
            let segments = areas
                .iter()
                .map(|area| extend_area(area, &oq.encoded, &stored.encoded, self.params.extend_dropoff))
                .collect();

            for segment in merge_segments(segments) {
                let query_window = encoder.decode_range(segment.query, segment.query_begin, segment.query_end);
                let target_window = encoder.decode_range(segment.target, segment.target_begin, segment.target_end);
                let alignment = self
                    .aligner
                    .align(&query_window, &target_window)
                    .map_err(|e| match e {
                        SearchError::Alignment { reason, .. } => SearchError::Alignment { target, reason },
                        other => other,
                    })?;
                let Some(alignment) = alignment else { continue };

                let (query_from, query_to) = oq.orientation.query_coordinates(
                    segment.query_begin + alignment.query_begin,
                    segment.query_begin + alignment.query_end,
                    query_length,
                );
                let (query_aligned, target_aligned) = alignment.aligned_strings(&query_window, &target_window);
                hsps.push(Hsp {
                    orientation: oq.orientation,
                    query_from,
                    query_to,
                    target_from: segment.target_begin + alignment.target_begin + 1,
                    target_to: segment.target_begin + alignment.target_end,
                    score: alignment.score,
                    normalized_score: statistics.normalized_score(alignment.score),
                    evalue: statistics.evalue(alignment.score, oq.symbols.len()),
                    identity: alignment.identity(),
                    alignment_len: alignment.alignment_len,
                    mismatches: alignment.mismatches,
                    gap_opens: alignment.gap_opens,
                    query_aligned,
                    target_aligned,
                });
            }
        }

        if hsps.is_empty() {
            return Ok(None);
        }
        let mut hit = Hit {
            databank: databank.name().to_string(),
            target_id: target,
            target_name: stored.name.clone(),
            target_description: stored.description.clone(),
            target_length: stored.len(),
            hsps,
        };
        hit.sort_hsps();
        // merged segments of one orientation can still align to the same HSP
        hit.hsps.dedup_by(|a, b| {
            a.orientation == b.orientation
                && (a.query_from, a.query_to, a.target_from, a.target_to)
                    == (b.query_from, b.query_to, b.target_from, b.target_to)
        });
        Ok(Some(hit))
    }
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("params", &self.params)
            .field("search_threads", &self.search_pool.current_num_threads())
            .field("align_threads", &self.align_pool.current_num_threads())
            .finish()
    }
}
