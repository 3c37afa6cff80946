//! Searching several databanks at once
//!
//! Every databank of a [`DatabankCollection`] is searched on its own thread;
//! results come back over a channel and are merged into one ranked list.
//! E-values use the summed length of the whole collection.

use std::sync::mpsc;
use std::thread;

use log::{debug, warn};

use super::engine::{SearchResults, Searcher};
use crate::databank::DatabankCollection;
use crate::error::ConfigError;

pub fn search_collection(
    searcher: &Searcher,
    collection: &DatabankCollection,
    query_name: &str,
    query: &[u8],
) -> Result<SearchResults, ConfigError> {
    let search_length = collection.total_length();
    let (tx, rx) = mpsc::channel();

    let mut outcomes: Vec<(usize, Result<SearchResults, ConfigError>)> = thread::scope(|scope| {
        for (i, databank) in collection.databanks().iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let result = searcher.search_with_space(databank, query_name, query, search_length);
                // the receiver outlives every sender inside this scope
                let _ = tx.send((i, result));
            });
        }
        drop(tx);
        rx.iter().collect()
    });

    outcomes.sort_by_key(|(i, _)| *i);
    let mut merged = SearchResults::empty(query_name, query.len());
    for (i, outcome) in outcomes {
        let results = outcome?;
        debug!(
            "{}: databank {} returned {} hits, {} failures",
            query_name,
            i,
            results.hits.len(),
            results.failures.len()
        );
        merged.hits.extend(results.hits);
        merged.failures.extend(results.failures);
    }

    if merged.has_failures() {
        warn!(
            "{}: {} task failures across the collection, discarding hits",
            query_name,
            merged.failures.len()
        );
        merged.hits.clear();
        return Ok(merged);
    }
    merged.rank(searcher.params().max_hits_results);
    Ok(merged)
}
