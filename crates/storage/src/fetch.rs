//! Parallel page retrieval for read paths.

use crate::page::Page;
use crate::persistence::PageStore;
use std::io;
use std::thread;
use strata_core::{Error, PageId, Result};
use tracing::trace;

/// Loads `ids` from `store` with at most `workers` threads and returns the
/// pages in the order of `ids`.
///
/// The ids are split into contiguous chunks, one per worker; joining the
/// workers in spawn order keeps the result in directory order.
pub fn fetch_pages(
    store: &dyn PageStore,
    table: &str,
    ids: &[PageId],
    workers: usize,
) -> Result<Vec<Page>> {
    if ids.len() <= 1 || workers <= 1 {
        return ids.iter().map(|&id| store.load_page(table, id)).collect();
    }

    let chunk_size = ids.len().div_ceil(workers);
    trace!(table, pages = ids.len(), workers, chunk_size, "fetching pages");

    let results: Vec<Result<Vec<Page>>> = thread::scope(|s| {
        let handles: Vec<_> = ids
            .chunks(chunk_size)
            .map(|chunk| {
                s.spawn(move || {
                    chunk
                        .iter()
                        .map(|&id| store.load_page(table, id))
                        .collect::<Result<Vec<Page>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    Err(Error::Io(io::Error::new(
                        io::ErrorKind::Other,
                        "page fetch worker panicked",
                    )))
                })
            })
            .collect()
    });

    let mut pages = Vec::with_capacity(ids.len());
    for result in results {
        pages.extend(result?);
    }
    Ok(pages)
}
