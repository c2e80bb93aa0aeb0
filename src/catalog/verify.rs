//! Reachability check for catalog URLs.
//!
//! Every entry's two statement pages are probed with an HTTP `HEAD` on a
//! fixed-size rayon pool. A probe that errors or times out counts as
//! unreachable; nothing is retried and no single failure stops the batch.
//! Entries where neither page answers are dropped.

use std::time::Duration;

use rayon::prelude::*;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::domain::CatalogEntry;
use crate::error::AppError;

/// Default worker count for the probe pool.
pub const DEFAULT_PROBE_WORKERS: usize = 15;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can tell whether a URL exists.
pub trait Probe: Sync {
    fn is_reachable(&self, url: &str) -> bool;
}

impl<F> Probe for F
where
    F: Fn(&str) -> bool + Sync,
{
    fn is_reachable(&self, url: &str) -> bool {
        self(url)
    }
}

/// `HEAD` probe; redirects are followed and only a final 200 counts.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Probe for HttpProbe {
    fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).send() {
            Ok(resp) => {
                let ok = resp.status() == StatusCode::OK;
                debug!(url, status = %resp.status(), ok, "probe");
                ok
            }
            Err(e) => {
                debug!(url, error = %e, "probe failed");
                false
            }
        }
    }
}

/// Probe both URLs of every entry and keep the reachable ones.
///
/// Result order follows input order; `bs_valid`/`pl_valid` are filled in.
pub fn verify_entries<P: Probe>(
    entries: Vec<CatalogEntry>,
    workers: usize,
    probe: &P,
) -> Result<Vec<CatalogEntry>, AppError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to start probe pool: {e}")))?;

    let total = entries.len();
    let checked: Vec<CatalogEntry> = pool.install(|| {
        entries
            .into_par_iter()
            .map(|mut entry| {
                let (bs, pl) = rayon::join(
                    || probe.is_reachable(&entry.balance_sheet_url),
                    || probe.is_reachable(&entry.profit_loss_url),
                );
                entry.bs_valid = Some(bs);
                entry.pl_valid = Some(pl);
                entry
            })
            .collect()
    });

    let kept: Vec<CatalogEntry> = checked.into_iter().filter(CatalogEntry::is_reachable).collect();
    info!(total, kept = kept.len(), "verified catalog entries");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::catalog::build::{BASE_URL, build};
    use crate::domain::MasterRow;

    fn entries() -> Vec<CatalogEntry> {
        build(
            &[
                MasterRow::new("Alpha Ltd", "ALPHA"),
                MasterRow::new("Beta Ltd", "BETA"),
                MasterRow::new("Gamma Ltd", "GAMMA"),
            ],
            BASE_URL,
        )
    }

    #[test]
    fn keeps_entries_with_any_reachable_page() {
        // Alpha: both pages, Beta: P&L only, Gamma: nothing.
        let check = |url: &str| url.contains("/alphaltd/") || (url.contains("/betaltd/") && url.contains("profit-loss"));
        let kept = verify_entries(entries(), DEFAULT_PROBE_WORKERS, &check).unwrap();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].company, "Alpha Ltd");
        assert_eq!((kept[0].bs_valid, kept[0].pl_valid), (Some(true), Some(true)));
        assert_eq!(kept[1].company, "Beta Ltd");
        assert_eq!((kept[1].bs_valid, kept[1].pl_valid), (Some(false), Some(true)));
    }

    #[test]
    fn checks_every_url_once() {
        let calls = AtomicUsize::new(0);
        let check = |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            false
        };
        let kept = verify_entries(entries(), 2, &check).unwrap();
        assert!(kept.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn concurrency_is_bounded_by_workers() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let check = |_: &str| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            true
        };
        let kept = verify_entries(entries(), 2, &check).unwrap();
        assert_eq!(kept.len(), 3);
        let peak = peak.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "peak {peak}");
    }

    #[test]
    fn refused_connection_is_unreachable() {
        let http = HttpProbe::new(Duration::from_secs(2), "Mozilla/5.0").unwrap();
        // Nothing listens on port 1.
        assert!(!http.is_reachable("http://127.0.0.1:1/"));

        let mut dead = entries();
        for e in &mut dead {
            e.balance_sheet_url = "http://127.0.0.1:1/bs".to_string();
            e.profit_loss_url = "http://127.0.0.1:1/pl".to_string();
        }
        let kept = verify_entries(dead, 2, &http).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn empty_input_is_fine() {
        let check = |_: &str| true;
        assert!(verify_entries(Vec::new(), 0, &check).unwrap().is_empty());
    }
}
