//! Statement page fetching.
//!
//! A statement page is fetched with a blocking `GET` and the first `<table>`
//! on it becomes the [`RawTable`]. Every failure (transport, status, missing
//! table) collapses to `None`; the caller turns that into one user-facing
//! message.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::data::cache::FetchCache;
use crate::domain::{Cell, RawTable};
use crate::error::AppError;

/// Default `User-Agent`; the source site rejects the reqwest default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Default `GET` timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches statement tables, memoized per URL for the life of the client.
pub struct StatementClient {
    client: Client,
    cache: FetchCache,
}

impl StatementClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            cache: FetchCache::new(),
        })
    }

    /// First table on the page at `url`, or `None` if it can't be had.
    pub fn fetch_table(&mut self, url: &str) -> Option<RawTable> {
        let client = &self.client;
        self.cache.get_or_fetch(url, |url| fetch_uncached(client, url))
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Forget every cached page (failures included) so the next fetch retries.
    pub fn clear_cache(&mut self) -> usize {
        let dropped = self.cache.len();
        self.cache.clear();
        dropped
    }
}

fn fetch_uncached(client: &Client, url: &str) -> Option<RawTable> {
    let resp = match client.get(url).send() {
        Ok(resp) => resp,
        Err(e) => {
            warn!(url, error = %e, "statement request failed");
            return None;
        }
    };

    if !resp.status().is_success() {
        warn!(url, status = %resp.status(), "statement request returned an error status");
        return None;
    }

    let body = match resp.text() {
        Ok(body) => body,
        Err(e) => {
            warn!(url, error = %e, "failed to read statement body");
            return None;
        }
    };

    let table = parse_first_table(&body);
    match &table {
        Some(t) => debug!(url, columns = t.width(), rows = t.rows.len(), "parsed statement table"),
        None => warn!(url, "no table found on statement page"),
    }
    table
}

/// Parse the first `<table>` of an HTML document.
///
/// The first row with any text is the header. Blank cells become `None`, rows
/// with no text at all are dropped, and columns without a header get an
/// `Unnamed: N` name.
pub fn parse_first_table(html: &str) -> Option<RawTable> {
    let doc = Html::parse_document(html);

    let sel_table = Selector::parse("table").ok()?;
    let sel_tr = Selector::parse("tr").ok()?;
    let sel_cell = Selector::parse("th, td").ok()?;

    let table = doc.select(&sel_table).next()?;

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    for tr in table.select(&sel_tr) {
        let cells: Vec<Cell> = tr.select(&sel_cell).map(cell_text).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }

        if header.is_none() {
            header = Some(cells.into_iter().map(Option::unwrap_or_default).collect());
        } else {
            rows.push(cells);
        }
    }

    let mut headers = header?;
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width > headers.len() {
        headers.resize(width, String::new());
    }
    for (idx, h) in headers.iter_mut().enumerate() {
        if h.is_empty() {
            *h = format!("Unnamed: {idx}");
        }
    }

    Some(RawTable::new(headers, rows))
}

fn cell_text(el: ElementRef<'_>) -> Cell {
    let text = norm_text(&el.text().collect::<String>());
    if text.is_empty() { None } else { Some(text) }
}

/// Collapse whitespace & trim.
fn norm_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <table class="mctable1">
            <tr><th>Particulars</th><th>2021</th><th>2022</th><th>2023</th></tr>
            <tr><td>Total   Assets</td><td>100</td><td>120</td><td>140</td></tr>
            <tr><td></td><td> </td><td></td><td></td></tr>
            <tr><td>Net Worth</td><td>1,000</td><td></td><td>3</td></tr>
          </table>
          <table><tr><th>ignored</th></tr></table>
        </body></html>"#;

    #[test]
    fn parses_first_table() {
        let t = parse_first_table(PAGE).unwrap();
        assert_eq!(t.headers, ["Particulars", "2021", "2022", "2023"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][0].as_deref(), Some("Total Assets"));
        assert_eq!(t.rows[1][1].as_deref(), Some("1,000"));
        assert_eq!(t.rows[1][2], None);
    }

    #[test]
    fn td_header_row_and_wide_rows() {
        let html = "<table><tr><td></td><td>Mar 24</td></tr><tr><td>Net Profit</td><td>5</td><td>extra</td></tr></table>";
        let t = parse_first_table(html).unwrap();
        assert_eq!(t.headers, ["Unnamed: 0", "Mar 24", "Unnamed: 2"]);
        assert_eq!(t.rows, vec![vec![Some("Net Profit".to_string()), Some("5".to_string()), Some("extra".to_string())]]);
    }

    #[test]
    fn failed_fetch_is_cached_until_cleared() {
        let mut client = StatementClient::new(Duration::from_secs(2), DEFAULT_USER_AGENT).unwrap();
        // Nothing listens on port 1.
        let url = "http://127.0.0.1:1/statement";
        assert!(client.fetch_table(url).is_none());
        assert!(client.fetch_table(url).is_none());
        assert_eq!((client.cache().misses(), client.cache().hits()), (1, 1));

        assert_eq!(client.clear_cache(), 1);
        assert!(client.cache().is_empty());
    }

    #[test]
    fn page_without_table_is_none() {
        assert!(parse_first_table("<html><body><p>Moved</p></body></html>").is_none());
    }

    #[test]
    fn fetched_table_feeds_the_trend() {
        let t = parse_first_table(PAGE).unwrap();
        let trend = crate::table::trend_series(Some(&t), "total assets");
        let values: Vec<f64> = trend.iter().filter_map(|p| p.numeric()).collect();
        assert_eq!(values, [100.0, 120.0, 140.0]);
    }
}
