use crate::core::config::{CellPosition, TableLayout};
use crate::core::{PriceQuote, QuoteProvider, TrackerError};
use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::VecDeque;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("aurum/", env!("CARGO_PKG_VERSION"));

/// Reads the gold quote from the first HTML table of a bank's price page.
pub struct BankTableProvider {
    url: String,
    layout: TableLayout,
    client: reqwest::Client,
}

impl BankTableProvider {
    pub fn new(url: &str, layout: TableLayout) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(BankTableProvider {
            url: url.to_string(),
            layout,
            client,
        })
    }
}

#[async_trait]
impl QuoteProvider for BankTableProvider {
    #[instrument(name = "GoldQuoteFetch", skip(self), fields(url = %self.url))]
    async fn fetch_current_quote(&self) -> Result<PriceQuote, TrackerError> {
        debug!("Requesting gold price page");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TrackerError::SourceUnavailable(format!("Request error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Gold price page returned an error status");
            return Err(TrackerError::SourceUnavailable(format!(
                "HTTP error: {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            TrackerError::SourceUnavailable(format!("Failed to read response body: {e}"))
        })?;

        let quote = parse_quote(&body, &self.layout)?;
        debug!(?quote, "Parsed gold quote");
        Ok(quote)
    }
}

/// Extracts the buy and sell prices from the first table in `html`.
pub fn parse_quote(html: &str, layout: &TableLayout) -> Result<PriceQuote, TrackerError> {
    let grid = first_table_grid(html)?;
    Ok(PriceQuote {
        buy_price: price_at(&grid, layout.buy, "buy")?,
        sell_price: price_at(&grid, layout.sell, "sell")?,
    })
}

fn price_at(grid: &[Vec<String>], pos: CellPosition, label: &str) -> Result<i64, TrackerError> {
    let cell = grid
        .get(pos.row)
        .and_then(|row| row.get(pos.column))
        .ok_or_else(|| {
            TrackerError::ParseFailure(format!(
                "no {label} price cell at row {}, column {}",
                pos.row, pos.column
            ))
        })?;

    let token = cell.split_whitespace().next().ok_or_else(|| {
        TrackerError::ParseFailure(format!(
            "{label} price cell at row {}, column {} is empty",
            pos.row, pos.column
        ))
    })?;

    token.parse::<i64>().map_err(|e| {
        TrackerError::ParseFailure(format!("{label} price {token:?} is not an integer: {e}"))
    })
}

struct RawCell {
    text: String,
    rowspan: usize,
    colspan: usize,
}

struct Span {
    column: usize,
    text: String,
    rows_left: usize,
}

/// Text grid of the data rows of the first table. Rows of `<thead>`, `<tbody>`
/// and `<tfoot>` are expanded together, then the first row is dropped as the
/// header.
fn first_table_grid(html: &str) -> Result<Vec<Vec<String>>, TrackerError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("table")
        .map_err(|e| TrackerError::ParseFailure(format!("invalid table selector: {e:?}")))?;
    let table = document
        .select(&selector)
        .next()
        .ok_or_else(|| TrackerError::ParseFailure("no table found in page".to_string()))?;

    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => head.extend(section_rows(child)),
            "tbody" => body.extend(section_rows(child)),
            "tfoot" => foot.extend(section_rows(child)),
            "tr" => body.push(read_row(child)),
            _ => {}
        }
    }
    head.extend(body);
    head.extend(foot);

    let mut grid = expand_spans(head);
    if !grid.is_empty() {
        grid.remove(0);
    }
    debug!(rows = grid.len(), "Expanded price table");
    Ok(grid)
}

fn section_rows(section: ElementRef<'_>) -> Vec<Vec<RawCell>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .map(read_row)
        .collect()
}

fn read_row(row: ElementRef<'_>) -> Vec<RawCell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|cell| RawCell {
            text: cell
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" "),
            rowspan: span_attr(cell, "rowspan"),
            colspan: span_attr(cell, "colspan"),
        })
        .collect()
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Repeats spanning cells into every slot they cover so that column indices
/// are stable across rows.
fn expand_spans(rows: Vec<Vec<RawCell>>) -> Vec<Vec<String>> {
    let mut grid = Vec::with_capacity(rows.len());
    let mut carried: VecDeque<Span> = VecDeque::new();

    for row in rows {
        let mut texts = Vec::new();
        let mut next = Vec::new();

        for cell in row {
            while carried.front().is_some_and(|s| s.column <= texts.len()) {
                if let Some(span) = carried.pop_front() {
                    place_carried(span, &mut texts, &mut next);
                }
            }
            for _ in 0..cell.colspan {
                let column = texts.len();
                texts.push(cell.text.clone());
                if cell.rowspan > 1 {
                    next.push(Span {
                        column,
                        text: cell.text.clone(),
                        rows_left: cell.rowspan - 1,
                    });
                }
            }
        }
        for span in carried.drain(..) {
            place_carried(span, &mut texts, &mut next);
        }

        grid.push(texts);
        carried = next.into();
    }
    grid
}

fn place_carried(span: Span, texts: &mut Vec<String>, next: &mut Vec<Span>) {
    texts.push(span.text.clone());
    if span.rows_left > 1 {
        next.push(Span {
            rows_left: span.rows_left - 1,
            ..span
        });
    }
}
