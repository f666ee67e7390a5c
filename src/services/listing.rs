// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rapid-mapping activations listing scraper.

use crate::error::AppError;
use crate::models::ActivationSummary;
use crate::services::CopernicusClient;
use scraper::{ElementRef, Html, Selector};

/// Inline style of the marker div on rows whose activation is still open.
const ACTIVE_STYLE: &str = "background-color:#75b127";

const WILDFIRE: &str = "Wildfire";

/// Scrape the listing and return wildfire activations.
pub async fn scan_activations(
    client: &CopernicusClient,
) -> Result<Vec<ActivationSummary>, AppError> {
    let html = client.get_text(&client.listing_url()).await?;
    let activations = parse_listing(&html, |href| client.resolve("mapping", href))?;

    tracing::info!(count = activations.len(), "Scanned wildfire activations");
    Ok(activations)
}

/// Parse the listing table.
///
/// Columns: marker, code, name, date, type, country, links. Short rows
/// yield empty fields rather than an error; rows whose type is not a
/// wildfire are dropped. `resolve_link` turns the first link of the last
/// column into an absolute RSS URL.
pub fn parse_listing(
    html: &str,
    resolve_link: impl Fn(&str) -> String,
) -> Result<Vec<ActivationSummary>, AppError> {
    let document = Html::parse_document(html);
    let row_sel = selector(".view-content table tr")?;
    let cell_sel = selector("td")?;
    let marker_sel = selector("div")?;
    let link_sel = selector("a")?;

    let activations = document
        .select(&row_sel)
        .map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
            let text = |i: usize| cells.get(i).map(cell_text).unwrap_or_default();

            let is_active = cells
                .first()
                .and_then(|cell| cell.select(&marker_sel).next())
                .and_then(|div| div.value().attr("style"))
                .is_some_and(|style| style == ACTIVE_STYLE);

            let rss_href = cells
                .get(6)
                .and_then(|cell| cell.select(&link_sel).next())
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default();

            ActivationSummary {
                is_active,
                activation_code: text(1),
                activation_name: text(2),
                activation_date: text(3),
                activation_type: text(4),
                activation_country: text(5),
                rss_link: resolve_link(rss_href),
            }
        })
        .filter(|a| a.activation_type.contains(WILDFIRE))
        .collect();

    Ok(activations)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

pub(crate) fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid CSS selector '{css}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body>
<div class="view-content">
<table>
  <thead><tr><th>Status</th><th>Code</th><th>Name</th><th>Date</th><th>Type</th><th>Country</th><th>Links</th></tr></thead>
  <tbody>
  <tr>
    <td><div style="background-color:#75b127"></div></td>
    <td> EMSR699 </td>
    <td>Wildfire in Attica</td>
    <td>2024-08-11</td>
    <td>Wildfire</td>
    <td>Greece</td>
    <td><a href="list-of-components/EMSR699/feed">RSS</a><a href="other">x</a></td>
  </tr>
  <tr>
    <td><div style="background-color:#cccccc"></div></td>
    <td>EMSR700</td>
    <td>Flood in Valencia</td>
    <td>2024-10-30</td>
    <td>Flood</td>
    <td>Spain</td>
    <td><a href="list-of-components/EMSR700/feed">RSS</a></td>
  </tr>
  <tr>
    <td><div style="background-color: #75b127"></div></td>
    <td>EMSR650</td>
    <td>Forest fire in Madeira</td>
    <td>2024-08-15</td>
    <td>Wildfire</td>
  </tr>
  </tbody>
</table>
</div>
<table><tr><td></td><td>EMSR1</td><td></td><td></td><td>Wildfire</td></tr></table>
</body></html>"#;

    fn parse(html: &str) -> Vec<ActivationSummary> {
        parse_listing(html, |href| format!("https://ems.test/mapping/{href}")).unwrap()
    }

    #[test]
    fn test_parses_wildfire_rows_only() {
        let activations = parse(LISTING);
        let codes: Vec<&str> = activations
            .iter()
            .map(|a| a.activation_code.as_str())
            .collect();
        assert_eq!(codes, vec!["EMSR699", "EMSR650"]);

        let first = &activations[0];
        assert!(first.is_active);
        assert_eq!(first.activation_name, "Wildfire in Attica");
        assert_eq!(first.activation_date, "2024-08-11");
        assert_eq!(first.activation_country, "Greece");
        assert_eq!(
            first.rss_link,
            "https://ems.test/mapping/list-of-components/EMSR699/feed"
        );
    }

    #[test]
    fn test_active_requires_exact_style() {
        let activations = parse(LISTING);
        // " #75b127" with a space is not the marker style
        assert!(!activations[1].is_active);
    }

    #[test]
    fn test_short_row_defaults() {
        let activations = parse(LISTING);
        let short = &activations[1];
        assert_eq!(short.activation_country, "");
        assert_eq!(short.rss_link, "https://ems.test/mapping/");
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("<html></html>").is_empty());
    }
}
