// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Global activations RSS feed.

use crate::error::AppError;
use crate::models::FeedItem;
use crate::services::xml::{read_items, XmlItem};
use crate::services::CopernicusClient;

const WILDFIRE: &str = "Wildfire";

/// Fetch the global feed and return wildfire items.
pub async fn fetch_feed(client: &CopernicusClient, url: &str) -> Result<Vec<FeedItem>, AppError> {
    let xml = client.get_text(url).await?;
    let items = parse_feed(&xml)?;

    tracing::info!(count = items.len(), url, "Parsed wildfire feed items");
    Ok(items)
}

/// Parse feed XML, keeping items with a category containing "Wildfire".
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, AppError> {
    Ok(read_items(xml)?
        .iter()
        .filter(|item| item.texts("category").any(|c| c.contains(WILDFIRE)))
        .map(to_feed_item)
        .collect())
}

fn to_feed_item(item: &XmlItem) -> FeedItem {
    FeedItem {
        title: item.text("title"),
        link: item.text("link"),
        description: item.text("description"),
        category: item.text("category"),
        guid: item.text("guid"),
        pub_date: item.text("pubDate"),
        source: item.text("source"),
        thumbnail: item.text("gdacs:thumbnail"),
        point: item.text("georss:point"),
        actor: item.text("iwgsem:actor"),
        activation_guid: item.text("iwgsem:activationGUID"),
        activation_name: item.text("iwgsem:activationName"),
        activation_event_type: item.text("iwgsem:activationEventType"),
        activation_published: item.text("iwgsem:activationPublished"),
        activation_location: item.text("iwgsem:activationLocation"),
        activation_affected_countries: item.text("iwgsem:activationAffectedCountries"),
        activation_description: item.text("iwgsem:activationDescription"),
        activation_link: item.text("iwgsem:activationLink"),
        activation_status: item.text("iwgsem:activationStatus"),
        activation_preview: item.text("iwgsem:activationPreview"),
        activation_rss: item.text("iwgsem:activationRSS"),
        event_type: item.opt("gdacs:eventtype"),
        event_id: item.opt("gdacs:eventid"),
        id: item.opt("gdacs:id"),
        gdacs_link: item.opt("gdacs:link"),
    }
}
