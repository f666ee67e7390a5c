// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activation product feed (`aemfeed`).

use crate::error::AppError;
use crate::models::ActivationDetail;
use crate::services::xml::{read_items, XmlItem};
use crate::services::CopernicusClient;
use crate::time_utils::parse_feed_date;
use geojson::{Feature, Geometry, JsonObject, Value};

/// Fetch the products of one activation, newest first.
pub async fn fetch_activation(
    client: &CopernicusClient,
    activation_id: &str,
) -> Result<Vec<ActivationDetail>, AppError> {
    let xml = client
        .get_text(&client.activation_feed_url(activation_id))
        .await?;
    let details = parse_activation_feed(&xml)?;

    tracing::info!(
        activation_id,
        count = details.len(),
        "Parsed activation products"
    );
    Ok(details)
}

/// Parse an activation feed and sort it by `pubDate`, newest first.
pub fn parse_activation_feed(xml: &str) -> Result<Vec<ActivationDetail>, AppError> {
    let mut details: Vec<ActivationDetail> = read_items(xml)?.iter().map(to_detail).collect();
    sort_newest_first(&mut details);
    Ok(details)
}

/// Stable sort, newest first. Records whose date is missing or unparsable
/// go after all dated ones and keep their relative order.
pub fn sort_newest_first(details: &mut [ActivationDetail]) {
    details.sort_by_cached_key(|d| {
        std::cmp::Reverse(d.pub_date.as_deref().and_then(parse_feed_date))
    });
}

fn to_detail(item: &XmlItem) -> ActivationDetail {
    let polygon = item.text("georss:polygon");
    let geojson = match polygon_feature(&polygon) {
        Ok(feature) => Some(feature),
        Err(reason) => {
            tracing::warn!(guid = %item.text("guid"), reason, "Malformed georss:polygon");
            None
        }
    };

    ActivationDetail {
        title: item.text("title"),
        link: item.text("link"),
        description: item.text("description"),
        category: item.text("category"),
        guid: item.text("guid"),
        source: item.text("source"),
        internal_id: item.text("gdacs:cemsaoi"),
        polygon,
        geojson,
        pub_date: item.opt("pubDate"),
        thumbnail: item.opt("gdacs:thumbnail"),
        product_type: item.opt("gdacs:cemsptype"),
        component_type: item.opt("gdacs:cemsctype"),
        monitoring: item.opt("gdacs:cemsmonit"),
    }
}

/// Convert a `georss:polygon` ("lat lon lat lon ...") into lon/lat positions.
pub fn polygon_ring(raw: &str) -> Result<Vec<Vec<f64>>, &'static str> {
    let values = raw
        .split_whitespace()
        .map(|token| token.parse::<f64>().map_err(|_| "non-numeric coordinate"))
        .collect::<Result<Vec<f64>, _>>()?;

    if values.is_empty() {
        return Err("empty polygon");
    }
    if values.len() % 2 != 0 {
        return Err("odd number of coordinates");
    }

    Ok(values
        .chunks_exact(2)
        .map(|pair| vec![pair[1], pair[0]])
        .collect())
}

/// Wrap a `georss:polygon` as a GeoJSON Polygon feature with empty properties.
pub fn polygon_feature(raw: &str) -> Result<Feature, &'static str> {
    let ring = polygon_ring(raw)?;
    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    })
}
