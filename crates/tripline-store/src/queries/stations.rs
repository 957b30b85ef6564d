// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Station dimension lookups against the infra network-group collection.

use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::Client;
use tracing::debug;

use tripline_core::error::TriplineError;
use tripline_core::types::DimensionRecord;

use crate::convert::dimension_from_document;
use crate::handle::store_error;

const DIMENSION_DATABASE: &str = "infra";
const DIMENSION_COLLECTION: &str = "network_group";

/// Property name carrying the area label on a network group.
const AREA_PROPERTY: &str = "area_name";

/// Looks up the area dimension rows for the given station codes.
///
/// Codes unknown to the dimension table are simply absent from the result.
pub async fn station_areas(
    client: &Client,
    station_ids: &[String],
) -> Result<Vec<DimensionRecord>, TriplineError> {
    if station_ids.is_empty() {
        return Ok(Vec::new());
    }

    let collection = client
        .database(DIMENSION_DATABASE)
        .collection::<Document>(DIMENSION_COLLECTION);

    let mut cursor = collection
        .aggregate(station_pipeline(station_ids))
        .await
        .map_err(|e| store_error("station dimension aggregation failed", e))?;

    let mut dimensions = Vec::new();
    while let Some(document) = cursor
        .try_next()
        .await
        .map_err(|e| store_error("station cursor read failed", e))?
    {
        if let Some(dimension) = dimension_from_document(&document) {
            dimensions.push(dimension);
        }
    }
    debug!(
        requested = station_ids.len(),
        matched = dimensions.len(),
        "fetched station areas"
    );
    Ok(dimensions)
}

/// Match station codes, then pull the area property value out of the
/// properties array.
pub(crate) fn station_pipeline(station_ids: &[String]) -> Vec<Document> {
    let codes: Vec<Bson> = station_ids
        .iter()
        .map(|id| Bson::String(id.clone()))
        .collect();
    vec![
        doc! { "$match": { "code": { "$in": codes } } },
        doc! {
            "$project": {
                "_id": 0,
                "Filling_Station_Id": "$code",
                "Area": {
                    "$arrayElemAt": [
                        {
                            "$map": {
                                "input": {
                                    "$filter": {
                                        "input": "$properties",
                                        "as": "prop",
                                        "cond": { "$eq": ["$$prop.propName", AREA_PROPERTY] },
                                    }
                                },
                                "as": "matched",
                                "in": "$$matched.value",
                            }
                        },
                        0,
                    ]
                },
            }
        },
    ]
}
