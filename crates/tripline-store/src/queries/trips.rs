// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trip fact aggregation against the filling-station service collection.

use bson::{Bson, Document, doc};
use chrono_tz::Tz;
use futures::TryStreamExt;
use mongodb::Client;
use tracing::debug;

use tripline_core::error::TriplineError;
use tripline_core::types::{FactRecord, FetchWindow};

use crate::convert::fact_from_document;
use crate::handle::store_error;

const TRIP_DATABASE: &str = "filling-station-service";
const TRIP_COLLECTION: &str = "trip";

/// Timestamp render format for `$dateToString`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fetches completed trips of one category created inside the half-open
/// window.
pub async fn completed_trips(
    client: &Client,
    category: &str,
    window: &FetchWindow,
    tz: Tz,
) -> Result<Vec<FactRecord>, TriplineError> {
    let collection = client
        .database(TRIP_DATABASE)
        .collection::<Document>(TRIP_COLLECTION);

    let mut cursor = collection
        .aggregate(trip_pipeline(category, window, tz))
        .await
        .map_err(|e| store_error(format!("trip aggregation failed for {category}"), e))?;

    let mut facts = Vec::new();
    while let Some(document) = cursor
        .try_next()
        .await
        .map_err(|e| store_error("trip cursor read failed", e))?
    {
        facts.push(fact_from_document(&document));
    }
    debug!(category, count = facts.len(), "fetched trip facts");
    Ok(facts)
}

/// Match on creation time, category, and completed status, then project
/// flat report-named columns with timestamps rendered server-side in the
/// report timezone.
pub(crate) fn trip_pipeline(category: &str, window: &FetchWindow, tz: Tz) -> Vec<Document> {
    vec![
        doc! {
            "$match": {
                "createdAt": {
                    "$gte": bson::DateTime::from_chrono(window.start),
                    "$lt": bson::DateTime::from_chrono(window.end),
                },
                "category": category,
                "status": "COMPLETED",
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "Trip_Id": "$referenceId",
                "Vehicle_Number": "$vehicleNumber",
                "Trip_Start_Time": date_to_string("$startTime", tz),
                "Trip_End_Time": date_to_string("$endTime", tz),
                "Trip_Category": "$category",
                "Filling_Quantity": "$fillingQuantity",
                "Card_Quantity": "$cardQuantity",
                "Filling_Station_Id": "$fillingStationId",
                "Filling_Station_Name": "$fillingStationName",
                "Trip_Status": "$status",
                "Dispensed_Quantity": "$dispensedQuantity",
                "CMC_Number": first_dispense_point("cmcNumber"),
                "Customer_Name": first_dispense_point("customerName"),
                "Customer_Address": first_dispense_point("address"),
            }
        },
    ]
}

fn date_to_string(field: &str, tz: Tz) -> Document {
    doc! {
        "$dateToString": {
            "format": TIME_FORMAT,
            "date": field,
            "timezone": tz.name(),
        }
    }
}

/// First dispense point's `field`, or null for trips without dispense
/// points.
fn first_dispense_point(field: &str) -> Document {
    doc! {
        "$cond": {
            "if": {
                "$and": [
                    { "$isArray": "$request.dispensePoints" },
                    { "$gt": [{ "$size": "$request.dispensePoints" }, 0] },
                ]
            },
            "then": { "$arrayElemAt": [format!("$request.dispensePoints.{field}"), 0] },
            "else": Bson::Null,
        }
    }
}
