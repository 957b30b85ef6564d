// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tolerant BSON-to-record conversion for aggregation output.
//!
//! Projection output is only as clean as the source documents, so every
//! getter degrades to `None` instead of failing the row: missing keys,
//! nulls, and off-type values all become absent cells.

use bson::{Bson, Document};

use tripline_core::types::{DimensionRecord, FactRecord};

/// Builds a fact row from one trip projection document.
pub(crate) fn fact_from_document(doc: &Document) -> FactRecord {
    FactRecord {
        trip_id: get_string(doc, "Trip_Id"),
        vehicle_number: get_string(doc, "Vehicle_Number"),
        trip_category: get_string(doc, "Trip_Category"),
        trip_status: get_string(doc, "Trip_Status"),
        trip_start_time: get_string(doc, "Trip_Start_Time"),
        trip_end_time: get_string(doc, "Trip_End_Time"),
        dispensed_quantity: get_number(doc, "Dispensed_Quantity"),
        filling_station_name: get_string(doc, "Filling_Station_Name"),
        filling_station_id: get_string(doc, "Filling_Station_Id"),
        filling_quantity: get_number(doc, "Filling_Quantity"),
        card_quantity: get_number(doc, "Card_Quantity"),
        cmc_number: get_string(doc, "CMC_Number"),
        customer_name: get_string(doc, "Customer_Name"),
        customer_address: get_string(doc, "Customer_Address"),
    }
}

/// Builds a dimension row; `None` when the station id itself is missing.
pub(crate) fn dimension_from_document(doc: &Document) -> Option<DimensionRecord> {
    let station_id = get_string(doc, "Filling_Station_Id")?;
    Some(DimensionRecord {
        station_id,
        area: get_area(doc),
    })
}

/// String value of `key`; numeric values render through `Display`.
fn get_string(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key)? {
        Bson::String(s) => Some(s.clone()),
        Bson::Int32(i) => Some(i.to_string()),
        Bson::Int64(i) => Some(i.to_string()),
        Bson::Double(d) => Some(d.to_string()),
        _ => None,
    }
}

/// Numeric value of `key` across the integer and double BSON kinds.
fn get_number(doc: &Document, key: &str) -> Option<f64> {
    match doc.get(key)? {
        Bson::Double(d) => Some(*d),
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

/// Area value: a plain string, or the first string of an array-valued
/// property.
fn get_area(doc: &Document) -> Option<String> {
    match doc.get("Area")? {
        Bson::String(s) => Some(s.clone()),
        Bson::Array(items) => items.iter().find_map(|item| match item {
            Bson::String(s) => Some(s.clone()),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn fact_converts_mixed_scalar_types() {
        let doc = doc! {
            "Trip_Id": "TRIP-001",
            "Vehicle_Number": "TN01AB1234",
            "Trip_Category": "MC",
            "Trip_Status": "COMPLETED",
            "Trip_Start_Time": "2024-06-01 08:15:00",
            "Trip_End_Time": "2024-06-01 11:40:00",
            "Dispensed_Quantity": 1250.5,
            "Filling_Station_Name": "Thiruvottiyur Station",
            "Filling_Station_Id": "FS-17",
            "Filling_Quantity": 1300i32,
            "Card_Quantity": 1280i64,
            "CMC_Number": 88321i32,
            "Customer_Name": "Metro Water",
            "Customer_Address": "Chennai",
        };

        let fact = fact_from_document(&doc);
        assert_eq!(fact.trip_id.as_deref(), Some("TRIP-001"));
        assert_eq!(fact.dispensed_quantity, Some(1250.5));
        assert_eq!(fact.filling_quantity, Some(1300.0));
        assert_eq!(fact.card_quantity, Some(1280.0));
        assert_eq!(fact.cmc_number.as_deref(), Some("88321"));
    }

    #[test]
    fn missing_and_null_fields_become_absent_cells() {
        let doc = doc! {
            "Trip_Id": "TRIP-002",
            "Customer_Name": Bson::Null,
        };

        let fact = fact_from_document(&doc);
        assert_eq!(fact.trip_id.as_deref(), Some("TRIP-002"));
        assert_eq!(fact.customer_name, None);
        assert_eq!(fact.vehicle_number, None);
        assert_eq!(fact.dispensed_quantity, None);
    }

    #[test]
    fn empty_strings_are_kept_as_values() {
        let doc = doc! { "Customer_Address": "" };
        let fact = fact_from_document(&doc);
        assert_eq!(fact.customer_address.as_deref(), Some(""));
    }

    #[test]
    fn off_type_quantity_is_dropped_not_coerced() {
        let doc = doc! { "Dispensed_Quantity": "not a number" };
        let fact = fact_from_document(&doc);
        assert_eq!(fact.dispensed_quantity, None);
    }

    #[test]
    fn dimension_requires_a_station_id() {
        let doc = doc! { "Area": "01-Thiruvottiyur" };
        assert!(dimension_from_document(&doc).is_none());
    }

    #[test]
    fn dimension_area_accepts_a_plain_string() {
        let doc = doc! { "Filling_Station_Id": "FS-17", "Area": "01-Thiruvottiyur" };
        let dim = dimension_from_document(&doc).unwrap();
        assert_eq!(dim.station_id, "FS-17");
        assert_eq!(dim.area.as_deref(), Some("01-Thiruvottiyur"));
    }

    #[test]
    fn dimension_area_takes_the_first_string_of_an_array() {
        let doc = doc! {
            "Filling_Station_Id": "FS-18",
            "Area": [Bson::Null, "02-Manali", "03-Madhavaram"],
        };
        let dim = dimension_from_document(&doc).unwrap();
        assert_eq!(dim.area.as_deref(), Some("02-Manali"));
    }

    #[test]
    fn dimension_without_an_area_match_is_kept_unmatched() {
        let doc = doc! { "Filling_Station_Id": "FS-19", "Area": Bson::Null };
        let dim = dimension_from_document(&doc).unwrap();
        assert_eq!(dim.area, None);
    }
}
