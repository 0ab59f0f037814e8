// ABOUTME: Device and source attribution from workout metadata
// ABOUTME: Ordered table of manufacturer substrings mapped to canonical brands, evaluated as a pure function
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;

use crate::models::DeviceMetadata;

/// Source label used when no known brand matches
pub const LOCAL_HEALTH_STORE_SOURCE: &str = "Apple Health";

/// Ordered (pattern, canonical brand) table; the first matching row wins
///
/// Third-party brands come before Apple so a Garmin workout synced through the
/// phone's health store is still attributed to Garmin.
pub const BRAND_TABLE: &[(&str, &str)] = &[
    ("garmin", "Garmin"),
    ("forerunner", "Garmin"),
    ("fenix", "Garmin"),
    ("coros", "COROS"),
    ("polar", "Polar"),
    ("suunto", "Suunto"),
    ("wahoo", "Wahoo"),
    ("fitbit", "Fitbit"),
    ("whoop", "WHOOP"),
    ("oura", "Oura"),
    ("amazfit", "Amazfit"),
    ("zepp", "Amazfit"),
    ("samsung", "Samsung"),
    ("galaxy watch", "Samsung"),
    ("pixel watch", "Google"),
    ("huawei", "Huawei"),
    ("strava", "Strava"),
    ("nike", "Nike Run Club"),
    ("apple watch", "Apple Watch"),
    ("com.apple", "Apple Health"),
    ("apple", "Apple Health"),
];

/// Canonical source and device labels for an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    /// Canonical brand or health store name
    pub source: String,
    /// Device label, when the metadata names one
    pub device: Option<String>,
}

impl Attribution {
    /// Attribution to the local health store
    #[must_use]
    pub fn local_health_store(device: Option<String>) -> Self {
        Self {
            source: LOCAL_HEALTH_STORE_SOURCE.to_owned(),
            device,
        }
    }
}

/// Canonical brand for metadata, if any table row matches
#[must_use]
pub fn match_brand(metadata: &DeviceMetadata) -> Option<&'static str> {
    let fields: Vec<String> = metadata.fields().map(str::to_lowercase).collect();
    BRAND_TABLE
        .iter()
        .find(|(pattern, _)| fields.iter().any(|field| field.contains(pattern)))
        .map(|(_, brand)| *brand)
}

/// Resolve source and device labels for a workout
#[must_use]
pub fn resolve(metadata: &DeviceMetadata) -> Attribution {
    let device = metadata
        .device_model
        .clone()
        .or_else(|| metadata.device_name.clone())
        .filter(|label| !label.trim().is_empty());

    match match_brand(metadata) {
        Some(brand) => Attribution {
            source: brand.to_owned(),
            device: device.or_else(|| Some(brand.to_owned())),
        },
        None => Attribution::local_health_store(device),
    }
}
