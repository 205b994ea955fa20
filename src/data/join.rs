use std::collections::HashMap;

use geojson::{feature::Id, Feature};
use serde_json::Value as JsonValue;

use super::table::CountryRecord;

/// Lookup key of a feature: its id rendered as a string.
pub fn feature_key(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        Id::String(s) => Some(s.clone()),
        Id::Number(n) => Some(n.to_string()),
    }
}

/// Index records by the value of `key_column`.
///
/// Later rows win when a key repeats. Rows without the column are skipped.
pub fn index_by_key<'a>(
    records: &'a [CountryRecord],
    key_column: &str,
) -> HashMap<&'a str, &'a CountryRecord> {
    let mut index = HashMap::with_capacity(records.len());
    let mut duplicates = 0usize;

    for record in records {
        let Some(key) = record.get(key_column) else {
            continue;
        };
        if index.insert(key, record).is_some() {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        tracing::debug!(duplicates, key_column, "duplicate table keys, later rows kept");
    }

    index
}

/// Merge each feature's matching record into its property bag, in place.
///
/// Every column of the record is copied and overwrites a property of the
/// same name. Features without a match are left exactly as they were.
/// Returns the number of features that matched.
pub fn merge_properties(
    features: &mut [Feature],
    index: &HashMap<&str, &CountryRecord>,
) -> usize {
    let mut matched = 0;

    for feature in features.iter_mut() {
        let Some(record) = feature_key(feature).and_then(|key| index.get(key.as_str()).copied())
        else {
            continue;
        };

        let properties = feature.properties.get_or_insert_with(Default::default);
        for (column, value) in record.columns() {
            properties.insert(column.to_string(), JsonValue::String(value.to_string()));
        }
        matched += 1;
    }

    tracing::debug!(matched, total = features.len(), "joined table onto features");
    matched
}
