//! Grouping of occurrence records into map markers
//!
//! Records sharing the same coordinates (rounded to a fixed precision) are
//! merged into one marker; the group's record list backs the popup carousel.
//! Grouping is a pure function of the occurrence array and is memoized per
//! occurrence generation so markers do not churn on unrelated redraws.

use crate::data::occurrence::Occurrence;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Decimal places used when bucketing coordinates into marker keys.
/// Records within the same rounding bucket are merged; there is no
/// geodesic distance threshold.
pub const COORD_DECIMALS: usize = 6;

/// Key for a coordinate pair, formatted to [`COORD_DECIMALS`] places.
pub fn coord_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.dp$},{longitude:.dp$}", dp = COORD_DECIMALS)
}

/// Round a coordinate to the bucketing precision.
fn round_coord(value: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS as i32);
    (value * scale).round() / scale
}

/// One map marker: all records sharing a coordinate bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
    /// Coordinate key of this group, see [`coord_key`].
    pub key: String,

    /// Bucketed latitude in degrees.
    pub latitude: f64,

    /// Bucketed longitude in degrees.
    pub longitude: f64,

    /// Records at this location, in occurrence-array order.
    pub records: Vec<Occurrence>,
}

impl MarkerGroup {
    /// Identifiers of the records in this group.
    pub fn record_ids(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

/// Group records by bucketed coordinates. Records without coordinates are
/// skipped. Groups are ordered by first appearance in the input.
pub fn group_occurrences(occurrences: &[Occurrence]) -> Vec<MarkerGroup> {
    let mut groups: Vec<MarkerGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for occ in occurrences {
        let Some((lat, lon)) = occ.position() else {
            continue;
        };
        let key = coord_key(lat, lon);
        match index_by_key.get(&key) {
            Some(&idx) => groups[idx].records.push(occ.clone()),
            None => {
                index_by_key.insert(key.clone(), groups.len());
                groups.push(MarkerGroup {
                    key,
                    latitude: round_coord(lat),
                    longitude: round_coord(lon),
                    records: vec![occ.clone()],
                });
            }
        }
    }

    groups
}

/// Memoized grouping keyed by the occurrence set's generation counter.
///
/// The occurrence array is replaced wholesale on each reload and the
/// generation bumped; regrouping only happens when the generation changes.
#[derive(Default)]
pub struct GroupCache {
    generation: Option<u64>,
    groups: Arc<Vec<MarkerGroup>>,
}

impl GroupCache {
    /// Groups for the given occurrence set, recomputing only when
    /// `generation` differs from the cached one.
    pub fn groups(&mut self, generation: u64, occurrences: &[Occurrence]) -> Arc<Vec<MarkerGroup>> {
        if self.generation != Some(generation) {
            self.groups = Arc::new(group_occurrences(occurrences));
            self.generation = Some(generation);
        }
        self.groups.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, lat: f64, lon: f64) -> Occurrence {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "latitude": lat,
            "longitude": lon,
            "scientificName": "Testus exampli",
        }))
        .unwrap()
    }

    #[test]
    fn merges_records_in_same_rounding_bucket() {
        let occurrences = vec![
            record("a", -33.868800, 151.209300),
            record("b", -33.8688001, 151.2093002), // rounds to the same key
            record("c", -33.900000, 151.209300),
        ];

        let groups = group_occurrences(&occurrences);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].key, coord_key(-33.8688, 151.2093));
        assert_eq!(groups[1].records.len(), 1);
    }

    #[test]
    fn skips_records_without_coordinates() {
        let mut no_coords = record("a", 0.0, 0.0);
        no_coords.latitude = None;
        let groups = group_occurrences(&[no_coords, record("b", 1.0, 2.0)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].records[0].id, "b");
    }

    #[test]
    fn grouping_is_idempotent() {
        let occurrences = vec![
            record("a", -33.8688, 151.2093),
            record("b", -33.8688, 151.2093),
            record("c", -27.4698, 153.0251),
            record("d", -37.8136, 144.9631),
        ];

        let groups = group_occurrences(&occurrences);
        let flattened: Vec<Occurrence> = groups
            .iter()
            .flat_map(|g| g.records.iter().cloned())
            .collect();
        let regrouped = group_occurrences(&flattened);
        assert_eq!(groups, regrouped);
    }

    #[test]
    fn cache_recomputes_only_on_generation_change() {
        let mut cache = GroupCache::default();
        let occurrences = vec![record("a", 1.0, 2.0)];

        let first = cache.groups(1, &occurrences);
        let again = cache.groups(1, &[]); // stale input ignored at same generation
        assert!(Arc::ptr_eq(&first, &again));

        let fresh = cache.groups(2, &[]);
        assert!(fresh.is_empty());
    }
}
