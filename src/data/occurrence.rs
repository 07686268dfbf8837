//! Occurrence records and endpoint payloads
//!
//! These mirror the JSON emitted by the explorer API: camelCase field names,
//! nullable coordinates, and image URLs at several quality levels. Records
//! are immutable once fetched; the whole set is replaced on each viewport
//! reload.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single museum occurrence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Stable record identifier (the upstream uuid).
    pub id: String,

    /// Decimal latitude in degrees, if the record is georeferenced.
    pub latitude: Option<f64>,

    /// Decimal longitude in degrees, if the record is georeferenced.
    pub longitude: Option<f64>,

    #[serde(default)]
    pub scientific_name: Option<String>,

    #[serde(default)]
    pub common_name: Option<String>,

    #[serde(default)]
    pub catalog_number: Option<String>,

    #[serde(default)]
    pub collection_name: Option<String>,

    #[serde(default)]
    pub institution_name: Option<String>,

    #[serde(default)]
    pub basis_of_record: Option<String>,

    #[serde(default)]
    pub event_date: Option<String>,

    #[serde(default)]
    pub locality: Option<String>,

    #[serde(default)]
    pub state_province: Option<String>,

    #[serde(default)]
    pub recorded_by: Option<String>,

    // Taxonomic hierarchy
    #[serde(default)]
    pub kingdom: Option<String>,
    #[serde(default)]
    pub phylum: Option<String>,
    #[serde(default, rename = "class")]
    pub taxon_class: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub genus: Option<String>,
    #[serde(default)]
    pub species: Option<String>,

    // Image URLs at different quality levels
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Occurrence {
    /// Coordinates as (latitude, longitude), if both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Best display name: scientific name, falling back to common name.
    pub fn display_name(&self) -> &str {
        self.scientific_name
            .as_deref()
            .or(self.common_name.as_deref())
            .unwrap_or("Unidentified specimen")
    }

    /// Best available image URL (medium, then large, then thumbnail).
    pub fn best_image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or(self.large_image_url.as_deref())
            .or(self.thumbnail_url.as_deref())
    }

    /// The known levels of the taxonomic hierarchy, kingdom first.
    pub fn taxonomy_path(&self) -> Option<String> {
        let levels = [
            &self.kingdom,
            &self.phylum,
            &self.taxon_class,
            &self.order,
            &self.family,
            &self.genus,
        ];
        let path: Vec<&str> = levels.iter().filter_map(|l| l.as_deref()).collect();
        if path.is_empty() {
            None
        } else {
            Some(path.join(" › "))
        }
    }
}

/// One value of a facet, e.g. `("New South Wales", 1234)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

/// Facet name → value counts, as returned alongside occurrence pages.
pub type Facets = HashMap<String, Vec<FacetValue>>;

/// Response of the occurrences endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccurrencePage {
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,

    #[serde(default, rename = "totalRecords")]
    pub total_records: u64,

    #[serde(default)]
    pub facets: Facets,

    /// Upstream search URL for user reference, when the API provides one.
    #[serde(default)]
    pub ala_url: Option<String>,
}

/// Response of the statistics endpoint: aggregate counts over the dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Statistics {
    #[serde(default, rename = "totalRecords")]
    pub total_records: u64,

    #[serde(default)]
    pub facets: Facets,
}

impl Statistics {
    /// Counts by state/province, largest first, for the statistics panel.
    pub fn by_region(&self) -> Vec<&FacetValue> {
        let mut values: Vec<&FacetValue> = self
            .facets
            .get("state_province")
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        values.sort_by(|a, b| b.count.cmp(&a.count));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_occurrence_page_json() {
        let json = r#"{
            "occurrences": [{
                "id": "abc-123",
                "latitude": -33.8688,
                "longitude": 151.2093,
                "scientificName": "Macropus giganteus",
                "commonName": "Eastern Grey Kangaroo",
                "catalogNumber": "M.1234",
                "stateProvince": "New South Wales",
                "class": "Mammalia",
                "imageUrl": "https://images.test/m.jpg"
            }],
            "totalRecords": 42,
            "facets": {
                "state_province": [{"value": "New South Wales", "count": 40}]
            },
            "ala_url": "https://biocache.ala.org.au/occurrences/search?q=*:*"
        }"#;

        let page: OccurrencePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_records, 42);
        assert_eq!(page.occurrences.len(), 1);

        let occ = &page.occurrences[0];
        assert_eq!(occ.position(), Some((-33.8688, 151.2093)));
        assert_eq!(occ.display_name(), "Macropus giganteus");
        assert_eq!(occ.taxon_class.as_deref(), Some("Mammalia"));
        assert_eq!(occ.best_image_url(), Some("https://images.test/m.jpg"));
        assert_eq!(page.facets["state_province"][0].count, 40);
    }

    #[test]
    fn taxonomy_path_joins_known_levels() {
        let occ: Occurrence = serde_json::from_str(
            r#"{"id": "x", "kingdom": "Animalia", "class": "Mammalia", "genus": "Macropus"}"#,
        )
        .unwrap();
        assert_eq!(
            occ.taxonomy_path().as_deref(),
            Some("Animalia › Mammalia › Macropus")
        );

        let bare: Occurrence = serde_json::from_str(r#"{"id": "y"}"#).unwrap();
        assert_eq!(bare.taxonomy_path(), None);
    }

    #[test]
    fn missing_coordinates_yield_no_position() {
        let occ: Occurrence =
            serde_json::from_str(r#"{"id": "x", "latitude": -33.0, "longitude": null}"#).unwrap();
        assert_eq!(occ.position(), None);
        assert_eq!(occ.display_name(), "Unidentified specimen");
    }

    #[test]
    fn statistics_regions_sorted_by_count() {
        let stats: Statistics = serde_json::from_str(
            r#"{
                "totalRecords": 100,
                "facets": {
                    "state_province": [
                        {"value": "Queensland", "count": 10},
                        {"value": "New South Wales", "count": 60},
                        {"value": "Victoria", "count": 30}
                    ]
                }
            }"#,
        )
        .unwrap();

        let regions = stats.by_region();
        assert_eq!(regions[0].value, "New South Wales");
        assert_eq!(regions[2].value, "Queensland");
    }
}
