use clap::Parser;

/// Museum Specimen Explorer - a map viewer and chat assistant for museum
/// occurrence records
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Settings {
    /// Base URL of the explorer API
    #[clap(long, default_value = "http://localhost:5000/api")]
    pub api_base_url: String,

    /// Initial map center latitude
    #[clap(long, default_value_t = -33.8688)]
    pub center_lat: f64,

    /// Initial map center longitude
    #[clap(long, default_value_t = 151.2093)]
    pub center_lon: f64,

    /// Initial map zoom level
    #[clap(long, default_value_t = 10.0)]
    pub zoom: f64,

    /// Include records without images (the default is images only)
    #[clap(long)]
    pub all_records: bool,

    /// Page size for occurrence queries
    #[clap(long, default_value_t = 500)]
    pub page_size: u32,
}

impl Settings {
    /// Whether occurrence queries should be limited to records with images.
    pub fn image_only(&self) -> bool {
        !self.all_records
    }
}
