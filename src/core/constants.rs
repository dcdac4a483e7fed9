/// Application-wide constants to avoid magic values throughout the codebase.
///
/// Output format constants
pub mod output_formats {
    /// Text output format - colorful summary of the key findings
    pub const TEXT: &str = "text";
    /// JSON output format - the full summary document on stdout
    pub const JSON: &str = "json";
    /// Minimal output format - plain text without colors
    pub const MINIMAL: &str = "minimal";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 3] = [TEXT, JSON, MINIMAL];
}

/// Emission model constants
pub mod emissions {
    /// Energy used to transfer one gigabyte (kWh/GB)
    pub const KWH_PER_GB: f64 = 0.81;
    /// Average grid carbon intensity (gCO2e/kWh)
    pub const GRID_INTENSITY_G_PER_KWH: f64 = 442.0;
    /// Bytes in a gigabyte (decimal)
    pub const BYTES_PER_GB: f64 = 1_000_000_000.0;
    /// Bytes in a megabyte (decimal)
    pub const BYTES_PER_MB: f64 = 1_000_000.0;
    /// Default reduction applied to green-hosted sites
    pub const DEFAULT_GREEN_DISCOUNT: f64 = 0.20;
    /// Default half-width of the multiplicative noise band
    pub const DEFAULT_NOISE: f64 = 0.05;
}

/// Rating cut points in gCO2e; a value below `CUT_POINTS[i]` earns grade `i`
pub mod ratings {
    pub const CUT_POINTS: [f64; 5] = [0.40, 0.70, 1.00, 1.50, 2.00];
}

/// Size bands used when summarising emissions by page weight (in MB)
pub mod size_bands {
    pub const BOUNDARIES_MB: [f64; 3] = [1.0, 3.0, 10.0];
    pub const LABELS: [&str; 4] = ["Small (<1MB)", "Medium (1-3MB)", "Large (3-10MB)", "Very Large (>10MB)"];
}

/// Default configuration values
pub mod defaults {
    pub const RECORD_COUNT: usize = 240;
    pub const SEED: u64 = 42;
    pub const OUTPUT_DIR: &str = "output";
    pub const CLUSTERS: usize = 3;
    pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
    pub const HISTOGRAM_BINS: usize = 20;
    pub const KMEANS_MAX_ITERATIONS: usize = 100;
    /// Accepted deviation of the green share from 0.5
    pub const SPLIT_TOLERANCE: f64 = 0.10;
    pub const API_BASE_URL: &str = "https://api.websitecarbon.com";
    pub const API_TIMEOUT_SECONDS: u64 = 10;
    /// Default category weights, in declaration order of `Category::ALL`
    pub const CATEGORY_WEIGHTS: [f64; 6] = [0.20, 0.20, 0.15, 0.15, 0.15, 0.15];
    pub const CONFIG_FILE_NAME: &str = ".carbon-eda.toml";
}

/// Validation limits
pub mod limits {
    pub const MAX_RECORD_COUNT: usize = 1_000_000;
    pub const MAX_CLUSTERS: usize = 50;
    pub const MAX_HISTOGRAM_BINS: usize = 500;
    /// Chi-square cells below this expected count are flagged
    pub const MIN_EXPECTED_CELL_COUNT: f64 = 5.0;
}

/// Names of the files written into the output directory
pub mod artifacts {
    pub const DATASET_CSV: &str = "dataset.csv";
    pub const DATASET_JSON: &str = "dataset.json";
    pub const SUMMARY_JSON: &str = "summary.json";
    pub const HISTOGRAM_SVG: &str = "emissions_histogram.svg";
    pub const CATEGORY_BOXPLOT_SVG: &str = "emissions_by_category_boxplot.svg";
    pub const HOSTING_BOXPLOT_SVG: &str = "emissions_by_hosting_boxplot.svg";
    pub const SCATTER_SVG: &str = "size_vs_emissions.svg";
    pub const CORRELATION_SVG: &str = "correlation_matrix.svg";
    pub const RATING_SVG: &str = "rating_distribution.svg";
    pub const INTERACTIVE_SCATTER: &str = "interactive_scatter.html";
    pub const INTERACTIVE_HISTOGRAM: &str = "interactive_histogram.html";
    pub const INTERACTIVE_BOXPLOT: &str = "interactive_boxplot.html";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_formats_constants() {
        assert_eq!(output_formats::DEFAULT, output_formats::TEXT);
        assert!(output_formats::ALL.contains(&output_formats::JSON));
        assert!(output_formats::ALL.contains(&output_formats::MINIMAL));
    }

    #[test]
    fn test_rating_cut_points_are_increasing() {
        assert!(ratings::CUT_POINTS.windows(2).all(|w| w[0] < w[1]));
        assert!(ratings::CUT_POINTS[0] > 0.0);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let total: f64 = defaults::CATEGORY_WEIGHTS.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_band_labels_match_boundaries() {
        assert_eq!(size_bands::LABELS.len(), size_bands::BOUNDARIES_MB.len() + 1);
    }
}
