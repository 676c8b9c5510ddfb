/// Runtime configuration, overridable from JavaScript
use crate::cover::{CropBand, SplittableShape};
use serde::Deserialize;

/// Structural queries against the host page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub detail_container: String,
    pub button_group: String,
    pub image_container: String,
    pub front_cover: String,
    pub back_cover: String,
    pub edit_header: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            detail_container: "#movie-page .detail-container".to_string(),
            button_group: ".movie-head .details-edit".to_string(),
            image_container: "div.movie-images".to_string(),
            front_cover: "div.movie-images img[alt='Front Cover']".to_string(),
            back_cover: "div.movie-images img[alt='Back Cover']".to_string(),
            edit_header: "div.detail-header.edit".to_string(),
        }
    }
}

/// The injected button
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub id: String,
    pub label: String,
    pub class: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            id: "crop-btn".to_string(),
            label: "Split Cover".to_string(),
            class: "btn btn-warning".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub selectors: Selectors,
    pub control: ControlConfig,
    pub shape: SplittableShape,
    /// Right half of the scan: the front cover
    pub front_band: CropBand,
    /// Left half of the scan: the back cover
    pub back_band: CropBand,
    pub poll_interval_ms: i32,
    pub poll_initial_delay_ms: i32,
    pub page_event: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            selectors: Selectors::default(),
            control: ControlConfig::default(),
            shape: SplittableShape::default(),
            front_band: CropBand { x: 420, width: 380 },
            back_band: CropBand { x: 0, width: 380 },
            poll_interval_ms: 100,
            poll_initial_delay_ms: 2000,
            page_event: "stash:page:movie:scenes".to_string(),
        }
    }
}
