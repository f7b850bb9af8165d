//! Image-based teeth condition heuristics
//!
//! Every check reduces the image to one statistic (contour count, masked mean,
//! pixel count, edge count, red fraction, variance) and maps it to a verdict
//! with a fixed threshold from [`AnalyzerConfig`].

pub mod image_ops;
pub mod verdicts;

use chrono::{Local, NaiveDateTime};
use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::errors::{CareError, Result};

pub use verdicts::{
    Alignment, CavityFinding, CavityUrgency, CheckKind, Enamel, HealthReport, Inflammation,
    Plaque, Sensitivity, Whiteness,
};

/// Where the analyzer gets its pixels from
#[derive(Debug, Clone, Copy)]
pub enum ImageInput<'a> {
    Path(&'a Path),
    Image(&'a DynamicImage),
}

impl<'a> From<&'a Path> for ImageInput<'a> {
    fn from(path: &'a Path) -> Self {
        ImageInput::Path(path)
    }
}

impl<'a> From<&'a DynamicImage> for ImageInput<'a> {
    fn from(image: &'a DynamicImage) -> Self {
        ImageInput::Image(image)
    }
}

/// Open an image file, mapping decode failures to [`CareError::ImageLoad`]
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| CareError::ImageLoad {
        path: path.display().to_string(),
        source,
    })
}

/// Decoded image with its grayscale and preprocessed forms
pub struct Frame {
    pub color: RgbImage,
    pub gray: GrayImage,
    /// Blurred and CLAHE-equalized grayscale
    pub prepared: GrayImage,
}

impl Frame {
    pub fn load(input: ImageInput<'_>, config: &AnalyzerConfig) -> Result<Self> {
        let color = match input {
            ImageInput::Path(path) => load_image(path)?.to_rgb8(),
            ImageInput::Image(image) => image.to_rgb8(),
        };
        Self::from_rgb(color, config)
    }

    pub fn from_rgb(color: RgbImage, config: &AnalyzerConfig) -> Result<Self> {
        if color.width() == 0 || color.height() == 0 {
            return Err(CareError::EmptyImage);
        }
        let gray = image_ops::to_gray(&color);
        let blurred = image_ops::gaussian_blur(&gray);
        let prepared = image_ops::clahe(&blurred, config.clahe_clip_limit, config.clahe_tiles);
        Ok(Self { color, gray, prepared })
    }
}

/// One timestamped analysis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub at: NaiveDateTime,
    pub result: String,
}

/// Teeth analyzer with a history of cavity checks and full reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeethAnalyzer {
    history: Vec<AnalysisRecord>,
    #[serde(skip)]
    config: AnalyzerConfig,
}

impl TeethAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            history: Vec::new(),
            config,
        }
    }

    pub fn set_config(&mut self, config: AnalyzerConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn frame<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Frame> {
        Frame::load(input.into(), &self.config)
    }

    fn record(&mut self, result: String) {
        self.history.push(AnalysisRecord {
            at: Local::now().naive_local(),
            result,
        });
    }

    /// Count cavity-sized dark regions; the result is kept in history
    pub fn detect_cavities<'a>(&mut self, input: impl Into<ImageInput<'a>>) -> Result<CavityFinding> {
        let frame = self.frame(input)?;
        let finding = self.cavities_in(&frame);
        self.record(finding.to_string());
        Ok(finding)
    }

    pub fn cavities_in(&self, frame: &Frame) -> CavityFinding {
        let smoothed = image_ops::median_blur(&frame.prepared);
        let binary = image_ops::adaptive_threshold_inv(&smoothed);
        let count = image_ops::external_contour_areas(&binary)
            .into_iter()
            .filter(|area| *area > self.config.cavity_area_min && *area < self.config.cavity_area_max)
            .count();
        debug!(count, "cavity-sized contours");
        CavityFinding::classify(count, &self.config)
    }

    pub fn measure_whiteness<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Whiteness> {
        Ok(self.whiteness_in(&self.frame(input)?))
    }

    pub fn whiteness_in(&self, frame: &Frame) -> Whiteness {
        let bright_mean = image_ops::mean_above(&frame.prepared, self.config.whiteness_mask_level);
        debug!(?bright_mean, "whiteness");
        Whiteness::classify(bright_mean, &self.config)
    }

    pub fn detect_plaque<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Plaque> {
        Ok(self.plaque_in(&self.frame(input)?))
    }

    pub fn plaque_in(&self, frame: &Frame) -> Plaque {
        let dark = image_ops::count_at_or_below(&frame.prepared, self.config.plaque_level);
        debug!(dark, "plaque pixels");
        Plaque::classify(dark, &self.config)
    }

    pub fn check_alignment<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Alignment> {
        Ok(self.alignment_in(&self.frame(input)?))
    }

    pub fn alignment_in(&self, frame: &Frame) -> Alignment {
        let edges = imageproc::edges::canny(&frame.prepared, self.config.canny_low, self.config.canny_high);
        let count = image_ops::count_nonzero(&edges);
        debug!(count, "edge pixels");
        Alignment::classify(count, &self.config)
    }

    pub fn detect_gum_inflammation<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Inflammation> {
        Ok(self.inflammation_in(&self.frame(input)?))
    }

    pub fn inflammation_in(&self, frame: &Frame) -> Inflammation {
        let fraction = image_ops::red_fraction(&frame.color);
        debug!(fraction, "red fraction");
        Inflammation::classify(fraction, &self.config)
    }

    pub fn analyze_enamel<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Enamel> {
        Ok(self.enamel_in(&self.frame(input)?))
    }

    pub fn enamel_in(&self, frame: &Frame) -> Enamel {
        let variance = image_ops::variance(&frame.prepared).unwrap_or(0.0);
        debug!(variance, "enamel variance");
        Enamel::classify(variance, &self.config)
    }

    pub fn detect_sensitivity<'a>(&self, input: impl Into<ImageInput<'a>>) -> Result<Sensitivity> {
        Ok(self.sensitivity_in(&self.frame(input)?))
    }

    pub fn sensitivity_in(&self, frame: &Frame) -> Sensitivity {
        let std_dev = image_ops::variance(&frame.prepared).unwrap_or(0.0).sqrt();
        debug!(std_dev, "sensitivity spread");
        Sensitivity::classify(std_dev, &self.config)
    }

    /// Verdict text of a single check against an already decoded frame
    ///
    /// [`CheckKind::Full`] is not a single check; use [`TeethAnalyzer::analyze_health`].
    pub fn check_text(&self, kind: CheckKind, frame: &Frame) -> String {
        match kind {
            CheckKind::Cavities => self.cavities_in(frame).to_string(),
            CheckKind::Whiteness => self.whiteness_in(frame).to_string(),
            CheckKind::Plaque => self.plaque_in(frame).to_string(),
            CheckKind::Alignment => self.alignment_in(frame).to_string(),
            CheckKind::Inflammation => self.inflammation_in(frame).to_string(),
            CheckKind::Enamel => self.enamel_in(frame).to_string(),
            CheckKind::Sensitivity => self.sensitivity_in(frame).to_string(),
            CheckKind::Full => self.report_in(frame).to_string(),
        }
    }

    fn report_in(&self, frame: &Frame) -> HealthReport {
        self.report_with(frame, |_| {})
    }

    /// Report checks in order, calling `on_check` before each one
    fn report_with(&self, frame: &Frame, mut on_check: impl FnMut(CheckKind)) -> HealthReport {
        HealthReport {
            findings: CheckKind::REPORT
                .iter()
                .map(|kind| {
                    on_check(*kind);
                    self.check_text(*kind, frame)
                })
                .collect(),
        }
    }

    /// Run the report checks; both the cavity line and the report are kept in history
    pub fn analyze_health<'a>(&mut self, input: impl Into<ImageInput<'a>>) -> Result<HealthReport> {
        let frame = self.frame(input)?;
        self.analyze_frame(&frame)
    }

    pub fn analyze_frame(&mut self, frame: &Frame) -> Result<HealthReport> {
        self.analyze_frame_with(frame, |_| {})
    }

    /// [`TeethAnalyzer::analyze_frame`] with a hook for progress display
    pub fn analyze_frame_with(&mut self, frame: &Frame, on_check: impl FnMut(CheckKind)) -> Result<HealthReport> {
        let report = self.report_with(frame, on_check);
        if let Some(cavities) = report.findings.first() {
            self.record(cavities.clone());
        }
        self.record(report.findings.join("\n- "));
        Ok(report)
    }

    /// Run one check by kind, recording it the same way the named methods do
    pub fn run_check(&mut self, kind: CheckKind, frame: &Frame) -> Result<String> {
        match kind {
            CheckKind::Full => Ok(self.analyze_frame(frame)?.to_string()),
            CheckKind::Cavities => {
                let finding = self.cavities_in(frame).to_string();
                self.record(finding.clone());
                Ok(finding)
            }
            other => Ok(self.check_text(other, frame)),
        }
    }

    pub fn history(&self) -> &[AnalysisRecord] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn analyzer() -> TeethAnalyzer {
        TeethAnalyzer::new(AnalyzerConfig::default())
    }

    fn flat_rgb(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([value, value, value])))
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let err = analyzer()
            .measure_whiteness(Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load image"));
    }

    #[test]
    fn test_empty_image_rejected() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(analyzer().detect_plaque(&empty), Err(CareError::EmptyImage)));
    }

    #[test]
    fn test_flat_image_has_no_cavities_and_weak_enamel() {
        let mut analyzer = analyzer();
        let img = flat_rgb(120);
        let finding = analyzer.detect_cavities(&img).unwrap();
        assert_eq!(finding.count, 0);
        assert_eq!(analyzer.analyze_enamel(&img).unwrap(), Enamel::Weak);
        assert_eq!(analyzer.detect_sensitivity(&img).unwrap(), Sensitivity::Normal);
        assert_eq!(analyzer.check_alignment(&img).unwrap(), Alignment::Normal);
        assert_eq!(analyzer.history().len(), 1);
    }

    #[test]
    fn test_odd_sized_image_is_analyzed() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(41, 41, Rgb([200, 200, 200])));
        assert_eq!(analyzer().detect_plaque(&img).unwrap(), Plaque::Low);
        let frame = analyzer().frame(&img).unwrap();
        let level = frame.prepared.get_pixel(0, 0).0[0];
        assert!(frame.prepared.pixels().all(|p| p.0[0] == level));
    }

    #[test]
    fn test_red_image_is_inflamed() {
        let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([210, 30, 40])));
        assert_eq!(analyzer().detect_gum_inflammation(&red).unwrap(), Inflammation::Significant);
    }

    #[test]
    fn test_gray_image_has_normal_gums() {
        assert_eq!(analyzer().detect_gum_inflammation(&flat_rgb(200)).unwrap(), Inflammation::Normal);
    }

    #[test]
    fn test_full_report_records_twice() {
        let mut analyzer = analyzer();
        let report = analyzer.analyze_health(&flat_rgb(90)).unwrap();
        assert_eq!(report.findings.len(), 6);
        assert!(report.to_string().starts_with("Teeth Health Report:\n- Found 0 potential cavities."));
        assert_eq!(analyzer.history().len(), 2);
    }

    #[test]
    fn test_run_check_dispatch() {
        let mut analyzer = analyzer();
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([30])));
        let frame = analyzer.frame(&img).unwrap();
        let text = analyzer.run_check(CheckKind::Inflammation, &frame).unwrap();
        assert_eq!(text, "Gum health appears normal.");
        assert!(analyzer.history().is_empty());
        analyzer.run_check(CheckKind::Cavities, &frame).unwrap();
        assert_eq!(analyzer.history().len(), 1);
    }

    #[test]
    fn test_progress_hook_sees_report_order() {
        let mut analyzer = analyzer();
        let frame = analyzer.frame(&flat_rgb(150)).unwrap();
        let mut seen = Vec::new();
        analyzer.analyze_frame_with(&frame, |kind| seen.push(kind)).unwrap();
        assert_eq!(seen, CheckKind::REPORT.to_vec());
    }
}
