//! Chart generation (plotters)
//!
//! Bar chart of normalized price for the recent records.

use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use tracing::info;

use crate::models::PriceRecord;
use crate::pricing::RecentHistory;

const BAR_COLOR: (u8, u8, u8) = (46, 125, 50);
const MAX_LABEL_CHARS: usize = 14;

/// Largest accepted width or height, in pixels
pub const MAX_CHART_DIMENSION: u32 = 4096;

/// One bar: label under the bar, normalized price as its height
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    pub base_unit: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GenerateChartResponse {
    pub success: bool,
    pub file_path: String,
    pub bars: Vec<ChartBar>,
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        short.push('…');
        short
    }
}

/// Reject sizes outside 1..=MAX_CHART_DIMENSION
pub fn check_dimensions(width: u32, height: u32) -> Result<(), String> {
    let valid = 1..=MAX_CHART_DIMENSION;
    if valid.contains(&width) && valid.contains(&height) {
        Ok(())
    } else {
        Err(format!(
            "Chart size {}x{} out of range (1-{} per side)",
            width, height, MAX_CHART_DIMENSION
        ))
    }
}

/// Bars for records given newest first; the chart reads oldest to newest.
/// Records without a finite normalized price are left out.
pub fn chart_bars(records: &[PriceRecord]) -> Vec<ChartBar> {
    records
        .iter()
        .rev()
        .filter(|r| r.normalized_price.is_finite())
        .map(|r| ChartBar {
            label: short_label(r.label()),
            value: r.normalized_price,
            base_unit: r.base_unit().label(),
        })
        .collect()
}

/// Render bars as PNG bytes
pub fn render_price_chart(bars: &[ChartBar], width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if bars.is_empty() {
        return Err("No data to chart".to_string());
    }
    if bars.iter().any(|b| !b.value.is_finite()) {
        return Err("Chart values must be finite".to_string());
    }
    check_dimensions(width, height)?;

    let buffer_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or("Chart buffer size overflows")?;
    let mut buffer = vec![0u8; buffer_len];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let y_max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max).max(1.0) * 1.15;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption("Price per base unit", ("sans-serif", 22))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0..bars.len() as i32 - 1).into_segmented(), 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart.configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => bars
                    .get(*i as usize)
                    .map(|b| b.label.clone())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .y_desc("$ / unit")
            .y_label_formatter(&|y| format!("{:.2}", y))
            .draw()
            .map_err(|e| e.to_string())?;

        let (r, g, b) = BAR_COLOR;
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(RGBColor(r, g, b).filled())
                .margin(12)
                .data(bars.iter().enumerate().map(|(i, bar)| (i as i32, bar.value))),
        ).map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Render the recent view and write it to `path`
pub fn generate_price_chart(
    history: &RecentHistory<PriceRecord>,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<GenerateChartResponse, String> {
    let bars = chart_bars(&history.recent());
    let png = render_price_chart(&bars, width, height)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    std::fs::write(path, &png)
        .map_err(|e| format!("Failed to write chart '{}': {}", path.display(), e))?;

    info!(path = %path.display(), bars = bars.len(), "price chart written");

    Ok(GenerateChartResponse {
        success: true,
        file_path: path.display().to_string(),
        bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::pricing::Unit;

    fn record(id: i64, description: &str, normalized_price: f64, unit: Unit) -> PriceRecord {
        PriceRecord {
            id,
            date: "2025-03-01".to_string(),
            category: Category::Snacks,
            description: description.to_string(),
            price: normalized_price,
            weight: 1.0,
            unit,
            normalized_price,
            created_at: "2025-03-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_chart_bars_oldest_first() {
        let newest_first = vec![
            record(2, "Crisps", 12.5, Unit::G),
            record(1, "", 3.0, Unit::Pcs),
        ];
        let bars = chart_bars(&newest_first);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "snacks");
        assert_eq!(bars[0].base_unit, "pcs");
        assert_eq!(bars[1].label, "Crisps");
        assert_eq!(bars[1].value, 12.5);
    }

    #[test]
    fn test_long_labels_are_shortened() {
        let bars = chart_bars(&[record(1, "Extra mature farmhouse cheddar", 9.0, Unit::Kg)]);
        assert_eq!(bars[0].label.chars().count(), MAX_LABEL_CHARS);
        assert!(bars[0].label.ends_with('…'));
    }

    #[test]
    fn test_render_empty_is_error() {
        assert_eq!(render_price_chart(&[], 400, 300), Err("No data to chart".to_string()));
    }

    fn bar(label: &str, value: f64) -> ChartBar {
        ChartBar {
            label: label.to_string(),
            value,
            base_unit: "kg",
        }
    }

    fn is_png(bytes: &[u8]) -> bool {
        bytes.starts_with(b"\x89PNG")
    }

    #[test]
    fn test_render_single_bar() {
        let png = render_price_chart(&[bar("Rice", 3.0)], 400, 300).unwrap();
        assert!(is_png(&png));
    }

    #[test]
    fn test_render_full_window() {
        let bars: Vec<ChartBar> = (1..=5).map(|i| bar(&format!("Item {}", i), i as f64 * 1.5)).collect();
        let png = render_price_chart(&bars, 800, 400).unwrap();
        assert!(is_png(&png));
    }

    #[test]
    fn test_render_rejects_non_finite_values() {
        let bars = [bar("Bad", f64::INFINITY), bar("Good", 2.0)];
        assert_eq!(
            render_price_chart(&bars, 400, 300),
            Err("Chart values must be finite".to_string())
        );
        assert!(render_price_chart(&[bar("Bad", f64::NAN)], 400, 300).is_err());
    }

    #[test]
    fn test_chart_bars_skip_non_finite() {
        let bars = chart_bars(&[
            record(2, "Overflow", f64::INFINITY, Unit::G),
            record(1, "Rice", 3.0, Unit::Kg),
        ]);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].label, "Rice");
    }

    #[test]
    fn test_render_rejects_oversized_dimensions() {
        assert!(render_price_chart(&[bar("Rice", 3.0)], 70000, 70000).is_err());
        assert!(render_price_chart(&[bar("Rice", 3.0)], 0, 300).is_err());
        assert!(check_dimensions(MAX_CHART_DIMENSION, 1).is_ok());
        assert!(check_dimensions(MAX_CHART_DIMENSION + 1, 300).is_err());
    }

    #[test]
    fn test_generate_writes_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("recent.png");
        let history = RecentHistory::from_oldest_first(
            5,
            (1..=6).map(|i| record(i, &format!("Item {}", i), i as f64, Unit::L)),
        );

        let response = generate_price_chart(&history, &path, 640, 320).unwrap();
        assert_eq!(response.bars.len(), 5);
        assert_eq!(response.bars[0].label, "Item 2");
        assert!(is_png(&std::fs::read(&path).unwrap()));
    }

    #[test]
    fn test_generate_with_empty_history_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let history = RecentHistory::default();

        assert!(generate_price_chart(&history, &path, 400, 300).is_err());
        assert!(!path.exists());
    }
}
