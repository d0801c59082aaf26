//! Reference card generation
//!
//! Generates a printable PDF reference card for one hormone: its unit table,
//! a chart of the clinical reference ranges, and the ranges with citations.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;

use crate::conversion::{convert_range_to_unit, format_range_text, Hormone, HormoneCatalog};

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (30, 64, 175); // Dark blue title
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ExportReferenceCardResponse {
    pub success: bool,
    pub file_path: String,
    pub hormone_id: String,
    pub hormone_name: String,
    pub units_listed: usize,
    pub ranges_listed: usize,
    pub message: String,
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

/// A range's bounds expressed in the hormone's base unit, ready to draw
struct ChartBar {
    label: String,
    min: f64,
    max: f64,
    open_ended: bool,
    rgb: (u8, u8, u8),
}

fn chart_bars(hormone: &Hormone) -> Vec<ChartBar> {
    hormone
        .ranges
        .iter()
        .filter_map(|range| {
            let converted = convert_range_to_unit(range, &hormone.base_unit, hormone)?;
            Some(ChartBar {
                label: range.label.clone(),
                min: converted.min,
                max: converted.max,
                open_ended: converted.max.is_infinite(),
                rgb: range.color.rgb(),
            })
        })
        .collect()
}

/// Upper edge of the chart's value axis
///
/// Open-ended bars are drawn out to this edge, a quarter beyond the widest
/// finite bound.
fn chart_axis_max(bars: &[ChartBar]) -> f64 {
    let finite_max = bars
        .iter()
        .flat_map(|b| [b.min, if b.open_ended { b.min } else { b.max }])
        .fold(0.0f64, f64::max);
    if finite_max > 0.0 {
        finite_max * 1.25
    } else {
        1.0
    }
}

/// Render the hormone's reference ranges as a horizontal bar chart, PNG bytes
pub fn generate_range_chart(
    hormone: &Hormone,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    let bars = chart_bars(hormone);
    if bars.is_empty() {
        return Err("No ranges to chart".to_string());
    }

    let x_max = chart_axis_max(&bars);
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(170)
            .build_cartesian_2d(0.0..x_max, 0.0..(bars.len() as f64))
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(bars.len())
            .y_label_formatter(&|y| {
                let idx = y.floor() as usize;
                if *y >= 0.0 && idx < bars.len() {
                    bars[idx].label.clone()
                } else {
                    String::new()
                }
            })
            .x_desc(hormone.base_unit.clone())
            .draw()
            .map_err(|e| e.to_string())?;

        for (i, bar) in bars.iter().enumerate() {
            let (r, g, b) = bar.rgb;
            let color = RGBColor(r, g, b);
            let drawn_max = if bar.open_ended { x_max } else { bar.max };
            let y0 = i as f64 + 0.2;
            let y1 = i as f64 + 0.8;

            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(bar.min, y0), (drawn_max, y1)],
                    color.mix(0.35).filled(),
                )))
                .map_err(|e| e.to_string())?;

            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(bar.min, y0), (drawn_max, y1)],
                    color.stroke_width(1),
                )))
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    // Convert RGB buffer to PNG
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    let dyn_img = DynamicImage::ImageRgb8(img);
    dyn_img
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

/// Render a unit multiplier without float noise ("1000", "0.001", "0.272401")
fn format_multiplier(multiplier: f64) -> String {
    if multiplier == multiplier.trunc() {
        format!("{}", multiplier as i64)
    } else {
        format!("{:.6}", multiplier)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(
    layer: &PdfLayerReference,
    x1: Mm,
    y1: Mm,
    x2: Mm,
    y2: Mm,
    color: (u8, u8, u8),
    width: f32,
) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![(Point::new(x1, y1), false), (Point::new(x2, y2), false)],
        is_closed: false,
    };
    layer.add_line(line);
}

// ============================================================================
// Reference Card Generation
// ============================================================================

/// Generate a PDF reference card for one hormone
pub fn export_reference_card(
    catalog: &HormoneCatalog,
    hormone_id: &str,
    output_path: &str,
) -> Result<ExportReferenceCardResponse, String> {
    let hormone = catalog
        .get(hormone_id)
        .ok_or_else(|| format!("Unknown hormone: {}", hormone_id))?;

    // Create PDF - Letter portrait
    let (doc, page1, layer1) = PdfDocument::new(
        format!("{} Reference Card", hormone.name),
        Mm(215.9),
        Mm(279.4),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let layer = doc.get_page(page1).get_layer(layer1);

    let page_height = 279.4;
    let margin_left = 15.0;
    let mut y = page_height - 20.0;

    // Title
    add_text(
        &layer,
        &font_bold,
        &format!("{} Reference Card", hormone.name),
        Mm(margin_left),
        Mm(y),
        18.0,
        COLOR_TITLE,
    );
    y -= 8.0;

    let now = chrono::Local::now().format("%Y-%m-%d").to_string();
    add_text(
        &layer,
        &font,
        &format!("Generated: {}", now),
        Mm(margin_left),
        Mm(y),
        10.0,
        COLOR_GRAY,
    );
    y -= 8.0;

    add_line(&layer, Mm(margin_left), Mm(y), Mm(200.0), Mm(y), COLOR_GRAY, 0.5);
    y -= 8.0;

    // Summary
    add_text(
        &layer,
        &font,
        &format!("Base unit: {}", hormone.base_unit),
        Mm(margin_left),
        Mm(y),
        10.0,
        COLOR_BLACK,
    );
    if let Some(mw) = hormone.molecular_weight {
        add_text(
            &layer,
            &font,
            &format!("Molecular weight: {} g/mol", mw),
            Mm(90.0),
            Mm(y),
            10.0,
            COLOR_BLACK,
        );
    }
    y -= 10.0;

    // Unit table
    add_text(&layer, &font_bold, "Units", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [70.0, 25.0, 25.0, 45.0];
    let headers = ["Unit", "Symbol", "Category", "Factor to base"];

    let mut col_x = margin_left;
    for (i, header) in headers.iter().enumerate() {
        add_text(&layer, &font_bold, header, Mm(col_x), Mm(y), 9.0, COLOR_BLACK);
        col_x += col_widths[i];
    }
    y -= 5.0;

    for unit in &hormone.units {
        col_x = margin_left;
        let values = [
            unit.name.clone(),
            unit.symbol.clone(),
            unit.category.as_str().to_string(),
            format!("x {}", format_multiplier(unit.multiplier)),
        ];
        for (i, value) in values.iter().enumerate() {
            add_text(&layer, &font, value, Mm(col_x), Mm(y), 8.0, COLOR_BLACK);
            col_x += col_widths[i];
        }
        y -= 4.5;
    }
    y -= 6.0;

    // Range chart
    add_text(
        &layer,
        &font_bold,
        &format!("Reference Ranges ({})", hormone.base_unit),
        Mm(margin_left),
        Mm(y),
        12.0,
        COLOR_BLACK,
    );
    y -= 4.0;

    // 850x360 pixels at 120 DPI = ~180mm x 76mm, fits the portrait text width
    match generate_range_chart(hormone, 850, 360) {
        Ok(png_bytes) => {
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes)
                .map_err(|e| e.to_string())?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            let transform = ImageTransform {
                translate_x: Some(Mm(margin_left)),
                translate_y: Some(Mm(y - 78.0)),
                dpi: Some(120.0),
                ..Default::default()
            };

            pdf_image.add_to_layer(layer.clone(), transform);
            y -= 84.0;
        }
        Err(e) => {
            add_text(
                &layer,
                &font,
                &format!("Chart generation error: {}", e),
                Mm(margin_left),
                Mm(y - 6.0),
                9.0,
                COLOR_GRAY,
            );
            y -= 12.0;
        }
    }

    // Range table with citations
    for range in &hormone.ranges {
        add_text(
            &layer,
            &font_bold,
            &range.label,
            Mm(margin_left),
            Mm(y),
            10.0,
            range.color.rgb(),
        );
        add_text(
            &layer,
            &font,
            &format!("{} {}", format_range_text(range.min, range.max), range.unit),
            Mm(110.0),
            Mm(y),
            10.0,
            COLOR_BLACK,
        );
        y -= 5.0;

        if let Some(ref description) = range.description {
            add_text(&layer, &font, description, Mm(margin_left + 4.0), Mm(y), 8.0, COLOR_BLACK);
            y -= 4.5;
        }

        add_text(
            &layer,
            &font,
            &format!("Source: {} ({})", range.source.name, range.source.url),
            Mm(margin_left + 4.0),
            Mm(y),
            7.0,
            COLOR_GRAY,
        );
        y -= 7.0;
    }

    // Footer
    y -= 3.0;
    add_line(&layer, Mm(margin_left), Mm(y), Mm(200.0), Mm(y), COLOR_GRAY, 0.5);
    y -= 5.0;
    add_text(
        &layer,
        &font,
        "Reference ranges are context for interpreting lab results, not medical advice.",
        Mm(margin_left),
        Mm(y),
        8.0,
        COLOR_GRAY,
    );

    // Save PDF
    let path = Path::new(output_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    Ok(ExportReferenceCardResponse {
        success: true,
        file_path: output_path.to_string(),
        hormone_id: hormone.id.clone(),
        hormone_name: hormone.name.clone(),
        units_listed: hormone.units.len(),
        ranges_listed: hormone.ranges.len(),
        message: format!(
            "Reference card for {} generated with {} ranges",
            hormone.name,
            hormone.ranges.len()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_bars_cover_all_ranges() {
        let catalog = HormoneCatalog::builtin();
        let estradiol = catalog.get("estradiol").unwrap();

        let bars = chart_bars(estradiol);
        assert_eq!(bars.len(), estradiol.ranges.len());

        let open = bars.iter().find(|b| b.open_ended).unwrap();
        assert_eq!(open.min, 300.0);
    }

    #[test]
    fn axis_extends_beyond_widest_finite_bound() {
        let catalog = HormoneCatalog::builtin();
        let estradiol = catalog.get("estradiol").unwrap();

        let bars = chart_bars(estradiol);
        let x_max = chart_axis_max(&bars);
        // Widest finite bound is the open-ended range's 300 pg/mL minimum
        assert!((x_max - 375.0).abs() < 1e-9);
        assert!(x_max.is_finite());
    }

    #[test]
    fn multiplier_formatting() {
        assert_eq!(format_multiplier(1.0), "1");
        assert_eq!(format_multiplier(1000.0), "1000");
        assert_eq!(format_multiplier(0.001), "0.001");
        assert_eq!(format_multiplier(28.84), "28.84");
        assert_eq!(format_multiplier(1.0 / 3.671), "0.272405");
    }

    #[test]
    fn chart_renders_png() {
        let catalog = HormoneCatalog::builtin();
        let testosterone = catalog.get("testosterone").unwrap();

        let png = generate_range_chart(testosterone, 400, 200).unwrap();
        // PNG signature
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }

    #[test]
    fn export_writes_pdf_file() {
        let catalog = HormoneCatalog::builtin();
        let path = std::env::temp_dir().join(format!(
            "huc_reference_card_{}.pdf",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let response =
            export_reference_card(&catalog, "estradiol", path.to_str().unwrap()).unwrap();
        assert!(response.success);
        assert_eq!(response.ranges_listed, 4);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn export_rejects_unknown_hormone() {
        let catalog = HormoneCatalog::builtin();
        let err = export_reference_card(&catalog, "cortisol", "unused.pdf").unwrap_err();
        assert!(err.contains("cortisol"));
    }
}
