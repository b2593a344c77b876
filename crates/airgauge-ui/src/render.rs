//! Terminal rendering of the air quality widget.
//!
//! A frame is a plain string: header, then the error, loading or reading
//! panel, then the location line. The gauge is a half ring drawn with block
//! characters and filled clockwise from the left.

use airgauge_core::DisplayConfig;
use crossterm::style::{style, Color, Stylize};

use crate::models::{AirQualityView, AqiPanel, Gauge};

/// Top of the gauge scale. Readings above it draw as a full ring.
pub const GAUGE_MAX: u32 = 500;

/// Smallest sweep for a non-zero reading, in degrees
pub const MIN_SWEEP_DEGREES: f64 = 15.0;

const HEADER: &str = "Air Quality Index (AQI)";
const ERROR_COLOR: &str = "#EF4444";
const TRACK_COLOR: &str = "#E5E7EB";
const FILL: char = '█';
const TRACK: char = '░';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit truecolor styling
    pub color: bool,
    /// Outer ring radius in rows
    pub radius: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for RenderOptions {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            color: display.color,
            radius: display.gauge_radius,
        }
    }
}

/// Degrees of the half ring covered by `value`.
pub fn sweep_degrees(value: u32) -> f64 {
    if value == 0 {
        return 0.0;
    }
    let fraction = f64::from(value.min(GAUGE_MAX)) / f64::from(GAUGE_MAX);
    (fraction * 180.0).max(MIN_SWEEP_DEGREES)
}

/// Parse `#rgb` or `#rrggbb` into a truecolor value.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    let (r, g, b) = match digits.len() {
        3 => {
            let mut channels = digits
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            (channels.next()??, channels.next()??, channels.next()??)
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
            (channel(0)?, channel(2)?, channel(4)?)
        }
        _ => return None,
    };
    Some(Color::Rgb { r, g, b })
}

/// Style `text` with a foreground color when `enabled`.
pub fn paint(text: &str, hex: &str, enabled: bool) -> String {
    match hex_color(hex) {
        Some(color) if enabled => style(text).with(color).to_string(),
        _ => text.to_string(),
    }
}

/// Draw the half ring, one string per row, top row first.
///
/// Terminal cells are about twice as tall as wide, so the ring is
/// `4 * radius + 1` columns wide and `radius + 1` rows tall.
pub fn render_gauge(gauge: &Gauge, opts: &RenderOptions) -> Vec<String> {
    let outer = f64::from(opts.radius.max(1));
    let inner = outer / 2.0;
    let sweep = sweep_degrees(gauge.value);
    let width = i32::from(opts.radius.max(1)) * 2;

    (0..=opts.radius.max(1))
        .map(|row| {
            let dy = outer - f64::from(row);
            let mut line = String::new();
            let mut run = String::new();
            let mut run_filled = None;

            for col in -width..=width {
                let dx = f64::from(col) / 2.0;
                let distance = dx.hypot(dy);
                let cell = if distance < inner || distance > outer + 0.5 {
                    None
                } else {
                    // 0 at the left end, 180 at the right end
                    let angle = 180.0 - dy.atan2(dx).to_degrees();
                    Some(sweep > 0.0 && angle <= sweep)
                };

                if cell != run_filled {
                    flush(&mut line, &mut run, run_filled, gauge.color, opts.color);
                    run_filled = cell;
                }
                run.push(match cell {
                    Some(true) => FILL,
                    Some(false) => TRACK,
                    None => ' ',
                });
            }
            flush(&mut line, &mut run, run_filled, gauge.color, opts.color);
            line.trim_end().to_string()
        })
        .collect()
}

fn flush(line: &mut String, run: &mut String, filled: Option<bool>, color: &str, enabled: bool) {
    if run.is_empty() {
        return;
    }
    match filled {
        Some(true) => line.push_str(&paint(run, color, enabled)),
        Some(false) => line.push_str(&paint(run, TRACK_COLOR, enabled)),
        None => line.push_str(run),
    }
    run.clear();
}

/// Render one full frame.
pub fn render(view: &AirQualityView, opts: &RenderOptions) -> String {
    let mut lines = vec![HEADER.to_string(), String::new()];

    match &view.panel {
        AqiPanel::Error(message) => lines.push(paint(message, ERROR_COLOR, opts.color)),
        AqiPanel::Loading => lines.push("Fetching AQI data...".to_string()),
        AqiPanel::Reading {
            aqi,
            category,
            gauge,
        } => {
            lines.extend(render_gauge(gauge, opts));
            lines.push(format!(
                "{} {}/{} {}",
                paint(&FILL.to_string(), gauge.color, opts.color),
                gauge.value,
                GAUGE_MAX,
                gauge.color
            ));
            lines.push(String::new());
            lines.push(paint(&format!("AQI: {}", aqi), category.color(), opts.color));
            lines.push(category.status().to_string());
            lines.push(format!("Mask Recommendation: {}", category.mask()));
        }
    }

    if let Some(address) = &view.address {
        lines.push(String::new());
        lines.push(format!("Location: {}", address));
    }

    let mut frame = lines.join("\n");
    frame.push('\n');
    frame
}
