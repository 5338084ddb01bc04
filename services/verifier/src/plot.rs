//! Line-chart rendering for the hourly rollups.
//!
//! Draws one line per configuration over the analysis hours onto an RGBA
//! canvas with a 5x7 bitmap font, then encodes it through the PNG writer.
//! NaN hours break the line instead of plotting a point.

use std::fs;
use std::path::Path;

use verify_common::VerifyResult;

use crate::png;

const WIDTH: usize = 900;
const HEIGHT: usize = 540;
const MARGIN_LEFT: usize = 70;
const MARGIN_RIGHT: usize = 170;
const MARGIN_TOP: usize = 40;
const MARGIN_BOTTOM: usize = 50;

const BLACK: (u8, u8, u8) = (0, 0, 0);
const GRID: (u8, u8, u8) = (220, 220, 220);

/// Matplotlib-like default cycle, reused in order for the legend.
const SERIES_COLORS: [(u8, u8, u8); 8] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
];

struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        let mut pixels = vec![255u8; width * height * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn set(&mut self, x: i64, y: i64, color: (u8, u8, u8)) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let at = (y as usize * self.width + x as usize) * 4;
        self.pixels[at] = color.0;
        self.pixels[at + 1] = color.1;
        self.pixels[at + 2] = color.2;
        self.pixels[at + 3] = 255;
    }

    /// Bresenham segment, endpoints inclusive.
    fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw text with the 5x7 font, 6 pixels per character advance.
    fn text(&mut self, x: i64, y: i64, s: &str, color: (u8, u8, u8)) {
        for (k, c) in s.chars().enumerate() {
            let rows = glyph(c);
            for (r, bits) in rows.iter().enumerate() {
                for col in 0..5 {
                    if bits & (1 << (4 - col)) != 0 {
                        self.set(x + k as i64 * 6 + col as i64, y + r as i64, color);
                    }
                }
            }
        }
    }
}

/// 5x7 glyph rows, bit 4 is the leftmost column. Lowercase maps to
/// uppercase; anything else is blank.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100, 0b01000],
        _ => [0; 7],
    }
}

/// Value range over every finite point, padded by 5% on each side.
fn value_range(series: &[(String, Vec<f64>)]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, values) in series {
        for &v in values {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Render `series` over `x_labels` and write the PNG to `path`, creating
/// parent directories on demand.
pub fn line_chart(
    path: &Path,
    title: &str,
    x_labels: &[String],
    series: &[(String, Vec<f64>)],
) -> VerifyResult<()> {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);
    let plot_w = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) as f64;
    let plot_h = (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) as f64;
    let (lo, hi) = value_range(series);
    let n = x_labels.len().max(2);

    let x_at = |k: usize| MARGIN_LEFT as i64 + (k as f64 / (n - 1) as f64 * plot_w) as i64;
    let y_at = |v: f64| {
        MARGIN_TOP as i64 + (plot_h - (v - lo) / (hi - lo) * plot_h) as i64
    };

    // Horizontal grid lines and y-axis tick labels, 5 intervals.
    for k in 0..=5 {
        let v = lo + (hi - lo) * k as f64 / 5.0;
        let y = y_at(v);
        canvas.line(
            MARGIN_LEFT as i64,
            y,
            (WIDTH - MARGIN_RIGHT) as i64,
            y,
            GRID,
        );
        canvas.text(6, y - 3, &format!("{v:>8.2}"), BLACK);
    }

    // Axes.
    canvas.line(
        MARGIN_LEFT as i64,
        MARGIN_TOP as i64,
        MARGIN_LEFT as i64,
        (HEIGHT - MARGIN_BOTTOM) as i64,
        BLACK,
    );
    canvas.line(
        MARGIN_LEFT as i64,
        (HEIGHT - MARGIN_BOTTOM) as i64,
        (WIDTH - MARGIN_RIGHT) as i64,
        (HEIGHT - MARGIN_BOTTOM) as i64,
        BLACK,
    );

    // X tick labels, subsampled so they never overlap.
    let label_step = (x_labels.len() * 7 * 6 / plot_w as usize).max(1);
    for (k, label) in x_labels.iter().enumerate() {
        if k % label_step != 0 {
            continue;
        }
        let x = x_at(k);
        canvas.line(
            x,
            (HEIGHT - MARGIN_BOTTOM) as i64,
            x,
            (HEIGHT - MARGIN_BOTTOM) as i64 + 4,
            BLACK,
        );
        canvas.text(
            x - label.len() as i64 * 3,
            (HEIGHT - MARGIN_BOTTOM) as i64 + 8,
            label,
            BLACK,
        );
    }

    // Title centered over the plot area.
    let title_x = (MARGIN_LEFT as i64 + (WIDTH - MARGIN_RIGHT) as i64) / 2
        - title.len() as i64 * 3;
    canvas.text(title_x, 12, title, BLACK);

    // Series lines, broken at NaN points, plus the legend.
    for (s, (name, values)) in series.iter().enumerate() {
        let color = SERIES_COLORS[s % SERIES_COLORS.len()];
        let mut prev: Option<(i64, i64)> = None;
        for (k, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                prev = None;
                continue;
            }
            let here = (x_at(k), y_at(v));
            if let Some((px, py)) = prev {
                canvas.line(px, py, here.0, here.1, color);
                canvas.line(px, py + 1, here.0, here.1 + 1, color);
            }
            prev = Some(here);
        }

        let legend_x = (WIDTH - MARGIN_RIGHT) as i64 + 10;
        let legend_y = MARGIN_TOP as i64 + s as i64 * 14;
        canvas.line(legend_x, legend_y + 3, legend_x + 16, legend_y + 3, color);
        canvas.line(
            legend_x,
            legend_y + 4,
            legend_x + 16,
            legend_y + 4,
            color,
        );
        canvas.text(legend_x + 22, legend_y, name, BLACK);
    }

    let body = png::encode_rgba(&canvas.pixels, WIDTH, HEIGHT)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    Ok(())
}
