//! Rasterising a board position.

use image::{Rgba, RgbaImage};
use sgf_core::selector::Theme;
use sgf_core::tree::Stone;

use crate::board::{Board, Point};
use crate::font::{self, GLYPH_HEIGHT};

/// Column letters as Go boards label them; `I` is skipped.
const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub board: Rgba<u8>,
    pub line: Rgba<u8>,
    pub black: Rgba<u8>,
    pub white: Rgba<u8>,
    pub outline: Rgba<u8>,
    pub label: Rgba<u8>,
    pub marker: Rgba<u8>,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Classic => Self {
                board: Rgba([0xDC, 0xB3, 0x5C, 0xFF]),
                line: Rgba([0x1E, 0x16, 0x0A, 0xFF]),
                black: Rgba([0x14, 0x14, 0x14, 0xFF]),
                white: Rgba([0xF5, 0xF5, 0xF0, 0xFF]),
                outline: Rgba([0x1E, 0x16, 0x0A, 0xFF]),
                label: Rgba([0x3A, 0x2A, 0x10, 0xFF]),
                marker: Rgba([0xC8, 0x28, 0x28, 0xFF]),
            },
            Theme::Modern => Self {
                board: Rgba([0xE8, 0xEC, 0xF1, 0xFF]),
                line: Rgba([0x5A, 0x64, 0x73, 0xFF]),
                black: Rgba([0x21, 0x25, 0x29, 0xFF]),
                white: Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
                outline: Rgba([0x5A, 0x64, 0x73, 0xFF]),
                label: Rgba([0x49, 0x50, 0x57, 0xFF]),
                marker: Rgba([0x1C, 0x7E, 0xD6, 0xFF]),
            },
            Theme::Minimal => Self {
                board: Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
                line: Rgba([0xA0, 0xA0, 0xA0, 0xFF]),
                black: Rgba([0x00, 0x00, 0x00, 0xFF]),
                white: Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
                outline: Rgba([0x00, 0x00, 0x00, 0xFF]),
                label: Rgba([0x60, 0x60, 0x60, 0xFF]),
                marker: Rgba([0x80, 0x80, 0x80, 0xFF]),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    pub width: u32,
    pub height: u32,
    pub coord_labels: bool,
    pub move_numbers: bool,
    pub theme: Theme,
}

/// Pixel geometry of the grid inside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell: f32,
}

impl Layout {
    pub fn new(width: u32, height: u32, size: usize, coord_labels: bool) -> Self {
        let lines = size.saturating_sub(1) as f32;
        // Margin on each side, in cells.
        let margin = if coord_labels { 1.5 } else { 0.75 };
        let cell = width.min(height) as f32 / (lines + 2.0 * margin);
        let span = cell * lines;
        Self {
            origin_x: (width as f32 - span) / 2.0,
            origin_y: (height as f32 - span) / 2.0,
            cell,
        }
    }

    pub fn centre(&self, p: Point) -> (f32, f32) {
        (
            self.origin_x + p.x as f32 * self.cell,
            self.origin_y + p.y as f32 * self.cell,
        )
    }
}

pub fn draw_board(board: &Board, options: &DrawOptions) -> RgbaImage {
    let palette = Palette::for_theme(options.theme);
    let size = board.size();
    let layout = Layout::new(options.width, options.height, size, options.coord_labels);
    let mut image = RgbaImage::from_pixel(options.width, options.height, palette.board);

    draw_grid(&mut image, &layout, size, palette.line);
    for (x, y) in star_points(size) {
        let (cx, cy) = layout.centre(Point { x, y });
        fill_circle(&mut image, cx, cy, (layout.cell * 0.1).max(1.5), palette.line);
    }
    if options.coord_labels {
        draw_coordinates(&mut image, &layout, size, palette.label);
    }

    let radius = layout.cell * 0.48;
    for (point, stone) in board.stones() {
        let (cx, cy) = layout.centre(point);
        match stone {
            Stone::Black => fill_circle(&mut image, cx, cy, radius, palette.black),
            Stone::White => {
                fill_circle(&mut image, cx, cy, radius, palette.outline);
                fill_circle(&mut image, cx, cy, radius - (layout.cell / 20.0).max(1.0), palette.white);
            }
        }

        if options.move_numbers {
            if let Some(number) = board.number_at(point) {
                draw_number(&mut image, &layout, point, stone, number, &palette);
            }
        }
    }

    if !options.move_numbers {
        if let Some(point) = board.last_move() {
            let (cx, cy) = layout.centre(point);
            let outer = layout.cell * 0.22;
            fill_circle(&mut image, cx, cy, outer, palette.marker);
            if let Some(stone) = board.get(point) {
                fill_circle(&mut image, cx, cy, outer * 0.55, stone_fill(stone, &palette));
            }
        }
    }

    image
}

fn stone_fill(stone: Stone, palette: &Palette) -> Rgba<u8> {
    match stone {
        Stone::Black => palette.black,
        Stone::White => palette.white,
    }
}

fn draw_grid(image: &mut RgbaImage, layout: &Layout, size: usize, color: Rgba<u8>) {
    let thickness = (layout.cell / 25.0).max(1.0);
    let span = layout.cell * size.saturating_sub(1) as f32;
    let half = thickness / 2.0;
    for i in 0..size {
        let offset = i as f32 * layout.cell;
        let x = layout.origin_x + offset;
        let y = layout.origin_y + offset;
        fill_rect(image, x - half, layout.origin_y - half, x + half, layout.origin_y + span + half, color);
        fill_rect(image, layout.origin_x - half, y - half, layout.origin_x + span + half, y + half, color);
    }
}

/// Hoshi: the four corner points, the centre on odd boards, and the side
/// midpoints on large odd boards.
pub fn star_points(size: usize) -> Vec<(usize, usize)> {
    if size < 7 {
        return Vec::new();
    }
    let edge = if size < 13 { 2 } else { 3 };
    let far = size - 1 - edge;
    let mid = size / 2;
    let mut points = vec![(edge, edge), (edge, far), (far, edge), (far, far)];
    if size % 2 == 1 {
        points.push((mid, mid));
        if size >= 15 {
            points.extend([(edge, mid), (far, mid), (mid, edge), (mid, far)]);
        }
    }
    points
}

/// Column label for a 0-based column index.
pub fn column_label(x: usize, size: usize) -> String {
    if size <= COLUMN_LETTERS.len() {
        (COLUMN_LETTERS[x] as char).to_string()
    } else {
        (x + 1).to_string()
    }
}

fn label_scale(cell: f32) -> u32 {
    ((cell * 0.4) / GLYPH_HEIGHT as f32).floor().max(1.0) as u32
}

fn draw_coordinates(image: &mut RgbaImage, layout: &Layout, size: usize, color: Rgba<u8>) {
    let scale = label_scale(layout.cell);
    let span = layout.cell * size.saturating_sub(1) as f32;
    let gap = layout.cell * 0.9;
    for i in 0..size {
        let offset = i as f32 * layout.cell;
        let column = column_label(i, size);
        let row = (size - i).to_string();

        let x = layout.origin_x + offset;
        font::draw_text(image, &column, x, layout.origin_y - gap, scale, color);
        font::draw_text(image, &column, x, layout.origin_y + span + gap, scale, color);

        let y = layout.origin_y + offset;
        font::draw_text(image, &row, layout.origin_x - gap, y, scale, color);
        font::draw_text(image, &row, layout.origin_x + span + gap, y, scale, color);
    }
}

fn draw_number(
    image: &mut RgbaImage,
    layout: &Layout,
    point: Point,
    stone: Stone,
    number: usize,
    palette: &Palette,
) {
    let text = number.to_string();
    let by_height = (layout.cell * 0.45) / GLYPH_HEIGHT as f32;
    let by_width = (layout.cell * 0.75) / font::text_width(&text, 1) as f32;
    let scale = by_height.min(by_width).floor();
    if scale < 1.0 {
        return;
    }
    let ink = match stone {
        Stone::Black => palette.white,
        Stone::White => palette.black,
    };
    let (cx, cy) = layout.centre(point);
    font::draw_text(image, &text, cx, cy, scale as u32, ink);
}

fn fill_rect(image: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    let clamp_x = |v: f32| v.round().clamp(0.0, image.width() as f32) as u32;
    let clamp_y = |v: f32| v.round().clamp(0.0, image.height() as f32) as u32;
    let (x0, x1) = (clamp_x(x0), clamp_x(x1).max(clamp_x(x0) + 1).min(image.width()));
    let (y0, y1) = (clamp_y(y0), clamp_y(y1).max(clamp_y(y0) + 1).min(image.height()));
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x, y, color);
        }
    }
}

/// Anti-aliased disc: edge pixels blend by coverage.
fn fill_circle(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    if radius <= 0.0 {
        return;
    }
    let min_x = (cx - radius - 1.0).floor().max(0.0) as u32;
    let min_y = (cy - radius - 1.0).floor().max(0.0) as u32;
    let max_x = ((cx + radius + 1.0).ceil().max(0.0) as u32).min(image.width());
    let max_y = ((cy + radius + 1.0).ceil().max(0.0) as u32).min(image.height());

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let blended = blend(*image.get_pixel(x, y), color, coverage);
                image.put_pixel(x, y, blended);
            }
        }
    }
}

fn blend(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let mix = |d: u8, s: u8| (d as f32 + (s as f32 - d as f32) * coverage).round() as u8;
    Rgba([
        mix(dst[0], src[0]),
        mix(dst[1], src[1]),
        mix(dst[2], src[2]),
        255,
    ])
}
