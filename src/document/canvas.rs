//! Page description: an ordered list of draw operations in PDF user space
//! (points, origin at the bottom-left corner).

/// ISO A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    pub const BLACK: Color = Color::gray(0.0);
    pub const WHITE: Color = Color::gray(1.0);
}

/// The three standard Helvetica faces used by every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    /// Resource name inside the page's font dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }

    /// Advance width of `text` at `size`, from the standard AFM metrics.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let table = match self {
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
            Font::Regular | Font::Oblique => &HELVETICA_WIDTHS,
        };
        let units: u32 = text
            .chars()
            .map(|ch| match ch as u32 {
                code @ 32..=126 => table[(code - 32) as usize] as u32,
                // bullet
                0x2022 => 350,
                _ => 556,
            })
            .sum();
        units as f32 * size / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + 2.0 * amount,
            height: self.height + 2.0 * amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle, optionally outlined with a 1pt black stroke.
    FillRect {
        rect: Rect,
        fill: Color,
        outline: Option<Color>,
        line_width: f32,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        line_width: f32,
    },
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    /// Blit of the page's image XObject into `rect`.
    Image { rect: Rect },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSpec {
    ops: Vec<DrawOp>,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn fill_rect(&mut self, rect: Rect, fill: Color) {
        self.ops.push(DrawOp::FillRect {
            rect,
            fill,
            outline: None,
            line_width: 1.0,
        });
    }

    /// Filled and outlined panel.
    pub fn panel(&mut self, rect: Rect, fill: Color, outline: Color, line_width: f32) {
        self.ops.push(DrawOp::FillRect {
            rect,
            fill,
            outline: Some(outline),
            line_width,
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Color, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text: text.into(),
        });
    }

    /// Text horizontally centered on the page.
    pub fn centered_text(&mut self, y: f32, font: Font, size: f32, color: Color, text: impl Into<String>) {
        let text = text.into();
        let x = (PAGE_WIDTH - font.text_width(&text, size)) / 2.0;
        self.text(x, y, font, size, color, text);
    }

    pub fn image(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Image { rect });
    }

    /// All text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }

    pub fn image_rect(&self) -> Option<Rect> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Image { rect } => Some(*rect),
            _ => None,
        })
    }
}

// Widths for ASCII 32..=126, 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
