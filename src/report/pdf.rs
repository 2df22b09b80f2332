//! PDF table writer built on `lopdf`.
//!
//! Landscape Letter pages with a grey header band repeated on each page,
//! beige body rows and a thin grid. Text uses the standard Helvetica fonts
//! with `WinAnsiEncoding`, so no font files are embedded.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use unicode_segmentation::UnicodeSegmentation;

use super::rows::{Cell, Table};
use crate::error::RenderError;

const PAGE_WIDTH: f32 = 792.0;
const PAGE_HEIGHT: f32 = 612.0;
const MARGIN: f32 = 36.0;
const FONT_SIZE: f32 = 9.0;
/// Smallest font a wide table is scaled down to.
const MIN_FONT_SIZE: f32 = 5.0;
/// Line height as a multiple of the font size.
const LINE_SPACING: f32 = 1.25;
const CELL_PADDING: f32 = 3.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.55;
/// Minimum column width in characters.
const MIN_COLUMN_CHARS: usize = 4;
/// Values up to this length always get a column wide enough for one line.
const SHORT_VALUE_CHARS: usize = 24;

const HEADER_FILL: [f32; 3] = [0.5, 0.5, 0.5];
const HEADER_TEXT: [f32; 3] = [0.96, 0.96, 0.96];
const BODY_FILL: [f32; 3] = [0.96, 0.96, 0.86];

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn color_op(operator: &str, rgb: [f32; 3]) -> Operation {
    Operation::new(operator, rgb.iter().copied().map(real).collect())
}

/// Encodes text for a `WinAnsiEncoding` font; unmappable characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => u8::try_from(code).unwrap_or(b'?'),
            _ => b'?',
        })
        .collect()
}

fn char_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Breaks `text` into lines of at most `max` graphemes.
///
/// Lines break between words; a word longer than `max` is split. Explicit
/// newlines are kept. Nothing is dropped apart from runs of whitespace.
fn wrap(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let graphemes: Vec<&str> = word.graphemes(true).collect();
            for piece in graphemes.chunks(max) {
                if len > 0 && len + 1 + piece.len() <= max {
                    line.push(' ');
                    len += 1;
                } else if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                line.push_str(&piece.concat());
                len += piece.len();
            }
        }
        lines.push(line);
    }
    lines
}

/// Font size and column widths for one table.
#[derive(Debug)]
struct Layout {
    font_size: f32,
    widths: Vec<f32>,
}

impl Layout {
    /// Every column is at least as wide as its header and its short values.
    /// The remaining width goes to columns with longer values in proportion
    /// to how much they need. When the minimum widths overflow the page the
    /// font shrinks, down to [`MIN_FONT_SIZE`].
    #[allow(clippy::cast_precision_loss)]
    fn new(table: &Table) -> Self {
        let usable = 2.0f32.mul_add(-MARGIN, PAGE_WIDTH);
        let (min_chars, natural_chars): (Vec<usize>, Vec<usize>) = table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let header_len = char_count(header).max(MIN_COLUMN_CHARS);
                let lengths: Vec<usize> = table
                    .rows
                    .iter()
                    .flat_map(|row| {
                        row[idx]
                            .display()
                            .split('\n')
                            .map(char_count)
                            .collect::<Vec<_>>()
                    })
                    .collect();
                let short = lengths
                    .iter()
                    .copied()
                    .filter(|&len| len <= SHORT_VALUE_CHARS)
                    .max()
                    .unwrap_or(0);
                let longest = lengths.iter().copied().max().unwrap_or(0);
                (header_len.max(short), header_len.max(longest))
            })
            .unzip();

        let padding = 2.0 * CELL_PADDING * table.headers.len() as f32;
        let min_total: usize = min_chars.iter().sum();
        let fits = |font: f32| (min_total as f32 * font).mul_add(AVG_GLYPH_WIDTH, padding) <= usable;
        let font_size = if fits(FONT_SIZE) {
            FONT_SIZE
        } else {
            ((usable - padding) / (min_total as f32 * AVG_GLYPH_WIDTH))
                .clamp(MIN_FONT_SIZE, FONT_SIZE)
        };

        let width = |chars: usize| {
            (chars as f32 * font_size).mul_add(AVG_GLYPH_WIDTH, 2.0 * CELL_PADDING)
        };
        let min_widths: Vec<f32> = min_chars.iter().map(|&c| width(c)).collect();
        let wanted: Vec<f32> = natural_chars
            .iter()
            .zip(&min_widths)
            .map(|(&c, &min)| width(c) - min)
            .collect();
        let spare = usable - min_widths.iter().sum::<f32>();
        let wanted_total: f32 = wanted.iter().sum();

        let widths = if spare <= 0.0 || min_widths.is_empty() {
            min_widths
        } else if wanted_total <= spare {
            let even = (spare - wanted_total) / min_widths.len() as f32;
            min_widths
                .iter()
                .zip(&wanted)
                .map(|(min, want)| min + want + even)
                .collect()
        } else {
            min_widths
                .iter()
                .zip(&wanted)
                .map(|(min, want)| min + spare * want / wanted_total)
                .collect()
        };

        Self { font_size, widths }
    }

    fn line_height(&self) -> f32 {
        self.font_size * LINE_SPACING
    }

    #[allow(clippy::cast_precision_loss)]
    fn row_height(&self, cells: &[Vec<String>]) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        (lines as f32).mul_add(self.line_height(), 2.0 * CELL_PADDING)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn max_chars(&self, width: f32) -> usize {
        let chars =
            2.0f32.mul_add(-CELL_PADDING, width) / (self.font_size * AVG_GLYPH_WIDTH) + 1e-3;
        chars.max(1.0).floor() as usize
    }

    /// Wraps each cell of one table line to its column width.
    fn wrap_line(&self, cells: &[String]) -> Vec<Vec<String>> {
        cells
            .iter()
            .zip(&self.widths)
            .map(|(cell, &width)| wrap(cell, self.max_chars(width)))
            .collect()
    }

    /// Appends the fill, grid and text operations for one table line.
    #[allow(clippy::cast_precision_loss)]
    fn draw_line(&self, ops: &mut Vec<Operation>, cells: &[Vec<String>], top: f32, header: bool) {
        let height = self.row_height(cells);
        let bottom = top - height;
        let width: f32 = self.widths.iter().sum();

        ops.push(color_op("rg", if header { HEADER_FILL } else { BODY_FILL }));
        ops.push(Operation::new(
            "re",
            vec![real(MARGIN), real(bottom), real(width), real(height)],
        ));
        ops.push(Operation::new("f", vec![]));

        ops.push(color_op("RG", [0.0, 0.0, 0.0]));
        ops.push(Operation::new("w", vec![real(0.5)]));
        ops.push(Operation::new(
            "re",
            vec![real(MARGIN), real(bottom), real(width), real(height)],
        ));
        ops.push(Operation::new("S", vec![]));

        let mut x = MARGIN;
        for (lines, &col_width) in cells.iter().zip(&self.widths) {
            if x > MARGIN {
                ops.push(Operation::new("m", vec![real(x), real(bottom)]));
                ops.push(Operation::new("l", vec![real(x), real(top)]));
                ops.push(Operation::new("S", vec![]));
            }

            for (n, line) in lines.iter().enumerate().filter(|(_, l)| !l.is_empty()) {
                let baseline = 0.3f32.mul_add(
                    self.font_size,
                    (n as f32 + 1.0).mul_add(-self.line_height(), top - CELL_PADDING),
                );
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(if header { b"F2".to_vec() } else { b"F1".to_vec() }),
                        real(self.font_size),
                    ],
                ));
                ops.push(color_op("rg", if header { HEADER_TEXT } else { [0.0, 0.0, 0.0] }));
                ops.push(Operation::new(
                    "Td",
                    vec![real(x + CELL_PADDING), real(baseline)],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(line), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }

            x += col_width;
        }
    }
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Writes `table` as a PDF file at `path`.
///
/// Long values wrap inside their cell and rows grow to fit. A page takes
/// rows until the next one would cross the bottom margin.
///
/// # Errors
///
/// Returns [`RenderError::Pdf`] if content encoding fails and
/// [`RenderError::Io`] if the file cannot be written.
pub fn write(table: &Table, path: &Path) -> Result<(), RenderError> {
    let layout = Layout::new(table);
    let header = layout.wrap_line(&table.headers);
    let header_top = PAGE_HEIGHT - MARGIN;
    let body_top = header_top - layout.row_height(&header);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut pages: Vec<Vec<Operation>> = Vec::new();
    let mut ops = Vec::new();
    layout.draw_line(&mut ops, &header, header_top, true);
    let mut top = body_top;
    for row in &table.rows {
        let texts: Vec<String> = row.iter().map(Cell::display).collect();
        let cells = layout.wrap_line(&texts);
        let height = layout.row_height(&cells);
        if top < body_top && top - height < MARGIN {
            pages.push(std::mem::take(&mut ops));
            layout.draw_line(&mut ops, &header, header_top, true);
            top = body_top;
        }
        layout.draw_line(&mut ops, &cells, top, false);
        top -= height;
    }
    pages.push(ops);

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(path)?;
    Ok(())
}
