//! Excel writer built on `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use super::rows::{Cell, Table};
use crate::error::RenderError;

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Reporte";

const BEIGE: u32 = 0x00F5_F5DC;

fn row_index(idx: usize) -> Result<u32, RenderError> {
    u32::try_from(idx).map_err(|_| RenderError::InvalidRows(format!("too many rows ({idx})")))
}

fn col_index(idx: usize) -> Result<u16, RenderError> {
    u16::try_from(idx).map_err(|_| RenderError::InvalidRows(format!("too many columns ({idx})")))
}

/// Writes `table` as an `.xlsx` workbook at `path`.
///
/// # Errors
///
/// Returns [`RenderError::Xlsx`] on any workbook failure.
pub fn write(table: &Table, path: &Path) -> Result<(), RenderError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::Gray)
        .set_border(FormatBorder::Thin);
    let body_format = Format::new()
        .set_background_color(Color::RGB(BEIGE))
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (c, header) in table.headers.iter().enumerate() {
            sheet.write_string_with_format(0, col_index(c)?, header, &header_format)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let r = row_index(r + 1)?;
            for (c, cell) in row.iter().enumerate() {
                let c = col_index(c)?;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string_with_format(r, c, s, &body_format)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number_with_format(r, c, *n, &body_format)?;
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean_with_format(r, c, *b, &body_format)?;
                    }
                    Cell::Empty => {
                        sheet.write_blank(r, c, &body_format)?;
                    }
                }
            }
        }

        sheet.autofit();
    }
    workbook.save(path)?;
    Ok(())
}
