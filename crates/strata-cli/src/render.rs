//! Box-drawing table output for query results.
//!
//! Columns are measured at their natural width, capped at a configurable
//! maximum, then shrunk (never below 8 cells) to fit the terminal; cell text
//! is truncated with an ellipsis only after measuring.

use strata_core::{record::Fields, value::Value};

/// The border glyph set: (left, cross, right, fill) per horizontal rule,
/// plus the vertical bar.
struct Borders {
  top:  [&'static str; 4],
  mid:  [&'static str; 4],
  bot:  [&'static str; 4],
  vert: &'static str,
}

const UNICODE: Borders = Borders {
  top:  ["┌", "┬", "┐", "─"],
  mid:  ["├", "┼", "┤", "─"],
  bot:  ["└", "┴", "┘", "─"],
  vert: "│",
};

const ASCII: Borders = Borders {
  top:  ["+", "+", "+", "-"],
  mid:  ["+", "+", "+", "-"],
  bot:  ["+", "+", "+", "-"],
  vert: "|",
};

const PADDING: usize = 1;
const MIN_SHRINK_WIDTH: usize = 8;

/// How a (possibly absent) field renders in a cell.
pub fn display_value(value: Option<&Value>) -> String {
  value.map(Value::to_string).unwrap_or_default()
}

/// Turn field maps into cell rows following `headers` order.
pub fn rows_from_fields<'a>(
  headers: &[String],
  records: impl IntoIterator<Item = &'a Fields>,
) -> Vec<Vec<String>> {
  records
    .into_iter()
    .map(|fields| {
      headers
        .iter()
        .map(|h| display_value(fields.get(h)))
        .collect()
    })
    .collect()
}

/// Render a bordered table. `term_width = None` disables shrink-to-fit
/// (tests pass a fixed width; the binary passes the probed terminal width).
pub fn render_table(
  headers: &[String],
  rows: &[Vec<String>],
  max_col_width: usize,
  ascii: bool,
  term_width: Option<usize>,
) -> String {
  let borders = if ascii { &ASCII } else { &UNICODE };
  let widths = compute_widths(headers, rows, max_col_width, term_width);

  let header_cells: Vec<String> = headers
    .iter()
    .enumerate()
    .map(|(i, h)| truncate(h, widths[i]))
    .collect();

  let mut out = Vec::new();
  out.push(rule(&widths, &borders.top, borders.top[3]));
  out.push(row_line(&header_cells, &widths, borders.vert));
  out.push(rule(&widths, &borders.mid, borders.mid[3]));
  for row in rows {
    let cells: Vec<String> = row
      .iter()
      .enumerate()
      .map(|(i, v)| truncate(v, widths[i]))
      .collect();
    out.push(row_line(&cells, &widths, borders.vert));
  }
  out.push(rule(&widths, &borders.bot, borders.bot[3]));
  out.join("\n")
}

fn char_len(s: &str) -> usize { s.chars().count() }

/// Truncate to `width` characters, keeping an ellipsis when room allows.
fn truncate(s: &str, width: usize) -> String {
  if char_len(s) <= width {
    return s.to_owned();
  }
  if width <= 3 {
    return s.chars().take(width).collect();
  }
  let mut out: String = s.chars().take(width - 1).collect();
  out.push('…');
  out
}

/// Natural widths capped at `max_col_width`, then shrunk round-robin (never
/// below [`MIN_SHRINK_WIDTH`]) until the table fits `term_width`.
fn compute_widths(
  headers: &[String],
  rows: &[Vec<String>],
  max_col_width: usize,
  term_width: Option<usize>,
) -> Vec<usize> {
  let mut widths: Vec<usize> = headers.iter().map(|h| char_len(h)).collect();
  for row in rows {
    for (i, cell) in row.iter().enumerate() {
      if i < widths.len() {
        widths[i] = widths[i].max(char_len(cell));
      }
    }
  }
  for w in &mut widths {
    *w = (*w).min(max_col_width);
  }

  if let Some(term_width) = term_width {
    let total =
      |ws: &[usize]| 1 + ws.iter().map(|w| w + 2 * PADDING + 1).sum::<usize>();
    let mut overflow = total(&widths).saturating_sub(term_width);
    while overflow > 0 {
      let mut shrunk = false;
      for w in &mut widths {
        if *w > MIN_SHRINK_WIDTH && overflow > 0 {
          *w -= 1;
          overflow -= 1;
          shrunk = true;
        }
      }
      if !shrunk {
        break;
      }
    }
  }

  widths
}

fn rule(widths: &[usize], glyphs: &[&'static str; 4], fill: &str) -> String {
  let [left, cross, right, _] = glyphs;
  let mut out = String::from(*left);
  for (i, w) in widths.iter().enumerate() {
    out.push_str(&fill.repeat(w + 2 * PADDING));
    out.push_str(if i + 1 < widths.len() { cross } else { right });
  }
  out
}

fn row_line(cells: &[String], widths: &[usize], vert: &str) -> String {
  let mut out = String::from(vert);
  for (cell, width) in cells.iter().zip(widths) {
    out.push(' ');
    out.push_str(cell);
    out.push_str(&" ".repeat(width.saturating_sub(char_len(cell)) + PADDING));
    out.push_str(vert);
  }
  out
}
