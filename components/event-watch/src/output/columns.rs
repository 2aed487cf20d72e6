//! Fixed-width column layout for the terminal view.

// Local crates
use crate::{normalizer::models::LogEvent, output::sink::Property};

// External crates
use owo_colors::OwoColorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const COLUMN_SEPARATOR: &str = " ";
const TRUNCATION_MARKER: char = '…';
const MIN_TEXT_WIDTH: usize = 20;

/// Width of every selected column for a terminal `terminal_width` characters wide.
///
/// Fixed columns keep their widths; `text` takes whatever is left after the fixed
/// columns and separators, never less than [`MIN_TEXT_WIDTH`].
pub fn column_widths(properties: &[Property], terminal_width: usize) -> Vec<usize> {
    let fixed: usize = properties.iter().filter_map(Property::fixed_width).sum();
    let separators = properties.len().saturating_sub(1) * COLUMN_SEPARATOR.len();
    let remaining = terminal_width
        .saturating_sub(fixed + separators)
        .max(MIN_TEXT_WIDTH);

    properties
        .iter()
        .map(|p| p.fixed_width().unwrap_or(remaining))
        .collect()
}

/// Render one batch. Each line ends with `\n`.
pub fn render(
    events: &[LogEvent],
    properties: &[Property],
    widths: &[usize],
    show_headers: bool,
    color: bool,
) -> String {
    let mut out = String::new();

    if show_headers {
        let cells: Vec<String> = properties
            .iter()
            .zip(widths)
            .map(|(p, w)| {
                let cell = fit(p.heading(), *w);
                if color {
                    cell.bold().to_string()
                } else {
                    cell
                }
            })
            .collect();
        push_line(&mut out, &cells);
    }

    for event in events {
        let cells: Vec<String> = properties
            .iter()
            .zip(widths)
            .map(|(p, w)| fit(&single_line(&p.value(event)), *w))
            .collect();
        push_line(&mut out, &cells);
    }

    out
}

fn push_line(out: &mut String, cells: &[String]) {
    let line = cells.join(COLUMN_SEPARATOR);
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Pad or truncate `value` to exactly `width` terminal columns.
fn fit(value: &str, width: usize) -> String {
    let display_width = value.width();

    if display_width <= width {
        let mut cell = value.to_string();
        cell.extend(std::iter::repeat_n(' ', width - display_width));
        return cell;
    }

    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut cell = String::new();
    for c in value.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        cell.push(c);
    }
    cell.push(TRUNCATION_MARKER);
    // A wide character that did not fit leaves a one-column gap.
    cell.extend(std::iter::repeat_n(' ', budget - used));
    cell
}

fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
