//! Error rendering using ariadne
//!
//! Draws the formula with the offending part underlined and the error message
//! attached to it.

use crate::{FormulaError, Span};
use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<formula>";

/// Render an error for `source` to stderr
///
/// # Example
/// ```no_run
/// use batpy::{evaluate_formula, render_error};
///
/// let source = "1 ** 42";
/// if let Err(e) = evaluate_formula(source, None) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &FormulaError, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    error: &FormulaError,
    source: &str,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String
pub fn render_error_to_string(error: &FormulaError, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Same as `render_error_to_string` but without ANSI color codes.
pub fn render_error_to_string_no_color(error: &FormulaError, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &FormulaError,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let (title, label, code) = match error {
        FormulaError::Syntax(err) => (
            format!("Syntax error at {}:{}", err.line, err.column),
            err.message(),
            "syntax",
        ),
        FormulaError::Runtime(err) => (err.to_string(), err.kind.to_string(), "runtime"),
    };

    let Some(span) = error.span() else {
        return writeln!(writer, "Error: {title}");
    };
    let range = clamp(span, source);

    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    Report::build(ReportKind::Error, (SOURCE_ID, range.clone()))
        .with_code(code)
        .with_message(title)
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_index_type(IndexType::Byte),
        )
        .with_label(
            Label::new((SOURCE_ID, range))
                .with_message(label)
                .with_color(colors.next()),
        )
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}

/// Keep the label inside the source, on char boundaries.
fn clamp(span: &Span, source: &str) -> std::ops::Range<usize> {
    let floor = |mut offset: usize| {
        offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    };
    let start = floor(span.0.start);
    let end = floor(span.0.end).max(start);
    start..end
}
