//! Formula assembly from chunks.
//!
//! Workbook-driven calculations describe a formula as a list of chunks. Each
//! chunk is either literal text or a reference to a named cell on a sheet,
//! optionally followed by a suffix (usually an operator). The assembled text
//! is then evaluated like any other formula.
//!
//! In configuration files a chunk is written as `[sheet, name_or_literal]` or
//! `[sheet, name_or_literal, suffix]`. An empty sheet marks the second item as
//! literal text:
//!
//! ```toml
//! chunks = [["Dashboard", "Battery energy", " / "], ["", 4]]
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    bindings::Bindings,
    errors::FormulaError,
    evaluator::evaluate_formula_with_options,
    options::EvaluatorOptions,
};

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunk: {reason}")]
    InvalidChunk { reason: String },

    #[error("no cell `{name}` on sheet `{sheet}`")]
    MissingCell { sheet: String, name: String },

    #[error("could not read cell `{name}` on sheet `{sheet}`")]
    Source {
        sheet: String,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Formula(#[from] FormulaError),
}

impl ChunkError {
    fn invalid(reason: impl Into<String>) -> Self {
        ChunkError::InvalidChunk {
            reason: reason.into(),
        }
    }
}

/// Value read from a cell.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Text inserted into the formula for this value.
    ///
    /// Numbers use the shortest form that parses back to the same value.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `{:?}` keeps a fraction or exponent, e.g. `42.0` or `1e300`.
            CellValue::Number(value) => write!(f, "{value:?}"),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Where cell values come from, usually a workbook.
pub trait CellSource {
    /// Read the value of cell `name` on `sheet`.
    ///
    /// Returns `ChunkError::MissingCell` for unknown cells and
    /// `ChunkError::Source` for failures of the underlying storage.
    fn read_value(&self, sheet: &str, name: &str) -> Result<CellValue, ChunkError>;
}

/// In-memory cell values, keyed by sheet then by cell name.
///
/// Deserialises from nested tables:
///
/// ```
/// use batpy_core::{CellSource, CellTable, CellValue};
///
/// let mut cells = CellTable::new();
/// cells.insert("Dashboard", "Battery energy", 42.0);
/// assert_eq!(
///     cells.read_value("Dashboard", "Battery energy").unwrap(),
///     CellValue::Number(42.0)
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CellTable {
    sheets: BTreeMap<String, BTreeMap<String, CellValue>>,
}

impl CellTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        sheet: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        self.sheets
            .entry(sheet.into())
            .or_default()
            .insert(name.into(), value.into())
    }

    pub fn get(&self, sheet: &str, name: &str) -> Option<&CellValue> {
        self.sheets.get(sheet)?.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.values().all(BTreeMap::is_empty)
    }
}

impl CellSource for CellTable {
    fn read_value(&self, sheet: &str, name: &str) -> Result<CellValue, ChunkError> {
        self.get(sheet, name)
            .cloned()
            .ok_or_else(|| ChunkError::MissingCell {
                sheet: sheet.to_string(),
                name: name.to_string(),
            })
    }
}

/// What a chunk contributes before its suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSource {
    Literal(String),
    Cell { sheet: String, name: String },
}

/// One piece of an assembled formula.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<ChunkItem>")]
pub struct Chunk {
    pub source: ChunkSource,
    pub suffix: Option<String>,
}

impl Chunk {
    pub fn literal(text: impl Into<String>) -> Self {
        Chunk {
            source: ChunkSource::Literal(text.into()),
            suffix: None,
        }
    }

    pub fn cell(sheet: impl Into<String>, name: impl Into<String>) -> Self {
        Chunk {
            source: ChunkSource::Cell {
                sheet: sheet.into(),
                name: name.into(),
            },
            suffix: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

/// A single item of the array form of a chunk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChunkItem {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ChunkItem {
    fn into_text(self) -> String {
        match self {
            ChunkItem::Integer(value) => value.to_string(),
            ChunkItem::Float(value) => CellValue::Number(value).render(),
            ChunkItem::Text(text) => text,
        }
    }
}

impl TryFrom<Vec<ChunkItem>> for Chunk {
    type Error = ChunkError;

    fn try_from(items: Vec<ChunkItem>) -> Result<Self, Self::Error> {
        if !(2..=3).contains(&items.len()) {
            return Err(ChunkError::invalid(format!(
                "expected 2 or 3 items, found {}",
                items.len()
            )));
        }

        let mut items = items.into_iter();
        let (Some(sheet), Some(second)) = (items.next(), items.next()) else {
            return Err(ChunkError::invalid("missing items"));
        };
        let suffix = items.next().map(ChunkItem::into_text);

        let ChunkItem::Text(sheet) = sheet else {
            return Err(ChunkError::invalid("sheet must be a string"));
        };

        let source = if sheet.is_empty() {
            ChunkSource::Literal(second.into_text())
        } else {
            match second {
                ChunkItem::Text(name) => ChunkSource::Cell { sheet, name },
                _ => {
                    return Err(ChunkError::invalid(format!(
                        "cell name on sheet `{sheet}` must be a string"
                    )));
                }
            }
        };

        Ok(Chunk { source, suffix })
    }
}

/// Concatenate `chunks` into formula text, reading cells from `cells`.
pub fn assemble_formula<C>(chunks: &[Chunk], cells: &C) -> Result<String, ChunkError>
where
    C: CellSource + ?Sized,
{
    let mut formula = String::new();
    for chunk in chunks {
        match &chunk.source {
            ChunkSource::Literal(text) => formula.push_str(text),
            ChunkSource::Cell { sheet, name } => {
                let value = cells.read_value(sheet, name)?;
                tracing::trace!(%sheet, %name, %value, "read cell");
                formula.push_str(&value.render());
            }
        }
        if let Some(suffix) = &chunk.suffix {
            formula.push_str(suffix);
        }
    }

    tracing::debug!(%formula, chunks = chunks.len(), "assembled formula");
    Ok(formula)
}

/// Assemble `chunks` and evaluate the result with the default limits.
pub fn evaluate_chunks<C>(
    chunks: &[Chunk],
    cells: &C,
    bindings: Option<&Bindings>,
) -> Result<f64, ChunkError>
where
    C: CellSource + ?Sized,
{
    evaluate_chunks_with_options(chunks, cells, bindings, &EvaluatorOptions::default())
}

pub fn evaluate_chunks_with_options<C>(
    chunks: &[Chunk],
    cells: &C,
    bindings: Option<&Bindings>,
    options: &EvaluatorOptions,
) -> Result<f64, ChunkError>
where
    C: CellSource + ?Sized,
{
    let formula = assemble_formula(chunks, cells)?;
    Ok(evaluate_formula_with_options(&formula, bindings, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> CellTable {
        let mut cells = CellTable::new();
        cells.insert("Dashboard", "Battery energy", 42.0);
        cells.insert("Dashboard", "Modules", 4.0);
        cells.insert("Chem", "Capacity", 0.125);
        cells
    }

    #[derive(Debug, Deserialize)]
    struct Target {
        chunks: Vec<Chunk>,
    }

    fn chunks(toml_text: &str) -> Vec<Chunk> {
        toml::from_str::<Target>(toml_text).unwrap().chunks
    }

    #[test]
    fn test_deserialize_cell_and_literal() {
        let parsed = chunks(r#"chunks = [["Dashboard", "Battery energy", " / "], ["", 4]]"#);
        assert_eq!(
            parsed,
            vec![
                Chunk::cell("Dashboard", "Battery energy").with_suffix(" / "),
                Chunk::literal("4"),
            ]
        );
    }

    #[test]
    fn test_deserialize_literal_kinds() {
        let parsed = chunks(r#"chunks = [["", "(1 + "], ["", 2.5, ")"], ["", 3, 7]]"#);
        assert_eq!(
            parsed,
            vec![
                Chunk::literal("(1 + "),
                Chunk::literal("2.5").with_suffix(")"),
                Chunk::literal("3").with_suffix("7"),
            ]
        );
    }

    #[test]
    fn test_deserialize_rejects_wrong_arity() {
        let err = toml::from_str::<Target>(r#"chunks = [["Dashboard"]]"#).unwrap_err();
        assert!(err.to_string().contains("expected 2 or 3 items, found 1"), "{err}");

        let err = toml::from_str::<Target>(r#"chunks = [["", 1, "+", 2]]"#).unwrap_err();
        assert!(err.to_string().contains("found 4"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_numeric_cell_name() {
        let err = toml::from_str::<Target>(r#"chunks = [["Dashboard", 3]]"#).unwrap_err();
        assert!(err.to_string().contains("must be a string"), "{err}");
    }

    #[test]
    fn test_cell_table_from_toml() {
        let cells: CellTable = toml::from_str(
            r#"
            [Dashboard]
            "Battery energy" = 42.0
            Modules = 4
            Label = "kWh"
            "#,
        )
        .unwrap();
        assert_eq!(cells.get("Dashboard", "Battery energy"), Some(&CellValue::Number(42.0)));
        assert_eq!(cells.get("Dashboard", "Modules"), Some(&CellValue::Number(4.0)));
        assert_eq!(cells.get("Dashboard", "Label"), Some(&CellValue::from("kWh")));
        assert_eq!(cells.get("Other", "Label"), None);
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(CellValue::Number(42.0).render(), "42.0");
        assert_eq!(CellValue::Number(0.1).render(), "0.1");
        assert_eq!(CellValue::Number(-3.5).render(), "-3.5");
        assert_eq!(CellValue::Number(1e300).render(), "1e300");
    }

    #[test]
    fn test_assemble_formula() {
        let chunks = vec![
            Chunk::cell("Dashboard", "Battery energy").with_suffix(" / "),
            Chunk::cell("Dashboard", "Modules").with_suffix(" * "),
            Chunk::literal("2"),
        ];
        assert_eq!(
            assemble_formula(&chunks, &dashboard()).unwrap(),
            "42.0 / 4.0 * 2"
        );
    }

    #[test]
    fn test_evaluate_chunks() {
        let chunks = vec![
            Chunk::cell("Dashboard", "Battery energy").with_suffix(" * "),
            Chunk::cell("Chem", "Capacity").with_suffix(" * "),
            Chunk::literal("k"),
        ];
        let bindings = Bindings::from_pairs([("k", 8)]).unwrap();
        assert_eq!(
            evaluate_chunks(&chunks, &dashboard(), Some(&bindings)).unwrap(),
            42.0
        );
    }

    #[test]
    fn test_missing_cell() {
        let chunks = vec![Chunk::cell("Dashboard", "Pack mass")];
        let err = assemble_formula(&chunks, &dashboard()).unwrap_err();
        assert!(matches!(
            &err,
            ChunkError::MissingCell { sheet, name } if sheet == "Dashboard" && name == "Pack mass"
        ));
        assert_eq!(err.to_string(), "no cell `Pack mass` on sheet `Dashboard`");
    }

    #[test]
    fn test_formula_errors_pass_through() {
        let chunks = vec![
            Chunk::cell("Dashboard", "Battery energy").with_suffix(" / "),
            Chunk::literal("0"),
        ];
        let err = evaluate_chunks(&chunks, &dashboard(), None).unwrap_err();
        assert!(
            matches!(&err, ChunkError::Formula(formula_err) if formula_err.is_runtime()),
            "{err:?}"
        );

        let chunks = vec![Chunk::literal("2 ** "), Chunk::cell("Dashboard", "Modules")];
        let err = evaluate_chunks(&chunks, &dashboard(), None).unwrap_err();
        assert!(matches!(err, ChunkError::Formula(FormulaError::Syntax(_))));
    }

    struct FailingSource;

    #[derive(Debug, Error)]
    #[error("workbook is locked")]
    struct Locked;

    impl CellSource for FailingSource {
        fn read_value(&self, sheet: &str, name: &str) -> Result<CellValue, ChunkError> {
            Err(ChunkError::Source {
                sheet: sheet.to_string(),
                name: name.to_string(),
                source: Box::new(Locked),
            })
        }
    }

    #[test]
    fn test_source_errors_keep_cause() {
        use std::error::Error as _;

        let chunks = vec![Chunk::cell("Dashboard", "Modules")];
        let err = assemble_formula(&chunks, &FailingSource).unwrap_err();
        assert_eq!(err.to_string(), "could not read cell `Modules` on sheet `Dashboard`");
        assert_eq!(err.source().unwrap().to_string(), "workbook is locked");
    }

    #[test]
    fn test_literal_only_chunks_skip_source() {
        let chunks = vec![Chunk::literal("6").with_suffix(" * "), Chunk::literal("7")];
        assert_eq!(evaluate_chunks(&chunks, &FailingSource, None).unwrap(), 42.0);
    }
}
