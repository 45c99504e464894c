#![allow(dead_code)]

use batpy::{Bindings, FormulaError, evaluate_formula};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Value(f64),
    /// Syntax error: line, column and message fragment.
    Syntax(usize, usize, &'static str),
    /// Runtime error message fragment.
    Runtime(&'static str),
}

pub struct TestCase {
    pub name: &'static str,
    pub formula: &'static str,
    pub bindings: &'static [(&'static str, f64)],
    pub outcome: Outcome,
}

pub fn bindings(pairs: &[(&str, f64)]) -> Bindings {
    Bindings::from_pairs(pairs.iter().copied()).unwrap()
}

pub fn run(formula: &str, pairs: &[(&str, f64)]) -> Result<f64, FormulaError> {
    evaluate_formula(formula, Some(&bindings(pairs)))
}

pub fn check(name: &str, formula: &str, pairs: &[(&str, f64)], outcome: Outcome) {
    let result = run(formula, pairs);
    match (outcome, &result) {
        (Outcome::Value(expected), Ok(actual)) => {
            assert_eq!(*actual, expected, "case '{name}': {formula:?}");
        }
        (Outcome::Syntax(line, column, fragment), Err(FormulaError::Syntax(err))) => {
            assert_eq!(
                (err.line, err.column),
                (line, column),
                "case '{name}': {formula:?} gave {err}"
            );
            assert!(
                err.to_string().contains(fragment),
                "case '{name}': {formula:?} gave {err}"
            );
        }
        (Outcome::Runtime(fragment), Err(FormulaError::Runtime(err))) => {
            assert!(
                err.to_string().contains(fragment),
                "case '{name}': {formula:?} gave {err}"
            );
        }
        _ => panic!("case '{name}': {formula:?} expected {outcome:?}, got {result:?}"),
    }
}

/// Generates one `#[test]` per case.
#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $(bindings: { $($var:literal => $val:expr),* $(,)? },)?
        outcome: $outcome:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            let pairs: &[(&str, f64)] = &[$($(($var, $val as f64)),*)?];
            $crate::cases::check(stringify!($name), $input, pairs, $outcome);
        }
    };
}

const BATTERY: &[(&str, f64)] = &[
    ("cell_capacity", 60.0),
    ("cells_per_module", 24.0),
    ("modules", 20.0),
    ("nominal_voltage", 3.5),
];

pub static TEST_CASES: Lazy<Vec<TestCase>> = Lazy::new(|| {
    vec![
        TestCase {
            name: "integer",
            formula: "42",
            bindings: &[],
            outcome: Outcome::Value(42.0),
        },
        TestCase {
            name: "negative_integer",
            formula: "-42",
            bindings: &[],
            outcome: Outcome::Value(-42.0),
        },
        TestCase {
            name: "mixed_arithmetic",
            formula: "1 + 2 * (3.0 / 4.0) - 0.5 + 40",
            bindings: &[],
            outcome: Outcome::Value(42.0),
        },
        TestCase {
            name: "variables",
            formula: "a * b / c",
            bindings: &[("a", 1274.0), ("b", 3.0), ("c", 91.0)],
            outcome: Outcome::Value(42.0),
        },
        TestCase {
            name: "pack_energy_kwh",
            formula: "cell_capacity * nominal_voltage * cells_per_module * modules / 1000",
            bindings: BATTERY,
            outcome: Outcome::Value(100.8),
        },
        TestCase {
            name: "unicode_identifier",
            formula: "größe * 2",
            bindings: &[("größe", 21.0)],
            outcome: Outcome::Value(42.0),
        },
        TestCase {
            name: "string_literal",
            formula: "''",
            bindings: &[],
            outcome: Outcome::Syntax(1, 1, "Literals of this type are not supported"),
        },
        TestCase {
            name: "power",
            formula: "1 ** 42",
            bindings: &[],
            outcome: Outcome::Syntax(1, 3, "Operations of this type are not supported: `**`"),
        },
        TestCase {
            name: "floor_division",
            formula: "1 // 42",
            bindings: &[],
            outcome: Outcome::Syntax(1, 3, "`//`"),
        },
        TestCase {
            name: "function_call",
            formula: "f(42)",
            bindings: &[("f", 1.0)],
            outcome: Outcome::Syntax(1, 2, "This syntax is not supported"),
        },
        TestCase {
            name: "boolean_literal",
            formula: "True",
            bindings: &[],
            outcome: Outcome::Syntax(1, 1, "Literals of this type are not supported"),
        },
        TestCase {
            name: "undefined_variable",
            formula: "modules * pack_mass",
            bindings: BATTERY,
            outcome: Outcome::Syntax(1, 11, "Undefined variable: pack_mass"),
        },
        TestCase {
            name: "too_long",
            formula: "1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1+1",
            bindings: &[],
            outcome: Outcome::Syntax(1, 1, "The formula is too long: 257 > 255"),
        },
        TestCase {
            name: "division_by_zero",
            formula: "42/0",
            bindings: &[],
            outcome: Outcome::Runtime("Evaluation failed: division by zero"),
        },
        TestCase {
            name: "division_by_zero_variable",
            formula: "modules / (cells_per_module - 24)",
            bindings: BATTERY,
            outcome: Outcome::Runtime("division by zero"),
        },
        TestCase {
            name: "overflow",
            formula: "1e308 * 10",
            bindings: &[],
            outcome: Outcome::Runtime("numeric overflow"),
        },
    ]
});
