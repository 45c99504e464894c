use thiserror::Error;

use crate::parser::syntax::line_col;
use crate::parser::{Rule, Span};

/// Words the grammar refuses as identifiers.
///
/// Keep in sync with the `keyword` rule in `formula.pest`.
const RESERVED_WORDS: &[&str] = &[
    "and", "or", "not", "if", "else", "lambda", "in", "is", "True", "False", "None",
];

/// Reserved words that would be literals in a general expression language.
const RESERVED_LITERALS: &[&str] = &["True", "False", "None"];

/// Operators of general expression languages that formulas do not support.
///
/// Two-character operators come first so that `<=` is not reported as `<`.
const UNSUPPORTED_OPERATORS: &[&str] = &[
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "%", "<", ">", "&", "|", "^", "~", "@", "!",
];

/// Why a formula was rejected before or during the tree walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("The formula is too long: {length} > {max_length}")]
    TooLong { length: usize, max_length: usize },

    #[error("Could not parse: the formula is nested deeper than {max_depth} levels")]
    TooDeeplyNested { max_depth: usize },

    #[error("Could not parse: {detail}")]
    Parse { detail: String },

    #[error("Literals of this type are not supported")]
    UnsupportedLiteral,

    #[error("Operations of this type are not supported: `{operator}`")]
    UnsupportedOperation { operator: String },

    #[error("This syntax is not supported")]
    UnsupportedSyntax,

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },
}

/// A formula that is malformed, too long, uses something outside the
/// supported arithmetic subset, or names an unbound variable.
///
/// `line` and `column` are 1-based; the column counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {kind}")]
pub struct FormulaSyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    pub column: usize,
    /// Byte range of the offending text, for rendering.
    pub span: Span,
}

impl FormulaSyntaxError {
    pub fn new(kind: SyntaxErrorKind, line: usize, column: usize, span: Span) -> Self {
        Self {
            kind,
            line,
            column,
            span,
        }
    }

    /// Positions the error at the start of `span` within `source`.
    pub fn at(source: &str, span: Span, kind: SyntaxErrorKind) -> Self {
        let (line, column) = line_col(source, span.0.start);
        Self::new(kind, line, column, span)
    }

    /// The human-readable message, without the position prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Convert a pest error into a positioned `FormulaSyntaxError`.
///
/// When the text at the failure position is a construct of a general
/// expression language (string literal, `**`, a call, a keyword), the error
/// names it instead of listing what the grammar expected.
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> FormulaSyntaxError {
    use pest::error::ErrorVariant;

    let pos = match err.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    let pos = pos.min(source.len());

    let (kind, span) = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => classify(source, pos, &positives),
        ErrorVariant::CustomError { message } => (
            SyntaxErrorKind::Parse { detail: message },
            Span::new(pos, pos),
        ),
    };

    FormulaSyntaxError::at(source, span, kind)
}

fn classify(source: &str, pos: usize, positives: &[Rule]) -> (SyntaxErrorKind, Span) {
    let rest = &source[pos..];
    let token_span = |len: usize| Span::new(pos, pos + len);

    if let Some((start, operator)) = unsupported_operator_at(source, pos) {
        let kind = if operator == "=" {
            SyntaxErrorKind::UnsupportedSyntax
        } else {
            SyntaxErrorKind::UnsupportedOperation {
                operator: operator.to_string(),
            }
        };
        return (kind, Span::new(start, start + operator.len()));
    }

    let Some(next) = rest.chars().next() else {
        let detail = format!(
            "expected {}, found end of input",
            format_expected_rules(positives)
        );
        return (SyntaxErrorKind::Parse { detail }, token_span(0));
    };

    if next == '\'' || next == '"' {
        return (SyntaxErrorKind::UnsupportedLiteral, token_span(next.len_utf8()));
    }

    if next == '+' && expects_operand(positives) {
        // Unary plus.
        let kind = SyntaxErrorKind::UnsupportedOperation {
            operator: "+".to_string(),
        };
        return (kind, token_span(1));
    }

    if let Some(word) = leading_word(rest) {
        if RESERVED_LITERALS.contains(&word) || is_imaginary_suffix(source, pos, word) {
            return (SyntaxErrorKind::UnsupportedLiteral, token_span(word.len()));
        }
        if RESERVED_WORDS.contains(&word) {
            return (SyntaxErrorKind::UnsupportedSyntax, token_span(word.len()));
        }
    }

    let unsupported = match next {
        // Calls and attribute access only make sense right after an operand.
        '(' | '.' => follows_operand(source, pos),
        '[' | ']' | '{' | '}' | ',' | ':' | ';' | '=' => true,
        _ => false,
    };
    if unsupported {
        return (SyntaxErrorKind::UnsupportedSyntax, token_span(next.len_utf8()));
    }

    let detail = format!(
        "expected {}, found {}",
        format_expected_rules(positives),
        describe_found(rest)
    );
    (SyntaxErrorKind::Parse { detail }, token_span(next.len_utf8()))
}

fn unsupported_operator_at(source: &str, pos: usize) -> Option<(usize, &'static str)> {
    // The grammar fails on the second character of `**` or `//`, so an
    // operator starting one character earlier may cover `pos`.
    let candidates = [pos.checked_sub(1), Some(pos)];
    for start in candidates.into_iter().flatten() {
        if !source.is_char_boundary(start) {
            continue;
        }
        let rest = &source[start..];
        if let Some(operator) = UNSUPPORTED_OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op) && start + op.len() > pos)
        {
            return Some((start, *operator));
        }
    }
    if source[pos..].starts_with('=') {
        return Some((pos, "="));
    }
    None
}

fn expects_operand(positives: &[Rule]) -> bool {
    positives.iter().any(|rule| {
        matches!(
            rule,
            Rule::expression | Rule::neg | Rule::number | Rule::ident | Rule::grouped
        )
    })
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn leading_word(text: &str) -> Option<&str> {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(text.len(), |(i, _)| i);
    (end > 0).then(|| &text[..end])
}

/// `1j`: a number immediately followed by `j` is a complex literal.
fn is_imaginary_suffix(source: &str, pos: usize, word: &str) -> bool {
    (word == "j" || word == "J")
        && source[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
}

fn follows_operand(source: &str, pos: usize) -> bool {
    source[..pos]
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| is_word_char(c) || c == ')' || c == '.')
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::add | Rule::sub | Rule::mul | Rule::div => "operator",
            Rule::EOI => "end of input",
            _ => "expression",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((only, [])) => only.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Format the token found at the error position
fn describe_found(rest: &str) -> String {
    match rest.chars().next() {
        None => "end of input".to_string(),
        Some(c) if c.is_ascii_digit() => "number".to_string(),
        Some(_) => match leading_word(rest) {
            Some(word) => format!("identifier `{}`", word),
            None => {
                let token: String = rest.chars().take(1).collect();
                format!("`{}`", token)
            }
        },
    }
}
