//! Ariadne-based rendering of compile errors, plus the JSON form used by
//! `asyncifyc --json`.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use asyncify_common::span::Span;
use rowan::TextRange;
use serde_json::{json, Value};

use crate::error::{CompileError, RewriteError};

/// Rendering switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticOptions {
    /// ANSI colors. Off for tests and redirected output.
    pub color: bool,
    /// Emit JSON instead of a rendered report (consulted by the CLI).
    pub json: bool,
}

impl DiagnosticOptions {
    pub fn colorless() -> Self {
        Self::default()
    }
}

// ── Codes and spans ────────────────────────────────────────────────────

fn error_code(err: &CompileError) -> &'static str {
    match err {
        CompileError::Parse(_) => "P0001",
        CompileError::Rewrite(RewriteError::UnresolvedAsyncDynamicAccess { .. }) => "A0001",
        CompileError::Rewrite(RewriteError::AmbiguousConditionalReturnType { .. }) => "A0002",
    }
}

fn text_range_to_range(range: TextRange) -> Range<usize> {
    range.start().into()..range.end().into()
}

fn span_to_range(span: Span) -> Range<usize> {
    span.into()
}

/// A labeled span in the JSON output.
struct LabeledSpan {
    range: Range<usize>,
    label: String,
}

/// Primary message, labeled spans (primary first) and help text.
fn describe(err: &CompileError) -> (String, Vec<LabeledSpan>, Option<String>) {
    match err {
        CompileError::Parse(errors) => {
            let Some(first) = errors.first() else {
                return ("syntax error".to_string(), Vec::new(), None);
            };
            let mut spans = vec![LabeledSpan {
                range: span_to_range(first.span),
                label: first.message.clone(),
            }];
            if let Some((message, span)) = &first.related {
                spans.push(LabeledSpan {
                    range: span_to_range(*span),
                    label: message.clone(),
                });
            }
            (first.message.clone(), spans, None)
        }
        CompileError::Rewrite(rewrite) => match rewrite {
            RewriteError::UnresolvedAsyncDynamicAccess {
                object_type,
                hint,
                span,
            } => (
                rewrite.message().to_string(),
                vec![LabeledSpan {
                    range: text_range_to_range(*span),
                    label: format!("dynamic access on `{object_type}`"),
                }],
                hint.clone(),
            ),
            RewriteError::AmbiguousConditionalReturnType { span, returns } => {
                let mut spans = vec![LabeledSpan {
                    range: text_range_to_range(*span),
                    label: "return type depends on which branch runs".to_string(),
                }];
                spans.extend(returns.iter().map(|r| LabeledSpan {
                    range: text_range_to_range(*r),
                    label: "returns here".to_string(),
                }));
                (
                    rewrite.message().to_string(),
                    spans,
                    Some("return the same shell API type from every branch, or await it explicitly".to_string()),
                )
            }
        },
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Render a compile error as a labeled report.
///
/// The filename is part of the report header; colors follow `options.color`.
pub fn render_diagnostic(
    err: &CompileError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    let config = Config::default().with_color(options.color);
    let source_len = source.len();

    // ariadne needs a non-empty span inside the source.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s.saturating_sub(usize::from(s == source_len && s > 0))..(e + 1).min(source_len)
        } else {
            s..e
        }
    };

    let (message, spans, help) = describe(err);
    let primary = spans
        .first()
        .map(|s| clamp(s.range.clone()))
        .unwrap_or(0..source_len.min(1));

    let mut builder = Report::build(ReportKind::Error, (filename, primary))
        .with_code(error_code(err))
        .with_message(&message)
        .with_config(config);
    for (i, span) in spans.iter().enumerate() {
        let color = if i == 0 { Color::Red } else { Color::Blue };
        builder.add_label(
            Label::new((filename, clamp(span.range.clone())))
                .with_message(&span.label)
                .with_color(color),
        );
    }
    if let Some(help) = help {
        builder.set_help(help);
    }

    let mut buf = Vec::new();
    if builder
        .finish()
        .write((filename, Source::from(source)), &mut buf)
        .is_err()
    {
        return format!("error[{}]: {}", error_code(err), message);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// One JSON object per error, in the compiler CLI's diagnostic shape.
pub fn render_json(err: &CompileError, filename: &str) -> Vec<Value> {
    let (message, spans, help) = describe(err);
    let spans: Vec<Value> = spans
        .iter()
        .map(|s| json!({ "start": s.range.start, "end": s.range.end, "label": s.label }))
        .collect();
    vec![json!({
        "code": error_code(err),
        "severity": "error",
        "message": message,
        "file": filename,
        "spans": spans,
        "fix": help,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncify_parser::ParseError;

    #[test]
    fn parse_error_uses_p_code_and_related_label() {
        let err = CompileError::Parse(vec![ParseError::with_related(
            "expected `}`",
            Span::new(9, 9),
            "block opened here",
            Span::new(0, 1),
        )]);
        let out = render_diagnostic(&err, "{ let a\n\n", "a.js", &DiagnosticOptions::colorless());
        assert!(out.contains("[P0001]"), "{out}");
        assert!(out.contains("block opened here"), "{out}");
    }

    #[test]
    fn json_shape() {
        let err = CompileError::Rewrite(RewriteError::UnresolvedAsyncDynamicAccess {
            object_type: "Collection".to_string(),
            hint: None,
            span: TextRange::new(0.into(), 10.into()),
        });
        let values = render_json(&err, "in.js");
        assert_eq!(values.len(), 1);
        let v = &values[0];
        assert_eq!(v["code"], "A0001");
        assert_eq!(v["severity"], "error");
        assert_eq!(v["file"], "in.js");
        assert_eq!(v["spans"][0]["start"], 0);
        assert_eq!(v["spans"][0]["end"], 10);
        assert_eq!(v["spans"][0]["label"], "dynamic access on `Collection`");
        assert!(v["fix"].is_null());
    }

    #[test]
    fn empty_source_does_not_panic() {
        let err = CompileError::Parse(vec![ParseError::new("expected expression", Span::empty_at(0))]);
        let out = render_diagnostic(&err, "", "empty.js", &DiagnosticOptions::colorless());
        assert!(out.contains("expected expression"));
    }
}
