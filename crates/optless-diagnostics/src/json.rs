// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for tools.

use optless_ast::LineMap;
use serde::Serialize;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// All diagnostics of one unit.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version.
    pub version: u32,
    pub file: String,
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Registry category of the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Line and column, both 1-based.
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub role: LabelStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let line_map = LineMap::new(source);
    let locate = |offset: usize| {
        let (line, column) = line_map.line_col(offset);
        SourceLocation {
            line,
            column,
            byte_offset: offset,
            source_line: line_map.line_text(source, line).unwrap_or("").to_string(),
        }
    };

    let diagnostics: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|diag| {
            let code = diag.code.as_ref().map(|c| c.0.clone());
            JsonDiagnostic {
                severity: diag.severity,
                category: code
                    .as_deref()
                    .and_then(|c| registry.get(c))
                    .map(|info| info.category.to_string()),
                code,
                message: diag.message.clone(),
                location: diag.primary_span().map(|span| locate(span.start)),
                labels: diag
                    .labels
                    .iter()
                    .map(|label| JsonLabel {
                        role: label.style,
                        message: label.message.clone(),
                        start: locate(label.span.start),
                        end: locate(label.span.end),
                    })
                    .collect(),
                notes: diag.notes.clone(),
                help: diag.help.clone(),
            }
        })
        .collect();

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics,
        error_count,
        warning_count,
    }
}

/// Serialize a report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use optless_ast::Span;

    #[test]
    fn report_locates_labels_and_categorizes_codes() {
        let source = "int x;\nOptional raw;\n";
        let start = source.find("raw").unwrap();
        let diag = Diagnostic::error("cannot infer the element type of `raw`")
            .with_code("E0910")
            .with_primary(Span::new(start, start + 3), "declared with a raw wrapper type");
        let report = to_json_report(&[diag], source, "Raw.java");

        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        let json: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();
        let first = &json["diagnostics"][0];
        assert_eq!(first["category"], "Inference");
        assert_eq!(first["location"]["line"], 2);
        assert_eq!(first["location"]["column"], 10);
        assert_eq!(first["labels"][0]["role"], "primary");
        assert_eq!(first["location"]["source_line"], "Optional raw;");
    }
}
