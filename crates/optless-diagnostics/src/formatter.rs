// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! error[E0900]: no transformer handles `Optional.equals`
//!   --> Names.java:4:16
//!     |
//!   4 |         return a.equals(b);
//!     |                ^^^^^^^^^^^ wrapper call with no rewrite
//!     |
//!     = note: `equals` is not part of the supported wrapper surface
//!     = help: compare the wrapped values instead
//! ```

use std::collections::BTreeMap;

use colored::Colorize;
use optless_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(first) = annotated.first() else {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        };

        let first_col = diagnostic
            .primary_span()
            .map(|span| self.line_map.line_col(span.start).1)
            .unwrap_or(1);
        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);
        out.push_str(&format!(
            "{}{} {}:{}:{}\n",
            " ".repeat(gutter_width),
            "-->".blue(),
            self.file_name.unwrap_or("<source>"),
            first.line_num,
            first_col
        ));
        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));

        let mut prev_line_num: Option<usize> = None;
        for line in &annotated {
            if let Some(prev) = prev_line_num {
                if line.line_num > prev + 1 {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
            }
            out.push_str(&format!(
                "{:>width$} {} {}\n",
                line.line_num.to_string().blue().bold(),
                "|".blue(),
                line.text,
                width = gutter_width + 1,
            ));
            self.format_annotations(&mut out, line, gutter_width);
            prev_line_num = Some(line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic, gutter_width);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };
        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code.0.as_str().red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "help".cyan().bold(),
                help
            ));
        }
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.line_map.line_col(label.span.start);
            let (end_line, col_end) = self.line_map.line_col(label.span.end);
            let text = self.line_map.line_text(self.source, line_num).unwrap_or("");

            // multi-line spans are underlined to the end of their first line
            let col_end = if end_line == line_num {
                col_end
            } else {
                text.len() + 1
            };

            let entry = lines.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: text.to_string(),
                annotations: Vec::new(),
            });
            entry.annotations.push(Annotation {
                col_start,
                col_end: col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
        sorted.sort_by_key(|a| (a.style == LabelStyle::Secondary, a.col_start));

        let width = line.text.len() + 10;
        let mut underline = vec![' '; width];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();
        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            for slot in underline
                .iter_mut()
                .take(ann.col_end.saturating_sub(1).min(width))
                .skip(ann.col_start - 1)
            {
                *slot = ch;
            }
            if let Some(msg) = &ann.message {
                messages.push((ann.col_start, ann.style, msg));
            }
        }

        let underline: String = underline.iter().collect::<String>().trim_end().to_string();
        if underline.is_empty() {
            return;
        }
        let pad = " ".repeat(gutter_width + 1);
        let colored_underline = color_underline(&underline);

        match messages.as_slice() {
            [] => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline)),
            [(_, style, msg)] => out.push_str(&format!(
                "{} {} {} {}\n",
                pad,
                "|".blue(),
                colored_underline,
                style_message(*style, msg)
            )),
            _ => {
                out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline));
                for (col, style, msg) in messages.iter().rev() {
                    out.push_str(&format!(
                        "{} {} {}{}\n",
                        pad,
                        "|".blue(),
                        " ".repeat(col.saturating_sub(1)),
                        style_message(*style, msg)
                    ));
                }
            }
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color runs of `^` red and runs of `-` blue.
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut run = String::new();
    let mut current = None;

    for ch in s.chars() {
        let kind = matches!(ch, '^' | '-').then_some(ch);
        if kind != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}
