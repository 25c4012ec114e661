//! Source-annotated listing of the placeholders in a template

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use super::scanner::{scan, Segment};

/// Render a report that points at every placeholder in `template`
///
/// Each token is labelled with its name and, when present, its default.
/// A template without placeholders produces a one-line note instead.
pub fn placeholder_report(
    template: &str,
    source_name: &str,
    color: bool,
) -> std::io::Result<String> {
    let labels: Vec<_> = scan(template)
        .filter_map(|segment| match segment {
            Segment::Placeholder {
                name,
                default,
                span,
            } => Some((name, default, span)),
            Segment::Literal(_) => None,
        })
        .collect();

    if labels.is_empty() {
        return Ok(format!("{}: no placeholders\n", source_name));
    }

    let message = match labels.len() {
        1 => "1 placeholder".to_string(),
        n => format!("{} placeholders", n),
    };

    let mut buf = Vec::new();
    Report::build(ReportKind::Advice, source_name, labels[0].2.start)
        .with_config(
            Config::default()
                .with_color(color)
                .with_index_type(IndexType::Byte),
        )
        .with_message(message)
        .with_labels(labels.into_iter().map(|(name, default, span)| {
            let (text, tint) = match default {
                Some(value) => (format!("{} (default: {})", name, value), Color::Green),
                None => (name.to_string(), Color::Yellow),
            };
            Label::new((source_name, span))
                .with_message(text)
                .with_color(tint)
        }))
        .finish()
        .write((source_name, Source::from(template)), &mut buf)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
