use crate::model::Report;
use crate::{ReportError, ReportWriter};

pub const TEXT_FILE_NAME: &str = "ustva_zusammenfassung.txt";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Plain-text rendering for terminals and logs.
#[derive(Debug, Clone, Default)]
pub struct TextWriter;

impl TextWriter {
    pub fn render(report: &Report) -> String {
        let mut out = String::new();
        underline(&mut out, report.title(), '=');
        for section in report.sections() {
            out.push('\n');
            underline(&mut out, &section.heading, '-');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

fn underline(out: &mut String, text: &str, rule: char) {
    out.push_str(text);
    out.push('\n');
    out.extend(std::iter::repeat(rule).take(text.chars().count()));
    out.push('\n');
}

impl ReportWriter for TextWriter {
    fn file_name(&self) -> &str {
        TEXT_FILE_NAME
    }

    fn content_type(&self) -> &'static str {
        TEXT_CONTENT_TYPE
    }

    fn write(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        Ok(Self::render(report).into_bytes())
    }
}
