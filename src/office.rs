//! Plain-text extraction from OpenXML (`.docx`) and OpenDocument (`.odt`) files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::LoadError;

/// Where the body text lives in a container and which elements end a
/// paragraph, break a line or stand for a space.
struct Layout {
    format: &'static str,
    entry: &'static str,
    paragraph_ends: &'static [&'static [u8]],
    line_breaks: &'static [&'static [u8]],
    spaces: &'static [&'static [u8]],
}

const DOCX: Layout = Layout {
    format: ".docx",
    entry: "word/document.xml",
    paragraph_ends: &[b"p"],
    line_breaks: &[b"br", b"cr"],
    spaces: &[b"tab"],
};

const ODT: Layout = Layout {
    format: ".odt",
    entry: "content.xml",
    paragraph_ends: &[b"p", b"h"],
    line_breaks: &[b"line-break"],
    spaces: &[b"tab", b"s"],
};

pub fn extract_text_from_docx(path: &Path) -> Result<String, LoadError> {
    extract(path, &DOCX)
}

pub fn extract_text_from_odt(path: &Path) -> Result<String, LoadError> {
    extract(path, &ODT)
}

fn extract(path: &Path, layout: &Layout) -> Result<String, LoadError> {
    let fmt = layout.format;
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| LoadError::Office(format!("{fmt} is not a valid archive: {e}")))?;
    let mut entry = archive
        .by_name(layout.entry)
        .map_err(|_| LoadError::Office(format!("{fmt} has no {}", layout.entry)))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| LoadError::Office(format!("reading {} failed: {e}", layout.entry)))?;
    body_text(&xml, layout)
}

fn body_text(xml: &str, layout: &Layout) -> Result<String, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                if layout.line_breaks.contains(&name.as_ref()) {
                    out.push('\n');
                } else if layout.spaces.contains(&name.as_ref()) {
                    out.push(' ');
                }
            }
            Ok(Event::End(e)) => {
                if layout.paragraph_ends.contains(&e.local_name().as_ref()) {
                    out.push('\n');
                }
            }
            Ok(Event::Text(t)) => out.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::CData(t)) => out.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::GeneralRef(r)) => {
                if let Some(c) = resolve_entity(&String::from_utf8_lossy(&r)) {
                    out.push(c);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(LoadError::Office(format!(
                    "{} XML is malformed: {e}",
                    layout.format
                )));
            }
            _ => {}
        }
    }
    Ok(tidy_lines(&out))
}

/// Predefined XML entities and numeric character references.
fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Trims every line and drops empty ones.
fn tidy_lines(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
