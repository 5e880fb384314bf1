use super::{type_is_one_of, FieldFormatter};
use crate::record::Field;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

const SUPPORTED_TYPES: &[&str] = &["Layout", "Tracking", "Rules"];

/// Pretty-prints XML-valued fields so that changes diff line by line.
/// Values that are not well-formed XML are stored untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatter;

impl FieldFormatter for XmlFormatter {
    fn can_format(&self, field: &Field) -> bool {
        type_is_one_of(field, SUPPORTED_TYPES)
    }

    fn format(&self, field: &Field) -> String {
        let Some(events) = parse(&field.value) else {
            if !field.value.trim().is_empty() {
                log::warn!(
                    "Field {} ({}) is not valid XML; storing it unformatted",
                    field.id,
                    field.name_hint
                );
            }
            return field.value.clone();
        };
        if !is_indentable(&events) {
            // Indenting would change whitespace that belongs to the content
            return write(&events, false).unwrap_or_else(|| field.value.clone());
        }
        write(&events, true).unwrap_or_else(|| field.value.clone())
    }

    fn unformat(&self, value: &str) -> Option<String> {
        if value.trim().is_empty() {
            return None;
        }
        let Some(events) = parse(value) else {
            log::warn!("Stored XML value is not well-formed; loading it unformatted");
            return Some(value.to_string());
        };

        // Only whitespace that `format` itself added is removed.
        let compact: Vec<Event> = events.iter().filter(|e| !is_blank_text(e)).cloned().collect();
        if is_indentable(&compact) && write(&compact, true).as_deref() == Some(value) {
            return write(&compact, false);
        }
        Some(write(&events, false).unwrap_or_else(|| value.to_string()))
    }
}

/// Read every event of a well-formed document. The XML declaration and
/// whitespace outside the root element are dropped. Returns `None` if the
/// input is not a well-formed document.
fn parse(value: &str) -> Option<Vec<Event<'_>>> {
    let mut reader = Reader::from_str(value);
    reader.config_mut().trim_text(false);

    let mut events = Vec::new();
    let mut depth: usize = 0;
    let mut saw_element = false;
    loop {
        let event = reader.read_event().ok()?;
        match &event {
            Event::Eof => break,
            Event::Decl(_) => continue,
            Event::Start(_) => {
                depth += 1;
                saw_element = true;
            }
            Event::End(_) => depth = depth.checked_sub(1)?,
            Event::Empty(_) => saw_element = true,
            Event::Text(_) if depth == 0 => {
                if is_blank_text(&event) {
                    continue;
                }
                return None;
            }
            _ => {}
        }
        events.push(event);
    }

    if depth != 0 || !saw_element {
        return None;
    }
    Some(events)
}

fn write(events: &[Event<'_>], indent: bool) -> Option<String> {
    let mut writer = if indent {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };
    for event in events {
        writer.write_event(event.clone()).ok()?;
    }
    String::from_utf8(writer.into_inner()).ok()
}

fn is_blank_text(event: &Event<'_>) -> bool {
    matches!(event, Event::Text(text) if text.iter().all(u8::is_ascii_whitespace))
}

/// A document can be indented without touching its content when it has no
/// whitespace-only text and every text node is the only child of its element.
fn is_indentable(events: &[Event<'_>]) -> bool {
    events.iter().enumerate().all(|(i, event)| match event {
        Event::Text(_) | Event::CData(_) => {
            !is_blank_text(event)
                && i > 0
                && matches!(events[i - 1], Event::Start(_))
                && matches!(events.get(i + 1), Some(Event::End(_)))
        }
        _ => true,
    })
}
