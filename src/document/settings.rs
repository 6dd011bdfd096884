//! Document settings part (word/settings.xml)

use crate::error::Result;
use crate::xml::{get_w_val, part_namespaces, skip_element};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Document-wide settings.
///
/// Regenerated on save when present; anything not modeled here is dropped
/// on decode.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    /// Default tab stop in twips
    pub default_tab_stop: Option<u32>,
    /// Footnote numbering configuration (w:footnotePr)
    pub footnotes: Option<NoteNumbering>,
    /// Endnote numbering configuration (w:endnotePr)
    pub endnotes: Option<NoteNumbering>,
}

/// Numbering configuration for one note kind
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteNumbering {
    /// Number format (e.g. "decimal", "lowerRoman")
    pub number_format: Option<String>,
    /// Restart rule ("continuous", "eachSect", "eachPage")
    pub restart: Option<String>,
    /// Placement ("pageBottom", "docEnd", ...)
    pub position: Option<String>,
}

impl Settings {
    /// Settings for a fresh document
    pub fn new() -> Self {
        Settings {
            default_tab_stop: Some(708),
            ..Default::default()
        }
    }

    /// Parse from part bytes
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut settings = Settings::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"settings" => {}
                        b"footnotePr" => {
                            settings.footnotes = Some(parse_note_numbering(&mut reader, b"footnotePr")?)
                        }
                        b"endnotePr" => {
                            settings.endnotes = Some(parse_note_numbering(&mut reader, b"endnotePr")?)
                        }
                        _ => skip_element(&mut reader, &e)?,
                    }
                }
                Event::Empty(e) => {
                    if e.name().local_name().as_ref() == b"defaultTabStop" {
                        settings.default_tab_stop = get_w_val(&e).and_then(|v| v.parse().ok());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(settings)
    }

    /// Serialize to part bytes
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut root = BytesStart::new("w:settings");
        for (name, value) in part_namespaces() {
            root.push_attribute((name, value));
        }
        writer.write_event(Event::Start(root))?;

        if let Some(tab) = self.default_tab_stop {
            let mut elem = BytesStart::new("w:defaultTabStop");
            elem.push_attribute(("w:val", tab.to_string().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        write_note_numbering(&mut writer, "w:footnotePr", self.footnotes.as_ref())?;
        write_note_numbering(&mut writer, "w:endnotePr", self.endnotes.as_ref())?;

        writer.write_event(Event::End(BytesEnd::new("w:settings")))?;
        Ok(writer.into_inner().into_inner())
    }
}

fn parse_note_numbering<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    end: &[u8],
) -> Result<NoteNumbering> {
    let mut numbering = NoteNumbering::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => skip_element(reader, &e)?,
            Event::Empty(e) => {
                let name = e.name();
                match name.local_name().as_ref() {
                    b"numFmt" => numbering.number_format = get_w_val(&e),
                    b"numRestart" => numbering.restart = get_w_val(&e),
                    b"pos" => numbering.position = get_w_val(&e),
                    _ => {}
                }
            }
            Event::End(e) if e.name().local_name().as_ref() == end => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(numbering)
}

fn write_note_numbering<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    numbering: Option<&NoteNumbering>,
) -> Result<()> {
    let Some(numbering) = numbering else {
        return Ok(());
    };

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    if let Some(pos) = &numbering.position {
        let mut elem = BytesStart::new("w:pos");
        elem.push_attribute(("w:val", pos.as_str()));
        writer.write_event(Event::Empty(elem))?;
    }
    if let Some(fmt) = &numbering.number_format {
        let mut elem = BytesStart::new("w:numFmt");
        elem.push_attribute(("w:val", fmt.as_str()));
        writer.write_event(Event::Empty(elem))?;
    }
    if let Some(restart) = &numbering.restart {
        let mut elem = BytesStart::new("w:numRestart");
        elem.push_attribute(("w:val", restart.as_str()));
        writer.write_event(Event::Empty(elem))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut settings = Settings::new();
        settings.footnotes = Some(NoteNumbering {
            number_format: Some("lowerRoman".into()),
            restart: Some("eachSect".into()),
            position: Some("pageBottom".into()),
        });

        let xml = String::from_utf8(settings.to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"<w:defaultTabStop w:val="708"/>"#));
        assert!(xml.contains(r#"<w:numFmt w:val="lowerRoman"/>"#));

        let settings2 = Settings::from_xml(&xml).unwrap();
        assert_eq!(settings2.default_tab_stop, Some(708));
        assert_eq!(settings2.footnotes, settings.footnotes);
        assert_eq!(settings2.endnotes, None);
    }

    #[test]
    fn test_unknown_settings_dropped() {
        let xml = r#"<w:settings xmlns:w="x"><w:compat><w:useFELayout/></w:compat><w:defaultTabStop w:val="420"/></w:settings>"#;
        let settings = Settings::from_xml(xml).unwrap();
        assert_eq!(settings.default_tab_stop, Some(420));

        let out = String::from_utf8(settings.to_xml().unwrap()).unwrap();
        assert!(!out.contains("compat"));
    }
}
