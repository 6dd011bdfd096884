//! Footnote and endnote parts (word/footnotes.xml, word/endnotes.xml)

use crate::document::{Paragraph, Run, RunContent};
use crate::error::Result;
use crate::xml::{get_w_attr, part_namespaces, skip_element};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Which of the two note parts this is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteKind {
    Footnote,
    Endnote,
}

impl NoteKind {
    /// Root element name (w:footnotes / w:endnotes)
    pub fn root_element(&self) -> &'static str {
        match self {
            NoteKind::Footnote => "w:footnotes",
            NoteKind::Endnote => "w:endnotes",
        }
    }

    /// Entry element name (w:footnote / w:endnote)
    pub fn entry_element(&self) -> &'static str {
        match self {
            NoteKind::Footnote => "w:footnote",
            NoteKind::Endnote => "w:endnote",
        }
    }

    fn entry_local(&self) -> &'static [u8] {
        match self {
            NoteKind::Footnote => b"footnote",
            NoteKind::Endnote => b"endnote",
        }
    }

    fn root_local(&self) -> &'static [u8] {
        match self {
            NoteKind::Footnote => b"footnotes",
            NoteKind::Endnote => b"endnotes",
        }
    }
}

/// One note entry
#[derive(Clone, Debug)]
pub struct Note {
    pub id: i64,
    /// "separator" / "continuationSeparator" for the reserved entries,
    /// None for regular user notes
    pub note_type: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

impl Note {
    /// A regular user note with one paragraph of text
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Note {
            id,
            note_type: None,
            paragraphs: vec![Paragraph::new(text)],
        }
    }

    fn reserved(id: i64, note_type: &str, content: RunContent) -> Self {
        let mut para = Paragraph::default();
        para.add_run(Run {
            properties: None,
            content: Some(content),
        });
        Note {
            id,
            note_type: Some(note_type.to_string()),
            paragraphs: vec![para],
        }
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The content of a note part, footnotes or endnotes
#[derive(Clone, Debug)]
pub struct Notes {
    pub kind: NoteKind,
    pub notes: Vec<Note>,
}

impl Notes {
    /// A new part seeded with the reserved separator entries (ids 0 and 1)
    pub fn new(kind: NoteKind) -> Self {
        Notes {
            kind,
            notes: vec![
                Note::reserved(0, "separator", RunContent::Separator),
                Note::reserved(1, "continuationSeparator", RunContent::ContinuationSeparator),
            ],
        }
    }

    /// Parse a note part from its XML bytes
    pub fn from_xml(kind: NoteKind, xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut notes = Notes { kind, notes: Vec::new() };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    if local.as_ref() == kind.entry_local() {
                        let id = get_w_attr(&e, "id")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                        let note_type = get_w_attr(&e, "type");
                        let paragraphs = parse_note_body(&mut reader, kind)?;
                        notes.notes.push(Note {
                            id,
                            note_type,
                            paragraphs,
                        });
                    } else if local.as_ref() == kind.root_local() {
                        // Root element, descend.
                    } else {
                        skip_element(&mut reader, &e)?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(notes)
    }

    /// Serialize to part bytes
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut root = BytesStart::new(self.kind.root_element());
        for (name, value) in part_namespaces() {
            root.push_attribute((name, value));
        }
        writer.write_event(Event::Start(root))?;

        for note in &self.notes {
            let mut entry = BytesStart::new(self.kind.entry_element());
            if let Some(note_type) = &note.note_type {
                entry.push_attribute(("w:type", note_type.as_str()));
            }
            entry.push_attribute(("w:id", note.id.to_string().as_str()));
            writer.write_event(Event::Start(entry))?;
            for para in &note.paragraphs {
                para.write_to(&mut writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.kind.entry_element())))?;
        }

        writer.write_event(Event::End(BytesEnd::new(self.kind.root_element())))?;
        Ok(writer.into_inner().into_inner())
    }

    /// Append a user note
    pub fn add(&mut self, note: Note) -> &mut Note {
        self.notes.push(note);
        match self.notes.last_mut() {
            Some(note) => note,
            None => unreachable!("just pushed a note"),
        }
    }

    /// Look up a note by id
    pub fn get(&self, id: i64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Ids of every note, for allocator seeding
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.notes.iter().map(|n| n.id)
    }

    /// Regular notes only, skipping the reserved separator entries
    pub fn user_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| n.note_type.is_none())
    }
}

fn parse_note_body<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    kind: NoteKind,
) -> Result<Vec<Paragraph>> {
    let mut paragraphs = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                if name.local_name().as_ref() == b"p" {
                    paragraphs.push(Paragraph::from_reader(reader, &e)?);
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Event::Empty(e) => {
                if e.name().local_name().as_ref() == b"p" {
                    paragraphs.push(Paragraph::default());
                }
            }
            Event::End(e) => {
                if e.name().local_name().as_ref() == kind.entry_local() {
                    break;
                }
            }
            Event::Eof => {
                return Err(crate::error::Error::InvalidDocument(
                    "unexpected EOF inside a note entry".into(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
