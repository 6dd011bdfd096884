//! Styles part (word/styles.xml), carried opaquely.
//!
//! No style resolution happens in this crate: an opened document's styles
//! round-trip byte-for-byte, and a new document gets a minimal built-in
//! stylesheet. Only the relationship wiring is managed here.

/// The styles part as raw bytes
#[derive(Clone, Debug)]
pub struct Styles {
    data: Vec<u8>,
}

impl Styles {
    /// The built-in stylesheet for new documents: document defaults plus
    /// the Normal and heading styles the paragraph API refers to.
    pub fn built_in() -> Self {
        Styles {
            data: BUILT_IN_STYLES.as_bytes().to_vec(),
        }
    }

    /// Wrap the bytes of an existing styles part, unexamined
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Styles { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::built_in()
    }
}

const BUILT_IN_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault>
      <w:rPr>
        <w:rFonts w:ascii="Calibri" w:eastAsia="Calibri" w:hAnsi="Calibri"/>
        <w:sz w:val="22"/>
      </w:rPr>
    </w:rPrDefault>
    <w:pPrDefault>
      <w:pPr>
        <w:spacing w:after="160" w:line="259" w:lineRule="auto"/>
      </w:pPr>
    </w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:spacing w:before="240" w:after="0"/>
      <w:outlineLvl w:val="0"/>
    </w:pPr>
    <w:rPr>
      <w:b/>
      <w:sz w:val="32"/>
    </w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:basedOn w:val="Normal"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:spacing w:before="200" w:after="0"/>
      <w:outlineLvl w:val="1"/>
    </w:pPr>
    <w:rPr>
      <w:b/>
      <w:sz w:val="26"/>
    </w:rPr>
  </w:style>
</w:styles>
"#;
