//! Table-related types and enums

/// Grid column definition
#[derive(Clone, Debug, Default)]
pub struct GridColumn {
    /// Width in twips
    pub width: Option<i32>,
}

/// Address of a cell inside a table, row-major
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        CellAddress { row, col }
    }
}

/// Vertical merge type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VMerge {
    /// Start of a new vertical merge group
    Restart,
    /// Continuation of a vertical merge
    Continue,
}

/// Table width specification
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TableWidth {
    /// Automatic width
    #[default]
    Auto,
    /// Width as percentage (0.0 - 100.0)
    Percent(f64),
    /// Width in twips (1/20 of a point)
    Twips(i32),
}

impl TableWidth {
    /// OOXML (value, type) attribute pair for w:tblW / w:tcW
    pub fn to_attrs(&self) -> (String, &'static str) {
        match self {
            TableWidth::Auto => ("0".to_string(), "auto"),
            // Percent is stored in fiftieths of a percent.
            TableWidth::Percent(p) => (((p * 50.0).round() as i64).to_string(), "pct"),
            TableWidth::Twips(t) => (t.to_string(), "dxa"),
        }
    }

    /// Parse from OOXML (value, type) attribute pair
    pub fn parse(value: Option<&str>, kind: Option<&str>) -> Self {
        match kind {
            Some("pct") => value
                .and_then(|v| v.parse::<f64>().ok())
                .map(|v| TableWidth::Percent(v / 50.0))
                .unwrap_or_default(),
            Some("dxa") => value
                .and_then(|v| v.parse().ok())
                .map(TableWidth::Twips)
                .unwrap_or_default(),
            _ => TableWidth::Auto,
        }
    }
}

/// Table alignment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableAlignment {
    /// Left aligned (default)
    #[default]
    Left,
    /// Center aligned
    Center,
    /// Right aligned
    Right,
}

impl TableAlignment {
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => TableAlignment::Center,
            "right" | "end" => TableAlignment::Right,
            _ => TableAlignment::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableAlignment::Left => "left",
            TableAlignment::Center => "center",
            TableAlignment::Right => "right",
        }
    }
}

/// Vertical alignment for table cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    /// Top aligned (default)
    #[default]
    Top,
    /// Center aligned
    Center,
    /// Bottom aligned
    Bottom,
}

impl VerticalAlignment {
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => VerticalAlignment::Center,
            "bottom" => VerticalAlignment::Bottom,
            _ => VerticalAlignment::Top,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
        }
    }
}

/// Cell text flow direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextDirection {
    /// Left to right, top to bottom (default)
    #[default]
    Horizontal,
    /// Top to bottom, right to left
    TopToBottomRightToLeft,
    /// Bottom to top, left to right
    BottomToTopLeftToRight,
}

impl TextDirection {
    pub fn parse(s: &str) -> Self {
        match s {
            "tbRl" => TextDirection::TopToBottomRightToLeft,
            "btLr" => TextDirection::BottomToTopLeftToRight,
            _ => TextDirection::Horizontal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Horizontal => "lrTb",
            TextDirection::TopToBottomRightToLeft => "tbRl",
            TextDirection::BottomToTopLeftToRight => "btLr",
        }
    }
}

/// A single border edge (style, width in eighths of a point, hex color)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorderEdge {
    pub style: String,
    pub size: u32,
    pub color: String,
}

impl Default for BorderEdge {
    fn default() -> Self {
        BorderEdge {
            style: "single".to_string(),
            size: 4,
            color: "auto".to_string(),
        }
    }
}

/// Borders of a table (outer edges plus inside rules)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableBorders {
    pub top: Option<BorderEdge>,
    pub left: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub inside_h: Option<BorderEdge>,
    pub inside_v: Option<BorderEdge>,
}

impl TableBorders {
    /// All six edges set to the same single-line border
    pub fn all(edge: BorderEdge) -> Self {
        TableBorders {
            top: Some(edge.clone()),
            left: Some(edge.clone()),
            bottom: Some(edge.clone()),
            right: Some(edge.clone()),
            inside_h: Some(edge.clone()),
            inside_v: Some(edge),
        }
    }
}

/// Borders of a single cell
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellBorders {
    pub top: Option<BorderEdge>,
    pub left: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
}

/// Cell interior margins in twips
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellMargins {
    pub top: Option<u32>,
    pub left: Option<u32>,
    pub bottom: Option<u32>,
    pub right: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_width_attrs() {
        assert_eq!(TableWidth::Auto.to_attrs(), ("0".to_string(), "auto"));
        assert_eq!(
            TableWidth::Percent(100.0).to_attrs(),
            ("5000".to_string(), "pct")
        );
        assert_eq!(
            TableWidth::Twips(2400).to_attrs(),
            ("2400".to_string(), "dxa")
        );
    }

    #[test]
    fn test_table_width_parse_roundtrip() {
        let w = TableWidth::Percent(50.0);
        let (v, k) = w.to_attrs();
        assert_eq!(TableWidth::parse(Some(&v), Some(k)), w);
    }

    #[test]
    fn test_text_direction() {
        assert_eq!(TextDirection::parse("tbRl"), TextDirection::TopToBottomRightToLeft);
        assert_eq!(TextDirection::parse("anything"), TextDirection::Horizontal);
        assert_eq!(TextDirection::BottomToTopLeftToRight.as_str(), "btLr");
    }
}
