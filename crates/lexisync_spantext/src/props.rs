//! Text property identifiers.
//!
//! Integer and string properties live in separate id spaces, so the same
//! number can name an integer property and a string property at once
//! (`1` is both the writing system and the font family).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a text property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u32);

impl PropertyId {
    /// Writing system (integer).
    pub const WS: PropertyId = PropertyId(1);
    /// Superscript/subscript (integer).
    pub const SUPERSCRIPT: PropertyId = PropertyId(4);
    /// Paragraph alignment (integer).
    pub const ALIGN: PropertyId = PropertyId(17);
    /// First-line indent in millipoints (integer).
    pub const FIRST_INDENT: PropertyId = PropertyId(18);

    /// Font family (string).
    pub const FONT_FAMILY: PropertyId = PropertyId(1);
    /// Character style (string).
    pub const CHAR_STYLE: PropertyId = PropertyId(2);
    /// Paragraph style (string).
    pub const PARA_STYLE: PropertyId = PropertyId(3);
    /// Embedded object data (string, hex-escaped on the wire).
    pub const OBJ_DATA: PropertyId = PropertyId(6);
    /// Named style (string, carried as `styleName_*`).
    pub const NAMED_STYLE: PropertyId = PropertyId(133);

    /// Returns the raw numeric id.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value of an integer property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntProperty {
    /// Property value.
    pub value: i32,
    /// Variation (unit or interpretation of the value).
    pub variation: i32,
}

impl IntProperty {
    /// Variation for plain values.
    pub const DEFAULT_VARIATION: i32 = 0;
    /// Variation for values in millipoints.
    pub const MILLI_POINT: i32 = 1;

    /// Creates a new integer property value.
    pub fn new(value: i32, variation: i32) -> Self {
        Self { value, variation }
    }
}

const UNKNOWN_NAME: &str = "ktptUnknown";

/// Returns the wire name of an integer property.
///
/// Names are informational; the decoder only reads the numeric id.
pub fn int_property_name(id: PropertyId) -> &'static str {
    match id.0 {
        1 => "ktptWs",
        4 => "ktptSuperscript",
        17 => "ktptAlign",
        18 => "ktptFirstIndent",
        _ => UNKNOWN_NAME,
    }
}

/// Returns the wire name of a string property.
pub fn string_property_name(id: PropertyId) -> &'static str {
    match id.0 {
        1 => "ktptFontFamily",
        2 => "ktptCharStyle",
        3 => "ktptParaStyle",
        6 => "ktptObjData",
        133 => "ktptNamedStyle",
        _ => UNKNOWN_NAME,
    }
}
