use serde::{Deserialize, Serialize};

/// Built-in type of a leaf or leaf-list.
///
/// Values are validated and canonicalized through [`LeafType::parse`]; the
/// canonical text is what ends up stored in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafType {
    String,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Enumeration(Vec<String>),
    /// A leaf whose presence is its only information; it never has a value.
    Empty,
    /// A value constrained to exist at `path` in the data tree.
    Leafref { path: String },
}

impl LeafType {
    /// Resolves a type by its YANG built-in name.
    ///
    /// `enumeration` needs its members and `leafref` its path; both are
    /// taken from the extra arguments.
    pub fn from_name(name: &str, path: Option<&str>, enums: &[String]) -> Option<Self> {
        let ty = match name {
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "empty" => Self::Empty,
            "enumeration" if !enums.is_empty() => Self::Enumeration(enums.to_vec()),
            "leafref" => Self::Leafref {
                path: path?.to_string(),
            },
            _ => return None,
        };
        Some(ty)
    }

    /// Returns true for the `empty` type.
    pub fn is_empty_type(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the leafref path, if this is a leafref.
    pub fn leafref_path(&self) -> Option<&str> {
        match self {
            Self::Leafref { path } => Some(path),
            _ => None,
        }
    }

    /// Validates `text` and returns its canonical form.
    ///
    /// The error is a short description suitable for an `invalid-value`
    /// message.
    pub fn parse(&self, text: &str) -> Result<String, String> {
        match self {
            Self::String | Self::Leafref { .. } => Ok(text.to_string()),
            Self::Boolean => match text {
                "true" | "false" => Ok(text.to_string()),
                _ => Err(format!("'{}' is not a boolean", text)),
            },
            Self::Int8 => parse_signed(text, i8::MIN as i64, i8::MAX as i64),
            Self::Int16 => parse_signed(text, i16::MIN as i64, i16::MAX as i64),
            Self::Int32 => parse_signed(text, i32::MIN as i64, i32::MAX as i64),
            Self::Int64 => parse_signed(text, i64::MIN, i64::MAX),
            Self::Uint8 => parse_unsigned(text, u8::MAX as u64),
            Self::Uint16 => parse_unsigned(text, u16::MAX as u64),
            Self::Uint32 => parse_unsigned(text, u32::MAX as u64),
            Self::Uint64 => parse_unsigned(text, u64::MAX),
            Self::Enumeration(members) => {
                if members.iter().any(|m| m == text) {
                    Ok(text.to_string())
                } else {
                    Err(format!("'{}' is not one of {:?}", text, members))
                }
            },
            Self::Empty => {
                if text.is_empty() {
                    Ok(String::new())
                } else {
                    Err("type empty does not take a value".to_string())
                }
            },
        }
    }

    /// Returns true for the numeric built-ins.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
        )
    }
}

fn parse_signed(text: &str, min: i64, max: i64) -> Result<String, String> {
    let value: i64 = text
        .parse()
        .map_err(|_| format!("'{}' is not an integer", text))?;
    if value < min || value > max {
        return Err(format!("{} is out of range {}..{}", value, min, max));
    }
    Ok(value.to_string())
}

fn parse_unsigned(text: &str, max: u64) -> Result<String, String> {
    let value: u64 = text
        .parse()
        .map_err(|_| format!("'{}' is not an unsigned integer", text))?;
    if value > max {
        return Err(format!("{} is out of range 0..{}", value, max));
    }
    Ok(value.to_string())
}
