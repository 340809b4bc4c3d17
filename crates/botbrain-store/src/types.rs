use std::fmt;

/// Store-native collection kind of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// The key does not exist.
    None,
    /// A plain byte-string value.
    String,
    /// An ordered list of byte strings.
    List,
    /// An unordered set of byte strings.
    Set,
    /// A field-to-bytes mapping.
    Hash,
}

impl ValueKind {
    /// Store-native type name, as the `TYPE` command reports it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::None => "none",
            ValueKind::String => "string",
            ValueKind::List => "list",
            ValueKind::Set => "set",
            ValueKind::Hash => "hash",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where `linsert` places the new element relative to the pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}
