use std::borrow::Borrow;
use std::fmt;

/// Identity of a listed item: the first field of its label.
///
/// Used both as the dedupe key and as the exact file name that marks a
/// finished transfer in the download directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemIdentity(String);

impl ItemIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-sensitive suffix match, e.g. `".zip"`.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.0.ends_with(extension)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    Empty,
    EmptyIdentity { label: String },
    /// The identity would not name a file directly inside the download directory.
    NotAFileName { identity: String },
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelError::Empty => write!(f, "empty label"),
            LabelError::EmptyIdentity { label } => {
                write!(f, "label {label:?} has no identity before the separator")
            }
            LabelError::NotAFileName { identity } => {
                write!(f, "identity {identity:?} is not a plain file name")
            }
        }
    }
}

impl std::error::Error for LabelError {}

/// Extract the identity from a raw label: the trimmed text before the first separator.
pub fn parse_label(label: &str, separator: char) -> Result<ItemIdentity, LabelError> {
    if label.trim().is_empty() {
        return Err(LabelError::Empty);
    }
    let first = label.split(separator).next().unwrap_or(label).trim();
    if first.is_empty() {
        return Err(LabelError::EmptyIdentity {
            label: label.to_string(),
        });
    }
    if first == "." || first == ".." || first.contains(['/', '\\']) {
        return Err(LabelError::NotAFileName {
            identity: first.to_string(),
        });
    }
    Ok(ItemIdentity::new(first))
}
