//! Ordering of build-tools version directory names

use std::cmp::Ordering;
use std::fmt;

/// One dot-separated component of a version directory name.
///
/// Numbers sort before text, so comparing mixed positions never fails.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionPart {
    /// All-digit component
    Number(u64),
    /// Anything else, lowercased
    Text(String),
}

impl VersionPart {
    fn parse(part: &str) -> Self {
        if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = part.parse() {
                return Self::Number(n);
            }
        }
        Self::Text(part.to_lowercase())
    }
}

/// A build-tools directory name such as `34.0.0` or `31.0.0-rc2`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildToolsVersion {
    name: String,
    parts: Vec<VersionPart>,
}

impl BuildToolsVersion {
    /// Split a directory name into comparable parts.
    ///
    /// `-rc` becomes its own `.rc.` component and spaces act as separators,
    /// so `31.0.0-rc2` compares as `[31, 0, 0, "rc", 2]`.
    pub fn parse(name: &str) -> Self {
        let parts = name
            .replace("-rc", ".rc.")
            .replace(' ', ".")
            .split('.')
            .map(VersionPart::parse)
            .collect();

        Self {
            name: name.to_string(),
            parts,
        }
    }

    /// Highest version among `names`, regardless of their order
    pub fn latest<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| Self::parse(n.as_ref())).max()
    }

    /// The directory name this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Parsed components
    pub fn parts(&self) -> &[VersionPart] {
        &self.parts
    }
}

impl Ord for BuildToolsVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Names with identical parts ("30.0" / "30.00") fall back to the raw
        // name so the maximum is unique.
        self.parts
            .cmp(&other.parts)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for BuildToolsVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BuildToolsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
