use std::fmt;

pub const IDENTITY_SEPARATOR: char = '_';

/// Aggregation key for replicate probes: the spot's `ID` together with its `Name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProbeIdentity {
    pub id: String,
    pub name: String,
}

impl ProbeIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// `ID_Name`, the form written to summaries and matched across pools.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProbeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.id, IDENTITY_SEPARATOR, self.name)
    }
}

pub fn build_identities(ids: &[String], names: &[String]) -> Vec<ProbeIdentity> {
    ids.iter()
        .zip(names)
        .map(|(id, name)| ProbeIdentity::new(id.as_str(), name.as_str()))
        .collect()
}
