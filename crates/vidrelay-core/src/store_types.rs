use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Metadata store backend types
///
/// Defined in core because configuration selects it and the store factory
/// dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Whole list kept as a JSON array in a local file
    Local,
    /// Whole list kept in the `videos` field of a remote JSON document
    Remote,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Ok(StoreBackend::Local),
            "remote" | "jsonbin" => Ok(StoreBackend::Remote),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Local => write!(f, "local"),
            StoreBackend::Remote => write!(f, "remote"),
        }
    }
}
