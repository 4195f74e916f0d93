use std::{collections::HashSet, fs, path::Path, str::FromStr};

use serde::Deserialize;

/// How raw register words encode a numeric value.
///
/// The tags match the vendor register map: `sw` stands for «swapped words» —
/// the 32-bit quantity arrives low word first, high word second.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
pub enum Encoding {
    #[serde(rename = "uint16be")]
    U16,

    #[serde(rename = "int16be")]
    I16,

    #[serde(rename = "uint32sw")]
    U32SwappedWords,

    #[serde(rename = "int32sw")]
    I32SwappedWords,

    /// 8-bit value packed into the low byte of a 16-bit register.
    #[serde(rename = "int8be")]
    I8,
}

impl Encoding {
    /// Number of registers the value occupies.
    pub const fn word_count(self) -> u16 {
        match self {
            Self::U32SwappedWords | Self::I32SwappedWords => 2,
            Self::U16 | Self::I16 | Self::I8 => 1,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterSpec {
    pub address: u16,

    #[serde(rename = "type")]
    pub encoding: Encoding,

    pub factor: f64,
    pub unit: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Metric {
    pub name: String,

    #[serde(flatten)]
    pub register: RegisterSpec,
}

/// Ordered name-to-register mapping: what to read and how to interpret it.
///
/// Loaded once at startup, read-only afterwards.
#[must_use]
#[derive(derive_more::IntoIterator)]
pub struct MetricCatalog(#[into_iterator(owned, ref)] Vec<Metric>);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read the catalog")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog")]
    Malformed(#[from] toml::de::Error),

    #[error("duplicate metric `{0}`")]
    DuplicateMetric(String),
}

#[derive(Deserialize)]
struct CatalogFile {
    metric: Vec<Metric>,
}

impl MetricCatalog {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn get(&self, name: &str) -> Option<&RegisterSpec> {
        self.0.iter().find(|metric| metric.name == name).map(|metric| &metric.register)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|metric| metric.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Metric> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for MetricCatalog {
    type Err = ConfigError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let file: CatalogFile = toml::from_str(source)?;
        let mut seen = HashSet::new();
        for metric in &file.metric {
            if !seen.insert(metric.name.as_str()) {
                return Err(ConfigError::DuplicateMetric(metric.name.clone()));
            }
        }
        Ok(Self(file.metric))
    }
}
