use std::{collections::BTreeMap, fs, path::Path};

use itertools::Itertools;
use log::info;
use serde::Deserialize;

use super::CodegenError;

/// Province code -> municipalities of that province, as found in
/// `municipality_data.json`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MunicipalityCatalog(BTreeMap<String, ProvinceEntry>);

/// Municipality code -> display name.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ProvinceEntry(BTreeMap<String, String>);

impl MunicipalityCatalog {
    /// Read and parse the catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<MunicipalityCatalog, CodegenError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CodegenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog =
            MunicipalityCatalog::from_json_str(&content).map_err(|source| CodegenError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "loaded {} provinces, {} municipalities from {}",
            catalog.len(),
            catalog.municipality_count(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json_str(s: &str) -> Result<MunicipalityCatalog, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Provinces in ascending order of their numeric code.
    pub fn provinces(&self) -> Result<Vec<(&str, &ProvinceEntry)>, CodegenError> {
        sorted_by_code(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn municipality_count(&self) -> usize {
        self.0.values().map(|e| e.len()).sum()
    }
}

impl ProvinceEntry {
    /// Municipalities as `(code, name)` pairs, in ascending order of their
    /// numeric code.
    pub fn municipalities(&self) -> Result<Vec<(&str, &str)>, CodegenError> {
        Ok(sorted_by_code(&self.0)?
            .into_iter()
            .map(|(code, name)| (code, name.as_str()))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a province or municipality code as an integer.  Codes must fit in an
/// `i128`.
pub fn parse_code(key: &str) -> Result<i128, CodegenError> {
    key.parse::<i128>().map_err(|_| CodegenError::KeyFormat {
        key: key.to_string(),
    })
}

/// Order entries by the integer value of their key.  Keys with the same value
/// (e.g. "7" and "07") keep their lexical order.
fn sorted_by_code<V>(map: &BTreeMap<String, V>) -> Result<Vec<(&str, &V)>, CodegenError> {
    let keyed = map
        .iter()
        .map(|(k, v)| parse_code(k).map(|n| (n, k.as_str(), v)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keyed
        .into_iter()
        .sorted_by_key(|(n, k, _)| (*n, *k))
        .map(|(_, k, v)| (k, v))
        .collect())
}
