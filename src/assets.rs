//! Asset model and the static asset catalog
//!
//! An asset is either the native lumen or a credit asset identified by
//! `(code, issuer)`. Several credit assets may share a code, so resolving a
//! user-supplied code can yield more than one candidate.

use crate::errors::RequestError;
use crate::keys::PublicKey;
use crate::selector::Selector;
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Code of the native asset
pub const NATIVE_CODE: &str = "XLM";

/// Alias accepted for the native asset
const NATIVE_ALIAS: &str = "lumens";

const DEFAULT_CATALOG: &str = include_str!("../assets/catalog.toml");

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Credit { code: String, issuer: PublicKey },
}

impl Asset {
    /// Build a credit asset, validating the code length (1-12 alphanumerics)
    pub fn credit(code: &str, issuer: PublicKey) -> Result<Self, RequestError> {
        if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(RequestError::InvalidOperation(format!(
                "invalid asset code '{}'",
                code
            )));
        }
        Ok(Asset::Credit {
            code: code.to_string(),
            issuer,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    pub fn code(&self) -> &str {
        match self {
            Asset::Native => NATIVE_CODE,
            Asset::Credit { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<&PublicKey> {
        match self {
            Asset::Native => None,
            Asset::Credit { issuer, .. } => Some(issuer),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("XLM (native)"),
            Asset::Credit { code, issuer } => write!(f, "{} ({})", code, issuer),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    asset: Vec<CatalogEntry>,
}

/// One catalog line: a code, its issuer (absent for native) and a label
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CatalogEntry {
    fn to_asset(&self) -> anyhow::Result<Asset> {
        match &self.issuer {
            None if self.code.eq_ignore_ascii_case(NATIVE_CODE) => Ok(Asset::Native),
            None => anyhow::bail!("catalog entry {} has no issuer", self.code),
            Some(issuer) => {
                let issuer = PublicKey::from_address(issuer)
                    .with_context(|| format!("bad issuer for catalog entry {}", self.code))?;
                Asset::credit(&self.code, issuer).map_err(anyhow::Error::from)
            }
        }
    }
}

/// A catalog asset with its display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogAsset {
    pub asset: Asset,
    pub name: Option<String>,
}

impl fmt::Display for CatalogAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} - {}", self.asset, name),
            None => write!(f, "{}", self.asset),
        }
    }
}

/// Static list of supported assets
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    entries: Vec<CatalogAsset>,
}

impl AssetCatalog {
    /// Catalog with the embedded well-known assets
    pub fn embedded() -> anyhow::Result<Self> {
        let file: CatalogFile =
            toml::from_str(DEFAULT_CATALOG).context("Failed to parse embedded asset catalog")?;
        let mut catalog = Self::default();
        catalog.extend_from_entries(&file.asset)?;
        Ok(catalog)
    }

    pub fn from_assets(assets: impl IntoIterator<Item = Asset>) -> Self {
        Self {
            entries: assets
                .into_iter()
                .map(|asset| CatalogAsset { asset, name: None })
                .collect(),
        }
    }

    /// Append the entries of an extra TOML catalog file
    pub fn extend_from_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read asset catalog {}", path.display()))?;
        let file: CatalogFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse asset catalog {}", path.display()))?;
        self.extend_from_entries(&file.asset)
    }

    fn extend_from_entries(&mut self, entries: &[CatalogEntry]) -> anyhow::Result<()> {
        for entry in entries {
            let asset = entry.to_asset()?;
            if self.entries.iter().any(|e| e.asset == asset) {
                continue;
            }
            self.entries.push(CatalogAsset {
                asset,
                name: entry.name.clone(),
            });
        }
        Ok(())
    }

    /// All assets whose code matches, case-insensitively
    pub fn lookup(&self, code: &str) -> Vec<&CatalogAsset> {
        let code = normalize_code(code);
        self.entries
            .iter()
            .filter(|e| e.asset.code().eq_ignore_ascii_case(&code))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_code(code: &str) -> String {
    if code.eq_ignore_ascii_case(NATIVE_ALIAS) {
        NATIVE_CODE.to_string()
    } else {
        code.to_string()
    }
}

/// Resolve a currency code to a single asset.
///
/// Zero matches fail with `UnsupportedAsset`. A single match is returned
/// without consulting the selector; several matches always go through it.
pub fn resolve_asset(
    catalog: &AssetCatalog,
    code: &str,
    selector: &dyn Selector,
) -> Result<Asset, RequestError> {
    let candidates = catalog.lookup(code);
    match candidates.as_slice() {
        [] => Err(RequestError::UnsupportedAsset(code.to_string())),
        [only] => {
            debug!(code = %code, asset = %only.asset, "Asset resolved");
            Ok(only.asset.clone())
        }
        many => {
            let labels: Vec<String> = many.iter().map(|c| c.to_string()).collect();
            let idx = selector.select("Choose currency", &labels)?;
            let chosen = many.get(idx).ok_or_else(|| {
                RequestError::Selection(format!("currency choice {} out of range", idx))
            })?;
            debug!(code = %code, asset = %chosen.asset, candidates = many.len(), "Asset disambiguated");
            Ok(chosen.asset.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;
    use crate::test_utils::ScriptedSelector;

    fn issuer(n: u8) -> PublicKey {
        Keypair::from_seed_bytes(&[n; 32]).public_key()
    }

    #[test]
    fn test_embedded_catalog_parses() {
        let parsed: CatalogFile = toml::from_str(DEFAULT_CATALOG).unwrap();
        assert!(!parsed.asset.is_empty());
        let catalog = AssetCatalog::embedded().unwrap();
        assert_eq!(catalog.len(), parsed.asset.len());
        assert_eq!(catalog.lookup("xlm")[0].asset, Asset::Native);
    }

    #[test]
    fn test_lumens_alias() {
        let catalog = AssetCatalog::from_assets([Asset::Native]);
        let selector = ScriptedSelector::new();
        let asset = resolve_asset(&catalog, "Lumens", &selector).unwrap();
        assert_eq!(asset, Asset::Native);
        assert_eq!(selector.select_calls(), 0);
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        let catalog = AssetCatalog::from_assets([Asset::Native]);
        let selector = ScriptedSelector::new();
        let err = resolve_asset(&catalog, "DOGE", &selector).unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedAsset(ref c) if c == "DOGE"));
    }

    #[test]
    fn test_multiple_issuers_require_selection() {
        let a = Asset::credit("USD", issuer(1)).unwrap();
        let b = Asset::credit("USD", issuer(2)).unwrap();
        let catalog = AssetCatalog::from_assets([a.clone(), b.clone()]);

        let selector = ScriptedSelector::new().with_choice(1);
        assert_eq!(resolve_asset(&catalog, "usd", &selector).unwrap(), b);
        assert_eq!(selector.select_calls(), 1);

        // No scripted choice left: the selector refuses instead of defaulting
        let err = resolve_asset(&catalog, "USD", &selector).unwrap_err();
        assert!(matches!(err, RequestError::Selection(_)));
    }

    #[test]
    fn test_credit_code_validation() {
        assert!(Asset::credit("", issuer(1)).is_err());
        assert!(Asset::credit("TOOLONGASSETCODE", issuer(1)).is_err());
        assert!(Asset::credit("US-D", issuer(1)).is_err());
        assert!(Asset::credit("ABCDEFGHIJKL", issuer(1)).is_ok());
    }

    #[test]
    fn test_extra_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        std::fs::write(
            &path,
            format!(
                "[[asset]]\ncode = \"USDC\"\nissuer = \"{}\"\nname = \"Test anchor\"\n",
                issuer(5)
            ),
        )
        .unwrap();

        let mut catalog = AssetCatalog::embedded().unwrap();
        let before = catalog.lookup("USDC").len();
        catalog.extend_from_file(&path).unwrap();
        assert_eq!(catalog.lookup("usdc").len(), before + 1);
    }
}
