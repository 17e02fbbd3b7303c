//! Fixtures

use std::{fs, path::PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    fixtures::menu::MenuFixture,
    script::Script,
};

pub mod menu;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Menu without items and without a declared currency
    #[error("Menu has no items and no currency")]
    NoCurrency,

    /// Menu items don't form a valid catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Loads menus and scripts from a fixture directory.
///
/// ```text
/// fixtures/
///   menu/<name>.yml
///   scripts/<name>.yml
/// ```
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Fixture loader rooted at `./fixtures`
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Fixture loader rooted at a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a menu into a catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is
    /// malformed, or the items don't form a valid catalog.
    pub fn load_catalog(&self, name: &str) -> Result<Catalog, FixtureError> {
        let fixture: MenuFixture = self.read("menu", name)?;

        fixture.try_into()
    }

    /// Load a scripted session
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_script(&self, name: &str) -> Result<Script, FixtureError> {
        self.read("scripts", name)
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusty_money::{Money, iso::RUB};
    use testresult::TestResult;

    use crate::catalog::MenuItemId;

    use super::*;

    #[test]
    fn loads_the_canteen_menu() -> TestResult {
        let catalog = Fixture::new().load_catalog("canteen")?;

        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.currency(), RUB);
        assert_eq!(catalog.all_label(), "Все");

        let Some(soup) = catalog.get(MenuItemId(1)) else {
            panic!("soup missing");
        };

        assert_eq!(soup.category, "Супы");
        assert_eq!(soup.price, Money::from_major(120, RUB));
        assert!(soup.available);

        Ok(())
    }

    #[test]
    fn loads_scripts() -> TestResult {
        let script = Fixture::new().load_script("lunch")?;

        assert!(!script.steps.is_empty());

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Fixture::new().load_catalog("does-not-exist");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn custom_base_path() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("menu"))?;
        fs::write(
            dir.path().join("menu").join("tiny.yml"),
            "currency: RUB\nitems:\n  - id: 7\n    name: Tea\n    category: Drinks\n    price: 25 RUB\n",
        )?;

        let catalog = Fixture::with_base_path(dir.path()).load_catalog("tiny")?;

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.all_label(), "All");

        Ok(())
    }

    #[test]
    fn malformed_yaml_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("menu"))?;
        fs::write(dir.path().join("menu").join("broken.yml"), "items: [")?;

        let result = Fixture::with_base_path(dir.path()).load_catalog("broken");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));

        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("menu"))?;
        fs::write(
            dir.path().join("menu").join("dupes.yml"),
            "items:\n  - id: 1\n    name: Tea\n    category: Drinks\n    price: 25 RUB\n  - id: 1\n    name: Coffee\n    category: Drinks\n    price: 40 RUB\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_catalog("dupes");

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::DuplicateId(MenuItemId(1))))
        ));

        Ok(())
    }
}
