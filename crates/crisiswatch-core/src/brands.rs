use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked brand from `config/brands.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    /// Monitoring priority tier (1 = highest).
    pub tier: u8,
    /// Named competitors benchmarked against this brand each cycle.
    #[serde(default)]
    pub competitors: Vec<String>,
    pub notes: Option<String>,
}

impl BrandConfig {
    /// Generate a URL-safe slug from the brand name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandConfig>,
}

/// Load and validate the brands configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let brands_file: BrandsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if ![1, 2, 3].contains(&brand.tier) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has invalid tier {}; must be 1, 2, or 3",
                brand.name, brand.tier
            )));
        }

        for competitor in &brand.competitors {
            if competitor.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "brand '{}' lists an empty competitor name",
                    brand.name
                )));
            }
            if competitor.eq_ignore_ascii_case(&brand.name) {
                return Err(ConfigError::Validation(format!(
                    "brand '{}' lists itself as a competitor",
                    brand.name
                )));
            }
        }

        let lower_name = brand.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }

        let slug = brand.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand slug: '{}' (from brand '{}')",
                slug, brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str, competitors: &[&str]) -> BrandConfig {
        BrandConfig {
            name: name.to_string(),
            tier: 1,
            competitors: competitors.iter().map(ToString::to_string).collect(),
            notes: None,
        }
    }

    #[test]
    fn slug_simple_name() {
        assert_eq!(brand("Apple", &[]).slug(), "apple");
    }

    #[test]
    fn slug_collapses_spaces_and_punctuation() {
        assert_eq!(brand("Fresh & Clean Co.", &[]).slug(), "fresh-clean-co");
    }

    #[test]
    fn validate_accepts_competitor_list() {
        let file = BrandsFile {
            brands: vec![brand("Apple", &["Samsung", "Google"])],
        };
        assert!(validate_brands(&file).is_ok());
    }

    #[test]
    fn validate_rejects_self_competitor() {
        let file = BrandsFile {
            brands: vec![brand("Apple", &["apple"])],
        };
        assert!(matches!(
            validate_brands(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let file = BrandsFile {
            brands: vec![brand("Apple", &[]), brand("apple", &[])],
        };
        assert!(matches!(
            validate_brands(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_tier() {
        let mut b = brand("Apple", &[]);
        b.tier = 9;
        let file = BrandsFile { brands: vec![b] };
        assert!(matches!(
            validate_brands(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn yaml_parses_with_defaulted_competitors() {
        let yaml = "brands:\n  - name: Apple\n    tier: 1\n";
        let file: BrandsFile = serde_yaml::from_str(yaml).expect("parse");
        assert!(file.brands[0].competitors.is_empty());
    }
}
