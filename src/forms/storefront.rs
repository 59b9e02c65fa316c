use serde::Deserialize;

/// Category filter of the customer catalog. The `category` key repeats once
/// per ticked category, e.g. `?category=audio&category=gaming`.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CatalogFilterForm {
    #[serde(default)]
    pub category: Vec<String>,
}

impl CatalogFilterForm {
    /// Parse the filter from a raw query string. A malformed query shows the
    /// unfiltered catalog.
    pub fn from_query(query: &str) -> Self {
        serde_html_form::from_str(query).unwrap_or_else(|err| {
            log::warn!("Ignoring malformed catalog filter `{query}`: {err}");
            Self::default()
        })
    }

    /// Selected category slugs without blanks or repeats.
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = Vec::new();
        for slug in &self.category {
            let slug = slug.trim();
            if !slug.is_empty() && !slugs.iter().any(|known| known == slug) {
                slugs.push(slug.to_string());
            }
        }
        slugs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_categories_are_collected() {
        let filter = CatalogFilterForm::from_query("category=audio&category=gaming&category=audio&category=");

        assert_eq!(filter.slugs(), vec!["audio".to_string(), "gaming".to_string()]);
    }

    #[test]
    fn empty_query_selects_nothing() {
        assert_eq!(CatalogFilterForm::from_query(""), CatalogFilterForm::default());
        assert!(CatalogFilterForm::from_query("page=2").slugs().is_empty());
    }
}
