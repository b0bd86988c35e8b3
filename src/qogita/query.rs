//! Variant search query builder

/// Filters for `GET /variants/search/`.
///
/// Unset filters are left out of the request entirely. Each brand becomes its
/// own `brand_name` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub page: u32,
    pub size: u32,
    pub query: Option<String>,
    pub category_name: Option<String>,
    pub brand_names: Option<Vec<String>>,
    pub has_deals: Option<bool>,
}

impl SearchQuery {
    pub fn new(page: u32, size: u32) -> Self {
        SearchQuery {
            page,
            size,
            query: None,
            category_name: None,
            brand_names: None,
            has_deals: None,
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn category_name(mut self, category_name: impl Into<String>) -> Self {
        self.category_name = Some(category_name.into());
        self
    }

    pub fn brand_names<I, S>(mut self, brand_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brand_names = Some(brand_names.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_deals(mut self, has_deals: bool) -> Self {
        self.has_deals = Some(has_deals);
        self
    }

    /// Flatten into ordered `(key, value)` pairs for the HTTP query string
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];

        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(category_name) = &self.category_name {
            pairs.push(("category_name", category_name.clone()));
        }
        if let Some(brand_names) = &self.brand_names {
            pairs.extend(brand_names.iter().map(|brand| ("brand_name", brand.clone())));
        }
        if let Some(has_deals) = self.has_deals {
            pairs.push(("has_deals", api_bool(has_deals).to_string()));
        }

        pairs
    }
}

/// The search endpoint takes booleans capitalized
fn api_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_paging_by_default() {
        let pairs = SearchQuery::new(3, 50).to_pairs();
        assert_eq!(pairs, vec![("page", "3".to_string()), ("size", "50".to_string())]);
    }

    #[test]
    fn test_brand_names_repeat() {
        let pairs = SearchQuery::new(1, 500)
            .brand_names(["acme", "globex"])
            .to_pairs();

        let brands: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| *key == "brand_name")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(brands, vec!["acme", "globex"]);
        assert!(pairs.iter().all(|(key, _)| *key != "query"));
        assert!(pairs.iter().all(|(key, _)| *key != "category_name"));
        assert!(pairs.iter().all(|(key, _)| *key != "has_deals"));
    }

    #[test]
    fn test_all_filters() {
        let pairs = SearchQuery::new(2, 500)
            .query("hair & body")
            .category_name("Beauty")
            .has_deals(true)
            .to_pairs();

        assert_eq!(
            pairs,
            vec![
                ("page", "2".to_string()),
                ("size", "500".to_string()),
                ("query", "hair & body".to_string()),
                ("category_name", "Beauty".to_string()),
                ("has_deals", "True".to_string()),
            ]
        );
    }

    #[test]
    fn test_has_deals_false() {
        let pairs = SearchQuery::new(1, 50).has_deals(false).to_pairs();
        assert_eq!(pairs.last(), Some(&("has_deals", "False".to_string())));
    }
}
