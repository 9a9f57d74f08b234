use urlencoding::encode;

use crate::filter::FilterSelection;

/// Query for one page of the tournament listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub selection: FilterSelection,
    pub page: usize,
    pub size: usize,
}

impl ListingQuery {
    pub fn new(selection: FilterSelection, page: usize, size: usize) -> Self {
        Self {
            selection,
            page,
            size,
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Query parameters in a stable order; "all" axes are left out
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let selection = &self.selection;
        let mut params = Vec::new();

        if let Some(game) = selection.game.selected() {
            params.push(("game", game.clone()));
        }
        if let Some(region) = selection.region.selected() {
            params.push(("region", region.clone()));
        }
        if let Some(tier) = selection.tier.selected() {
            params.push(("tier", tier.label().to_string()));
        }
        if let Some(range) = selection.date_range.query_value() {
            params.push(("dateRange", range));
        }
        if let Some(term) = selection.search_term() {
            params.push(("search", term.to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("size", self.size.to_string()));

        params
    }

    pub fn to_url(&self, base_url: &str) -> String {
        build_url_with_params(base_url, &self.params())
    }
}

/// Append percent-encoded params with `?` or `&` depending on the base
pub fn build_url_with_params(base_url: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return base_url.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{}{}", base_url, determine_separator(base_url), query)
}

fn determine_separator(url: &str) -> char {
    if url.contains('?') { '&' } else { '?' }
}
