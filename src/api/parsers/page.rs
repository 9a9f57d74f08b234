use serde_json::Value;

use crate::domain::{TournamentPage, normalize_tournaments};

const CONTENT_FIELDS: &[&str] = &["content", "items", "tournaments", "data"];
const TOTAL_FIELDS: &[&str] = &["totalElements", "total", "totalCount"];

/// Parse a listing response: a page envelope or a bare array.
///
/// A bare array is the whole result set, so it never reports more pages.
pub fn parse_page(data: &Value, page: usize, size: usize) -> TournamentPage {
    match data {
        Value::Array(items) => {
            let items = normalize_tournaments(items);
            let count = items.len();
            TournamentPage {
                items,
                total: count,
                page: 0,
                size: count.max(1),
            }
        }
        Value::Object(_) => parse_envelope(data, page, size),
        _ => TournamentPage::empty(page, size),
    }
}

fn parse_envelope(data: &Value, page: usize, size: usize) -> TournamentPage {
    let Some(items) = extract_content(data) else {
        return TournamentPage::empty(page, size);
    };
    let items = normalize_tournaments(items);
    let page = extract_usize(data, &["number", "page"]).unwrap_or(page);
    let size = extract_usize(data, &["size", "pageSize"]).unwrap_or(size);
    let total = extract_usize(data, TOTAL_FIELDS).unwrap_or(page * size + items.len());

    TournamentPage {
        items,
        total,
        page,
        size,
    }
}

fn extract_content(data: &Value) -> Option<&Vec<Value>> {
    CONTENT_FIELDS
        .iter()
        .find_map(|field| data.get(*field)?.as_array())
}

fn extract_usize(data: &Value, fields: &[&str]) -> Option<usize> {
    fields
        .iter()
        .find_map(|field| data.get(*field)?.as_u64())
        .and_then(|n| usize::try_from(n).ok())
}
