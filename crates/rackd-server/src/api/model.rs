//! List-endpoint helpers shared by all collection handlers
//!
//! Collection responses are plain JSON arrays; pagination metadata travels
//! in a `Link` response header with rel prev/next/first/last URLs built
//! from the original query string.

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::Value;

use rackd_api::{ListRequest, Page, PageLinks};
use rackd_common::RackdError;

/// Decode the raw query string into ordered pairs.
pub fn query_pairs(query_string: &str) -> Result<Vec<(String, String)>, RackdError> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query_string)
        .map_err(|e| RackdError::IllegalArgument(format!("malformed query string: {}", e)))
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Project a serialized object down to the selected fields (plus `id`).
///
/// Selections use the storage field names (snake_case); response keys are
/// camelCase, so the selection is translated before matching.
pub fn project_fields(value: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return value;
    }

    match value {
        Value::Object(map) => {
            let keep: Vec<String> = fields.iter().map(|f| snake_to_camel(f)).collect();
            Value::Object(
                map.into_iter()
                    .filter(|(key, _)| key == "id" || keep.iter().any(|f| f == key))
                    .collect(),
            )
        }
        other => other,
    }
}

/// Rebuild the request URL pointing at another page of the same query.
fn page_url(path: &str, pairs: &[(String, String)], page: u64) -> String {
    let mut pairs: Vec<(String, String)> = pairs
        .iter()
        .filter(|(key, _)| key != "page")
        .cloned()
        .collect();
    pairs.push(("page".to_string(), page.to_string()));

    match serde_urlencoded::to_string(&pairs) {
        Ok(query) => format!("{}?{}", path, query),
        Err(_) => path.to_string(),
    }
}

/// `Link` header value with prev/next/first/last page relations.
pub fn link_header(path: &str, pairs: &[(String, String)], links: &PageLinks) -> Option<String> {
    let mut parts = Vec::new();
    for (rel, page) in [
        ("prev", links.prev),
        ("next", links.next),
        ("first", links.first),
        ("last", links.last),
    ] {
        if let Some(page) = page {
            parts.push(format!("<{}>; rel=\"{}\"", page_url(path, pairs, page), rel));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Render a collection page: 204 when the page is empty, otherwise a JSON
/// array with the pagination `Link` header.
pub fn page_response<T: Serialize>(
    path: &str,
    pairs: &[(String, String)],
    request: &ListRequest,
    page: Page<T>,
) -> HttpResponse {
    if page.page_items.is_empty() {
        return HttpResponse::NoContent().finish();
    }

    let links = PageLinks::compute(page.page_number, page.pages_available, page.total_count);

    let items: Vec<Value> = page
        .page_items
        .iter()
        .map(|item| {
            let value = serde_json::to_value(item).unwrap_or(Value::Null);
            project_fields(value, &request.fields)
        })
        .collect();

    let mut builder = HttpResponse::Ok();
    if let Some(header) = link_header(path, pairs, &links) {
        builder.append_header(("Link", header));
    }
    builder.json(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("name"), "name");
        assert_eq!(snake_to_camel("operating_system_id"), "operatingSystemId");
        assert_eq!(snake_to_camel("local_port"), "localPort");
    }

    #[test]
    fn test_query_pairs_preserves_order_and_duplicates() {
        let pairs = query_pairs("per_page=10&name=eq%3Aweb&sort=name%3Aasc").unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], ("name".to_string(), "eq:web".to_string()));
    }

    #[test]
    fn test_project_fields_keeps_id_and_selection() {
        let value = json!({
            "id": "abc",
            "name": "web-1",
            "cpu": "4",
            "operatingSystemId": "o1"
        });
        let projected = project_fields(
            value,
            &["name".to_string(), "operating_system_id".to_string()],
        );
        assert_eq!(
            projected,
            json!({"id": "abc", "name": "web-1", "operatingSystemId": "o1"})
        );
    }

    #[test]
    fn test_project_fields_empty_selection_is_identity() {
        let value = json!({"id": "abc", "name": "web-1"});
        assert_eq!(project_fields(value.clone(), &[]), value);
    }

    #[test]
    fn test_link_header_middle_page() {
        let pairs = vec![
            ("per_page".to_string(), "10".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        let links = PageLinks::compute(2, 4, 40);
        let header = link_header("/server/servers", &pairs, &links).unwrap();

        assert!(header.contains("</server/servers?per_page=10&page=1>; rel=\"prev\""));
        assert!(header.contains("</server/servers?per_page=10&page=3>; rel=\"next\""));
        assert!(header.contains("page=1>; rel=\"first\""));
        assert!(header.contains("page=4>; rel=\"last\""));
    }

    #[test]
    fn test_link_header_empty_set() {
        let links = PageLinks::compute(1, 0, 0);
        assert!(link_header("/x", &[], &links).is_none());
    }
}
