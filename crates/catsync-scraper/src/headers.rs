//! Ordered header lists with case-insensitive names.
//!
//! Header names keep the casing they were captured with; lookups and
//! replacements ignore ASCII case.

/// Returns the value of the first header named `name`, ignoring case.
#[must_use]
pub fn get<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Replaces every header named `name` with a single entry holding `value`,
/// appending when absent. The first occurrence keeps its position.
pub fn set(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter().position(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(idx) => {
            headers[idx] = (name.to_string(), value.to_string());
            let mut seen = 0usize;
            headers.retain(|(n, _)| {
                if n.eq_ignore_ascii_case(name) {
                    seen += 1;
                    seen == 1
                } else {
                    true
                }
            });
        }
        None => headers.push((name.to_string(), value.to_string())),
    }
}

/// Removes every header named `name`.
pub fn remove(headers: &mut Vec<(String, String)>, name: &str) {
    headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
}
