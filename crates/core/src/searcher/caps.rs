//! Torznab `caps` document parsing.
//!
//! Only the `<categories>` block and `<error>` elements matter here, so a
//! couple of attribute regexes stand in for a full XML parser.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

use crate::ranking::natural_cmp;

use super::{Category, SearchError};

static CATEGORY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<category\b([^>]*?)(?:/>|>(.*?)</category>)").unwrap());
static SUBCAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<subcat\b([^>]*?)/?>").unwrap());
static ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<error\b([^>]*?)/?>").unwrap());
static ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(lt|gt|quot|apos|amp));").unwrap()
});

/// Value of attribute `name` in an element's attribute text.
fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR.captures_iter(attrs)
        .find(|c| &c[1] == name)
        .and_then(|c| c.get(2).or_else(|| c.get(3)))
        .map(|m| decode_entities(m.as_str()))
}

/// Decode the predefined XML entities and numeric character references.
///
/// References to invalid code points are left as written.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY
        .replace_all(raw, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("amp") => Some('&'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Subcategory display name, prefixed with its parent unless the
/// aggregator already did so (e.g. "Movies/HD" under "Movies").
fn subcategory_name(parent: &str, child: &str) -> String {
    if child.to_lowercase().starts_with(&parent.to_lowercase()) {
        child.to_string()
    } else {
        format!("{} > {}", parent, child)
    }
}

/// Flatten the categories of a caps document into one list.
///
/// Entries without an id or name are skipped. Duplicate ids keep their
/// first occurrence. The result is sorted by name.
pub fn parse_caps_categories(xml: &str) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    let mut push = |category: Category| {
        if !categories.iter().any(|c| c.id == category.id) {
            categories.push(category);
        }
    };

    for block in CATEGORY_BLOCK.captures_iter(xml) {
        let attrs = &block[1];
        let (Some(id), Some(name)) = (attr(attrs, "id"), attr(attrs, "name")) else {
            continue;
        };

        if let Some(body) = block.get(2) {
            for sub in SUBCAT.captures_iter(body.as_str()) {
                if let (Some(sub_id), Some(sub_name)) = (attr(&sub[1], "id"), attr(&sub[1], "name"))
                {
                    push(Category::new(sub_id, subcategory_name(&name, &sub_name)));
                }
            }
        }
        push(Category::new(id, name));
    }

    categories.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    categories
}

/// Map a Torznab `<error code description>` element to a [`SearchError`].
///
/// Code 100 is "incorrect user credentials".
pub fn parse_torznab_error(xml: &str, product: &str) -> Option<SearchError> {
    let caps = ERROR.captures(xml)?;
    let code = attr(&caps[1], "code");
    if code.as_deref() == Some("100") {
        return Some(SearchError::InvalidApiKey(product.to_string()));
    }
    let description = attr(&caps[1], "description")
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Torznab error {}", code.unwrap_or_default()));
    Some(SearchError::ApiError(description))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<caps>
  <server title="Jackett" />
  <searching>
    <search available="yes" supportedParams="q" />
  </searching>
  <categories>
    <category id="2000" name="Movies">
      <subcat id="2040" name="Movies/HD" />
      <subcat id="2030" name="SD" />
    </category>
    <category id="5000" name="TV">
      <subcat id="5040" name="HD"/>
    </category>
    <category id="3000" name="Audio &amp; Music" />
    <category id="2000" name="Movies" />
    <category name="No id" />
  </categories>
</caps>"#;

    #[test]
    fn test_parse_caps_categories() {
        let categories = parse_caps_categories(CAPS);
        let pairs: Vec<_> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("3000", "Audio & Music"),
                ("2000", "Movies"),
                ("2030", "Movies > SD"),
                ("2040", "Movies/HD"),
                ("5000", "TV"),
                ("5040", "TV > HD"),
            ]
        );
    }

    #[test]
    fn test_parse_caps_without_categories() {
        assert!(parse_caps_categories("<caps><categories/></caps>").is_empty());
        assert!(parse_caps_categories("not xml at all").is_empty());
    }

    #[test]
    fn test_decode_entities_numeric_references() {
        assert_eq!(decode_entities("Com&#233;die"), "Comédie");
        assert_eq!(decode_entities("Kid&#x27;s"), "Kid's");
        assert_eq!(decode_entities("&#X41;&lt;b&gt;"), "A<b>");
        assert_eq!(decode_entities("&amp;#233;"), "&#233;");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn test_parse_caps_decodes_numeric_references() {
        let xml = r#"<categories><category id="2000" name="Pel&#237;culas"/></categories>"#;
        assert_eq!(parse_caps_categories(xml)[0].name, "Películas");
    }

    #[test]
    fn test_attr_single_quotes() {
        assert_eq!(attr(r#" id='7' name="x""#, "id").as_deref(), Some("7"));
        assert!(attr(r#" id="7""#, "name").is_none());
    }

    #[test]
    fn test_parse_torznab_error_invalid_key() {
        let xml = r#"<?xml version="1.0"?><error code="100" description="Invalid API Key" />"#;
        assert!(matches!(
            parse_torznab_error(xml, "Jackett"),
            Some(SearchError::InvalidApiKey(p)) if p == "Jackett"
        ));
    }

    #[test]
    fn test_parse_torznab_error_other() {
        let xml = r#"<error code="201" description="Incorrect parameter"/>"#;
        match parse_torznab_error(xml, "Jackett") {
            Some(SearchError::ApiError(msg)) => assert_eq!(msg, "Incorrect parameter"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_torznab_error(CAPS, "Jackett").is_none());
    }
}
