use xmltree::{Element, XMLNode};

fn name_matches(raw_name: &str, target: &str) -> bool {
    if raw_name.eq_ignore_ascii_case(target) {
        return true;
    }

    raw_name
        .rsplit_once(':')
        .map(|(_, suffix)| suffix.eq_ignore_ascii_case(target))
        .unwrap_or(false)
}

/// Get child element by name (case-insensitive)
pub(crate) fn get_child_ci<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    el.children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|c| name_matches(&c.name, name))
}

/// Child elements with the given name (case-insensitive)
pub(crate) fn children_ci<'a>(el: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    el.children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(move |c| name_matches(&c.name, name))
}

/// Trimmed text of a child element; blank text counts as absent
pub(crate) fn child_text(el: &Element, name: &str) -> Option<String> {
    get_child_ci(el, name)
        .and_then(|e| e.get_text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Attribute value (case-insensitive name); blank counts as absent
pub(crate) fn attribute_ci(el: &Element, name: &str) -> Option<String> {
    el.attributes
        .iter()
        .find(|(key, _)| name_matches(key, name))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build `<name>text</name>`
pub(crate) fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}

/// Append `<name>text</name>` when a value is present
pub(crate) fn push_text(parent: &mut Element, name: &str, text: Option<&str>) {
    if let Some(text) = text {
        parent
            .children
            .push(XMLNode::Element(text_element(name, text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_child_lookup_is_case_insensitive() {
        let xml = r#"<network UUID="n1"><Name> LAN </Name><note>   </note><Gateway>10.0.0.1</Gateway></network>"#;
        let root = Element::parse(Cursor::new(xml)).unwrap();

        assert_eq!(child_text(&root, "name").as_deref(), Some("LAN"));
        assert_eq!(child_text(&root, "note"), None);
        assert_eq!(child_text(&root, "gateway").as_deref(), Some("10.0.0.1"));
        assert_eq!(child_text(&root, "missing"), None);
        assert_eq!(attribute_ci(&root, "uuid").as_deref(), Some("n1"));
    }
}
