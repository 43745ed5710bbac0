//! A subset of CSS selectors: tags, `#id`, `.class` and `[attr]`/`[attr="value"]`,
//! combined into compounds, descendant chains and comma-separated lists.

pub(crate) trait SelectorTarget: Sized {
    fn tag(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    fn has_class(&self, class: &str) -> bool;
    fn parent(&self) -> Option<Self>;
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(text: &str) -> Option<Compound> {
        let mut result = Compound::default();
        let mut rest = text;

        let tag_len = rest
            .find(|c: char| c == '.' || c == '#' || c == '[')
            .unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if tag != "*" {
                result.tag = Some(tag.to_ascii_lowercase());
            }
            rest = &rest[tag_len..];
        }

        while let Some(c) = rest.chars().next() {
            rest = &rest[c.len_utf8()..];

            if c == '[' {
                let close = rest.find(']')?;
                let inner = &rest[..close];
                rest = &rest[close + 1..];

                let attribute = match inner.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string()),
                    ),
                    None => (inner.trim().to_string(), None),
                };
                result.attributes.push(attribute);
                continue;
            }

            let len = rest
                .find(|c: char| c == '.' || c == '#' || c == '[')
                .unwrap_or(rest.len());
            let name = &rest[..len];
            rest = &rest[len..];

            if name.is_empty() {
                return None;
            }

            match c {
                '.' => result.classes.push(name.to_string()),
                '#' => result.id = Some(name.to_string()),
                _ => return None,
            }
        }

        Some(result)
    }

    fn matches<T: SelectorTarget>(&self, target: &T) -> bool {
        if let Some(tag) = &self.tag {
            if target.tag() != *tag {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if target.attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        self.classes.iter().all(|c| target.has_class(c))
            && self
                .attributes
                .iter()
                .all(|(name, value)| match (target.attribute(name), value) {
                    (Some(actual), Some(expected)) => actual == *expected,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
    }
}

/// A parsed selector list.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Selector {
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(text: &str) -> Option<Selector> {
        let alternatives = text
            .split(',')
            .map(|alternative| {
                let chain: Option<Vec<Compound>> =
                    alternative.split_whitespace().map(Compound::parse).collect();
                chain.filter(|c| !c.is_empty())
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Selector { alternatives })
    }

    pub fn matches<T: SelectorTarget>(&self, target: &T) -> bool {
        self.alternatives
            .iter()
            .any(|chain| matches_chain(chain, target))
    }
}

fn matches_chain<T: SelectorTarget>(chain: &[Compound], target: &T) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };

    if !last.matches(target) {
        return false;
    }

    let mut remaining = ancestors;
    let mut current = target.parent();

    while let Some((compound, rest)) = remaining.split_last() {
        let Some(node) = current else {
            return false;
        };

        if compound.matches(&node) {
            remaining = rest;
        }
        current = node.parent();
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Node {
        tag: &'static str,
        classes: Vec<&'static str>,
        attributes: Vec<(&'static str, &'static str)>,
        parent: Option<Box<Node>>,
    }

    impl SelectorTarget for Node {
        fn tag(&self) -> String {
            self.tag.to_string()
        }

        fn attribute(&self, name: &str) -> Option<String> {
            self.attributes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.to_string())
        }

        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }

        fn parent(&self) -> Option<Self> {
            self.parent.as_deref().cloned()
        }
    }

    fn option() -> Node {
        let panel = Node {
            tag: "section",
            classes: vec!["js-ring-configurator-colors"],
            attributes: vec![("id", "metals")],
            parent: None,
        };
        Node {
            tag: "button",
            classes: vec!["js-ring-configurator-color", "is-active"],
            attributes: vec![("data-color", "#b76e79")],
            parent: Some(Box::new(panel)),
        }
    }

    fn matches(selector: &str, node: &Node) -> bool {
        Selector::parse(selector).unwrap().matches(node)
    }

    #[test]
    fn simple_selectors() {
        let node = option();
        assert!(matches(".js-ring-configurator-color", &node));
        assert!(matches("button", &node));
        assert!(matches("BUTTON.is-active", &node));
        assert!(matches("[data-color]", &node));
        assert!(matches("[data-color=\"#b76e79\"]", &node));
        assert!(!matches("[data-color='#000']", &node));
        assert!(!matches("#metals", &node));
        assert!(!matches(".js-ring-configurator-colors", &node));
    }

    #[test]
    fn descendants_and_lists() {
        let node = option();
        assert!(matches("#metals .js-ring-configurator-color", &node));
        assert!(matches("section button", &node));
        assert!(!matches("div button", &node));
        assert!(matches("div, .is-active", &node));
    }

    #[test]
    fn malformed_selectors() {
        assert!(Selector::parse(".").is_none());
        assert!(Selector::parse("[data-x").is_none());
        assert!(Selector::parse("a,").is_none());
    }
}
