//! URL detection and cleanup.

use regex::Regex;

use super::node::{push_text, LinkSpan, Node};
use super::rules::FormatRules;
use crate::error::Result;

/// Finds link tokens in plain text and turns them into `Link` nodes.
#[derive(Debug, Clone)]
pub(crate) struct LinkDetector {
    pattern: Regex,
    /// Anchored form of the link rules, checked again after cleanup.
    valid: Regex,
    trailing: Vec<char>,
    leading: Vec<String>,
}

impl LinkDetector {
    pub(crate) fn new(rules: &FormatRules) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(&link_pattern(&rules.link_suffixes))?,
            valid: Regex::new(&valid_pattern(&rules.link_suffixes))?,
            trailing: rules.trailing_punctuation.clone(),
            leading: rules.leading_artifacts.clone(),
        })
    }

    /// Append `text` to `nodes`, with every link token replaced by a `Link`.
    /// Characters removed during cleanup stay in the output as plain text.
    pub(crate) fn linkify(&self, text: &str, nodes: &mut Vec<Node>) {
        let mut last = 0;
        for found in self.pattern.find_iter(text) {
            push_text(nodes, &text[last..found.start()]);
            let raw = found.as_str();
            match self.clean(raw) {
                Some((start, end)) => {
                    push_text(nodes, &raw[..start]);
                    nodes.push(Node::Link(make_span(raw, &raw[start..end])));
                    push_text(nodes, &raw[end..]);
                }
                None => push_text(nodes, raw),
            }
            last = found.end();
        }
        push_text(nodes, &text[last..]);
    }

    /// Byte range of the cleaned token inside `raw`, or `None` if what
    /// survives cleanup no longer has a host to point at.
    fn clean(&self, raw: &str) -> Option<(usize, usize)> {
        let mut end = raw.len();
        while let Some(c) = raw[..end].chars().next_back() {
            if !self.trailing.contains(&c) {
                break;
            }
            end -= c.len_utf8();
        }

        let mut start = 0;
        for artifact in &self.leading {
            if raw[start..end].starts_with(artifact.as_str()) {
                start += artifact.len();
            }
        }

        let cleaned = &raw[start..end];
        (!cleaned.is_empty() && self.valid.is_match(cleaned)).then_some((start, end))
    }
}

fn make_span(raw: &str, cleaned: &str) -> LinkSpan {
    let href = if has_scheme(cleaned) {
        cleaned.to_string()
    } else {
        format!("https://{cleaned}")
    };
    LinkSpan {
        raw: raw.to_string(),
        cleaned: cleaned.to_string(),
        href,
    }
}

fn has_scheme(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Three alternatives, tried left to right at each position: explicit
/// scheme, `www.` prefix, bare host ending in an allow-listed suffix.
fn link_pattern(suffixes: &[String]) -> String {
    let mut pattern = String::from(r"(?i)https?://[^\s<>]+|www\.[^\s<>]+");
    if !suffixes.is_empty() {
        let alternatives = suffixes
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        pattern.push_str(&format!(r"|[a-z0-9.\-]+(?:{alternatives})\b[^\s<>]*"));
    }
    pattern
}

/// A cleaned token must still be a scheme or `www.` followed by a host, or a
/// host ending in an allow-listed suffix.
fn valid_pattern(suffixes: &[String]) -> String {
    let mut pattern = String::from(r"(?i)^(?:(?:https?://|www\.)[\p{L}\p{N}][^\s<>]*");
    if !suffixes.is_empty() {
        let alternatives = suffixes
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        pattern.push_str(&format!(r"|[a-z0-9][a-z0-9.\-]*(?:{alternatives})\b[^\s<>]*"));
    }
    pattern.push_str(")$");
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> LinkDetector {
        LinkDetector::new(&FormatRules::default()).unwrap()
    }

    fn linkify(text: &str) -> Vec<Node> {
        let mut nodes = Vec::new();
        detector().linkify(text, &mut nodes);
        nodes
    }

    fn link(raw: &str, cleaned: &str, href: &str) -> Node {
        Node::Link(LinkSpan {
            raw: raw.into(),
            cleaned: cleaned.into(),
            href: href.into(),
        })
    }

    #[test]
    fn scheme_url_keeps_href() {
        assert_eq!(
            linkify("go to http://inf.ufrgs.br/x now"),
            vec![
                Node::Text("go to ".into()),
                link("http://inf.ufrgs.br/x", "http://inf.ufrgs.br/x", "http://inf.ufrgs.br/x"),
                Node::Text(" now".into()),
            ]
        );
    }

    #[test]
    fn trailing_punctuation_is_stripped_repeatedly() {
        assert_eq!(
            linkify("(https://a.com/b).;"),
            vec![
                Node::Text("(".into()),
                link("https://a.com/b).;", "https://a.com/b", "https://a.com/b"),
                Node::Text(").;".into()),
            ]
        );
    }

    #[test]
    fn bare_suffix_gets_https() {
        assert_eq!(
            linkify("site.ufrgs.br/ppc, ok"),
            vec![
                link("site.ufrgs.br/ppc,", "site.ufrgs.br/ppc", "https://site.ufrgs.br/ppc"),
                Node::Text(", ok".into()),
            ]
        );
    }

    #[test]
    fn suffix_must_end_on_word_boundary() {
        assert_eq!(
            linkify("site.ufrgs.brazil"),
            vec![Node::Text("site.ufrgs.brazil".into())]
        );
    }

    #[test]
    fn leading_numbering_artifact_is_split_off() {
        assert_eq!(
            linkify("1.www.ufrgs.br"),
            vec![
                Node::Text("1.".into()),
                link("1.www.ufrgs.br", "www.ufrgs.br", "https://www.ufrgs.br"),
            ]
        );
    }

    #[test]
    fn leading_stray_period_is_split_off() {
        assert_eq!(
            linkify(".prograd.ufrgs.br"),
            vec![
                Node::Text(".".into()),
                link(".prograd.ufrgs.br", "prograd.ufrgs.br", "https://prograd.ufrgs.br"),
            ]
        );
    }

    #[test]
    fn stops_before_angle_brackets() {
        assert_eq!(
            linkify("<https://a.com>"),
            vec![
                Node::Text("<".into()),
                link("https://a.com", "https://a.com", "https://a.com"),
                Node::Text(">".into()),
            ]
        );
    }

    #[test]
    fn www_prefix_is_case_insensitive() {
        let nodes = linkify("WWW.Example.com");
        assert_eq!(
            nodes,
            vec![link("WWW.Example.com", "WWW.Example.com", "https://WWW.Example.com")]
        );
    }

    #[test]
    fn uppercase_scheme_is_not_prefixed_again() {
        assert_eq!(
            linkify("HTTPS://a.com"),
            vec![link("HTTPS://a.com", "HTTPS://a.com", "HTTPS://a.com")]
        );
    }

    #[test]
    fn no_suffixes_disables_bare_hosts() {
        let rules = FormatRules {
            link_suffixes: Vec::new(),
            ..FormatRules::default()
        };
        let mut nodes = Vec::new();
        LinkDetector::new(&rules)
            .unwrap()
            .linkify("site.ufrgs.br", &mut nodes);
        assert_eq!(nodes, vec![Node::Text("site.ufrgs.br".into())]);
    }

    #[test]
    fn plain_text_without_links_is_untouched() {
        assert_eq!(
            linkify("no links here."),
            vec![Node::Text("no links here.".into())]
        );
    }

    #[test]
    fn token_without_host_after_cleanup_stays_text() {
        assert_eq!(linkify("www.)"), vec![Node::Text("www.)".into())]);
        assert_eq!(
            linkify("see https://."),
            vec![Node::Text("see https://.".into())]
        );
        assert_eq!(linkify("http://)."), vec![Node::Text("http://).".into())]);
    }

    #[test]
    fn artifact_only_suffix_token_stays_text() {
        assert_eq!(linkify("1..ufrgs.br"), vec![Node::Text("1..ufrgs.br".into())]);
    }
}
