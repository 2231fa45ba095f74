//! Message formatter: raw answer text in, typed node tree out.
//!
//! The pipeline runs in a fixed order:
//! 1. bold spans (`**text**`, single line), whose content is only linkified;
//! 2. bullet markers (`* ` at the start or after whitespace) over the rest;
//! 3. link detection over every remaining piece of plain text.
//!
//! Anything not claimed by a rule ends up in a `Text` node. The formatter
//! never fails on input; unmatched delimiters stay as literal characters.

mod link;
mod node;
mod rules;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use link::LinkDetector;

pub use node::{LinkSpan, MessageBody, Node};
pub use rules::FormatRules;

/// A compiled rule table. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct Formatter {
    rules: FormatRules,
    bold: Regex,
    links: LinkDetector,
}

impl Formatter {
    pub fn new(rules: FormatRules) -> Result<Self> {
        rules.validate()?;
        let delimiter = regex::escape(&rules.bold_delimiter);
        let bold = Regex::new(&format!("{delimiter}(.+?){delimiter}"))?;
        let links = LinkDetector::new(&rules)?;
        Ok(Self { rules, bold, links })
    }

    /// Format `text` into a node tree.
    pub fn render(&self, text: &str) -> MessageBody {
        let mut nodes = Vec::new();
        let mut last = 0;

        for caps in self.bold.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            self.push_block(text, last, whole.start(), &mut nodes);

            let mut children = Vec::new();
            self.links.linkify(inner.as_str(), &mut children);
            nodes.push(Node::Strong(children));

            last = whole.end();
        }
        self.push_block(text, last, text.len(), &mut nodes);

        MessageBody { nodes }
    }

    /// Bullets and links for `text[start..end]`. Bullet markers are only
    /// recognised at the start of the whole text or right after whitespace,
    /// judged against the full string so a bold span ending next to `* `
    /// does not start a list item.
    fn push_block(&self, text: &str, start: usize, end: usize, nodes: &mut Vec<Node>) {
        let segment = &text[start..end];
        let marker = self.rules.bullet_marker.as_str();
        let mut last = 0;

        for (pos, _) in segment.match_indices(marker) {
            let absolute = start + pos;
            let after_space = text[..absolute]
                .chars()
                .next_back()
                .map_or(true, char::is_whitespace);
            if !after_space {
                continue;
            }

            // The whitespace run before the marker is replaced by the break.
            let before = segment[last..pos].trim_end();
            self.links.linkify(before, nodes);
            nodes.push(Node::LineBreak);
            nodes.push(Node::Bullet(self.rules.bullet_glyph.clone()));

            last = pos + marker.len();
        }

        self.links.linkify(&segment[last..], nodes);
    }
}

impl Default for Formatter {
    fn default() -> Self {
        default_formatter().clone()
    }
}

fn default_formatter() -> &'static Formatter {
    static DEFAULT: OnceLock<Formatter> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        Formatter::new(FormatRules::default()).expect("default format rules must compile")
    })
}

/// Format `text` with the default rule table.
pub fn render(text: &str) -> MessageBody {
    default_formatter().render(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text(s.into())
    }

    fn bullet() -> Node {
        Node::Bullet("•".into())
    }

    #[test]
    fn empty_input_gives_empty_body() {
        let body = render("");
        assert!(body.is_empty());
        assert!(body.nodes.is_empty());
    }

    #[test]
    fn bold_span_drops_delimiters() {
        assert_eq!(render("**bold**").nodes, vec![Node::Strong(vec![text("bold")])]);
    }

    #[test]
    fn bold_inside_sentence() {
        assert_eq!(
            render("a **b** c").nodes,
            vec![text("a "), Node::Strong(vec![text("b")]), text(" c")]
        );
    }

    #[test]
    fn unbalanced_bold_stays_literal() {
        assert_eq!(render("**open only").nodes, vec![text("**open only")]);
        assert_eq!(
            render("**a** and **b").nodes,
            vec![Node::Strong(vec![text("a")]), text(" and **b")]
        );
    }

    #[test]
    fn bold_does_not_span_lines() {
        assert_eq!(
            render("**a\nb**").nodes,
            vec![text("**a"), Node::LineBreak, text("b**")]
        );
    }

    #[test]
    fn bold_content_is_not_reprocessed_for_bold() {
        assert_eq!(render("****").nodes, vec![text("****")]);
    }

    #[test]
    fn url_with_trailing_punctuation() {
        let body = render("Visit https://example.com/a, now.");
        let links = body.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://example.com/a");
        assert_eq!(links[0].cleaned, "https://example.com/a");
        assert_eq!(links[0].raw, "https://example.com/a,");
        assert_eq!(body.nodes.last(), Some(&text(", now.")));
        assert_eq!(body.visible_text(), "Visit https://example.com/a, now.");
    }

    #[test]
    fn www_link_gets_scheme() {
        let body = render("see www.ufrgs.br/info.");
        assert_eq!(
            body.nodes,
            vec![
                text("see "),
                Node::Link(LinkSpan {
                    raw: "www.ufrgs.br/info.".into(),
                    cleaned: "www.ufrgs.br/info".into(),
                    href: "https://www.ufrgs.br/info".into(),
                }),
                text("."),
            ]
        );
    }

    #[test]
    fn bullets_on_separate_lines() {
        assert_eq!(
            render("* first\n* second").nodes,
            vec![
                Node::LineBreak,
                bullet(),
                text("first"),
                Node::LineBreak,
                bullet(),
                text("second"),
            ]
        );
    }

    #[test]
    fn inline_bullets_after_whitespace() {
        assert_eq!(
            render("Options: * one * two").nodes,
            vec![
                text("Options:"),
                Node::LineBreak,
                bullet(),
                text("one"),
                Node::LineBreak,
                bullet(),
                text("two"),
            ]
        );
    }

    #[test]
    fn star_without_space_or_inside_word_is_literal() {
        assert_eq!(render("a*b and x* y").nodes, vec![text("a*b and x* y")]);
        assert_eq!(render("*").nodes, vec![text("*")]);
    }

    #[test]
    fn marker_right_after_bold_is_not_a_bullet() {
        assert_eq!(
            render("**a*** x").nodes,
            vec![Node::Strong(vec![text("a")]), text("* x")]
        );
    }

    #[test]
    fn bullet_followed_by_bold_and_link() {
        let body = render("* **Curso:** veja site.ufrgs.br.");
        assert_eq!(body.nodes[0], Node::LineBreak);
        assert_eq!(body.nodes[1], bullet());
        assert_eq!(body.nodes[2], Node::Strong(vec![text("Curso:")]));
        assert_eq!(body.links().len(), 1);
        assert_eq!(body.links()[0].href, "https://site.ufrgs.br");
        assert_eq!(body.visible_text(), "\n• Curso: veja site.ufrgs.br.");
    }

    #[test]
    fn links_inside_bold_are_linkified() {
        let body = render("**veja https://a.com**");
        assert_eq!(
            body.nodes,
            vec![Node::Strong(vec![
                text("veja "),
                Node::Link(LinkSpan {
                    raw: "https://a.com".into(),
                    cleaned: "https://a.com".into(),
                    href: "https://a.com".into(),
                }),
            ])]
        );
    }

    #[test]
    fn markup_is_never_interpreted() {
        let body = render("<script>alert(1)</script> <a href=x>y</a>");
        assert!(body.links().is_empty());
        assert_eq!(
            body.nodes,
            vec![text("<script>alert(1)</script> <a href=x>y</a>")]
        );
    }

    #[test]
    fn render_is_idempotent() {
        let input = "**Info:** * ver www.ufrgs.br.\n* e 1.site.ufrgs.br/x)";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn custom_rules_change_the_scanner() {
        let formatter = Formatter::new(FormatRules {
            bold_delimiter: "__".into(),
            bullet_marker: "- ".into(),
            bullet_glyph: "-".into(),
            link_suffixes: vec![".edu".into()],
            ..FormatRules::default()
        })
        .unwrap();
        let body = formatter.render("__x__ - mit.edu **y**");
        assert_eq!(
            body.nodes[..3],
            [
                Node::Strong(vec![text("x")]),
                Node::LineBreak,
                Node::Bullet("-".into()),
            ]
        );
        assert_eq!(body.links()[0].href, "https://mit.edu");
        assert_eq!(body.nodes.last(), Some(&text(" **y**")));
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let result = Formatter::new(FormatRules {
            bold_delimiter: String::new(),
            ..FormatRules::default()
        });
        assert!(result.is_err());
    }
}
