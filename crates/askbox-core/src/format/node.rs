//! Typed node tree produced by the formatter.
//!
//! Nodes only ever carry plain strings. Whatever renders them must create
//! text through a primitive that does not interpret markup.

/// A URL-like token found in an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    /// The token exactly as it matched.
    pub raw: String,
    /// The token after punctuation and artifact cleanup. This is the visible text.
    pub cleaned: String,
    /// Where the link points. Always carries a scheme.
    pub href: String,
}

/// One node of a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, shown as-is.
    Text(String),
    /// Strong emphasis. Children are only `Text` and `Link`.
    Strong(Vec<Node>),
    Link(LinkSpan),
    LineBreak,
    /// Bullet glyph starting a list item.
    Bullet(String),
}

/// A formatted message: the root of the node tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub nodes: Vec<Node>,
}

impl MessageBody {
    /// A body holding `text` verbatim, with no formatting applied.
    pub fn plain(text: &str) -> Self {
        let mut nodes = Vec::new();
        push_text(&mut nodes, text);
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The visible text of the body, with line breaks as `\n` and bullets as
    /// their glyph followed by a space.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    /// All links in document order, including those inside bold spans.
    pub fn links(&self) -> Vec<&LinkSpan> {
        let mut out = Vec::new();
        collect_links(&self.nodes, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Strong(children) => collect_text(children, out),
            Node::Link(link) => out.push_str(&link.cleaned),
            Node::LineBreak => out.push('\n'),
            Node::Bullet(glyph) => {
                out.push_str(glyph);
                out.push(' ');
            }
        }
    }
}

fn collect_links<'a>(nodes: &'a [Node], out: &mut Vec<&'a LinkSpan>) {
    for node in nodes {
        match node {
            Node::Link(link) => out.push(link),
            Node::Strong(children) => collect_links(children, out),
            _ => {}
        }
    }
}

/// Append `text`, splitting line feeds into `LineBreak` nodes and merging
/// with a preceding `Text` node. Empty pieces are dropped.
pub(crate) fn push_text(nodes: &mut Vec<Node>, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::LineBreak);
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        match nodes.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(line),
            _ => nodes.push(Node::Text(line.to_string())),
        }
    }
}
