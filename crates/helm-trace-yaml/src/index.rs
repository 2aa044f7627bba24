use regex::Regex;
use std::sync::LazyLock;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

/// A value node of a parsed YAML stream, located in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlNode {
    /// Keys and sequence indices leading to the node; empty for a document root.
    pub path: Vec<String>,
    pub kind: NodeKind,
    /// Resolved core schema tag, e.g. `!!map` or `!!int`.
    pub tag: &'static str,
    /// 1-based line the node starts on. Collections start at their first entry.
    pub line: usize,
    /// 0-based character column the node starts at.
    pub col: usize,
    /// Last line covered by the node or any of its descendants.
    pub end_line: usize,
    pub scalar: Option<String>,
}

/// All value nodes of a YAML stream in document order (parents before children),
/// together with the source lines they were located in.
#[derive(Debug, Default, Clone)]
pub struct NodeIndex {
    nodes: Vec<YamlNode>,
    documents: usize,
    lines: Vec<String>,
}

impl NodeIndex {
    /// # Errors
    ///
    /// Returns the scanner error if `src` is not valid YAML.
    pub fn parse(src: &str) -> Result<Self, ScanError> {
        let lines: Vec<String> = src.lines().map(str::to_string).collect();
        let mut builder = IndexBuilder::new(&lines);
        let mut parser = Parser::new(src.chars());
        parser.load(&mut builder, true)?;
        let IndexBuilder { nodes, documents, .. } = builder;
        Ok(Self {
            nodes,
            documents,
            lines,
        })
    }

    #[must_use]
    pub fn nodes(&self) -> &[YamlNode] {
        &self.nodes
    }

    /// Number of documents with a root node.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Source lines, without line terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn starting_at(&self, line: usize) -> impl Iterator<Item = &YamlNode> {
        self.nodes.iter().filter(move |n| n.line == line)
    }
}

static INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-+]?[0-9]+|0o[0-7]+|0x[0-9a-fA-F]+)$").unwrap());
static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$")
        .unwrap()
});

static BLOCK_INDICATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(?P<indicator>[|>][0-9+-]*)\s*(?:#.*)?$").unwrap());

/// Core schema tag of a scalar.
#[must_use]
pub fn scalar_tag(value: &str, plain: bool) -> &'static str {
    if !plain {
        return "!!str";
    }
    match value {
        "" | "~" | "null" | "Null" | "NULL" => "!!null",
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => "!!bool",
        v if INT.is_match(v) => "!!int",
        v if FLOAT.is_match(v) => "!!float",
        _ => "!!str",
    }
}

#[derive(Debug)]
enum Frame {
    Mapping {
        node: usize,
        key: Option<String>,
        key_mark: Option<Marker>,
        /// Block mappings are located at their first key rather than the event marker.
        locate_at_key: bool,
    },
    Sequence {
        node: usize,
        next: usize,
    },
}

impl Frame {
    fn node(&self) -> usize {
        match self {
            Self::Mapping { node, .. } | Self::Sequence { node, .. } => *node,
        }
    }
}

#[derive(Debug)]
struct IndexBuilder<'a> {
    lines: &'a [String],
    nodes: Vec<YamlNode>,
    stack: Vec<Frame>,
    /// Nesting depth inside a complex (collection) mapping key.
    skip_depth: usize,
    documents: usize,
}

impl<'a> IndexBuilder<'a> {
    fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            nodes: Vec::new(),
            stack: Vec::new(),
            skip_depth: 0,
            documents: 0,
        }
    }

    fn char_at(&self, line: usize, col: usize) -> Option<char> {
        self.lines.get(line.checked_sub(1)?)?.chars().nth(col)
    }

    fn expects_key(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Mapping { key: None, .. }))
    }

    fn set_key(&mut self, value: String, mark: Option<Marker>) {
        let Some(Frame::Mapping {
            node,
            key,
            key_mark,
            locate_at_key,
        }) = self.stack.last_mut()
        else {
            return;
        };
        *key = Some(value);
        *key_mark = mark;
        if let Some(mark) = mark
            && *locate_at_key
        {
            *locate_at_key = false;
            let mapping = &mut self.nodes[*node];
            mapping.line = mark.line();
            mapping.col = mark.col();
            mapping.end_line = mapping.end_line.max(mark.line());
        }
    }

    fn child_path(&self) -> Vec<String> {
        let Some(frame) = self.stack.last() else {
            return Vec::new();
        };
        let mut path = self.nodes[frame.node()].path.clone();
        match frame {
            Frame::Mapping { key, .. } => path.push(key.clone().unwrap_or_default()),
            Frame::Sequence { next, .. } => path.push(next.to_string()),
        }
        path
    }

    fn advance(&mut self) {
        match self.stack.last_mut() {
            Some(Frame::Mapping { key, key_mark, .. }) => {
                *key = None;
                *key_mark = None;
            }
            Some(Frame::Sequence { next, .. }) => *next += 1,
            None => {}
        }
    }

    /// Line and column of the `|`/`>` indicator of a block scalar whose marker
    /// may point at its content.
    fn block_scalar_start(&self, mark: Marker, empty: bool) -> (usize, usize) {
        if matches!(self.char_at(mark.line(), mark.col()), Some('|' | '>')) {
            return (mark.line(), mark.col());
        }
        let lower = match self.stack.last() {
            Some(Frame::Mapping {
                key_mark: Some(key_mark),
                ..
            }) => key_mark.line(),
            Some(frame) => self.nodes[frame.node()].line,
            None => 1,
        };
        let upper = if empty { mark.line() } else { mark.line().saturating_sub(1) };
        for line in (lower.max(1)..=upper).rev() {
            let Some(text) = self.lines.get(line - 1) else {
                continue;
            };
            if let Some(indicator) = BLOCK_INDICATOR.captures(text).and_then(|c| c.name("indicator")) {
                return (line, text[..indicator.start()].chars().count());
            }
        }
        (mark.line(), mark.col())
    }

    fn push_node(
        &mut self,
        kind: NodeKind,
        tag: &'static str,
        (line, col): (usize, usize),
        scalar: Option<String>,
        extra_lines: usize,
    ) -> usize {
        let end_line = line + extra_lines;

        for frame in &self.stack {
            let parent = &mut self.nodes[frame.node()];
            parent.end_line = parent.end_line.max(end_line);
        }
        if self.stack.is_empty() {
            self.documents += 1;
        }

        let path = self.child_path();
        self.advance();
        self.nodes.push(YamlNode {
            path,
            kind,
            tag,
            line,
            col,
            end_line,
            scalar,
        });
        self.nodes.len() - 1
    }
}

impl MarkedEventReceiver for IndexBuilder<'_> {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.skip_depth > 0 {
            match ev {
                Event::MappingStart(..) | Event::SequenceStart(..) => self.skip_depth += 1,
                Event::MappingEnd | Event::SequenceEnd => {
                    self.skip_depth -= 1;
                    if self.skip_depth == 0 {
                        self.set_key("?".to_string(), None);
                    }
                }
                _ => {}
            }
            return;
        }

        match ev {
            Event::Scalar(value, style, ..) => {
                if self.expects_key() {
                    self.set_key(value, Some(mark));
                    return;
                }
                let tag = scalar_tag(&value, matches!(style, TScalarStyle::Plain));
                let block = !matches!(
                    style,
                    TScalarStyle::Plain | TScalarStyle::SingleQuoted | TScalarStyle::DoubleQuoted
                );
                if block {
                    // content starts on the line after the indicator
                    let start = self.block_scalar_start(mark, value.is_empty());
                    let extra_lines = value.trim_end_matches('\n').lines().count();
                    self.push_node(NodeKind::Scalar, tag, start, Some(value), extra_lines);
                } else {
                    self.push_node(NodeKind::Scalar, tag, (mark.line(), mark.col()), Some(value), 0);
                }
            }
            Event::Alias(..) => {
                if self.expects_key() {
                    self.set_key("*".to_string(), Some(mark));
                } else {
                    self.advance();
                }
            }
            Event::MappingStart(..) => {
                if self.expects_key() {
                    self.skip_depth = 1;
                    return;
                }
                let flow = self.char_at(mark.line(), mark.col()) == Some('{');
                let node = self.push_node(NodeKind::Mapping, "!!map", (mark.line(), mark.col()), None, 0);
                self.stack.push(Frame::Mapping {
                    node,
                    key: None,
                    key_mark: None,
                    locate_at_key: !flow,
                });
            }
            Event::SequenceStart(..) => {
                if self.expects_key() {
                    self.skip_depth = 1;
                    return;
                }
                let node = self.push_node(NodeKind::Sequence, "!!seq", (mark.line(), mark.col()), None, 0);
                self.stack.push(Frame::Sequence { node, next: 0 });
            }
            Event::MappingEnd | Event::SequenceEnd => {
                self.stack.pop();
            }
            _ => {}
        }
    }
}
