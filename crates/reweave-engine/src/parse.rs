/* crates/reweave-engine/src/parse.rs */

// Byte-level JSX scanner. Produces a flat node arena with parent links
// and exact source spans, built fresh for every rewrite call and
// discarded afterwards. Whole component files are accepted: anything
// outside a markup region (imports, function bodies) is skipped
// permissively, with string/template/comment awareness so a `<` inside
// a literal never opens an element.

use crate::error::RewriteError;

pub(crate) type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
  pub start: usize,
  pub end: usize,
}

impl Span {
  pub(crate) fn contains(self, offset: usize) -> bool {
    self.start <= offset && offset < self.end
  }

  pub(crate) fn len(self) -> usize {
    self.end - self.start
  }

  pub(crate) fn text(self, source: &str) -> &str {
    &source[self.start..self.end]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
  Element,
  SelfClosing,
  Fragment,
  Expression,
  Text,
  Comment,
}

impl NodeKind {
  /// Kinds the locator may land on: nodes with an opening marker or a
  /// children slot of their own.
  pub(crate) fn is_markup(self) -> bool {
    matches!(self, Self::Element | Self::SelfClosing | Self::Fragment)
  }
}

#[derive(Debug, Clone)]
pub(crate) struct Attr {
  pub name: String,
  /// Raw value text including quotes or braces; None for bare attrs.
  pub value: Option<String>,
  pub value_span: Option<Span>,
}

#[derive(Debug)]
pub(crate) struct Node {
  pub kind: NodeKind,
  /// Tag name; empty for fragments, expressions, text and comments.
  pub tag: String,
  pub span: Span,
  /// Opening marker `<`..`>` inclusive. Equals `span` for non-markup
  /// kinds and self-closing elements.
  pub open_span: Span,
  /// Between the opening `>` and the closing `</`.
  pub inner_span: Option<Span>,
  pub attrs: Vec<Attr>,
  pub parent: Option<NodeId>,
  pub children: Vec<NodeId>,
}

impl Node {
  pub(crate) fn attr(&self, name: &str) -> Option<&Attr> {
    self.attrs.iter().find(|a| a.name == name)
  }
}

#[derive(Debug)]
pub(crate) struct Tree<'a> {
  pub source: &'a str,
  pub nodes: Vec<Node>,
  pub roots: Vec<NodeId>,
}

impl Tree<'_> {
  /// All element / self-closing / fragment nodes in document order.
  pub(crate) fn markup_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
    (0..self.nodes.len()).filter(|&id| self.nodes[id].kind.is_markup())
  }
}

/// Parse raw source into an element tree. The input is never mutated;
/// malformed markup surfaces as `RewriteError::Parse` with no partial
/// recovery.
pub(crate) fn parse(source: &str) -> Result<Tree<'_>, RewriteError> {
  let mut parser = Parser { source, bytes: source.as_bytes(), pos: 0, nodes: Vec::new() };
  let mut roots = Vec::new();

  while parser.pos < parser.bytes.len() {
    match parser.bytes[parser.pos] {
      b'"' | b'\'' => parser.skip_string()?,
      b'`' => parser.skip_template()?,
      b'/' if parser.peek(1) == Some(b'/') => parser.skip_line_comment(),
      b'/' if parser.peek(1) == Some(b'*') => parser.skip_block_comment()?,
      b'<' if parser.at_element_start() => {
        let id = parser.parse_markup(None)?;
        roots.push(id);
      }
      _ => parser.pos += 1,
    }
  }

  Ok(Tree { source, nodes: parser.nodes, roots })
}

struct Parser<'a> {
  source: &'a str,
  bytes: &'a [u8],
  pos: usize,
  nodes: Vec<Node>,
}

fn is_tag_start_byte(b: u8) -> bool {
  b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_tag_byte(b: u8) -> bool {
  b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'.' | b'-' | b':')
}

impl Parser<'_> {
  fn peek(&self, ahead: usize) -> Option<u8> {
    self.bytes.get(self.pos + ahead).copied()
  }

  fn err(&self, message: impl Into<String>) -> RewriteError {
    RewriteError::parse(self.pos, message)
  }

  /// True when the `<` at `pos` opens markup rather than acting as a
  /// comparison or generic-argument bracket. Markup only begins in
  /// expression position: after an opener/operator byte or one of the
  /// statement keywords that can precede an expression.
  fn at_element_start(&self) -> bool {
    match self.peek(1) {
      Some(b'>') => {} // fragment
      Some(b) if is_tag_start_byte(b) => {}
      _ => return false,
    }
    let mut i = self.pos;
    while i > 0 && self.bytes[i - 1].is_ascii_whitespace() {
      i -= 1;
    }
    if i == 0 {
      return true;
    }
    let prev = self.bytes[i - 1];
    if matches!(prev, b'(' | b',' | b'{' | b'[' | b'?' | b':' | b';' | b'=' | b'>' | b'&' | b'|' | b'!')
    {
      return true;
    }
    // Walk back over the preceding identifier and check for keywords
    let word_end = i;
    while i > 0 && (self.bytes[i - 1].is_ascii_alphanumeric() || self.bytes[i - 1] == b'_') {
      i -= 1;
    }
    matches!(&self.source[i..word_end], "return" | "yield" | "default" | "case" | "do" | "else")
  }

  /// Parse an element, self-closing element, or fragment starting at
  /// the `<` under the cursor.
  fn parse_markup(&mut self, parent: Option<NodeId>) -> Result<NodeId, RewriteError> {
    let start = self.pos;
    self.pos += 1; // '<'

    // Fragment: <> children </>
    if self.peek(0) == Some(b'>') {
      self.pos += 1;
      let open_span = Span { start, end: self.pos };
      let id = self.push_node(NodeKind::Fragment, String::new(), parent, open_span);
      let inner_start = self.pos;
      self.parse_children(id, "")?;
      let inner_end = self.close_tag_start(inner_start);
      self.nodes[id].span = Span { start, end: self.pos };
      self.nodes[id].inner_span = Some(Span { start: inner_start, end: inner_end });
      return Ok(id);
    }

    let tag_start = self.pos;
    while self.peek(0).is_some_and(is_tag_byte) {
      self.pos += 1;
    }
    if self.pos == tag_start {
      return Err(self.err("expected tag name after '<'"));
    }
    let tag = self.source[tag_start..self.pos].to_string();

    let (attrs, self_closing) = self.parse_attrs(&tag)?;
    let open_span = Span { start, end: self.pos };

    if self_closing {
      let id = self.push_node(NodeKind::SelfClosing, tag, parent, open_span);
      self.nodes[id].attrs = attrs;
      self.nodes[id].span = open_span;
      return Ok(id);
    }

    let id = self.push_node(NodeKind::Element, tag.clone(), parent, open_span);
    self.nodes[id].attrs = attrs;
    let inner_start = self.pos;
    self.parse_children(id, &tag)?;
    let inner_end = self.close_tag_start(inner_start);
    self.nodes[id].span = Span { start, end: self.pos };
    self.nodes[id].inner_span = Some(Span { start: inner_start, end: inner_end });
    Ok(id)
  }

  /// Byte offset where the just-consumed closing tag begins. The
  /// cursor sits right after its `>`, so scan back to the `<`.
  fn close_tag_start(&self, floor: usize) -> usize {
    let mut i = self.pos;
    while i > floor && self.bytes[i - 1] != b'<' {
      i -= 1;
    }
    i.saturating_sub(1).max(floor)
  }

  /// Parse the attribute region of an opening tag. Leaves the cursor
  /// just past `>` (or `/>`); returns (attrs, self_closing).
  fn parse_attrs(&mut self, tag: &str) -> Result<(Vec<Attr>, bool), RewriteError> {
    let mut attrs = Vec::new();
    loop {
      while self.peek(0).is_some_and(|b| b.is_ascii_whitespace()) {
        self.pos += 1;
      }
      match self.peek(0) {
        None => return Err(self.err(format!("unclosed opening tag <{tag}>"))),
        Some(b'>') => {
          self.pos += 1;
          return Ok((attrs, false));
        }
        Some(b'/') if self.peek(1) == Some(b'>') => {
          self.pos += 2;
          return Ok((attrs, true));
        }
        Some(b'{') => {
          // Spread attribute: recorded raw so spans stay complete
          let value_start = self.pos;
          self.skip_expression(&format!("<{tag}> spread attribute"))?;
          let span = Span { start: value_start, end: self.pos };
          attrs.push(Attr {
            name: "...".to_string(),
            value: Some(span.text(self.source).to_string()),
            value_span: Some(span),
          });
        }
        Some(b) if is_tag_start_byte(b) => {
          let name_start = self.pos;
          while self.peek(0).is_some_and(is_tag_byte) {
            self.pos += 1;
          }
          let name = self.source[name_start..self.pos].to_string();
          if self.peek(0) != Some(b'=') {
            attrs.push(Attr { name, value: None, value_span: None });
            continue;
          }
          self.pos += 1; // '='
          let value_start = self.pos;
          match self.peek(0) {
            Some(q @ (b'"' | b'\'')) => {
              self.pos += 1;
              while self.peek(0).is_some_and(|b| b != q) {
                self.pos += 1;
              }
              if self.peek(0).is_none() {
                return Err(self.err(format!("unterminated string for attribute {name}")));
              }
              self.pos += 1;
            }
            Some(b'{') => self.skip_expression(&format!("attribute {name}"))?,
            _ => return Err(self.err(format!("expected value for attribute {name}"))),
          }
          let span = Span { start: value_start, end: self.pos };
          attrs.push(Attr {
            name,
            value: Some(span.text(self.source).to_string()),
            value_span: Some(span),
          });
        }
        Some(other) => {
          return Err(self.err(format!("unexpected byte {:?} in <{tag}>", other as char)));
        }
      }
    }
  }

  /// Parse children until the matching close tag (`</tag>`, or `</>`
  /// for fragments). Leaves the cursor past the close tag's `>`.
  fn parse_children(&mut self, parent: NodeId, tag: &str) -> Result<(), RewriteError> {
    loop {
      match self.peek(0) {
        None => {
          let name = if tag.is_empty() { "<>".to_string() } else { format!("<{tag}>") };
          return Err(self.err(format!("unclosed {name}")));
        }
        Some(b'<') if self.peek(1) == Some(b'/') => {
          self.consume_close_tag(tag)?;
          return Ok(());
        }
        Some(b'<') => {
          if !self.peek(1).is_some_and(|b| is_tag_start_byte(b) || b == b'>') {
            return Err(self.err("unexpected '<' in element body"));
          }
          self.parse_markup(Some(parent))?;
        }
        Some(b'{') => {
          self.parse_expression_child(parent)?;
        }
        _ => {
          let start = self.pos;
          while self.peek(0).is_some_and(|b| b != b'<' && b != b'{') {
            self.pos += 1;
          }
          let span = Span { start, end: self.pos };
          let id = self.push_node(NodeKind::Text, String::new(), Some(parent), span);
          self.nodes[id].span = span;
        }
      }
    }
  }

  fn consume_close_tag(&mut self, tag: &str) -> Result<(), RewriteError> {
    self.pos += 2; // '</'
    let name_start = self.pos;
    while self.peek(0).is_some_and(is_tag_byte) {
      self.pos += 1;
    }
    let name = &self.source[name_start..self.pos];
    if name != tag {
      let expected = if tag.is_empty() { "</>".to_string() } else { format!("</{tag}>") };
      return Err(self.err(format!("expected {expected}, found </{name}>")));
    }
    while self.peek(0).is_some_and(|b| b.is_ascii_whitespace()) {
      self.pos += 1;
    }
    if self.peek(0) != Some(b'>') {
      return Err(self.err(format!("malformed closing tag </{name}")));
    }
    self.pos += 1;
    Ok(())
  }

  /// Parse a `{ ... }` child. Elements nested inside the expression
  /// (map callbacks, conditionals) become child nodes of the
  /// expression so the locator can reach them. `{/* ... */}` becomes
  /// a comment node.
  fn parse_expression_child(&mut self, parent: NodeId) -> Result<NodeId, RewriteError> {
    let start = self.pos;
    let id = self.push_node(NodeKind::Expression, String::new(), Some(parent), Span {
      start,
      end: start,
    });
    let mut depth = 0usize;
    while let Some(b) = self.peek(0) {
      match b {
        b'{' => {
          depth += 1;
          self.pos += 1;
        }
        b'}' => {
          depth -= 1;
          self.pos += 1;
          if depth == 0 {
            let span = Span { start, end: self.pos };
            let inner = span.text(self.source);
            let trimmed = inner[1..inner.len() - 1].trim();
            if trimmed.starts_with("/*") && trimmed.ends_with("*/") && self.nodes[id].children.is_empty()
            {
              self.nodes[id].kind = NodeKind::Comment;
            }
            self.nodes[id].span = span;
            self.nodes[id].open_span = span;
            return Ok(id);
          }
        }
        b'"' | b'\'' => self.skip_string()?,
        b'`' => self.skip_template()?,
        b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
        b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
        b'<' if self.at_element_start() => {
          self.parse_markup(Some(id))?;
        }
        _ => self.pos += 1,
      }
    }
    Err(RewriteError::malformed("embedded expression".to_string()))
  }

  /// Skip a balanced `{ ... }` without creating nodes (attribute
  /// values, template holes).
  fn skip_expression(&mut self, context: &str) -> Result<(), RewriteError> {
    let mut depth = 0usize;
    while let Some(b) = self.peek(0) {
      match b {
        b'{' => {
          depth += 1;
          self.pos += 1;
        }
        b'}' => {
          depth -= 1;
          self.pos += 1;
          if depth == 0 {
            return Ok(());
          }
        }
        b'"' | b'\'' => self.skip_string()?,
        b'`' => self.skip_template()?,
        b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
        b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
        _ => self.pos += 1,
      }
    }
    Err(RewriteError::malformed(context.to_string()))
  }

  fn skip_string(&mut self) -> Result<(), RewriteError> {
    let quote = self.bytes[self.pos];
    self.pos += 1;
    while let Some(b) = self.peek(0) {
      if b == b'\\' {
        self.pos += 2;
        continue;
      }
      self.pos += 1;
      if b == quote {
        return Ok(());
      }
    }
    Err(self.err("unterminated string literal"))
  }

  fn skip_template(&mut self) -> Result<(), RewriteError> {
    self.pos += 1; // '`'
    while let Some(b) = self.peek(0) {
      match b {
        b'\\' => self.pos += 2,
        b'`' => {
          self.pos += 1;
          return Ok(());
        }
        b'$' if self.peek(1) == Some(b'{') => {
          self.pos += 1;
          self.skip_expression("template hole")?;
        }
        _ => self.pos += 1,
      }
    }
    Err(self.err("unterminated template literal"))
  }

  fn skip_line_comment(&mut self) {
    while self.peek(0).is_some_and(|b| b != b'\n') {
      self.pos += 1;
    }
  }

  fn skip_block_comment(&mut self) -> Result<(), RewriteError> {
    self.pos += 2;
    while self.pos + 1 < self.bytes.len() {
      if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
        self.pos += 2;
        return Ok(());
      }
      self.pos += 1;
    }
    Err(self.err("unterminated block comment"))
  }

  fn push_node(
    &mut self,
    kind: NodeKind,
    tag: String,
    parent: Option<NodeId>,
    open_span: Span,
  ) -> NodeId {
    let id = self.nodes.len();
    self.nodes.push(Node {
      kind,
      tag,
      span: open_span,
      open_span,
      inner_span: None,
      attrs: Vec::new(),
      parent,
      children: Vec::new(),
    });
    if let Some(p) = parent {
      self.nodes[p].children.push(id);
    }
    id
  }
}
