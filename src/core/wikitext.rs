// src/core/wikitext.rs
// Minimal wikitext parser tailored to chart list pages.
// Parsing never fails: anything malformed degrades to plain text, and
// lookups on the resulting tree simply come back empty. Callers that
// require a non-empty result raise their own errors.
//
// Recognized constructs:
//   == Heading ==                      section headings (level = '=' count)
//   {{Label|a|k=v|...}}                records (templates), nesting allowed
//   [[Target]] / [[Target|Display]]    wikilinks
//   <ref ...>...</ref>, <ref ... />    footnotes, kept as opaque spans
//
// Every node remembers its byte span in the source text, so callers can
// splice replacements into the original string without disturbing any
// byte they did not touch.

/// Byte range into the source text handed to `parse`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

#[derive(Clone, Debug)]
pub enum Node {
    Text(Span),
    Link(Link),
    Record(Record),
    Footnote(Span),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Text(s) | Node::Footnote(s) => *s,
            Node::Link(l) => l.span,
            Node::Record(r) => r.span,
        }
    }
}

/// `[[target]]` or `[[target|display]]`.
#[derive(Clone, Debug)]
pub struct Link {
    pub target: String,
    pub display: Option<String>,
    pub span: Span,
}

impl Link {
    /// Text a reader sees for this link.
    pub fn display_text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.target)
    }

    /// Render back to markup. Used for rebuilt links (e.g. after a year
    /// substitution in the target); untouched links are spliced from
    /// their original span instead.
    pub fn to_markup(&self) -> String {
        match &self.display {
            Some(d) => format!("[[{}|{}]]", self.target, d),
            None => format!("[[{}]]", self.target),
        }
    }
}

/// One `{{Label|...}}` invocation.
#[derive(Clone, Debug)]
pub struct Record {
    pub label: String,
    pub params: Vec<Param>,
    pub span: Span,
}

/// A single `|`-separated template parameter. `name` is `None` for
/// positional parameters.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: Option<String>,
    pub value: Vec<Node>,
    pub value_span: Span,
}

impl Record {
    /// Named parameter lookup (names compared after trimming).
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }

    /// 1-based positional parameter lookup, counting unnamed params only.
    pub fn nth(&self, index: usize) -> Option<&Param> {
        self.params
            .iter()
            .filter(|p| p.name.is_none())
            .nth(index.checked_sub(1)?)
    }

    /// Records nested anywhere inside this record's parameters,
    /// document order.
    pub fn records(&self, label: &str) -> Vec<&Record> {
        let mut out = Vec::new();
        for p in &self.params {
            collect_records(&p.value, label, &mut out);
        }
        out
    }
}

impl Param {
    /// Raw parameter text with footnote nodes removed, trimmed.
    pub fn plain_text(&self, text: &str) -> String {
        let mut out = String::new();
        for node in &self.value {
            if !matches!(node, Node::Footnote(_)) {
                out.push_str(node.span().slice(text));
            }
        }
        out.trim().to_string()
    }

    /// Does the value embed a wikilink at any depth?
    pub fn has_link(&self) -> bool {
        fn walk(nodes: &[Node]) -> bool {
            nodes.iter().any(|n| match n {
                Node::Link(_) => true,
                Node::Record(r) => r.params.iter().any(|p| walk(&p.value)),
                _ => false,
            })
        }
        walk(&self.value)
    }

    /// First embedded wikilink, depth-first.
    pub fn links(&self) -> Links<'_> {
        Links::over(&self.value)
    }
}

/// Section = heading plus everything up to the next heading of the same
/// or higher level. Children are the directly nested subsections.
#[derive(Clone, Debug)]
pub struct Section {
    pub label: String,
    pub level: usize,
    pub nodes: Vec<Node>,
    pub children: Vec<Section>,
}

impl Section {
    /// First subsection (any depth) whose heading contains `label`.
    pub fn find_subsection(&self, label: &str) -> Option<&Section> {
        for child in &self.children {
            if child.label.contains(label) {
                return Some(child);
            }
            if let Some(hit) = child.find_subsection(label) {
                return Some(hit);
            }
        }
        None
    }

    /// All records in this section (subsections included), document order,
    /// descending into record parameters.
    pub fn records(&self, label: &str) -> Vec<&Record> {
        let mut out = Vec::new();
        collect_records(&self.nodes, label, &mut out);
        for child in &self.children {
            out.extend(child.records(label));
        }
        out
    }
}

/// Parsed document. Owns a copy of the source text so spans stay valid.
#[derive(Clone, Debug)]
pub struct Tree {
    text: String,
    lead: Vec<Node>,
    sections: Vec<Section>,
}

impl Tree {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First section (any depth) whose heading contains `label`.
    pub fn find_section(&self, label: &str) -> Option<&Section> {
        fn dfs<'a>(sections: &'a [Section], label: &str) -> Option<&'a Section> {
            for s in sections {
                if s.label.contains(label) {
                    return Some(s);
                }
                if let Some(hit) = dfs(&s.children, label) {
                    return Some(hit);
                }
            }
            None
        }
        dfs(&self.sections, label)
    }

    /// All records in the whole document whose label contains `label`,
    /// document order, descending into record parameters.
    pub fn records(&self, label: &str) -> Vec<&Record> {
        let mut out = Vec::new();
        collect_records(&self.lead, label, &mut out);
        for s in &self.sections {
            out.extend(s.records(label));
        }
        out
    }

    /// Lazy, restartable iteration over every wikilink in the document.
    pub fn links(&self) -> Links<'_> {
        let mut stack: Vec<&Node> = Vec::new();
        fn push_section<'a>(stack: &mut Vec<&'a Node>, s: &'a Section) {
            for child in s.children.iter().rev() {
                push_section(stack, child);
            }
            stack.extend(s.nodes.iter().rev());
        }
        for s in self.sections.iter().rev() {
            push_section(&mut stack, s);
        }
        stack.extend(self.lead.iter().rev());
        Links { stack }
    }
}

fn collect_records<'a>(nodes: &'a [Node], label: &str, out: &mut Vec<&'a Record>) {
    for node in nodes {
        if let Node::Record(r) = node {
            if r.label.contains(label) {
                out.push(r);
            }
            for p in &r.params {
                collect_records(&p.value, label, out);
            }
        }
    }
}

/// Depth-first link iterator. Footnote contents stay opaque; a citation
/// link inside a `<ref>` never takes part in enrichment.
pub struct Links<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Links<'a> {
    fn over(nodes: &'a [Node]) -> Self {
        Links {
            stack: nodes.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a Link;

    fn next(&mut self) -> Option<&'a Link> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Link(l) => return Some(l),
                Node::Record(r) => {
                    for p in r.params.iter().rev() {
                        self.stack.extend(p.value.iter().rev());
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/* ---------------- Parsing ---------------- */

/// Parse `text` into a tree. Never fails; malformed markup becomes text.
pub fn parse(text: &str) -> Tree {
    let mut nodes = Vec::new();
    let mut headings: Vec<(usize, usize, String)> = Vec::new(); // (node_idx, level, label)

    let bytes = text.as_bytes();
    let mut pos = 0usize;
    let mut text_start = 0usize;
    let mut at_line_start = true;

    macro_rules! flush_text {
        ($upto:expr) => {
            if text_start < $upto {
                nodes.push(Node::Text(Span {
                    start: text_start,
                    end: $upto,
                }));
            }
        };
    }

    while pos < bytes.len() {
        if at_line_start && bytes[pos] == b'=' {
            if let Some((level, label, line_end)) = parse_heading(text, pos) {
                flush_text!(pos);
                headings.push((nodes.len(), level, label));
                // Heading line itself is kept as a text node so the
                // document can be reassembled from spans.
                nodes.push(Node::Text(Span {
                    start: pos,
                    end: line_end,
                }));
                pos = line_end;
                text_start = pos;
                at_line_start = true;
                continue;
            }
        }
        if text.at(pos, "{{") {
            if let Some(record) = parse_record(text, pos) {
                flush_text!(pos);
                pos = record.span.end;
                text_start = pos;
                nodes.push(Node::Record(record));
                at_line_start = false;
                continue;
            }
        }
        if text.at(pos, "[[") {
            if let Some(link) = parse_link(text, pos) {
                flush_text!(pos);
                pos = link.span.end;
                text_start = pos;
                nodes.push(Node::Link(link));
                at_line_start = false;
                continue;
            }
        }
        if text.at_ci(pos, "<ref") {
            if let Some(span) = parse_footnote(text, pos) {
                flush_text!(pos);
                pos = span.end;
                text_start = pos;
                nodes.push(Node::Footnote(span));
                at_line_start = false;
                continue;
            }
        }
        at_line_start = bytes[pos] == b'\n';
        pos += next_char_len(text, pos);
    }
    flush_text!(pos);

    build_tree(text, nodes, headings)
}

/// Assemble the flat node list into lead + nested sections.
fn build_tree(text: &str, nodes: Vec<Node>, headings: Vec<(usize, usize, String)>) -> Tree {
    let mut lead = Vec::new();
    let mut root: Vec<Section> = Vec::new();
    // Path of indexes into the partially built hierarchy.
    let mut open: Vec<Section> = Vec::new();

    fn close_into(open: &mut Vec<Section>, root: &mut Vec<Section>, level: usize) {
        while let Some(top) = open.last() {
            if top.level < level {
                break;
            }
            let done = open.pop().unwrap();
            match open.last_mut() {
                Some(parent) => parent.children.push(done),
                None => root.push(done),
            }
        }
    }

    let mut heading_iter = headings.into_iter().peekable();
    for (idx, node) in nodes.into_iter().enumerate() {
        if let Some(&(h_idx, level, ref label)) = heading_iter.peek() {
            if idx == h_idx {
                let label = label.clone();
                heading_iter.next();
                close_into(&mut open, &mut root, level);
                open.push(Section {
                    label,
                    level,
                    nodes: vec![node],
                    children: Vec::new(),
                });
                continue;
            }
        }
        match open.last_mut() {
            Some(section) => section.nodes.push(node),
            None => lead.push(node),
        }
    }
    close_into(&mut open, &mut root, 0);

    Tree {
        text: text.to_string(),
        lead,
        sections: root,
    }
}

/// `== Label ==` at `pos` (which is a line start). Returns
/// (level, label, end-of-line position past the newline).
fn parse_heading(text: &str, pos: usize) -> Option<(usize, String, usize)> {
    let line_end = text[pos..]
        .find('\n')
        .map(|i| pos + i + 1)
        .unwrap_or(text.len());
    let line = text[pos..line_end].trim_end();

    let level = line.bytes().take_while(|&b| b == b'=').count();
    if level < 2 || level > 6 {
        return None;
    }
    let trailing = line.bytes().rev().take_while(|&b| b == b'=').count();
    if trailing != level || line.len() < 2 * level {
        return None;
    }
    let label = line[level..line.len() - trailing].trim().to_string();
    if label.is_empty() {
        return None;
    }
    Some((level, label, line_end))
}

/// `{{ ... }}` starting at `pos`. None when unterminated.
fn parse_record(text: &str, pos: usize) -> Option<Record> {
    let end = matching_close(text, pos)?;
    let inner = &text[pos + 2..end - 2];
    let inner_start = pos + 2;

    let mut chunks: Vec<(usize, usize)> = Vec::new(); // absolute spans
    let mut depth_brace = 0usize;
    let mut depth_bracket = 0usize;
    let mut chunk_start = inner_start;
    let mut i = 0usize;
    let b = inner.as_bytes();
    while i < b.len() {
        if inner.at(i, "{{") {
            depth_brace += 1;
            i += 2;
        } else if inner.at(i, "}}") && depth_brace > 0 {
            depth_brace -= 1;
            i += 2;
        } else if inner.at(i, "[[") {
            depth_bracket += 1;
            i += 2;
        } else if inner.at(i, "]]") && depth_bracket > 0 {
            depth_bracket -= 1;
            i += 2;
        } else if b[i] == b'|' && depth_brace == 0 && depth_bracket == 0 {
            chunks.push((chunk_start, inner_start + i));
            chunk_start = inner_start + i + 1;
            i += 1;
        } else {
            i += next_char_len(inner, i);
        }
    }
    chunks.push((chunk_start, inner_start + inner.len()));

    let (label_start, label_end) = chunks[0];
    let label = text[label_start..label_end].trim().to_string();

    let mut params = Vec::new();
    for &(start, end) in &chunks[1..] {
        params.push(parse_param(text, start, end));
    }

    Some(Record {
        label,
        params,
        span: Span { start: pos, end },
    })
}

/// One template parameter chunk; splits `name=value` on the first
/// top-level `=`.
fn parse_param(text: &str, start: usize, end: usize) -> Param {
    let chunk = &text[start..end];
    let mut name = None;
    let mut value_start = start;

    let mut depth_brace = 0usize;
    let mut depth_bracket = 0usize;
    let mut i = 0usize;
    let b = chunk.as_bytes();
    while i < b.len() {
        if chunk.at(i, "{{") {
            depth_brace += 1;
            i += 2;
        } else if chunk.at(i, "}}") && depth_brace > 0 {
            depth_brace -= 1;
            i += 2;
        } else if chunk.at(i, "[[") {
            depth_bracket += 1;
            i += 2;
        } else if chunk.at(i, "]]") && depth_bracket > 0 {
            depth_bracket -= 1;
            i += 2;
        } else if b[i] == b'=' && depth_brace == 0 && depth_bracket == 0 {
            name = Some(chunk[..i].trim().to_string());
            value_start = start + i + 1;
            break;
        } else {
            i += next_char_len(chunk, i);
        }
    }

    let value_span = Span {
        start: value_start,
        end,
    };
    Param {
        name,
        value: parse_fragment(text, value_start, end),
        value_span,
    }
}

/// Parse inline nodes (links, nested records, footnotes, text) inside an
/// absolute byte range. Headings are not recognized here.
fn parse_fragment(text: &str, start: usize, end: usize) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut pos = start;
    let mut text_start = start;
    while pos < end {
        if text.at(pos, "{{") {
            if let Some(record) = parse_record(text, pos) {
                if record.span.end <= end {
                    if text_start < pos {
                        nodes.push(Node::Text(Span {
                            start: text_start,
                            end: pos,
                        }));
                    }
                    pos = record.span.end;
                    text_start = pos;
                    nodes.push(Node::Record(record));
                    continue;
                }
            }
        }
        if text.at(pos, "[[") {
            if let Some(link) = parse_link(text, pos) {
                if link.span.end <= end {
                    if text_start < pos {
                        nodes.push(Node::Text(Span {
                            start: text_start,
                            end: pos,
                        }));
                    }
                    pos = link.span.end;
                    text_start = pos;
                    nodes.push(Node::Link(link));
                    continue;
                }
            }
        }
        if text.at_ci(pos, "<ref") {
            if let Some(span) = parse_footnote(text, pos) {
                if span.end <= end {
                    if text_start < pos {
                        nodes.push(Node::Text(Span {
                            start: text_start,
                            end: pos,
                        }));
                    }
                    pos = span.end;
                    text_start = pos;
                    nodes.push(Node::Footnote(span));
                    continue;
                }
            }
        }
        pos += next_char_len(text, pos);
    }
    if text_start < end {
        nodes.push(Node::Text(Span {
            start: text_start,
            end,
        }));
    }
    nodes
}

/// `[[ ... ]]` starting at `pos`. None when unterminated.
fn parse_link(text: &str, pos: usize) -> Option<Link> {
    let rest = &text[pos + 2..];
    let close = rest.find("]]")?;
    let inner = &rest[..close];
    // Nested brackets mean something we do not understand; degrade.
    if inner.contains("[[") {
        return None;
    }
    let end = pos + 2 + close + 2;
    let (target, display) = match inner.find('|') {
        Some(i) => (
            inner[..i].trim().to_string(),
            Some(inner[i + 1..].trim().to_string()),
        ),
        None => (inner.trim().to_string(), None),
    };
    if target.is_empty() {
        return None;
    }
    Some(Link {
        target,
        display,
        span: Span { start: pos, end },
    })
}

/// `<ref ...>...</ref>` or self-closing `<ref ... />` at `pos`.
fn parse_footnote(text: &str, pos: usize) -> Option<Span> {
    let rest = &text[pos..];
    let gt = rest.find('>')?;
    if rest[..gt].ends_with('/') {
        return Some(Span {
            start: pos,
            end: pos + gt + 1,
        });
    }
    let body = rest[gt..].to_ascii_lowercase();
    let close = gt + body.find("</ref>")? + "</ref>".len();
    Some(Span {
        start: pos,
        end: pos + close,
    })
}

/// Position past the `}}` matching the `{{` at `pos`.
fn matching_close(text: &str, pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = pos;
    while i < text.len() {
        if text.at(i, "{{") {
            depth += 1;
            i += 2;
        } else if text.at(i, "}}") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += next_char_len(text, i);
        }
    }
    None
}

fn next_char_len(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map(char::len_utf8).unwrap_or(1)
}

trait StrAt {
    fn at(&self, pos: usize, pat: &str) -> bool;
    fn at_ci(&self, pos: usize, pat: &str) -> bool;
}

impl StrAt for str {
    fn at(&self, pos: usize, pat: &str) -> bool {
        self.as_bytes()[pos..].starts_with(pat.as_bytes())
    }
    fn at_ci(&self, pos: usize, pat: &str) -> bool {
        let b = &self.as_bytes()[pos..];
        b.len() >= pat.len() && b[..pat.len()].eq_ignore_ascii_case(pat.as_bytes())
    }
}
