//! Turn message content into display blocks according to its content kind.
//!
//! Markdown replies go through pulldown-cmark. List replies are one item per
//! line, each line carrying inline markdown.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use chat_types::message::{ContentKind, Message};

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(Vec<Span>),
    Paragraph(Vec<Span>),
    Bullet(Vec<Span>),
    Numbered(u64, Vec<Span>),
    Code { language: Option<String>, text: String },
}

/// A run of text sharing one inline style
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Span {
    pub text: String,
    pub strong: bool,
    pub italic: bool,
    pub code: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn same_style(&self, other: &Span) -> bool {
        self.strong == other.strong && self.italic == other.italic && self.code == other.code
    }
}

pub fn blocks(message: &Message) -> Vec<Block> {
    match message.kind.unwrap_or(ContentKind::Plain) {
        ContentKind::Plain => vec![Block::Paragraph(vec![Span::plain(message.content.as_str())])],
        ContentKind::Markdown => markdown_blocks(&message.content),
        ContentKind::List => list_blocks(&message.content),
    }
}

pub fn markdown_blocks(content: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(content, Options::empty()) {
        builder.process_event(event);
    }
    builder.finish()
}

/// Inline styling of `text` with its block structure flattened away.
pub fn spans(text: &str) -> Vec<Span> {
    let mut out = Vec::new();
    for block in markdown_blocks(text) {
        if !out.is_empty() {
            push_merged(&mut out, Span::plain(" "));
        }
        let spans = match block {
            Block::Code { text, .. } => vec![Span {
                text,
                code: true,
                ..Span::default()
            }],
            Block::Heading(spans)
            | Block::Paragraph(spans)
            | Block::Bullet(spans)
            | Block::Numbered(_, spans) => spans,
        };
        for span in spans {
            push_merged(&mut out, span);
        }
    }
    out
}

fn push_merged(out: &mut Vec<Span>, span: Span) {
    if span.text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.same_style(&span) => last.text.push_str(&span.text),
        _ => out.push(span),
    }
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    strong: usize,
    emphasis: usize,
    in_heading: bool,
    /// Next number of each open list, `None` for bullet lists
    lists: Vec<Option<u64>>,
    /// Marker of each open list item
    items: Vec<Option<u64>>,
    code: Option<(Option<String>, String)>,
}

impl BlockBuilder {
    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => push_merged(
                &mut self.spans,
                Span {
                    text: code.to_string(),
                    code: true,
                    ..Span::default()
                },
            ),
            Event::SoftBreak | Event::HardBreak => self.push_text(" "),
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { .. } => {
                self.flush_spans();
                self.in_heading = true;
            }
            Tag::CodeBlock(kind) => {
                self.flush_spans();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::List(start) => {
                self.flush_spans();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_spans();
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let n = *next;
                        *next += 1;
                        Some(n)
                    }
                    _ => None,
                };
                self.items.push(marker);
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush_spans();
                self.in_heading = false;
            }
            TagEnd::Paragraph => self.flush_spans(),
            TagEnd::CodeBlock => {
                if let Some((language, text)) = self.code.take() {
                    self.blocks.push(Block::Code {
                        language,
                        text: text.trim_end_matches('\n').to_string(),
                    });
                }
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Item => {
                self.flush_spans();
                self.items.pop();
            }
            TagEnd::List(_) => {
                self.flush_spans();
                self.lists.pop();
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, code)) = self.code.as_mut() {
            code.push_str(text);
            return;
        }
        push_merged(
            &mut self.spans,
            Span {
                text: text.to_string(),
                strong: self.strong > 0,
                italic: self.emphasis > 0,
                code: false,
            },
        );
    }

    /// Close the text collected so far into a block for the current context.
    fn flush_spans(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let block = if self.in_heading {
            Block::Heading(spans)
        } else {
            match self.items.last() {
                Some(Some(n)) => Block::Numbered(*n, spans),
                Some(None) => Block::Bullet(spans),
                None => Block::Paragraph(spans),
            }
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_spans();
        self.blocks
    }
}

/// Every non-empty line is an item; existing markers are kept.
fn list_blocks(content: &str) -> Vec<Block> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| match numbered(line) {
            Some((n, item)) => Block::Numbered(n, spans(item)),
            None => Block::Bullet(spans(bullet(line).unwrap_or(line))),
        })
        .collect()
}

fn bullet(line: &str) -> Option<&str> {
    ["- ", "* ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

fn numbered(line: &str) -> Option<(u64, &str)> {
    let (n, rest) = line.split_once(". ")?;
    let n = n.parse().ok()?;
    Some((n, rest.trim()))
}
