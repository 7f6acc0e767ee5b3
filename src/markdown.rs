//! Terminal rendering for assistant replies
//!
//! Replies come back as markdown. They are rendered with colors for headings,
//! emphasis, code and links; links are printed with their target so corrected
//! site URLs stay visible.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::Result;

/// Formats markdown text for terminal output with colors and styling
pub fn format_markdown(markdown: &str) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    render_markdown(&mut stdout, markdown)?;
    stdout.reset()?;
    Ok(())
}

/// Render markdown into any color-capable writer
pub fn render_markdown<W: WriteColor>(out: &mut W, markdown: &str) -> Result<()> {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut state = FormatState::default();

    for event in parser {
        state.handle_event(out, event)?;
    }
    writeln!(out)?;

    Ok(())
}

/// Tracks the current formatting state
#[derive(Default)]
struct FormatState {
    format_stack: Vec<ColorSpec>,
    // One entry per open list: the next item number for ordered lists
    lists: Vec<Option<u64>>,
    link_target: Option<String>,
}

impl FormatState {
    fn handle_event<W: WriteColor>(&mut self, out: &mut W, event: Event) -> Result<()> {
        match event {
            Event::Start(tag) => self.handle_start(out, tag)?,
            Event::End(tag_end) => self.handle_end(out, tag_end)?,
            Event::Text(text) => write!(out, "{}", text)?,
            Event::Code(code) => self.write_inline_code(out, &code)?,
            Event::SoftBreak | Event::HardBreak => writeln!(out)?,
            Event::Rule => writeln!(out, "{}", "─".repeat(40))?,
            _ => {}
        }
        Ok(())
    }

    fn handle_start<W: WriteColor>(&mut self, out: &mut W, tag: Tag) -> Result<()> {
        match tag {
            Tag::Heading { level, .. } => {
                let color = match level {
                    HeadingLevel::H1 => Color::Rgb(255, 99, 71),
                    HeadingLevel::H2 => Color::Rgb(70, 130, 180),
                    _ => Color::Cyan,
                };
                writeln!(out)?;
                self.push_style(out, ColorSpec::new().set_fg(Some(color)).set_bold(true).clone())?;
            }
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    writeln!(out)?;
                }
            }
            Tag::Strong => self.push_style(out, ColorSpec::new().set_bold(true).clone())?,
            Tag::Emphasis => self.push_style(out, ColorSpec::new().set_italic(true).clone())?,
            Tag::BlockQuote(_) => {
                self.push_style(out, ColorSpec::new().set_fg(Some(Color::Yellow)).clone())?;
                write!(out, "  │ ")?;
            }
            Tag::CodeBlock(kind) => {
                writeln!(out)?;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_italic(true))?;
                        writeln!(out, "[{}]", lang)?;
                    }
                }
                self.push_style(out, ColorSpec::new().set_fg(Some(Color::Green)).clone())?;
            }
            Tag::List(start) => self.lists.push(start),
            Tag::Item => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                match self.lists.last_mut() {
                    Some(Some(number)) => {
                        write!(out, "{}{:2}. ", indent, number)?;
                        *number += 1;
                    }
                    _ => write!(out, "{}• ", indent)?,
                }
            }
            Tag::Link { dest_url, .. } => {
                self.link_target = Some(dest_url.to_string());
                self.push_style(
                    out,
                    ColorSpec::new().set_fg(Some(Color::Blue)).set_underline(true).clone(),
                )?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end<W: WriteColor>(&mut self, out: &mut W, tag_end: TagEnd) -> Result<()> {
        match tag_end {
            TagEnd::Heading(_) => {
                self.pop_style(out)?;
                writeln!(out)?;
            }
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    writeln!(out)?;
                }
            }
            TagEnd::Strong | TagEnd::Emphasis => self.pop_style(out)?,
            TagEnd::Link => {
                self.pop_style(out)?;
                if let Some(target) = self.link_target.take() {
                    write!(out, " ({})", target)?;
                }
            }
            TagEnd::BlockQuote(_) | TagEnd::CodeBlock => {
                self.pop_style(out)?;
                writeln!(out)?;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    writeln!(out)?;
                }
            }
            TagEnd::Item => writeln!(out)?,
            _ => {}
        }
        Ok(())
    }

    fn push_style<W: WriteColor>(&mut self, out: &mut W, spec: ColorSpec) -> Result<()> {
        out.set_color(&spec)?;
        self.format_stack.push(spec);
        Ok(())
    }

    fn pop_style<W: WriteColor>(&mut self, out: &mut W) -> Result<()> {
        self.format_stack.pop();
        match self.format_stack.last() {
            Some(spec) => out.set_color(spec)?,
            None => out.reset()?,
        }
        Ok(())
    }

    fn write_inline_code<W: WriteColor>(&self, out: &mut W, code: &str) -> Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "`{}`", code)?;
        match self.format_stack.last() {
            Some(spec) => out.set_color(spec)?,
            None => out.reset()?,
        }
        Ok(())
    }
}
