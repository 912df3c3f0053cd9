//! HTML rendering for code blocks.
//!
//! Produces Bootstrap-style panels:
//!
//! ```text
//! <figure class="code panel panel-default">
//!   <figcaption class="panel-heading clearfix">   (only with title or href)
//!     <a … download button …></a><h3 class="panel-title path">Title</h3>
//!   </figcaption>
//!   <div class="panel-body">
//!     <div class="highlight"><table><tr>
//!       <td class="gutter"><pre class="line-numbers">1…N</pre></td>
//!       <td class="code"><pre><code class="ruby">…lines…</code></pre></td>
//!     </tr></table></div>
//!   </div>
//! </figure>
//! ```

use std::fmt::Write;

use crate::RenderOptions;

/// Render `code` (highlighted HTML, or a plain body as-is) as a panel.
///
/// # Example
///
/// ```
/// use octohl_filter::{RenderOptions, render_block};
///
/// let html = render_block("a\nb", &RenderOptions::default());
/// assert!(html.contains(r#"<span class="line-number">2</span>"#));
/// assert!(!html.contains("figcaption"));
/// ```
#[must_use]
pub fn render_block(code: &str, options: &RenderOptions) -> String {
    panelize(&tableize(code, options), options)
}

/// Wrap rendered code in a panel with an optional caption.
fn panelize(body: &str, options: &RenderOptions) -> String {
    let mut caption = String::new();
    if let Some(href) = &options.href {
        let _ = write!(
            caption,
            r#"<a href="{}" title="download" class="btn btn-default btn-xs pull-right"><span class="glyphicon glyphicon-download-alt"></span></a>"#,
            escape_html(href)
        );
    }
    if let Some(title) = &options.title {
        let _ = write!(
            caption,
            r#"<h3 class="panel-title path">{}</h3>"#,
            escape_html(title)
        );
    }

    let mut out = String::with_capacity(body.len() + caption.len() + 128);
    out.push_str(r#"<figure class="code panel panel-default">"#);
    if !caption.is_empty() {
        let _ = write!(
            out,
            r#"<figcaption class="panel-heading clearfix">{caption}</figcaption>"#
        );
    }
    let _ = write!(out, r#"<div class="panel-body">{body}</div></figure>"#);
    out
}

/// Lay out code as a gutter/code table, or a plain block without line numbers.
fn tableize(code: &str, options: &RenderOptions) -> String {
    let code_open = match &options.language {
        Some(language) => format!(r#"<code class="{}">"#, escape_html(language)),
        None => "<code>".to_owned(),
    };

    if !options.line_numbers {
        return format!(r#"<div class="highlight"><pre>{code_open}{code}</code></pre></div>"#);
    }

    let lines = split_lines(code);
    let mut gutter = String::new();
    let mut body = String::with_capacity(code.len() + lines.len() * 32);
    for (index, line) in lines.iter().enumerate() {
        let _ = writeln!(gutter, r#"<span class="line-number">{}</span>"#, index + 1);
        let _ = write!(body, r#"<span class="line">{line}</span>"#);
    }

    format!(
        concat!(
            r#"<div class="highlight"><table><tr>"#,
            r#"<td class="gutter"><pre class="line-numbers">{}</pre></td>"#,
            r#"<td class="code"><pre>{}{}</code></pre></td>"#,
            "</tr></table></div>"
        ),
        gutter, code_open, body
    )
}

/// Split HTML into lines that are each well-formed on their own.
///
/// Highlighters emit spans that cross line breaks (multi-line strings and
/// comments). Every element still open at a newline is closed before it and
/// reopened after it, so each line can be wrapped in its own element. Each
/// line except the last keeps its trailing newline.
fn split_lines(html: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut open: Vec<&str> = Vec::new();
    let mut current = String::new();
    let mut rest = html;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match tag_end(rest) {
                Some(end) => {
                    let tag = &rest[..=end];
                    if tag.starts_with("</") {
                        open.pop();
                    } else if !tag.ends_with("/>") && !tag.starts_with("<!") {
                        open.push(tag);
                    }
                    current.push_str(tag);
                    rest = &rest[end + 1..];
                }
                None => {
                    current.push('<');
                    rest = &rest[1..];
                }
            },
            '\n' => {
                for tag in open.iter().rev() {
                    current.push_str(&closing_tag(tag));
                }
                current.push('\n');
                lines.push(std::mem::take(&mut current));
                for tag in &open {
                    current.push_str(tag);
                }
                rest = &rest[1..];
            }
            _ => {
                let next = rest.find(['<', '\n']).unwrap_or(rest.len());
                current.push_str(&rest[..next]);
                rest = &rest[next..];
            }
        }
    }

    if !html.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte offset of the `>` ending the tag at the start of `rest`.
///
/// A `<` starts a tag only when a letter, `/` or `!` follows it and a `>`
/// closes it on the same line; anything else is plain text.
fn tag_end(rest: &str) -> Option<usize> {
    let next = rest[1..].chars().next()?;
    if !(next.is_ascii_alphabetic() || next == '/' || next == '!') {
        return None;
    }
    let end = rest.find(['>', '\n'])?;
    (rest.as_bytes()[end] == b'>').then_some(end)
}

/// Closing tag for a start tag: `<span class="k">` becomes `</span>`.
fn closing_tag(start: &str) -> String {
    let name: String = start[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("</{name}>")
}

/// Escape special HTML characters in text and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
