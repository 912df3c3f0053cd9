//! Fenced code block filter for octohl.
//!
//! Transforms already-rendered page content by replacing every fenced code
//! block with a highlighted HTML panel. Everything outside the fences is
//! copied byte for byte.
//!
//! # Architecture
//!
//! - [`fence`]: [`FenceParser`] locates blocks and splits options from body
//! - [`options`]: [`RenderOptions`] decodes the JSON options string
//! - [`render`]: [`render_block`] builds the gutter/code table and the panel
//! - [`include`]: [`include_code`] turns a source file into a fenced block
//!
//! Highlighting goes through a [`CachedHighlighter`], so each
//! `(language, code)` pair reaches the external highlighter at most once.
//!
//! # Example
//!
//! ```no_run
//! use octohl_cache::FileCache;
//! use octohl_filter::CodeFilter;
//! use octohl_highlight::{CachedHighlighter, Pygments};
//!
//! let cache = FileCache::new("tmp/pygments-cache")?;
//! let filter = CodeFilter::new(CachedHighlighter::new(Pygments::default(), cache));
//!
//! let html = filter.run("<p>Hello</p>\n```{\"lang\": \"ruby\"}\nputs 1\n```\n")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod fence;
pub mod include;
pub mod options;
pub mod render;

pub use error::FilterError;
pub use fence::{CodeBlock, FenceParser};
pub use include::include_code;
pub use options::RenderOptions;
pub use render::{escape_html, render_block};

use octohl_cache::HighlightCache;
use octohl_highlight::{CachedHighlighter, Highlighter};

/// The fenced code block filter.
///
/// Stateless apart from the highlight cache; one instance can filter any
/// number of documents, from several threads at once.
#[derive(Debug)]
pub struct CodeFilter<H, C> {
    highlighter: CachedHighlighter<H, C>,
}

impl<H: Highlighter, C: HighlightCache> CodeFilter<H, C> {
    /// Create a filter highlighting through `highlighter`.
    #[must_use]
    pub fn new(highlighter: CachedHighlighter<H, C>) -> Self {
        Self { highlighter }
    }

    /// Replace every fenced code block in `content` with its rendered panel.
    ///
    /// # Errors
    ///
    /// Fails on the first block with malformed options, an unterminated
    /// fence, or a highlighting failure. Nothing is returned for a document
    /// that fails part way.
    pub fn run(&self, content: &str) -> Result<String, FilterError> {
        let mut out = String::with_capacity(content.len());
        let mut copied = 0;

        for block in FenceParser::new(content) {
            let block = block?;
            out.push_str(&content[copied..block.span.start]);
            out.push_str(&self.render(&block)?);
            copied = block.span.end;
        }

        out.push_str(&content[copied..]);
        Ok(out)
    }

    /// Decode, highlight and render a single block.
    fn render(&self, block: &CodeBlock<'_>) -> Result<String, FilterError> {
        let options = RenderOptions::decode(block.options_raw).map_err(|source| {
            FilterError::MalformedOptions {
                line: block.line,
                options: block.options_raw.to_owned(),
                source,
            }
        })?;

        tracing::debug!(
            line = block.line,
            language = options.language.as_deref(),
            "rendering code block"
        );

        let code = match &options.language {
            Some(language) => self
                .highlighter
                .highlight(language, &block.body)
                .map_err(|source| FilterError::Highlight {
                    line: block.line,
                    source,
                })?,
            None => block.body.clone(),
        };

        Ok(render_block(&code, &options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octohl_cache::{CacheKey, FileCache};
    use octohl_highlight::HighlightError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Fake highlighter: knows `ruby` only, counts invocations.
    #[derive(Default)]
    struct FakeHighlighter {
        calls: AtomicUsize,
    }

    impl Highlighter for FakeHighlighter {
        fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if language != "ruby" {
                return Err(HighlightError::UnsupportedLanguage {
                    language: language.to_owned(),
                });
            }
            let html = code.replace("puts", r#"<span class="k">puts</span>"#);
            Ok(format!("<div class=\"highlight\"><pre>{html}\n</pre></div>\n"))
        }
    }

    fn filter<'a>(
        fake: &'a FakeHighlighter,
        tmp: &TempDir,
    ) -> CodeFilter<&'a FakeHighlighter, FileCache> {
        let cache = FileCache::new(tmp.path().join("cache")).unwrap();
        CodeFilter::new(CachedHighlighter::new(fake, cache))
    }

    #[test]
    fn test_no_fences_is_identity() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        for input in ["", "plain", "<p>a</p>\n\n<p>`b`</p>\r\n", "``not a fence``\n"] {
            assert_eq!(filter.run(input).unwrap(), input);
        }
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_end_to_end_example() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let html = filter
            .run("```{\"lang\":\"ruby\",\"title\":\"Demo\"}\nputs \"hi\"\n```")
            .unwrap();

        assert_eq!(
            html,
            concat!(
                r#"<figure class="code panel panel-default">"#,
                r#"<figcaption class="panel-heading clearfix"><h3 class="panel-title path">Demo</h3></figcaption>"#,
                r#"<div class="panel-body"><div class="highlight"><table><tr>"#,
                "<td class=\"gutter\"><pre class=\"line-numbers\"><span class=\"line-number\">1</span>\n</pre></td>",
                r#"<td class="code"><pre><code class="ruby"><span class="line"><span class="k">puts</span> "hi"</span></code></pre></td>"#,
                "</tr></table></div></div></figure>"
            )
        );
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let html = filter
            .run("<p>before</p>\n```\nx\n```\n<p>between</p>\n```\ny\n```\n<p>after</p>")
            .unwrap();

        assert!(html.starts_with("<p>before</p>\n<figure"));
        assert!(html.contains("</figure>\n<p>between</p>\n<figure"));
        assert!(html.ends_with("</figure>\n<p>after</p>"));
    }

    #[test]
    fn test_default_options_render() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let html = filter.run("```\n<b>x</b> & y\n```\n").unwrap();

        assert!(html.contains(r#"<span class="line-number">1</span>"#));
        assert!(!html.contains("figcaption"));
        assert!(!html.contains("download"));
        // Plain bodies pass through verbatim
        assert!(html.contains("<code><span class=\"line\"><b>x</b> & y</span></code>"));
        // No language: the highlighter is never consulted
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cache_hit_is_identical_and_skips_highlighter() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);
        let input = "```{\"lang\":\"ruby\"}\nputs 1\n```\n";

        let first = filter.run(input).unwrap();
        let second = filter.run(input).unwrap();

        assert_eq!(first, second);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_key_ignores_presentation() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);
        let input = concat!(
            "```{\"lang\":\"ruby\",\"title\":\"One\"}\nputs 1\n```\n",
            "```{\"lang\":\"ruby\",\"href\":\"/a.rb\",\"linenos\":false}\nputs 1\n```\n",
        );

        let html = filter.run(input).unwrap();

        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        let cache = FileCache::new(tmp.path().join("cache")).unwrap();
        assert!(cache.entry_path(&CacheKey::new("ruby", "puts 1")).is_file());
        assert_eq!(std::fs::read_dir(cache.root()).unwrap().count(), 1);

        let (first, second) = html.split_at(html.find("\n<figure").unwrap());
        assert!(first.contains(">One</h3>"));
        assert!(first.contains("gutter"));
        assert!(second.contains(r#"<a href="/a.rb""#));
        assert!(!second.contains("gutter"));
    }

    #[test]
    fn test_malformed_options_error() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let err = filter
            .run("intro\n\n```{lang: ruby}\nputs 1\n```\n")
            .unwrap_err();

        match &err {
            FilterError::MalformedOptions { line, options, .. } => {
                assert_eq!(*line, 3);
                assert_eq!(options, "{lang: ruby}");
            }
            other => panic!("expected MalformedOptions, got {other:?}"),
        }
        assert!(err.to_string().starts_with("code block at line 3"));
    }

    #[test]
    fn test_unterminated_block_error() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let err = filter.run("```\nok\n```\ntext\n```{}\nopen\n").unwrap_err();

        assert!(matches!(err, FilterError::UnterminatedBlock { line: 5 }));
    }

    #[test]
    fn test_unsupported_language_error() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let err = filter
            .run("```{\"lang\":\"klingon\"}\nQapla'\n```\n")
            .unwrap_err();

        assert!(matches!(
            err,
            FilterError::Highlight {
                line: 1,
                source: HighlightError::UnsupportedLanguage { .. }
            }
        ));
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_highlighted_multiline_body() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeHighlighter::default();
        let filter = filter(&fake, &tmp);

        let html = filter
            .run("```{\"lang\":\"ruby\"}\n\nputs 1\n\nputs 2\n```\n")
            .unwrap();

        assert_eq!(html.matches(r#"<span class="line-number">"#).count(), 3);
        assert!(html.contains(r#"<span class="line-number">3</span>"#));
        assert!(html.contains(r#"<span class="line"><span class="k">puts</span> 2</span>"#));
    }
}
