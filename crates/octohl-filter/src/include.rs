//! Fenced blocks from source files.
//!
//! Long snippets live next to the content as standalone files. [`include_code`]
//! turns such a file into a fenced block that [`CodeFilter`](crate::CodeFilter)
//! renders like any inline one, with a download link back to the file.

use std::fs;
use std::path::Path;

use crate::{FilterError, RenderOptions};

/// Build a fenced code block from the file at `path`.
///
/// When `options.href` is unset and `href_base` is given, the download link
/// defaults to `{href_base}/{file name}`.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use octohl_filter::{RenderOptions, include_code};
///
/// let options = RenderOptions {
///     language: Some("c".to_owned()),
///     ..RenderOptions::default()
/// };
/// let fenced = include_code(Path::new("static/code/ogg/vorbis_comment.c"), &options, Some("/static/code/ogg"))?;
/// # Ok::<(), octohl_filter::FilterError>(())
/// ```
pub fn include_code(
    path: &Path,
    options: &RenderOptions,
    href_base: Option<&str>,
) -> Result<String, FilterError> {
    let content = fs::read_to_string(path).map_err(|source| FilterError::Include {
        path: path.to_path_buf(),
        source,
    })?;

    let mut options = options.clone();
    if options.href.is_none()
        && let Some(base) = href_base
        && let Some(name) = path.file_name()
    {
        options.href = Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            name.to_string_lossy()
        ));
    }

    fence(&options, &content)
}

/// Format `content` as a fenced block carrying `options`.
fn fence(options: &RenderOptions, content: &str) -> Result<String, FilterError> {
    let json = if *options == RenderOptions::default() {
        String::new()
    } else {
        serde_json::to_string(options).map_err(|source| FilterError::EncodeOptions { source })?
    };
    let newline = if content.ends_with('\n') { "" } else { "\n" };
    Ok(format!("```{json}\n{content}{newline}```\n"))
}
