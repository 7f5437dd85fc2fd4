use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fs_err as fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::wire::PreviewData;

/// File name of the downloadable document.
pub const DOWNLOAD_FILENAME: &str = "gemini-ui.html";
pub const HTML_MIME: &str = "text/html";
const VIEWER_FILENAME: &str = "gemini-ui.viewer.html";
/// Scripts and same-origin are allowed; nothing else.
pub const SANDBOX: &str = "allow-scripts allow-same-origin";

#[derive(Debug, Clone)]
pub struct Exported {
    pub document: PathBuf,
    pub viewer: PathBuf,
}

fn write_atomic(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(name);
    let tmp = NamedTempFile::new_in(dir)?;
    fs::write(tmp.path(), data)?;
    tmp.persist(&target)
        .with_context(|| format!("persisting {}", target.display()))?;
    Ok(target)
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Host page that renders `code` in an isolated iframe.
pub fn viewer_page(code: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Generated UI Preview</title>\n\
<style>html,body{{margin:0;height:100%}}iframe{{border:0;width:100%;height:100%}}</style>\n</head>\n<body>\n\
<iframe title=\"Generated UI Preview\" sandbox=\"{}\" srcdoc=\"{}\"></iframe>\n</body>\n</html>\n",
        SANDBOX,
        escape_attr(code)
    )
}

/// Writes the document and its sandboxed viewer into `dir`.
pub fn export_html(dir: &Path, code: &str) -> Result<Exported> {
    let document = write_atomic(dir, DOWNLOAD_FILENAME, code.as_bytes())?;
    let viewer = write_atomic(dir, VIEWER_FILENAME, viewer_page(code).as_bytes())?;
    Ok(Exported { document, viewer })
}

/// Decodes each preview payload to `preview-<n>.png` so it can be opened full size.
pub fn export_previews(dir: &Path, preview: &PreviewData) -> Result<Vec<PathBuf>> {
    let mut out = Vec::with_capacity(preview.image_payloads.len());
    for (i, b64) in preview.image_payloads.iter().enumerate() {
        let bytes = STANDARD
            .decode(b64.trim())
            .with_context(|| format!("decoding preview image {}", i + 1))?;
        out.push(write_atomic(dir, &format!("preview-{}.png", i + 1), &bytes)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_escapes_srcdoc_and_sandboxes() {
        let page = viewer_page("<p class=\"x\">a & b</p>");
        assert!(page.contains("sandbox=\"allow-scripts allow-same-origin\""));
        assert!(page.contains("srcdoc=\"&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;\""));
    }

    #[test]
    fn export_writes_document_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let code = "<!DOCTYPE html><html><body>ok</body></html>";
        let out = export_html(tmp.path(), code).unwrap();
        assert_eq!(out.document.file_name().unwrap(), DOWNLOAD_FILENAME);
        assert_eq!(std::fs::read_to_string(&out.document).unwrap(), code);
        assert!(std::fs::read_to_string(&out.viewer).unwrap().contains("<iframe"));
    }

    #[test]
    fn previews_are_decoded() {
        let tmp = tempfile::tempdir().unwrap();
        let p = PreviewData::new(
            "l".into(),
            vec![STANDARD.encode(b"one"), STANDARD.encode(b"two")],
            "image/png",
        );
        let paths = export_previews(tmp.path(), &p).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"two");
    }

    #[test]
    fn bad_payload_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = PreviewData::new("l".into(), vec!["***".into()], "image/png");
        assert!(export_previews(tmp.path(), &p).is_err());
    }
}
