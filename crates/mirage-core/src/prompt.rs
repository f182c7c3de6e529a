//! Prompt construction: serialize a [`DistilledPage`] into a single
//! reconstruction instruction.
//!
//! The output is a pure function of the page and source URL, so the same
//! distillation always produces the same prompt.

use std::fmt::Write as _;

use crate::models::DistilledPage;

/// Build the synthesis prompt for a distilled page.
///
/// The instruction asks for a complete, self-contained document: inline
/// styling only, no references back to the target site, since nothing on
/// the original host can be guaranteed reachable at render time.
pub fn build_prompt(page: &DistilledPage, source_url: &str) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(
        "Recreate a similar-looking web page from the structural outline below.\n\
         Respond with a single complete HTML document (doctype, <html>, <head>, <body>).\n\
         Rules:\n\
         - The document must be fully self-contained: inline all CSS, no external \
         stylesheets, scripts, or fonts.\n\
         - Do not reference any asset on the original site; substitute missing images \
         with styled placeholders.\n\
         - Keep the same color scheme, typography hints, layout and overall design.\n\
         - Output only the HTML document, no commentary.\n\n",
    );

    let _ = writeln!(out, "Source URL: {source_url}");

    if let Some(title) = &page.title {
        let _ = writeln!(out, "Page title: {title}");
    }

    out.push_str("\nStructural outline (document order):\n");
    for block in &page.blocks {
        match &block.style {
            Some(style) => {
                let _ = writeln!(out, "<{}> {} [style: {}]", block.tag, block.text, style);
            }
            None => {
                let _ = writeln!(out, "<{}> {}", block.tag, block.text);
            }
        }
    }

    if !page.assets.images.is_empty() {
        let _ = writeln!(out, "\nImages referenced: {}", page.assets.images.join(", "));
    }
    if !page.assets.colors.is_empty() {
        let _ = writeln!(out, "Colors observed: {}", page.assets.colors.join(", "));
    }
    if !page.assets.fonts.is_empty() {
        let _ = writeln!(out, "Fonts observed: {}", page.assets.fonts.join(", "));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetHints, PageBlock};

    fn sample_page() -> DistilledPage {
        DistilledPage {
            title: Some("Example Domain".into()),
            blocks: vec![
                PageBlock {
                    tag: "h1".into(),
                    text: "Example".into(),
                    style: None,
                },
                PageBlock {
                    tag: "p".into(),
                    text: "More information...".into(),
                    style: Some("color: #333".into()),
                },
            ],
            assets: AssetHints {
                images: vec!["https://example.com/logo.png".into()],
                colors: vec!["#333".into()],
                fonts: vec!["sans-serif".into()],
            },
        }
    }

    #[test]
    fn test_prompt_contains_page_content() {
        let prompt = build_prompt(&sample_page(), "https://example.com");
        assert!(prompt.contains("https://example.com"));
        assert!(prompt.contains("Example Domain"));
        assert!(prompt.contains("<h1> Example"));
        assert!(prompt.contains("color: #333"));
        assert!(prompt.contains("logo.png"));
        assert!(prompt.contains("sans-serif"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let page = sample_page();
        assert_eq!(
            build_prompt(&page, "https://example.com"),
            build_prompt(&page, "https://example.com")
        );
    }

    #[test]
    fn test_prompt_omits_empty_asset_sections() {
        let page = DistilledPage {
            title: None,
            blocks: vec![PageBlock {
                tag: "p".into(),
                text: "hi".into(),
                style: None,
            }],
            assets: AssetHints::default(),
        };
        let prompt = build_prompt(&page, "https://example.com");
        assert!(!prompt.contains("Images referenced"));
        assert!(!prompt.contains("Page title"));
    }
}
