use mirage_core::error::AppError;
use mirage_core::models::{AssetHints, DistilledPage, PageBlock, RawDocument};
use mirage_core::traits::Distiller;
use scraper::{ElementRef, Html};

/// Total character budget for block text + retained styles. Blocks that
/// would overflow the budget are skipped, so long pages truncate the same
/// way on every run.
const TEXT_BUDGET: usize = 16_000;
const MAX_BLOCKS: usize = 400;
const MAX_IMAGES: usize = 20;
const MAX_COLORS: usize = 12;
const MAX_FONTS: usize = 8;
/// Inline styles beyond this length are dropped rather than truncated
/// mid-declaration.
const MAX_STYLE_LEN: usize = 200;

/// Tags whose text content becomes a structural block.
const CONTENT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "a", "button", "blockquote", "figcaption",
    "td", "th", "label", "dt", "dd", "summary",
];

/// Tags whose full descendant text is taken (headings often wrap their
/// text in spans); the rest contribute only their direct text children to
/// avoid double-counting nested blocks.
const DEEP_TEXT_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "button", "figcaption"];

/// HTML distiller built on the `scraper` crate.
///
/// Parses the raw markup permissively, walks the tree in document order,
/// and reduces it to the structural blocks, inline-style hints, and asset
/// references relevant to visual reconstruction. Script and style bodies
/// are discarded. Pure function of its input: no wall clock, no
/// randomness.
#[derive(Clone, Default)]
pub struct ScraperDistiller;

impl ScraperDistiller {
    pub fn new() -> Self {
        Self
    }
}

impl Distiller for ScraperDistiller {
    fn distill(&self, raw: &RawDocument) -> Result<DistilledPage, AppError> {
        let doc = Html::parse_document(&raw.body);

        let mut title = None;
        let mut blocks = Vec::new();
        let mut assets = AssetHints::default();
        let mut spent = 0usize;

        for node in doc.root_element().descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            let tag = el.value().name();

            if tag == "title" && title.is_none() {
                let text = collapse_ws(&el.text().collect::<String>());
                if !text.is_empty() {
                    title = Some(text);
                }
                continue;
            }

            if tag == "img" {
                if assets.images.len() < MAX_IMAGES
                    && let Some(src) = el.value().attr("src")
                    && !src.is_empty()
                    && !assets.images.iter().any(|s| s == src)
                {
                    assets.images.push(src.to_string());
                }
                continue;
            }

            // Style hints are harvested from any element carrying an
            // inline style, content tag or not (body backgrounds, wrapper
            // divs).
            let style = el.value().attr("style").map(str::trim);
            if let Some(style) = style {
                harvest_style_hints(style, &mut assets);
            }

            if !CONTENT_TAGS.contains(&tag) {
                continue;
            }

            let text = if DEEP_TEXT_TAGS.contains(&tag) {
                collapse_ws(&el.text().collect::<String>())
            } else {
                own_text(el)
            };
            if text.is_empty() {
                continue;
            }

            let style = style
                .filter(|s| !s.is_empty() && s.len() <= MAX_STYLE_LEN)
                .map(str::to_string);

            if blocks.len() >= MAX_BLOCKS {
                break;
            }
            // Skip blocks that don't fit rather than stopping: one huge
            // paragraph must not blank out the rest of the page.
            let cost = text.len() + style.as_ref().map_or(0, String::len);
            if spent + cost > TEXT_BUDGET {
                continue;
            }
            spent += cost;

            blocks.push(PageBlock {
                tag: tag.to_string(),
                text,
                style,
            });
        }

        if title.is_none() && blocks.is_empty() {
            return Err(AppError::DistillError(
                "document contains no usable structural content".into(),
            ));
        }

        Ok(DistilledPage {
            title,
            blocks,
            assets,
        })
    }
}

/// Text of the element's direct text-node children, whitespace collapsed.
fn own_text(el: ElementRef) -> String {
    let mut s = String::new();
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            s.push_str(text);
        }
    }
    collapse_ws(&s)
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull color and font declarations out of an inline style attribute.
fn harvest_style_hints(style: &str, assets: &mut AssetHints) {
    for decl in style.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = collapse_ws(value);
        if value.is_empty() {
            continue;
        }

        if (prop == "color" || prop.starts_with("background"))
            && assets.colors.len() < MAX_COLORS
            && !assets.colors.iter().any(|c| c == &value)
        {
            assets.colors.push(value);
        } else if prop == "font-family"
            && assets.fonts.len() < MAX_FONTS
            && !assets.fonts.iter().any(|f| f == &value)
        {
            assets.fonts.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_core::testutil::raw_doc;

    fn distill(html: &str) -> DistilledPage {
        ScraperDistiller::new().distill(&raw_doc(html)).unwrap()
    }

    #[test]
    fn test_extracts_heading_block() {
        let page = distill("<html><body><h1>Example</h1></body></html>");
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].tag, "h1");
        assert_eq!(page.blocks[0].text, "Example");
    }

    #[test]
    fn test_extracts_title_and_document_order() {
        let page = distill(
            "<html><head><title>My Site</title></head>\
             <body><h1>Welcome</h1><p>First</p><p>Second</p></body></html>",
        );
        assert_eq!(page.title.as_deref(), Some("My Site"));
        let texts: Vec<_> = page.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Welcome", "First", "Second"]);
    }

    #[test]
    fn test_discards_script_and_style_bodies() {
        let page = distill(
            "<html><body><p>Content</p>\
             <script>alert('xss')</script>\
             <style>body { color: red }</style></body></html>",
        );
        assert_eq!(page.blocks.len(), 1);
        assert!(!page.blocks.iter().any(|b| b.text.contains("alert")));
        assert!(!page.blocks.iter().any(|b| b.text.contains("color: red")));
    }

    #[test]
    fn test_collapses_whitespace() {
        let page = distill("<html><body><p>  hello \n\t world  </p></body></html>");
        assert_eq!(page.blocks[0].text, "hello world");
    }

    #[test]
    fn test_retains_inline_style_on_block() {
        let page = distill(r#"<html><body><p style="color: #123456">x</p></body></html>"#);
        assert_eq!(page.blocks[0].style.as_deref(), Some("color: #123456"));
        assert_eq!(page.assets.colors, vec!["#123456"]);
    }

    #[test]
    fn test_harvests_assets() {
        let page = distill(
            r#"<html><body style="background-color: #fff; font-family: Arial, sans-serif">
               <img src="/logo.png" alt="logo"><h1>Hi</h1></body></html>"#,
        );
        assert_eq!(page.assets.images, vec!["/logo.png"]);
        assert_eq!(page.assets.colors, vec!["#fff"]);
        assert_eq!(page.assets.fonts, vec!["Arial, sans-serif"]);
    }

    #[test]
    fn test_heading_text_inside_span_is_captured() {
        let page = distill("<html><body><h1><span>Nested</span></h1></body></html>");
        assert_eq!(page.blocks[0].text, "Nested");
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let page = distill("<h1>Unclosed <p>still works");
        assert!(page.blocks.iter().any(|b| b.text.contains("Unclosed")));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let err = ScraperDistiller::new()
            .distill(&raw_doc("<html><body><div></div></body></html>"))
            .unwrap_err();
        assert!(matches!(err, AppError::DistillError(_)));
    }

    #[test]
    fn test_no_markup_at_all_is_an_error() {
        // html5ever wraps bare text into body text nodes; none of them sit
        // under a content tag, so nothing usable comes out.
        let result = ScraperDistiller::new().distill(&raw_doc(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_distillation_is_deterministic() {
        let raw = raw_doc(
            "<html><head><title>T</title></head><body>\
             <h1 style=\"color: red\">A</h1><p>B</p><img src=\"x.png\"></body></html>",
        );
        let d = ScraperDistiller::new();
        let first = d.distill(&raw).unwrap();
        for _ in 0..5 {
            assert_eq!(d.distill(&raw).unwrap(), first);
        }
    }

    #[test]
    fn test_truncation_is_deterministic_and_bounded() {
        let mut body = String::from("<html><body>");
        for i in 0..5000 {
            body.push_str(&format!("<p>paragraph number {i} with some filler text</p>"));
        }
        body.push_str("</body></html>");
        let raw = raw_doc(&body);

        let d = ScraperDistiller::new();
        let first = d.distill(&raw).unwrap();
        let second = d.distill(&raw).unwrap();

        assert_eq!(first, second);
        assert!(first.blocks.len() <= MAX_BLOCKS);
        let total: usize = first.blocks.iter().map(|b| b.text.len()).sum();
        assert!(total <= TEXT_BUDGET);
        // Truncation is depth-first in document order: earliest paragraphs
        // survive.
        assert_eq!(first.blocks[0].text, "paragraph number 0 with some filler text");
    }

    #[test]
    fn test_oversized_block_is_skipped_not_terminal() {
        let huge = "x".repeat(TEXT_BUDGET + 1);
        let page = distill(&format!(
            "<html><body><p>{huge}</p><h1>Headline</h1><p>After</p></body></html>"
        ));

        let texts: Vec<_> = page.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Headline", "After"]);
    }

    #[test]
    fn test_image_dedup_and_cap() {
        let mut body = String::from("<html><body><h1>t</h1>");
        for i in 0..50 {
            body.push_str(&format!("<img src=\"img{}.png\"><img src=\"img{}.png\">", i, i));
        }
        body.push_str("</body></html>");
        let page = distill(&body);
        assert_eq!(page.assets.images.len(), MAX_IMAGES);
        assert_eq!(page.assets.images[0], "img0.png");
    }
}
