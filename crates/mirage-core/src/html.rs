//! Extraction of an HTML document from raw model output.
//!
//! Backends wrap the generated document differently: some return it bare,
//! some inside a fenced code block, some surrounded by prose. The extractor
//! looks for the outermost document delimiters and refuses output with no
//! recognizable document rather than letting garbage be persisted.

use crate::error::AppError;

/// Extract the HTML document embedded in raw model output.
///
/// Search order:
/// 1. a fenced code block (```html or ```), taking the document inside it;
/// 2. the outermost `<!doctype`/`<html` ... `</html>` span anywhere in the
///    text;
/// 3. text that itself starts with a document marker, taken whole.
///
/// Anything else is an [`AppError::UnparseableResponse`].
pub fn extract_document(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::UnparseableResponse("empty model output".into()));
    }

    if let Some(inner) = fenced_block(trimmed)
        && let Some(doc) = document_span(inner)
    {
        return Ok(doc);
    }

    if let Some(doc) = document_span(trimmed) {
        return Ok(doc);
    }

    Err(AppError::UnparseableResponse(format!(
        "no HTML document found in model output ({} chars)",
        raw.len()
    )))
}

/// Content of the first fenced code block, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip the info string ("html", "HTML", ...) up to the first newline.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// The `<!doctype`/`<html` ... `</html>` span within `text`, if present.
///
/// A missing closing tag is tolerated when the text begins at a document
/// marker (a truncated but recognizable document beats an error here —
/// the caller renders it sandboxed).
fn document_span(text: &str) -> Option<String> {
    let start = find_ci(text, "<!doctype").or_else(|| find_ci(text, "<html"))?;

    let end = rfind_ci(text, "</html>").map(|i| i + "</html>".len());
    match end {
        Some(end) if end > start => Some(text[start..end].to_string()),
        _ => Some(text[start..].trim_end().to_string()),
    }
}

/// ASCII case-insensitive forward search, returning a byte offset.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// ASCII case-insensitive backward search, returning a byte offset.
fn rfind_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).rev().find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<!DOCTYPE html><html><body><h1>Hi</h1></body></html>";

    #[test]
    fn test_bare_document_passes_through() {
        assert_eq!(extract_document(DOC).unwrap(), DOC);
    }

    #[test]
    fn test_fenced_block_with_prose_around() {
        let raw = format!("Here is the recreated page:\n\n```html\n{DOC}\n```\n\nLet me know!");
        assert_eq!(extract_document(&raw).unwrap(), DOC);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = format!("```\n{DOC}\n```");
        assert_eq!(extract_document(&raw).unwrap(), DOC);
    }

    #[test]
    fn test_prose_wrapped_document_without_fences() {
        let raw = format!("Sure, here you go: {DOC} Hope that helps.");
        assert_eq!(extract_document(&raw).unwrap(), DOC);
    }

    #[test]
    fn test_lowercase_doctype_and_mixed_case() {
        let raw = "<!doctype HTML><HTML><body></body></HTML>";
        assert_eq!(extract_document(raw).unwrap(), raw);
    }

    #[test]
    fn test_html_without_doctype() {
        let raw = "<html><body>x</body></html>";
        assert_eq!(extract_document(raw).unwrap(), raw);
    }

    #[test]
    fn test_truncated_document_is_tolerated() {
        let raw = "<!DOCTYPE html><html><body><p>cut off";
        assert_eq!(extract_document(raw).unwrap(), raw);
    }

    #[test]
    fn test_plain_prose_is_rejected() {
        let err = extract_document("I cannot help with that request.").unwrap_err();
        assert!(matches!(err, AppError::UnparseableResponse(_)));
    }

    #[test]
    fn test_empty_output_is_rejected() {
        assert!(matches!(
            extract_document("   \n  "),
            Err(AppError::UnparseableResponse(_))
        ));
    }

    #[test]
    fn test_fenced_json_is_rejected() {
        let raw = "```json\n{\"oops\": true}\n```";
        assert!(extract_document(raw).is_err());
    }
}
