//! Fragment extraction command.

use crate::config::Settings;
use crate::text::{extract_fragment, ParsedContent};

use super::helpers::load_document;

/// Print the minimal fragment of a document covering `[start, end)`.
pub async fn cmd_extract(
    settings: &Settings,
    document_id: i32,
    start: usize,
    end: usize,
) -> anyhow::Result<()> {
    let (_ctx, doc, kind) = load_document(settings, document_id).await?;
    let text = doc.text();

    // The extractor trusts its offsets; validate them here.
    let length = ParsedContent::parse(&text, kind).len();
    if start > end || end > length {
        anyhow::bail!(
            "Invalid range {}..{}: document {} has {} characters of text",
            start,
            end,
            document_id,
            length
        );
    }

    println!("{}", extract_fragment(&text, kind, start, end));
    Ok(())
}
