//! Fragment listing for debugging matches.

use console::style;

use crate::config::Settings;
use crate::text::{tokenize, ParsedContent};

use super::helpers::load_document;

pub async fn cmd_tokens(settings: &Settings, document_id: i32, ngram: usize) -> anyhow::Result<()> {
    if ngram == 0 {
        anyhow::bail!("--ngram must be at least 1");
    }

    let (_ctx, doc, kind) = load_document(settings, document_id).await?;
    let text = doc.text();
    let parsed = ParsedContent::parse(&text, kind);
    let fragments = tokenize(&parsed, ngram);

    println!(
        "{} {} fragments (n-grams up to {}) over {} characters",
        style("→").cyan(),
        fragments.len(),
        ngram,
        parsed.len()
    );
    for fragment in fragments {
        println!("  {:>6}..{:<6} {}", fragment.start, fragment.end, fragment.text);
    }

    Ok(())
}
