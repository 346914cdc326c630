use crate::{ExtractionError, Fragment, Page};

pub(crate) fn extract_pdf(bytes: &[u8]) -> Result<Vec<Page>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    Ok(pages_from_text(&text))
}

/// Split extractor output into pages of line fragments.
///
/// `pdf-extract` returns the whole document as one string with form feed
/// characters (\x0C) separating pages. Pages are numbered before empty
/// ones are dropped, so numbering matches the source document. Each
/// non-empty line becomes one fragment and keeps its trailing newline so
/// concatenated fragments read naturally.
fn pages_from_text(text: &str) -> Vec<Page> {
    text.split('\x0C')
        .enumerate()
        .filter(|(_, page_text)| !page_text.trim().is_empty())
        .map(|(i, page_text)| Page {
            number: i + 1,
            fragments: page_fragments(page_text),
        })
        .collect()
}

fn page_fragments(page_text: &str) -> Vec<Fragment> {
    page_text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| Fragment {
            text: format!("{line}\n"),
        })
        .collect()
}
