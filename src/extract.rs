use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};

// ── Constants ────────────────────────────────────────────────────────────────

/// Inline elements dropped from the chosen paragraph (reference markers).
const MARKER_TAGS: &[&str] = &["sup"];

static PARAGRAPH_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

// ── Public API ───────────────────────────────────────────────────────────────

/// Return the text of the first `<p>` with non-blank text, minus its
/// superscript markers, trimmed. Returns an empty string when no paragraph
/// qualifies.
///
/// Blankness is judged on the full paragraph text, markers included, so a
/// paragraph holding nothing but a marker is still the one selected.
pub fn first_paragraph(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&PARAGRAPH_SEL)
        .find(|p| !collect_text(*p, &[]).trim().is_empty())
        .map(|p| collect_text(p, MARKER_TAGS).trim().to_string())
        .unwrap_or_default()
}

// ── DOM utility helpers ──────────────────────────────────────────────────────

/// Recursively collect all text from an element and its descendants,
/// skipping any subtree rooted at one of the `skip` tags.
fn collect_text(el: ElementRef<'_>, skip: &[&str]) -> String {
    let mut out = String::new();
    push_text(el, skip, &mut out);
    out
}

fn push_text(el: ElementRef<'_>, skip: &[&str], out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&*text.text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !skip.contains(&child_el.value().name()) {
                        push_text(child_el, skip, out);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::first_paragraph;

    #[test]
    fn strips_marker_and_keeps_surrounding_spacing() {
        let html = "<p>Text<sup>[1]</sup> more.</p>";
        assert_eq!(first_paragraph(html), "Text more.");
    }

    #[test]
    fn strips_marker_without_inventing_spacing() {
        let html = "<p>Text<sup>[1]</sup>more.</p>";
        assert_eq!(first_paragraph(html), "Textmore.");
    }

    #[test]
    fn skips_blank_paragraphs() {
        let html = r##"
        <div class="mw-parser-output">
          <p class="mw-empty-elt">
          </p>
          <p>   </p>
          <p><b>Rust</b> is a general-purpose programming language.<sup id="cite_ref-1" class="reference"><a href="#cite_note-1">[1]</a></sup>
          </p>
          <p>Second paragraph.</p>
        </div>
        "##;

        assert_eq!(
            first_paragraph(html),
            "Rust is a general-purpose programming language."
        );
    }

    #[test]
    fn no_paragraphs_yields_empty_string() {
        let html = r#"<div class="mw-parser-output"><table><tr><td>cell</td></tr></table></div>"#;
        assert_eq!(first_paragraph(html), "");
    }

    #[test]
    fn only_blank_paragraphs_yield_empty_string() {
        assert_eq!(first_paragraph("<p></p><p>\n\t</p>"), "");
    }

    #[test]
    fn marker_only_paragraph_is_still_selected() {
        let html = "<p><sup>[1]</sup></p><p>Later text.</p>";
        assert_eq!(first_paragraph(html), "");
    }

    #[test]
    fn markers_removed_from_nested_inline_elements() {
        let html = r#"<p>The <a href="/wiki/Crab">crab<sup>[a]</sup></a> walks<sup>[2]</sup><sup>[3]</sup> sideways.</p>"#;
        assert_eq!(first_paragraph(html), "The crab walks sideways.");
    }

    #[test]
    fn text_outside_paragraphs_is_ignored() {
        let html = r#"
        <div role="note" class="hatnote">For other uses, see Rust (disambiguation).</div>
        <p>Rust is an iron oxide.</p>
        "#;
        assert_eq!(first_paragraph(html), "Rust is an iron oxide.");
    }

    #[test]
    fn decodes_entities() {
        let html = "<p>Fish &amp; chips&nbsp;</p>";
        assert_eq!(first_paragraph(html), "Fish & chips");
    }
}
