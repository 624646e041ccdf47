use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never visible
const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Visible descendant text of an element, text nodes joined by a space
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(element, &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !INVISIBLE_TAGS.contains(&child_element.value().name()) {
                collect_text(child_element, parts);
            }
        }
    }
}

/// Raw text of every element matching `tag`, in document order
pub fn tag_texts(doc: &Html, tag: &str) -> Vec<String> {
    let selector = match Selector::parse(tag) {
        Ok(selector) => selector,
        Err(e) => {
            ::log::warn!("Skipping invalid tag selector {:?}: {:?}", tag, e);
            return Vec::new();
        }
    };
    doc.select(&selector).map(element_text).collect()
}

/// Text of `<body>`, or of the whole document when there is no body
pub fn body_text(doc: &Html) -> String {
    let body_selector = Selector::parse("body").expect("body is a valid selector");
    match doc.select(&body_selector).next() {
        Some(body) => element_text(body),
        None => element_text(doc.root_element()),
    }
}

/// Applies each selector in order and returns the link target of every match.
///
/// The target is `href`, falling back to `data-href` and then `data-url`.
/// Results keep selector order and may contain duplicates.
pub fn select_links(html: &str, selectors: &[String]) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();

    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                ::log::warn!("Skipping invalid result selector {:?}: {:?}", raw, e);
                continue;
            }
        };

        links.extend(doc.select(&selector).filter_map(|anchor| {
            let attrs = anchor.value();
            attrs
                .attr("href")
                .or_else(|| attrs.attr("data-href"))
                .or_else(|| attrs.attr("data-url"))
                .map(|href| href.trim().to_string())
                .filter(|href| !href.is_empty())
        }));
    }

    ::log::debug!("Result selectors matched {} links", links.len());
    links
}
