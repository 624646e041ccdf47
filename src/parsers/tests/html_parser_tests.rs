use crate::parsers::html::{body_text, element_text, select_links, tag_texts};
use scraper::{Html, Selector};

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_element_text_joins_descendants() {
        let doc = Html::parse_document(
            "<html><body><p>Hello,<b>world</b>!  <span>Again</span></p></body></html>",
        );
        let p = doc.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(element_text(p), "Hello, world ! Again");
    }

    #[test]
    fn test_invisible_text_skipped() {
        let doc = Html::parse_document(
            "<html><body><p>Visible</p><script>var hidden = 1;</script>\
             <style>p { color: red }</style><noscript>Enable JS</noscript></body></html>",
        );
        assert_eq!(body_text(&doc), "Visible");
    }

    #[test]
    fn test_tag_texts_in_document_order() {
        let doc = Html::parse_document("<ul><li>first</li><li>second</li></ul><li>third</li>");
        assert_eq!(tag_texts(&doc, "li"), vec!["first", "second", "third"]);
        assert!(tag_texts(&doc, "h1").is_empty());
    }

    #[test]
    fn test_select_links_in_selector_order() {
        let html = r#"<html><body>
            <li class="b_algo"><h2><a href="https://one.example/">One</a></h2></li>
            <li class="b_algo"><h2><a href="https://two.example/">Two</a></h2>
                <a href="https://two.example/cached">Cached</a></li>
        </body></html>"#;

        let links = select_links(
            html,
            &selectors(&["li.b_algo h2 a", "li.b_algo a[href^='http']"]),
        );
        assert_eq!(
            links,
            vec![
                "https://one.example/",
                "https://two.example/",
                "https://one.example/",
                "https://two.example/",
                "https://two.example/cached",
            ]
        );
    }

    #[test]
    fn test_select_links_data_attribute_fallback() {
        let html = r#"<div class="algo">
            <a data-href="https://data-href.example/">A</a>
            <a data-url="https://data-url.example/">B</a>
            <a>No target</a>
            <a href="  ">Blank</a>
        </div>"#;
        let links = select_links(html, &selectors(&["div.algo a"]));
        assert_eq!(
            links,
            vec!["https://data-href.example/", "https://data-url.example/"]
        );
    }

    #[test]
    fn test_select_links_skips_invalid_selector() {
        let html = r#"<a class="result__a" href="https://ok.example/">ok</a>"#;
        let links = select_links(html, &selectors(&["a[[[", "a.result__a"]));
        assert_eq!(links, vec!["https://ok.example/"]);
    }

    #[test]
    fn test_select_links_testid_selector() {
        let html = r#"<article><h2><a data-testid="result-title-a" href="https://ddg.example/r">R</a></h2></article>"#;
        let links = select_links(html, &selectors(&["a[data-testid='result-title-a']"]));
        assert_eq!(links, vec!["https://ddg.example/r"]);
    }
}
