//! Library API integration tests
use rstest::rstest;
use selectio_core::*;

const PAGE: &str = r#"
    <html>
    <head><title>Catalog</title></head>
    <body>
        <section id="main">
            <div class="product">
                <h2>Widget</h2>
                <a href="/widget">details</a>
                <span class="price">$9.99</span>
            </div>
            <div class="product">
                <h2>Gadget</h2>
                <a href="/gadget">details</a>
                <span class="price">$19.99</span>
            </div>
        </section>
        <footer>
            <a href="/about">About</a>
        </footer>
    </body>
    </html>
"#;

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_css_document_order_no_duplicates_idempotent(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let first = doc.css("h2::text").unwrap().getall();
    let second = doc.css("h2::text").unwrap().getall();
    assert_eq!(first, vec!["Widget", "Gadget"]);
    assert_eq!(first, second);
}

#[test]
fn test_translation_is_pure() {
    let a = xpath_to_css("//div[@class='product']/a").unwrap();
    let b = xpath_to_css("//div[@class='product']/a").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.css, "div.product > a");
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_translated_query_matches_manual_css(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let via_xpath = doc.xpath("//div[@class='product']//a/@href").unwrap().getall();
    let via_css = doc.css("div.product a::attr(href)").unwrap().getall();
    assert_eq!(via_xpath, via_css);
    assert_eq!(via_xpath, vec!["/widget", "/gadget"]);
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_xpath_css_round_trip(#[case] backend: BackendKind) {
    let doc = Document::parse("<div>1</div><div>2</div><div>3</div>", backend);
    let via_xpath = doc.xpath("//div").unwrap();
    let via_css = doc.css("div").unwrap();
    assert_eq!(via_xpath.len(), 3);
    assert_eq!(via_xpath.getall(), via_css.getall());
    // Same underlying handles, not merely equal serializations.
    for (x, c) in via_xpath.iter().zip(&via_css) {
        assert_eq!(x.node(), c.node());
    }
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_child_vs_descendant_separators(#[case] backend: BackendKind) {
    let doc = Document::parse("<div><p>A</p><span><p>B</p></span></div>", backend);
    assert_eq!(doc.xpath("//div/p/text()").unwrap().getall(), vec!["A"]);
    assert_eq!(doc.xpath("//div//p/text()").unwrap().getall(), vec!["A", "B"]);
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_wildcard_id_predicate(#[case] backend: BackendKind) {
    let doc = Document::parse(r#"<section id="main">X</section>"#, backend);
    let result = doc.xpath(r#"//*[@id="main"]"#).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.css("::text").unwrap().getall(), vec!["X"]);
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_attribute_and_text_extraction_steps(#[case] backend: BackendKind) {
    let doc = Document::parse(r#"<a href="/x">t</a><p>Hello</p>"#, backend);
    assert_eq!(doc.xpath("//a/@href").unwrap().getall(), vec!["/x"]);
    assert_eq!(doc.xpath("//p/text()").unwrap().getall(), vec!["Hello"]);
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_unsupported_axis_never_translates_silently(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let err = doc.xpath("//div[@class=\"x\"]/following-sibling::p").unwrap_err();
    match err {
        SelectioError::XPathConversion { reason, .. } => assert!(reason.contains("following-sibling")),
        other => panic!("expected XPathConversion, got {:?}", other),
    }
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_empty_results_are_not_errors(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let result = doc.css(".missing").unwrap();
    assert_eq!(result.get(), None);
    assert_eq!(result.get_or("fallback"), "fallback");
    assert!(result.getall().is_empty());
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_chained_queries_stay_scoped(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let main = doc.css("#main").unwrap();
    let hrefs = main.css("a::attr(href)").unwrap().getall();
    // footer's /about link is outside the #main subtree.
    assert_eq!(hrefs, vec!["/widget", "/gadget"]);

    let prices = main.xpath(".//span[@class='price']/text()").unwrap().getall();
    assert_eq!(prices, vec!["$9.99", "$19.99"]);
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_per_product_extraction_loop(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let mut rows = Vec::new();
    for product in &doc.css("div.product").unwrap() {
        let name = product.css("h2::text").unwrap().get_or("");
        let href = product.css("a::attr(href)").unwrap().get_or("");
        rows.push((name, href));
    }
    assert_eq!(
        rows,
        vec![
            ("Widget".to_string(), "/widget".to_string()),
            ("Gadget".to_string(), "/gadget".to_string()),
        ]
    );
}

#[rstest]
#[case(BackendKind::Html5Ever)]
#[case(BackendKind::DomQuery)]
fn test_regex_over_extracted_values(#[case] backend: BackendKind) {
    let doc = Document::parse(PAGE, backend);
    let price_re = regex::Regex::new(r"\$([\d.]+)").unwrap();
    let prices = doc.css(".price::text").unwrap();
    assert_eq!(prices.re(&price_re), vec!["9.99", "19.99"]);
    assert_eq!(prices.re_first(&price_re).as_deref(), Some("9.99"));
}

#[test]
fn test_backends_agree_on_results() {
    let queries = ["h2::text", "a::attr(href)", "#main .price::text"];
    let scraper_doc = Document::parse(PAGE, BackendKind::Html5Ever);
    let dom_query_doc = Document::parse(PAGE, BackendKind::DomQuery);
    for query in queries {
        assert_eq!(
            scraper_doc.css(query).unwrap().getall(),
            dom_query_doc.css(query).unwrap().getall(),
            "backends disagree on {query}"
        );
    }
}

#[test]
fn test_response_policy_flow() {
    let config = PolicyConfig::new(ParsePolicy::Backend(BackendKind::Html5Ever));
    let parsed = HtmlResponse::new(PAGE.to_string(), None, &config, None);
    assert_eq!(parsed.css("h2::text").unwrap().getall(), vec!["Widget", "Gadget"]);

    let skipped = HtmlResponse::new(PAGE.to_string(), None, &config, Some(ParsePolicy::Disabled));
    assert!(skipped.document().is_none());
    assert!(skipped.css("h2").unwrap().is_empty());
}
