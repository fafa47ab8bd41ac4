// ABOUTME: Integration tests for the sanitizer through the public API.
// ABOUTME: Idempotence, boolean normalization, handler and script removal, adversarial input.

use domkit::sanitize::BOOLEAN_ATTRIBUTES;
use domkit::{
    create_nodes, parse_document, parse_fragment, sanitize, sanitize_document, sanitize_html,
    Document, Node, SanitizeOptions, Selector, TemplateCache,
};
use pretty_assertions::assert_eq;

fn clean(html: &str) -> String {
    sanitize_html(html, &SanitizeOptions::default())
}

const CORPUS: &[&str] = &[
    r#"<div hidden="weird" onclick="x()"><a href="javascript:y()">t</a></div>"#,
    r#"<p title="" class="c" ONMOUSEOVER="e()">para</p>"#,
    r#"<img src="data:image/png;base64,iVBORw0KGgo=" onerror="alert(1)" alt="">"#,
    r#"<a href="&#106;avascript:alert(1)">encoded</a><a href="https://ok.example/">ok</a>"#,
    r#"<form id="f"><input name="attributes"></form><form><input name="q"></form>"#,
    r#"<!--[if IE]><script>x</script><![endif]--><ul><li><script>y</script>item</li></ul>"#,
    r#"<svg><a xlink:href="data:text/html,<script>1</script>">s</a></svg>"#,
    r#"<details open="open"><summary>s</summary><input checked="yes" required="REQUIRED"></details>"#,
    r#"<div id="cookie" name="body" data-x="javascript:1" aria-label="data:">d</div>"#,
    "<svg><style>&lt;/style&gt;&lt;img src=x onerror=alert(1)&gt;</style></svg>",
    "<math><style>&lt;/style&gt;&lt;img src=x onerror=alert(1)&gt;</style></math>",
    "<svg><foreignObject><style>p { color: red }</style></foreignObject><title>&lt;b&gt;</title></svg>",
    r##"<svg><use xlink:href="#icon"></use></svg>"##,
    "<noscript><b>x</b></noscript>",
    r#"<noscript><p title="</noscript><img src=x onerror=alert(1)>"></noscript>"#,
];

/// Every attribute name in `html` after parsing it again.
fn reparsed_attribute_names(html: &str) -> Vec<String> {
    let doc = parse_fragment(html);
    Selector::parse("*")
        .unwrap()
        .select(&doc, doc.root())
        .into_iter()
        .flat_map(|id| {
            doc.element(id)
                .unwrap()
                .value()
                .attrs()
                .map(|(name, _)| name.to_ascii_lowercase())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn end_to_end_example() {
    assert_eq!(
        clean(r#"<div hidden="weird" onclick="x()"><a href="javascript:y()">t</a></div>"#),
        r#"<div hidden=""><a>t</a></div>"#
    );
}

#[test]
fn sanitize_is_idempotent() {
    for input in CORPUS {
        let once = clean(input);
        assert_eq!(clean(&once), once, "input: {input}");
    }
}

#[test]
fn no_event_handler_survives_reparse() {
    for input in CORPUS {
        let once = clean(input);
        let names = reparsed_attribute_names(&once);
        assert!(
            !names.iter().any(|name| name.starts_with("on")),
            "{input} -> {once} -> {names:?}"
        );
    }
}

#[test]
fn foreign_raw_text_stays_escaped() {
    let input = "<svg><style>&lt;/style&gt;&lt;img src=x onerror=alert(1)&gt;</style></svg>";
    assert_eq!(clean(input), input);
}

#[test]
fn noscript_round_trips() {
    let once = clean("<noscript><b>x</b></noscript>");
    assert_eq!(once, "<noscript><b>x</b></noscript>");
    assert_eq!(clean(&once), once);
}

#[test]
fn xlink_attributes_keep_their_prefix() {
    assert_eq!(
        clean(r##"<svg><use xlink:href="#icon"></use></svg>"##),
        r##"<svg><use xlink:href="#icon"></use></svg>"##
    );
    assert_eq!(
        clean(r#"<svg><a xlink:href="javascript:x()">s</a></svg>"#),
        "<svg><a>s</a></svg>"
    );
}

#[test]
fn second_pass_changes_nothing_in_place() {
    for input in CORPUS {
        let parsed = create_nodes(input, &SanitizeOptions::default());
        let mut doc = parsed.document;
        let before = doc.html();
        let survivors = sanitize(&mut doc, &parsed.nodes, &SanitizeOptions::default());
        assert_eq!(survivors, parsed.nodes);
        assert_eq!(doc.html(), before);
    }
}

#[test]
fn boolean_attributes_are_normalized() {
    for name in BOOLEAN_ATTRIBUTES {
        assert_eq!(
            clean(&format!(r#"<div {name}="anything">x</div>"#)),
            format!(r#"<div {name}="">x</div>"#)
        );
        assert_eq!(
            clean(&format!(r#"<div {name}="">x</div>"#)),
            format!(r#"<div {name}="">x</div>"#)
        );
        assert_eq!(
            clean(&format!(r#"<div {name}="{name}">x</div>"#)),
            format!(r#"<div {name}="{name}">x</div>"#)
        );
    }
}

#[test]
fn event_handlers_always_removed() {
    for name in ["onclick", "OnLoad", "onerror", "onpointerdown", "on"] {
        for value in ["", "x()", "https://example.com", "harmless"] {
            let out = clean(&format!(r#"<span {name}="{value}" class="k">s</span>"#));
            assert_eq!(out, r#"<span class="k">s</span>"#, "{name}={value:?}");
        }
    }
}

#[test]
fn scripts_never_survive() {
    let inputs = [
        "<script>secret()</script>",
        "<div><div><div><script>secret()</script></div></div></div>",
        "<table><tr><td><script>secret()</script></td></tr></table>",
        "<p>a</p><script src=\"x.js\">secret()</script><p>b</p>",
    ];
    for input in inputs {
        let out = clean(input);
        assert!(!out.contains("secret"), "{input} -> {out}");
        assert!(!out.contains("<script"), "{input} -> {out}");
    }
}

#[test]
fn full_document_sanitization() {
    let mut doc = parse_document(
        r#"<!DOCTYPE html><html><head><script>h()</script><title>T</title></head><body onload="x()"><p>ok</p></body></html>"#,
    );
    let survivors = sanitize_document(&mut doc, &SanitizeOptions::default());
    assert_eq!(survivors.len(), 1);
    assert_eq!(
        doc.html(),
        "<html><head><title>T</title></head><body><p>ok</p></body></html>"
    );
}

#[test]
fn boolean_normalization_can_be_disabled() {
    let options = SanitizeOptions::builder()
        .sanitize_boolean_attributes(false)
        .build();
    assert_eq!(
        sanitize_html(r#"<input disabled="nope" onfocus="x()">"#, &options),
        r#"<input disabled="nope" />"#
    );
}

#[test]
fn adversarial_input_does_not_panic() {
    let deep = "<div>".repeat(2_000) + "<script>x</script>" + &"</div>".repeat(2_000);
    let out = clean(&deep);
    assert!(!out.contains("script"));

    for input in ["", "<", "<<>>", "<!---->", "<?php echo 1 ?>", "&#xFFFFFFFF;", "<a href=\"&#\">x</a>"] {
        clean(input);
    }

    // Ids that belong to another document, and detached nodes.
    let mut doc = Document::fragment();
    let root = doc.root();
    let orphan = doc.create(Node::Comment("<b>".into()));
    let stray = {
        let mut other = Document::fragment();
        let other_root = other.root();
        let a = other.append_element(other_root, "a", &[]).unwrap();
        other.append_element(a, "b", &[]).unwrap()
    };
    let survivors = sanitize(&mut doc, &[orphan, stray, root], &SanitizeOptions::default());
    assert_eq!(survivors, vec![root]);
}

#[test]
fn template_cache_serves_sanitized_copies() {
    let mut cache = TemplateCache::default();
    let first = cache.get_or_parse(r#"<button onclick="x()" disabled="d">b</button>"#);
    assert_eq!(first.document.html(), r#"<button disabled="">b</button>"#);
    assert!(cache.contains(r#"<button onclick="x()" disabled="d">b</button>"#));
    assert_eq!(cache.len(), 1);
}
