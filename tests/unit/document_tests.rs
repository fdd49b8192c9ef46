/*!
 * Tests for the document tree, markup handling and mutation recording
 */

use pinyin_annotator::document::{Document, MutationKind, WatcherConfig};
use pinyin_annotator::errors::MarkupError;

#[test]
fn test_from_body_markup_withNestedElements_shouldRoundTrip() {
    let markup = "<p class=\"intro\">你好 <b>世界</b><br>&amp;</p><!-- note --><div id=\"x\"></div>";
    let doc = Document::from_body_markup(markup);
    assert_eq!(
        doc.inner_html(doc.body()),
        "<p class=\"intro\">你好 <b>世界</b><br>&amp;</p><!-- note --><div id=\"x\"></div>"
    );
    assert_eq!(doc.text_content(doc.body()), "你好 世界&");
}

#[test]
fn test_parse_fragment_withUnterminatedTag_shouldFailAndKeepNothing() {
    let mut doc = Document::new();
    let before = doc.live_node_count();
    let result = doc.parse_fragment("<pya class=\"x\"");
    assert!(matches!(result, Err(MarkupError::Rejected { errors, .. }) if errors > 0));
    assert_eq!(doc.live_node_count(), before);
}

#[test]
fn test_from_body_markup_withNamedEntitiesAndImpliedEndTags_shouldParseLikeBrowser() {
    let doc = Document::from_body_markup("<p>&ldquo;汉字&rdquo;&mdash;&hellip;</p><p>a<p>b");
    assert_eq!(doc.text_content(doc.body()), "\u{201c}汉字\u{201d}\u{2014}\u{2026}ab");
    assert_eq!(
        doc.inner_html(doc.body()),
        "<p>\u{201c}汉字\u{201d}\u{2014}\u{2026}</p><p>a</p><p>b</p>"
    );
}

#[test]
fn test_discard_withReusedSlot_shouldKeepStaleIdDead() {
    let mut doc = Document::from_body_markup("<p>汉</p><br>");
    let br = doc.query_selector("br").unwrap();
    doc.remove(br);
    doc.discard(br);

    let fresh = doc.create_element("div");
    assert_eq!(fresh.index(), br.index());
    assert_ne!(fresh, br);
    assert!(doc.node(br).is_none());
    assert!(!doc.is_connected(br));
    assert_eq!(doc.tag_name(fresh), Some("DIV"));
}

#[test]
fn test_is_connected_withDetachedNode_shouldBeFalse() {
    let mut doc = Document::from_body_markup("<p>汉字</p>");
    let p = doc.query_selector("p").unwrap();
    let text = doc.children(p)[0];
    assert!(doc.is_connected(text));

    assert!(doc.remove(text));
    assert!(!doc.is_connected(text));
    assert_eq!(doc.text(text), Some("汉字"));

    doc.discard(text);
    assert!(doc.node(text).is_none());
    let fresh = doc.create_text("新");
    assert_ne!(fresh, text);
}

#[test]
fn test_normalize_withAdjacentTexts_shouldMergeAndDropEmpty() {
    let mut doc = Document::new();
    let body = doc.body();
    for text in ["汉", "", "字", "!"] {
        let node = doc.create_text(text);
        doc.append_child(body, node);
    }
    doc.normalize(body);
    assert_eq!(doc.children(body).len(), 1);
    assert_eq!(doc.text_content(body), "汉字!");
}

#[test]
fn test_query_selector_all_withCompoundSelector_shouldExcludeScope() {
    let doc = Document::from_body_markup(
        "<pya class=\"py-result-item\"><pya class=\"py-chinese-item\">汉</pya></pya><span class=\"py-chinese-item\"></span>",
    );
    let outer = doc.query_selector("pya.py-result-item").unwrap();
    assert_eq!(doc.query_selector_all(outer, "pya.py-result-item").len(), 0);
    assert_eq!(doc.query_selector_all(doc.body(), "pya").len(), 2);
    assert_eq!(doc.query_selector_all(doc.body(), ".py-chinese-item").len(), 2);
}

#[test]
fn test_observe_withSubtreeConfig_shouldRecordEachKind() {
    let mut doc = Document::from_body_markup("<div id=\"t\"><p>汉</p></div><p id=\"out\">字</p>");
    let target = doc.query_selector("#t").unwrap();
    let p = doc.query_selector("p").unwrap();
    let text = doc.children(p)[0];
    let config = WatcherConfig {
        attributes: true,
        ..WatcherConfig::default()
    };
    doc.observe(target, config, None);

    doc.set_text(text, "漢");
    doc.set_attribute(p, "lang", "zh");
    let added = doc.create_text("中");
    doc.append_child(p, added);

    let outside = doc.query_selector("#out").unwrap();
    doc.set_attribute(outside, "lang", "zh");

    let records = doc.take_records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].kind, MutationKind::CharacterData);
    assert_eq!(records[0].target, text);
    assert!(matches!(&records[1].kind, MutationKind::Attributes { name } if name == "lang"));
    assert!(matches!(&records[2].kind, MutationKind::ChildList { added: a, .. } if a == &vec![added]));
}

#[test]
fn test_observe_withoutSubtree_shouldOnlyRecordTarget() {
    let mut doc = Document::from_body_markup("<div id=\"t\"><p>汉</p></div>");
    let target = doc.query_selector("#t").unwrap();
    let p = doc.query_selector("p").unwrap();
    let config = WatcherConfig {
        subtree: false,
        ..WatcherConfig::default()
    };
    doc.observe(target, config, None);

    let inner = doc.create_text("深");
    doc.append_child(p, inner);
    let direct = doc.create_text("浅");
    doc.append_child(target, direct);

    let records = doc.take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].target, target);
}

#[test]
fn test_unobserved_withMutations_shouldRecordNothing() {
    let mut doc = Document::new();
    let body = doc.body();
    doc.observe(body, WatcherConfig::default(), None);

    doc.unobserved(|doc| {
        let text = doc.create_text("汉");
        doc.append_child(body, text);
    });
    assert!(doc.take_records().is_empty());
    assert_eq!(doc.observed_target(), Some(body));

    let text = doc.create_text("字");
    doc.append_child(body, text);
    assert_eq!(doc.take_records().len(), 1);
}

#[test]
fn test_disconnect_withPendingRecords_shouldDropThem() {
    let mut doc = Document::new();
    let body = doc.body();
    doc.observe(body, WatcherConfig::default(), None);
    let text = doc.create_text("汉");
    doc.append_child(body, text);

    doc.disconnect();
    assert!(doc.take_records().is_empty());
    assert!(doc.observed_target().is_none());
}
