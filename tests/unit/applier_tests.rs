/*!
 * Tests for Apply and Clear
 */

use std::sync::Arc;

use pinyin_annotator::annotation::applier::{self, Applier};
use pinyin_annotator::annotation::markup::{self, TextUnit};
use pinyin_annotator::annotation::TextScanner;
use pinyin_annotator::preferences::ToneType;
use pinyin_annotator::providers::ConversionOptions;
use pinyin_annotator::providers::mock::{MockBehavior, MockConverter};

use crate::common;

fn options() -> ConversionOptions {
    ConversionOptions {
        wrap_non_qualifying: Some(true),
        tone_type: Some(ToneType::Symbol),
        dictionary_link_template: None,
    }
}

#[tokio::test]
async fn test_apply_withQualifyingTexts_shouldConvertEachNodeOnce() {
    let doc = common::shared_document("<p>你好</p><div>中文<b>汉字</b></div><p>none</p>");
    let converter = common::working_converter();
    let applier = Applier::new(Arc::new(converter.clone()), false);
    let body = doc.lock().body();

    let report = applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    assert_eq!(report.scanned, 3);
    assert_eq!(report.converted, 3);
    assert_eq!(converter.call_count(), 3);
    assert_eq!(converter.requested_texts(), vec!["你好", "中文", "汉字"]);
    assert_eq!(common::body_text(&doc), "你(nǐ)好(hǎo)中(zhōng)文(wén)汉(hàn)字(zì)none");
}

#[tokio::test]
async fn test_apply_withoutWrapFlag_shouldSpliceUnitsDirectlyIntoParent() {
    let doc = common::shared_document("<p>A汉</p>");
    let applier = Applier::new(Arc::new(common::working_converter()), false);
    let body = doc.lock().body();
    applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    let doc = doc.lock();
    let p = doc.query_selector("p").unwrap();
    let children = doc.children(p);
    assert_eq!(children.len(), 2);
    assert!(doc.node(children[0]).unwrap().has_class(markup::NON_CHINESE_CLASS));
    assert!(doc.node(children[1]).unwrap().has_class(markup::RESULT_CLASS));
}

#[tokio::test]
async fn test_apply_withWrapFlag_shouldKeepOneWrapperPerNode() {
    let doc = common::shared_document("<p>A汉</p>");
    let applier = Applier::new(Arc::new(common::working_converter()), true);
    let body = doc.lock().body();
    applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    {
        let doc = doc.lock();
        let p = doc.query_selector("p").unwrap();
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.tag_name(doc.children(p)[0]), Some("PYA"));
    }

    let cleared = applier::clear(&mut doc.lock(), body);
    assert_eq!(cleared, 3);
    assert_eq!(common::body_html(&doc), "<p>A汉</p>");
}

#[tokio::test]
async fn test_apply_withFailingConverter_shouldLeaveTextUntouched() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = MockConverter::failing();
    let applier = Applier::new(Arc::new(converter.clone()), false);
    let body = doc.lock().body();

    let report = applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.converted, 0);
    assert_eq!(common::body_html(&doc), "<p>汉字</p>");
}

#[tokio::test]
async fn test_apply_withOneFailingNode_shouldStillConvertTheRest() {
    let doc = common::shared_document("<p>你好</p><p>汉字</p><p>中文</p>");
    let converter = MockConverter::new(MockBehavior::FailOn('汉'), common::reading_table());
    let applier = Applier::new(Arc::new(converter.clone()), false);
    let body = doc.lock().body();

    let report = applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    assert_eq!(report.converted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(converter.call_count(), 3);
}

#[tokio::test]
async fn test_apply_withMalformedMarkup_shouldDiscardResponse() {
    let doc = common::shared_document("<p>汉字</p>");
    let applier = Applier::new(Arc::new(MockConverter::malformed()), false);
    let body = doc.lock().body();

    let report = applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    assert_eq!(report.failed, 1);
    assert_eq!(common::body_html(&doc), "<p>汉字</p>");
}

#[tokio::test]
async fn test_apply_withTextChangedMidFlight_shouldSkipNode() {
    let doc = common::shared_document("<p id=\"a\">你好</p>");
    let p = common::select(&doc, "#a");
    let hook_doc = doc.clone();
    let converter = common::working_converter().with_hook(move |_| {
        let mut doc = hook_doc.lock();
        let text = doc.children(p)[0];
        doc.set_text(text, "汉字");
    });
    let applier = Applier::new(Arc::new(converter), false);
    let body = doc.lock().body();

    let report = applier.apply(&doc, &TextScanner::default(), Some(body), &options()).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(common::body_html(&doc), "<p id=\"a\">汉字</p>");
}

#[tokio::test]
async fn test_apply_withMissingRoot_shouldDoNothing() {
    let doc = common::shared_document("<p>汉</p>");
    let converter = common::working_converter();
    let applier = Applier::new(Arc::new(converter.clone()), false);

    let report = applier.apply(&doc, &TextScanner::default(), None, &options()).await;

    assert_eq!(report.scanned, 0);
    assert_eq!(converter.call_count(), 0);
}

#[tokio::test]
async fn test_apply_withNumericTones_shouldRenderDigits() {
    let doc = common::shared_document("<p>汉</p>");
    let applier = Applier::new(Arc::new(common::working_converter()), false);
    let body = doc.lock().body();
    let options = ConversionOptions {
        tone_type: Some(ToneType::Num),
        ..options()
    };

    applier.apply(&doc, &TextScanner::default(), Some(body), &options).await;

    let doc = doc.lock();
    assert_eq!(
        markup::collect_units(&doc, doc.body()),
        vec![TextUnit::phonetic('汉', "han4")]
    );
}

#[test]
fn test_clear_withNothingAnnotated_shouldBeNoOp() {
    let doc = common::shared_document("<p>汉字 <i>x</i></p>");
    let mut guard = doc.lock();
    let body = guard.body();
    assert_eq!(applier::clear(&mut guard, body), 0);
    assert_eq!(guard.inner_html(body), "<p>汉字 <i>x</i></p>");
}

#[test]
fn test_clear_withScopedRoot_shouldLeaveOtherSubtreesAnnotated() {
    let unit = markup::render_units(&[TextUnit::phonetic('汉', "hàn")], true);
    let doc = common::shared_document(&format!("<div id=\"a\">{unit}</div><div id=\"b\">{unit}</div>"));
    let a = common::select(&doc, "#a");
    let b = common::select(&doc, "#b");

    let mut guard = doc.lock();
    assert_eq!(applier::clear(&mut guard, a), 1);
    assert!(!applier::is_annotated(&guard, a));
    assert!(applier::is_annotated(&guard, b));
    assert_eq!(guard.text_content(a), "汉");
}
