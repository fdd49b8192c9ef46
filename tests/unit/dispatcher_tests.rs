/*!
 * Tests for the action dispatcher
 */

use serde_json::json;
use std::sync::Arc;

use pinyin_annotator::annotation::{AnnotationStatus, UserAction, dispatch};
use pinyin_annotator::preferences::{
    MemoryPreferenceStore, PartialPreferences, PreferenceStore, ReadingPosition, ToneType,
};

use crate::common;
use crate::common::mock_stores::FailingPreferenceStore;

#[tokio::test]
async fn test_check_withStoredValues_shouldReconcileWithoutTouchingTree() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let store = Arc::new(MemoryPreferenceStore::with_values([("toneType", json!("num"))]));
    let mut ctx = common::context_with_store(&doc, &converter, store);

    let status = dispatch(&mut ctx, UserAction::Check).await;

    assert_eq!(status, AnnotationStatus::NotAnnotated);
    assert_eq!(ctx.preferences().tone_type, ToneType::Num);
    assert_eq!(converter.call_count(), 0);
    assert_eq!(common::body_html(&doc), "<p>汉字</p>");
}

#[tokio::test]
async fn test_annotate_withMonitorEnabled_shouldEnableWatcherAfterApply() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);

    let status = dispatch(&mut ctx, UserAction::Annotate).await;

    assert_eq!(status, AnnotationStatus::Annotated);
    assert!(ctx.watcher().is_enabled());
    assert_eq!(converter.call_count(), 1);
}

#[tokio::test]
async fn test_annotate_withMonitorDisabled_shouldLeaveWatcherOff() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let store = Arc::new(MemoryPreferenceStore::with_values([("observerEnabled", json!(false))]));
    let mut ctx = common::context_with_store(&doc, &converter, store);

    let status = dispatch(&mut ctx, UserAction::Annotate).await;

    assert_eq!(status, AnnotationStatus::Annotated);
    assert!(!ctx.watcher().is_enabled());
}

#[tokio::test]
async fn test_annotate_withMissingTarget_shouldBeSilentNoOp() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);
    ctx.set_target_selector("#missing");

    for action in [UserAction::Annotate, UserAction::Clear, UserAction::Toggle] {
        assert_eq!(dispatch(&mut ctx, action).await, AnnotationStatus::NotAnnotated);
    }
    assert_eq!(converter.call_count(), 0);
    assert!(!ctx.watcher().is_enabled());
}

#[tokio::test]
async fn test_annotate_withCustomTarget_shouldOnlyTouchTarget() {
    let doc = common::shared_document("<div id=\"article\">汉字</div><aside>中文</aside>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);
    ctx.set_target_selector("#article");

    dispatch(&mut ctx, UserAction::Annotate).await;

    assert_eq!(converter.requested_texts(), vec!["汉字"]);
    let aside = common::select(&doc, "aside");
    assert_eq!(doc.lock().inner_html(aside), "中文");
}

#[tokio::test]
async fn test_clear_withEnabledWatcher_shouldDisableItFirst() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);
    dispatch(&mut ctx, UserAction::Annotate).await;
    assert!(ctx.watcher().is_enabled());

    let status = dispatch(&mut ctx, UserAction::Clear).await;

    assert_eq!(status, AnnotationStatus::NotAnnotated);
    assert!(!ctx.watcher().is_enabled());
    assert!(doc.lock().observed_target().is_none());
    assert_eq!(common::body_html(&doc), "<p>汉字</p>");
}

#[tokio::test]
async fn test_update_options_withPartialData_shouldUpsertOnlyPresentFields() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let store = Arc::new(MemoryPreferenceStore::with_values([("autoAnnotate", json!(true))]));
    let mut ctx = common::context_with_store(&doc, &converter, store.clone());
    dispatch(&mut ctx, UserAction::Check).await;

    let partial = PartialPreferences {
        tone_type: Some(ToneType::None),
        ..Default::default()
    };
    let status = dispatch(&mut ctx, UserAction::UpdateOptions(partial)).await;

    assert_eq!(status, AnnotationStatus::NotAnnotated);
    assert_eq!(store.raw("toneType"), Some(json!("none")));
    assert_eq!(store.raw("autoAnnotate"), Some(json!(true)));
    assert!(store.raw("observerEnabled").is_none());
    assert_eq!(ctx.preferences().tone_type, ToneType::None);
    assert!(ctx.preferences().auto_annotate_on_load);
    assert_eq!(common::body_html(&doc), "<p>汉字</p>");
}

#[tokio::test]
async fn test_update_options_withReadingPosition_shouldRewriteSingleStyle() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);

    for position in [ReadingPosition::Under, ReadingPosition::Over, ReadingPosition::Under] {
        let partial = PartialPreferences {
            reading_position: Some(position),
            ..Default::default()
        };
        dispatch(&mut ctx, UserAction::UpdateOptions(partial)).await;
    }

    let guard = doc.lock();
    let head = guard.head();
    assert_eq!(guard.children(head).len(), 1);
    assert_eq!(guard.text_content(head), "ruby { ruby-position: under; }");
    assert_eq!(ctx.style_node(), Some(guard.children(head)[0]));
}

#[tokio::test]
async fn test_update_options_withMonitorOff_shouldDisableRunningWatcher() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);
    dispatch(&mut ctx, UserAction::Annotate).await;

    let partial = PartialPreferences {
        monitor_enabled: Some(false),
        ..Default::default()
    };
    let status = dispatch(&mut ctx, UserAction::UpdateOptions(partial)).await;

    assert_eq!(status, AnnotationStatus::Annotated);
    assert!(!ctx.watcher().is_enabled());
}

#[tokio::test]
async fn test_toggle_twice_shouldAnnotateThenClear() {
    let doc = common::shared_document("<p>你好, 汉字!</p>");
    let converter = common::working_converter();
    let mut ctx = common::context_for(&doc, &converter);

    assert_eq!(dispatch(&mut ctx, UserAction::Toggle).await, AnnotationStatus::Annotated);
    assert_eq!(dispatch(&mut ctx, UserAction::Toggle).await, AnnotationStatus::NotAnnotated);
    assert_eq!(common::body_html(&doc), "<p>你好, 汉字!</p>");
}

#[tokio::test]
async fn test_actions_withFailingStore_shouldFallBackToDefaults() {
    let doc = common::shared_document("<p>汉字</p>");
    let converter = common::working_converter();
    let store = FailingPreferenceStore::new();
    let mut ctx = common::context_with_store(&doc, &converter, Arc::new(store.clone()));

    let partial = PartialPreferences {
        tone_type: Some(ToneType::Num),
        ..Default::default()
    };
    dispatch(&mut ctx, UserAction::UpdateOptions(partial)).await;
    assert_eq!(ctx.preferences().tone_type, ToneType::Num);
    assert_eq!(store.writes(), 1);

    let status = dispatch(&mut ctx, UserAction::Annotate).await;
    assert_eq!(status, AnnotationStatus::Annotated);
    assert_eq!(ctx.preferences().tone_type, ToneType::Symbol);
    assert!(store.reads() > 0);
    assert!(store.get("toneType").await.is_err());
}
