/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::str::FromStr;

use pinyin_annotator::app_config::{Config, EngineConfig, LogLevel};
use pinyin_annotator::document::WatcherConfig;

use crate::common;

#[test]
fn test_default_config_shouldBeValid() -> Result<()> {
    let config = Config::default();
    config.validate()?;
    assert_eq!(config.engine.observation_selector, "body");
    assert_eq!(config.engine.batch_queue_capacity, 64);
    assert!(!config.engine.wrap_output);
    assert_eq!(config.engine.watcher, WatcherConfig::default());
    assert_eq!(config.log_level, LogLevel::Info);
    Ok(())
}

#[test]
fn test_validate_withBadValues_shouldFail() {
    let mut config = Config::default();
    config.engine.observation_selector = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.engine.batch_queue_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.engine.watcher = WatcherConfig {
        child_list: false,
        character_data: false,
        attributes: false,
        subtree: true,
    };
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.engine.observation_selector = "div > p".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(
        r##"{ "engine": { "observation_selector": "#main", "watcher": { "attributes": true } }, "log_level": "debug" }"##,
    )?;

    assert_eq!(config.engine.observation_selector, "#main");
    assert!(config.engine.watcher.attributes);
    assert!(config.engine.watcher.child_list);
    assert!(config.engine.watcher.subtree);
    assert_eq!(config.engine.batch_queue_capacity, EngineConfig::default().batch_queue_capacity);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_from_file_withWrittenConfig_shouldLoadIt() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("pinyin-annotator.json");
    let mut config = Config::default();
    config.engine.wrap_output = true;
    std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;

    assert_eq!(Config::from_file(&path)?, config);
    assert!(Config::from_file(&dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn test_for_url_withYoutubeHost_shouldAddCaptionStyle() -> Result<()> {
    let config = Config::default().for_url("https://www.youtube.com/watch?v=1")?;
    assert_eq!(
        config.engine.extra_styles,
        vec!["span.ytp-caption-segment { white-space: nowrap !important; }"]
    );
    assert!(Config::default().for_url("not a url").is_err());
    Ok(())
}

#[tokio::test]
async fn test_extra_styles_withController_shouldBeInjectedIntoHead() {
    let doc = common::shared_document("<p>汉</p>");
    let config = Config::default().for_url("https://www.youtube.com/").unwrap();
    let (mut controller, _handle) = pinyin_annotator::Controller::new(
        doc.clone(),
        std::sync::Arc::new(common::working_converter()),
        std::sync::Arc::new(pinyin_annotator::preferences::MemoryPreferenceStore::new()),
        config,
    );
    controller.initialize().await;

    let guard = doc.lock();
    let head_text = guard.text_content(guard.head());
    assert!(head_text.contains("span.ytp-caption-segment"));
    assert!(head_text.contains("ruby-position: over"));
}

#[test]
fn test_log_level_fromStr_shouldAcceptKnownNames() {
    assert_eq!(LogLevel::from_str("WARNING").unwrap(), LogLevel::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    assert!(LogLevel::from_str("loud").is_err());
}
