/*!
 * Tests for conversion service implementations
 */

use anyhow::Result;

use pinyin_annotator::annotation::markup::{self, TextUnit};
use pinyin_annotator::document::Document;
use pinyin_annotator::errors::ConversionError;
use pinyin_annotator::preferences::ToneType;
use pinyin_annotator::providers::mock::{MockBehavior, MockConverter};
use pinyin_annotator::providers::{ConversionOptions, ConversionRequest, ConversionService};
use pinyin_annotator::ReadingTableConverter;

use crate::common;

fn request(text: &str, tone: ToneType, wrap: bool) -> ConversionRequest {
    let options = ConversionOptions {
        wrap_non_qualifying: Some(wrap),
        tone_type: Some(tone),
        dictionary_link_template: None,
    };
    ConversionRequest::new(text, &options)
}

#[tokio::test]
async fn test_reading_table_withScenarioText_shouldRenderFiveUnits() -> Result<()> {
    let response = common::reading_table()
        .convert(request("A,漢，汉", ToneType::Symbol, true))
        .await?;

    let doc = Document::from_body_markup(&response.markup);
    let units = markup::collect_units(&doc, doc.body());
    assert_eq!(
        units,
        vec![
            TextUnit::plain("A"),
            TextUnit::plain(","),
            TextUnit::phonetic('漢', "hàn"),
            TextUnit::plain("，"),
            TextUnit::phonetic('汉', "hàn"),
        ]
    );
    assert_eq!(markup::visible_text(&units), "A,漢，汉");
    Ok(())
}

#[tokio::test]
async fn test_reading_table_withToneTypes_shouldRenderEachRepresentation() -> Result<()> {
    let table = common::reading_table();
    let cases = [
        (ToneType::Symbol, "lǜ"),
        (ToneType::Num, "lü4"),
        (ToneType::None, "lü"),
    ];
    for (tone, expected) in cases {
        let response = table.convert(request("绿", tone, true)).await?;
        let doc = Document::from_body_markup(&response.markup);
        assert_eq!(
            markup::collect_units(&doc, doc.body()),
            vec![TextUnit::phonetic('绿', expected)],
            "tone {:?}",
            tone
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_reading_table_withoutWrapping_shouldEmitBareEscapedText() -> Result<()> {
    let response = common::reading_table()
        .convert(request("<汉>", ToneType::Symbol, false))
        .await?;
    assert!(response.markup.starts_with("&lt;<pya class=\"py-result-item\""));
    assert!(response.markup.ends_with("</pya>&gt;"));
    Ok(())
}

#[tokio::test]
async fn test_reading_table_withUnknownCharacter_shouldTreatItAsPlain() -> Result<()> {
    let response = ReadingTableConverter::default()
        .convert(request("汉", ToneType::Symbol, true))
        .await?;
    assert_eq!(response.markup, "<pya class=\"py-non-chinese-item\">汉</pya>");
    Ok(())
}

#[tokio::test]
async fn test_reading_table_withDictionaryTemplate_shouldLinkCharacters() -> Result<()> {
    let options = ConversionOptions {
        wrap_non_qualifying: Some(true),
        tone_type: Some(ToneType::Symbol),
        dictionary_link_template: Some("https://www.zdic.net/hans/{word}".to_string()),
    };
    let response = common::reading_table()
        .convert(ConversionRequest::new("汉", &options))
        .await?;

    let doc = Document::from_body_markup(&response.markup);
    let link = doc.query_selector("a").expect("link should be rendered");
    assert_eq!(doc.attribute(link, "href"), Some("https://www.zdic.net/hans/%E6%B1%89"));
    assert_eq!(markup::visible_text(&markup::collect_units(&doc, doc.body())), "汉");
    Ok(())
}

#[test]
fn test_from_json_str_withReadings_shouldLoadTable() -> Result<()> {
    let table = ReadingTableConverter::from_json_str(r#"{"汉": "hàn", "字": "zì"}"#)?;
    assert_eq!(table.len(), 2);
    assert!(ReadingTableConverter::from_json_str("[]").is_err());
    Ok(())
}

#[tokio::test]
async fn test_mock_converter_withBehaviors_shouldCountEveryRequest() {
    let failing = MockConverter::failing();
    let result = failing.convert(request("汉", ToneType::Symbol, true)).await;
    assert!(matches!(result, Err(ConversionError::RequestFailed(_))));
    assert_eq!(failing.call_count(), 1);

    let slow = MockConverter::new(MockBehavior::Slow { delay_ms: 5 }, common::reading_table());
    let response = slow.convert(request("汉", ToneType::Symbol, true)).await;
    assert!(response.is_ok());
    assert_eq!(slow.requested_texts(), vec!["汉"]);
}

#[test]
fn test_mock_converter_withFailOn_shouldFailOnlyMatchingText() {
    let converter = MockConverter::new(MockBehavior::FailOn('字'), common::reading_table());

    let (ok, failed) = tokio_test::block_on(async {
        let ok = converter.convert(request("汉", ToneType::Num, false)).await;
        let failed = converter.convert(request("汉字", ToneType::Num, false)).await;
        (ok, failed)
    });

    assert!(ok.is_ok());
    assert!(failed.is_err());
    assert_eq!(converter.requested_texts(), vec!["汉", "汉字"]);
}
