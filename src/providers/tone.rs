/*!
 * Tone representation for tone-marked pinyin readings.
 */

use crate::preferences::ToneType;

/// Split a possibly tone-marked vowel into its base letter and tone number
#[rustfmt::skip]
fn split_tone_mark(c: char) -> Option<(char, u8)> {
    let split = match c {
        'ā' => ('a', 1), 'á' => ('a', 2), 'ǎ' => ('a', 3), 'à' => ('a', 4),
        'ē' => ('e', 1), 'é' => ('e', 2), 'ě' => ('e', 3), 'è' => ('e', 4),
        'ī' => ('i', 1), 'í' => ('i', 2), 'ǐ' => ('i', 3), 'ì' => ('i', 4),
        'ō' => ('o', 1), 'ó' => ('o', 2), 'ǒ' => ('o', 3), 'ò' => ('o', 4),
        'ū' => ('u', 1), 'ú' => ('u', 2), 'ǔ' => ('u', 3), 'ù' => ('u', 4),
        'ǖ' => ('ü', 1), 'ǘ' => ('ü', 2), 'ǚ' => ('ü', 3), 'ǜ' => ('ü', 4),
        'ń' => ('n', 2), 'ň' => ('n', 3), 'ǹ' => ('n', 4),
        'ḿ' => ('m', 2),
        'Ā' => ('A', 1), 'Á' => ('A', 2), 'Ǎ' => ('A', 3), 'À' => ('A', 4),
        'Ē' => ('E', 1), 'É' => ('E', 2), 'Ě' => ('E', 3), 'È' => ('E', 4),
        'Ō' => ('O', 1), 'Ó' => ('O', 2), 'Ǒ' => ('O', 3), 'Ò' => ('O', 4),
        _ => return None,
    };
    Some(split)
}

/// Render a tone-marked reading in the requested representation.
///
/// `Num` appends the tone digit, `0` for the neutral tone; `ü` is kept as is.
pub fn render_reading(reading: &str, tone: ToneType) -> String {
    match tone {
        ToneType::Symbol => reading.to_string(),
        ToneType::None => reading
            .chars()
            .map(|c| split_tone_mark(c).map_or(c, |(base, _)| base))
            .collect(),
        ToneType::Num => {
            let mut tone_number = 0;
            let mut out: String = reading
                .chars()
                .map(|c| match split_tone_mark(c) {
                    Some((base, number)) => {
                        tone_number = number;
                        base
                    }
                    None => c,
                })
                .collect();
            if out.chars().last().is_some_and(|c| c.is_ascii_digit()) {
                return out;
            }
            out.push(char::from(b'0' + tone_number));
            out
        }
    }
}
