//! Kana script conversion.

/// Full-width equivalents of the half-width katakana block
/// (`U+FF61`..=`U+FF9F`), in code point order.
const HALFWIDTH_TO_FULLWIDTH: &str = "。「」、・ヲァィゥェォャュョッー\
    アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワン゛゜";

const HALFWIDTH_START: u32 = 0xFF61;
const HALFWIDTH_END: u32 = 0xFF9F;
const HALFWIDTH_VOICED_MARK: char = '\u{FF9E}';
const HALFWIDTH_SEMI_VOICED_MARK: char = '\u{FF9F}';

/// Bases that take a voiced mark by moving to the next code point.
const VOICEABLE: &str = "カキクケコサシスセソタチツテトハヒフヘホ";
/// Bases that take a semi-voiced mark by moving two code points.
const SEMI_VOICEABLE: &str = "ハヒフヘホ";

/// Returns `true` for hiragana letters (`ぁ`..=`ゖ`).
#[must_use]
pub const fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}')
}

/// Returns `true` for full-width katakana letters (`ァ`..=`ヶ`).
#[must_use]
pub const fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30F6}')
}

/// Converts full-width katakana letters to hiragana. Other characters
/// (including the prolonged sound mark) pass through unchanged.
#[must_use]
pub fn katakana_to_hiragana(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if is_katakana(c) {
                char::from_u32(c as u32 - 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Converts half-width katakana to full-width, merging a trailing
/// half-width voicing mark into its base (`ｶﾞ` → `ガ`).
#[must_use]
pub fn widen_halfwidth_katakana(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let Some(base) = widen_char(c) else {
            out.push(c);
            continue;
        };

        let combined = match chars.peek() {
            Some(&HALFWIDTH_VOICED_MARK) => voiced(base),
            Some(&HALFWIDTH_SEMI_VOICED_MARK) => semi_voiced(base),
            _ => None,
        };

        if let Some(combined) = combined {
            chars.next();
            out.push(combined);
        } else {
            out.push(base);
        }
    }

    out
}

fn widen_char(c: char) -> Option<char> {
    let code = c as u32;
    if !(HALFWIDTH_START..=HALFWIDTH_END).contains(&code) {
        return None;
    }
    HALFWIDTH_TO_FULLWIDTH
        .chars()
        .nth((code - HALFWIDTH_START) as usize)
}

fn voiced(base: char) -> Option<char> {
    if base == 'ウ' {
        return Some('ヴ');
    }
    if VOICEABLE.contains(base) {
        return char::from_u32(base as u32 + 1);
    }
    None
}

fn semi_voiced(base: char) -> Option<char> {
    if SEMI_VOICEABLE.contains(base) {
        return char::from_u32(base as u32 + 2);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halfwidth_table_covers_block() {
        let expected = (HALFWIDTH_END - HALFWIDTH_START + 1) as usize;
        assert_eq!(HALFWIDTH_TO_FULLWIDTH.chars().count(), expected);
    }

    #[test]
    fn widens_plain_halfwidth() {
        assert_eq!(widen_halfwidth_katakana("ｱｲｳｴｵ"), "アイウエオ");
        assert_eq!(widen_halfwidth_katakana("ﾜｦﾝｰ"), "ワヲンー");
    }

    #[test]
    fn merges_voicing_marks() {
        assert_eq!(widen_halfwidth_katakana("ｶﾞｷﾞﾀﾞ"), "ガギダ");
        assert_eq!(widen_halfwidth_katakana("ﾊﾟﾋﾟﾌﾟ"), "パピプ");
        assert_eq!(widen_halfwidth_katakana("ｳﾞ"), "ヴ");
    }

    #[test]
    fn stray_voicing_mark_is_kept() {
        assert_eq!(widen_halfwidth_katakana("ｱﾞ"), "ア゛");
    }

    #[test]
    fn converts_katakana_to_hiragana() {
        assert_eq!(katakana_to_hiragana("セタガヤク"), "せたがやく");
        assert_eq!(katakana_to_hiragana("ラーメン"), "らーめん");
        assert_eq!(katakana_to_hiragana("新宿"), "新宿");
    }
}
