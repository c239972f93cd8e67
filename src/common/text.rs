use std::borrow::Cow;

use crate::config::RegionMatch;

/// Undo the common "UTF-8 read as Latin-1" corruption (e.g. `ThÃ¼ringen` → `Thüringen`).
/// Strings that are not of that shape are returned unchanged.
pub(crate) fn repair_mojibake(s: &str) -> Cow<'_, str> {
    if s.is_ascii() || s.chars().any(|c| c as u32 > 0xff) {
        return Cow::Borrowed(s);
    }
    let bytes = s.chars().map(|c| c as u32 as u8).collect::<Vec<_>>();
    match String::from_utf8(bytes) {
        Ok(repaired) => Cow::Owned(repaired),
        Err(_) => Cow::Borrowed(s),
    }
}

/// Map a Latin letter with a diacritic to its ASCII base; `ß` expands to `ss`.
fn fold_char(c: char, out: &mut String) {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        'ł' => 'l',
        'ř' => 'r',
        'ß' => { out.push_str("ss"); return }
        other => other,
    };
    out.push(base);
}

/// Comparison key for a region label under the given matching mode.
pub(crate) fn region_key(label: &str, mode: RegionMatch) -> Cow<'_, str> {
    match mode {
        RegionMatch::Exact => Cow::Borrowed(label),
        RegionMatch::Folded => {
            let repaired = repair_mojibake(label.trim());
            let mut out = String::with_capacity(repaired.len());
            for c in repaired.chars().flat_map(char::to_lowercase) {
                fold_char(c, &mut out);
            }
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_double_encoded_umlaut() {
        assert_eq!(repair_mojibake("ThÃ¼ringen"), "Thüringen");
        assert_eq!(repair_mojibake("Thüringen"), "Thüringen");
        assert_eq!(repair_mojibake("Sachsen"), "Sachsen");
    }

    #[test]
    fn exact_mode_is_identity() {
        assert_eq!(region_key(" Sachsen", RegionMatch::Exact), " Sachsen");
    }

    #[test]
    fn folded_mode_equates_spellings() {
        let a = region_key("Thüringen", RegionMatch::Folded);
        let b = region_key(" THÃ¼RINGEN ", RegionMatch::Folded);
        let c = region_key("Thuringen", RegionMatch::Folded);
        assert_eq!(a, "thuringen");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(region_key("Großstadt", RegionMatch::Folded), "grossstadt");
    }
}
