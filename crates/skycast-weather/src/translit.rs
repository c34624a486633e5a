//! Cyrillic-to-Latin transliteration for geocoding queries.
//!
//! The geocoding endpoint matches Latin names far more reliably, so queries
//! are romanized before hitting the network ("Киев" -> "kiev"). Total over
//! all input: characters outside the table pass through unchanged.

/// Romanization of one lowercase Cyrillic character. `None` means the
/// character is outside the table and passes through as-is.
fn romanize(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        // Hard and soft signs have no Latin counterpart.
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Lower-case the input and map each Cyrillic character to its Latin
/// romanization. Multi-character mappings concatenate in order, so the
/// output may be longer than the input. Never fails.
pub fn to_latin(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match romanize(c) {
            Some(s) => out.push_str(s),
            None => out.push(c),
        }
    }
    out
}
