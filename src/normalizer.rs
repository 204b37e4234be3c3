//! # Text Normalizer Module
//!
//! Turns a raw OCR invoice line description into a human-presentable item
//! name: strips vendor codes, pack/case counts, and unit-quantity tokens,
//! then applies capitalization rules and a small set of domain-specific
//! name completions.
//!
//! Every step is a pure transform over the string; no external calls.

use crate::units;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

/// Packaging words removed alongside unit tokens
const PACKAGING_WORDS: &str = "bib|bag-in-box|bc";

/// Extra piece words accepted in pack-count tokens (`6 pc/cs`)
const PIECE_WORDS: &str = "pcs|pc|pieces|piece";

lazy_static! {
    /// Vendor item-code tokens: `pitt#123`, `SKU: 456`, `code:789`, `item#12`
    static ref VENDOR_CODE: Regex = Regex::new(r"(?i)\b(?:pitt#|sku:|code:|item#)\s*\d+")
        .expect("vendor code pattern should be valid");

    /// Pack/case-count tokens: `6/cs`, `12/750ml`, `4/1`, `6 pc/cs`
    static ref PACK_COUNT: Regex = {
        let unit_words = format!("{}|{}", units::any_token_pattern(), PIECE_WORDS);
        Regex::new(&format!(
            r"(?i)\b\d+(?:\.\d+)?\s*(?:{unit_words})?\s*/\s*(?:\d+(?:\.\d+)?\s*(?:{unit_words})?|(?:{unit_words}))\b"
        ))
        .expect("pack count pattern should be valid")
    };

    /// Case-multiplier tokens: `12x750ml`, `6 x 1L`
    static ref MULTIPLIER: Regex = {
        let unit_words = units::any_token_pattern();
        Regex::new(&format!(
            r"(?i)\b\d+(?:\.\d+)?\s*[x×]\s*\d+(?:\.\d+)?\s*(?:{unit_words})?\b"
        ))
        .expect("multiplier pattern should be valid")
    };

    /// Unit-quantity tokens across the full taxonomy vocabulary: `750ml`, `5 LB`, `2 gal`
    static ref UNIT_QUANTITY: Regex = {
        let unit_words = format!("{}|{}", units::any_token_pattern(), PACKAGING_WORDS);
        Regex::new(&format!(
            r"(?i)\b\d+(?:\.\d+)?\s*(?:{unit_words})\b\.?|\b\d+(?:\.\d+)?#"
        ))
        .expect("unit quantity pattern should be valid")
    };

    /// Standalone packaging words left behind once sizes are stripped
    static ref PACKAGING: Regex = Regex::new(&format!(r"(?i)\b(?:{})\b", PACKAGING_WORDS))
        .expect("packaging pattern should be valid");

    /// Fruit names that trigger juice completion
    static ref FRUIT: Regex =
        Regex::new(r"(?i)\b(orange|lemon|lime|grapefruit|pineapple|apple|cranberry)\b")
            .expect("fruit pattern should be valid");

    static ref JUICE: Regex = Regex::new(r"(?i)\bjuice\b").expect("juice pattern should be valid");
    static ref EVOO: Regex = Regex::new(r"(?i)\bevoo\b").expect("evoo pattern should be valid");
    static ref OIL: Regex = Regex::new(r"(?i)\boil\b").expect("oil pattern should be valid");
}

/// Normalize a raw invoice description into a presentable item name
///
/// Steps, each independently testable:
/// 1. Remove vendor item-code tokens (`pitt#`, `sku:`, `code:`, `item#` + digits)
/// 2. Remove pack/case-count tokens (`N/M`, optionally with a unit word)
/// 3. Remove unit-quantity tokens across the full unit taxonomy vocabulary
/// 4. Collapse whitespace and punctuation, trim separators
/// 5. Title-case each word, preserving `%` tokens and short all-caps acronyms
/// 6. Domain completions (fruit juice, EVOO expansion)
///
/// # Examples
///
/// ```rust
/// use invoice_mapper::normalizer::normalize_item_name;
///
/// assert_eq!(normalize_item_name("12x750ml TEQUILA ANEJO"), "Tequila Anejo");
/// assert_eq!(normalize_item_name("5 LB Salmon Fillet"), "Salmon Fillet");
/// ```
pub fn normalize_item_name(description: &str) -> String {
    trace!("Normalizing description: '{}'", description);

    let stripped = strip_noise_tokens(description);
    let collapsed = collapse_separators(&stripped);
    let cased = title_case(&collapsed);
    let completed = apply_domain_completions(&cased);

    debug!(
        "Normalized '{}' -> '{}'",
        description, completed
    );
    completed
}

/// Steps 1-3: remove vendor codes, pack counts, and unit-quantity tokens
pub fn strip_noise_tokens(description: &str) -> String {
    let without_codes = VENDOR_CODE.replace_all(description, " ");
    let without_packs = PACK_COUNT.replace_all(&without_codes, " ");
    let without_multipliers = MULTIPLIER.replace_all(&without_packs, " ");
    let without_sizes = UNIT_QUANTITY.replace_all(&without_multipliers, " ");
    PACKAGING.replace_all(&without_sizes, " ").into_owned()
}

/// Step 4: collapse whitespace/punctuation runs and trim leading/trailing separators
pub fn collapse_separators(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                cleaned.push(' ');
                last_was_space = true;
            }
        } else {
            cleaned.push(ch);
            last_was_space = false;
        }
    }
    cleaned
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | '/' | '.' | ';'))
        .to_string()
}

/// Step 5: title-case each word
///
/// Tokens containing `%` are preserved verbatim; tokens of at most 4
/// characters that are already all-uppercase are treated as acronyms and
/// preserved verbatim.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if word.contains('%') {
                return word.to_string();
            }
            let has_alpha = word.chars().any(|c| c.is_alphabetic());
            let all_upper = word
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(|c| c.is_uppercase());
            if has_alpha && all_upper && word.len() <= 4 {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Step 6: domain-specific name completions
///
/// A bare fruit name without "juice" becomes `"<Fruit> Juice - <rest>"`;
/// `evoo` without "oil" expands to `"EVOO (Extra Virgin Olive Oil)"`.
pub fn apply_domain_completions(name: &str) -> String {
    let mut completed = name.to_string();

    if let Some(fruit_match) = FRUIT.find(&completed) {
        if !JUICE.is_match(&completed) {
            let fruit = title_case(fruit_match.as_str());
            let rest = format!(
                "{} {}",
                &completed[..fruit_match.start()],
                &completed[fruit_match.end()..]
            );
            let rest = collapse_separators(&rest);
            completed = if rest.is_empty() {
                format!("{} Juice", fruit)
            } else {
                format!("{} Juice - {}", fruit, rest)
            };
            debug!("Applied juice completion: '{}' -> '{}'", name, completed);
        }
    }

    if EVOO.is_match(&completed) && !OIL.is_match(&completed) {
        completed = EVOO
            .replace(&completed, "EVOO (Extra Virgin Olive Oil)")
            .into_owned();
        debug!("Applied EVOO expansion: '{}' -> '{}'", name, completed);
    }

    completed
}

/// Truncate a name at a word boundary when it exceeds `max_length` bytes
pub fn truncate_name(name: &str, max_length: usize) -> String {
    if name.len() <= max_length {
        return name.to_string();
    }
    // max_length may land inside a multibyte character; back up to the
    // nearest char boundary before slicing
    let mut cut = max_length;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &name[..cut];
    match truncated.rfind(' ') {
        Some(last_space) => truncated[..last_space].to_string(),
        None => truncated.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_code_removal() {
        assert_eq!(strip_noise_tokens("PITT#1234 Flour").trim(), "Flour");
        assert_eq!(strip_noise_tokens("Flour sku: 998").trim(), "Flour");
        assert_eq!(strip_noise_tokens("item#42 Sugar CODE:7").trim(), "Sugar");
    }

    #[test]
    fn test_pack_count_removal() {
        assert_eq!(strip_noise_tokens("Chicken Breast 6/cs").trim(), "Chicken Breast");
        assert_eq!(strip_noise_tokens("Salmon 4/1").trim(), "Salmon");
        assert_eq!(strip_noise_tokens("6 PC/CS Chicken").trim(), "Chicken");
    }

    #[test]
    fn test_unit_quantity_removal() {
        assert_eq!(strip_noise_tokens("5 LB Salmon Fillet").trim(), "Salmon Fillet");
        assert_eq!(strip_noise_tokens("750ml Olive Oil").trim(), "Olive Oil");
        assert_eq!(strip_noise_tokens("Soda Syrup 5 gal bib").trim(), "Soda Syrup");
        assert_eq!(strip_noise_tokens("Ground Beef 10#").trim(), "Ground Beef");
    }

    #[test]
    fn test_multiplier_removal() {
        assert_eq!(strip_noise_tokens("12x750ml Tequila Anejo").trim(), "Tequila Anejo");
        assert_eq!(strip_noise_tokens("6 x 1L Tonic").trim(), "Tonic");
    }

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("TEQUILA ANEJO"), "Tequila Anejo");
        assert_eq!(title_case("salmon fillet"), "Salmon Fillet");
    }

    #[test]
    fn test_title_case_preserves_percent_tokens() {
        assert_eq!(title_case("MILK 2%"), "Milk 2%");
    }

    #[test]
    fn test_title_case_preserves_short_acronyms() {
        assert_eq!(title_case("IPA draft"), "IPA Draft");
        assert_eq!(title_case("BBQ sauce"), "BBQ Sauce");
        // Longer all-caps words are not acronyms
        assert_eq!(title_case("SALMON"), "Salmon");
    }

    #[test]
    fn test_juice_completion() {
        assert_eq!(
            normalize_item_name("Orange Fresh Squeezed"),
            "Orange Juice - Fresh Squeezed"
        );
        assert_eq!(normalize_item_name("cranberry"), "Cranberry Juice");
        // Already a juice: untouched
        assert_eq!(normalize_item_name("Orange Juice"), "Orange Juice");
    }

    #[test]
    fn test_evoo_expansion() {
        assert_eq!(normalize_item_name("EVOO"), "EVOO (Extra Virgin Olive Oil)");
        // "oil" already present: no expansion
        assert_eq!(
            normalize_item_name("EVOO olive oil"),
            "EVOO Olive Oil"
        );
    }

    #[test]
    fn test_full_normalization() {
        assert_eq!(normalize_item_name("12x750ml TEQUILA ANEJO"), "Tequila Anejo");
        assert_eq!(normalize_item_name("PITT#7 5 LB salmon fillet"), "Salmon Fillet");
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        assert_eq!(truncate_name("short name", 50), "short name");
        assert_eq!(truncate_name("one two three", 8), "one two");
        assert_eq!(truncate_name("abcdefghij", 5), "abcde");
    }

    #[test]
    fn test_truncate_never_splits_multibyte_chars() {
        // Byte 100 falls inside the two-byte 'é'; the cut backs up to the
        // preceding char boundary instead of panicking
        let name = format!("{}é extra", "a".repeat(99));
        assert_eq!(truncate_name(&name, 100), "a".repeat(99));
        assert_eq!(truncate_name("Rosé Wine", 4), "Ros");
    }

    #[test]
    fn test_deterministic() {
        let input = "6/Cs 1 LB Salmon Fillet";
        assert_eq!(normalize_item_name(input), normalize_item_name(input));
    }
}
