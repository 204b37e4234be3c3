//! # Category Classifier Module
//!
//! Maps a description (plus an optional vendor-name signal) to one item
//! category from the closed enumeration, and infers a subcategory for wine,
//! liquor, and beer.
//!
//! Rules are an ordered data structure evaluated first-match-wins; earlier
//! rules take precedence on overlap.

use crate::types::{Category, Classification};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

fn keyword_regex(words: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words))
        .expect("keyword pattern should be valid")
}

lazy_static! {
    /// Content rules, most specific first. The first matching rule wins.
    static ref CONTENT_RULES: Vec<(Category, Regex)> = vec![
        (
            Category::Chemicals,
            keyword_regex("sanitizer|bleach|detergent|degreaser|cleaner|soap|chemical"),
        ),
        (
            Category::Disposables,
            keyword_regex("napkins?|straws?|cutlery|gloves?|paper towels?|to-?go|plates?"),
        ),
        (
            Category::Packaging,
            keyword_regex("containers?|lids?|foil|film|wrap|cartons?"),
        ),
        (
            Category::BarConsumable,
            // "olives" plural only: "olive oil" belongs to dry goods
            keyword_regex("bitters|grenadine|puree|sour mix|margarita mix|olives|garnish"),
        ),
        (Category::Wine, keyword_regex(WINE_KEYWORDS)),
        (Category::Beer, keyword_regex(BEER_KEYWORDS)),
        (Category::Liquor, keyword_regex(SPIRIT_KEYWORDS)),
        (
            Category::NonAlcoholicBeverage,
            keyword_regex("soda|cola|tonic|water|tea|coffee|lemonade|kombucha"),
        ),
    ];

    /// Food-subfamily rules, evaluated after the content rules and vendor fallback
    static ref FOOD_RULES: Vec<(Category, Regex)> = vec![
        (
            Category::Seafood,
            keyword_regex(
                "salmon|tuna|shrimp|fish|cod|halibut|crab|lobster|scallops?|oysters?|clams?|mussels?|mahi|snapper|trout|calamari|squid"
            ),
        ),
        (
            Category::Meat,
            keyword_regex(
                "beef|chicken|pork|lamb|veal|turkey|duck|bacon|sausage|ham|brisket|ribeye|tenderloin|steak|wings?"
            ),
        ),
        (
            Category::Dairy,
            keyword_regex("milk|cheese|butter|cream|yogurt|eggs?|mozzarella|cheddar|parmesan"),
        ),
        (
            Category::Produce,
            keyword_regex(
                "lettuce|tomato(?:es)?|onions?|peppers?|potato(?:es)?|carrots?|celery|cucumbers?|avocados?|spinach|kale|cilantro|parsley|basil|lemons?|limes?|oranges?|apples?|berr(?:y|ies)|mushrooms?|garlic"
            ),
        ),
        (
            Category::DryGoods,
            keyword_regex("flour|rice|pasta|sugar|salt|beans?|grain|cereal|oil|vinegar|spices?|canned"),
        ),
        (Category::Frozen, keyword_regex("frozen|ice cream")),
    ];

    /// Beverage-distributor vendor names bias toward liquor
    static ref BEVERAGE_VENDOR: Regex = keyword_regex(
        "southern glazer'?s?|republic national|rndc|breakthru|empire|johnson brothers|wine|spirits?|liquor|beverage"
    );

    /// Any alcoholic-beverage keyword; used for the recipe-UOM override and
    /// the standard-bottle fallback in the pack cascade
    static ref BEVERAGE: Regex = keyword_regex(&format!(
        "{}|{}|{}",
        WINE_KEYWORDS, BEER_KEYWORDS, SPIRIT_KEYWORDS
    ));

    /// Subcategory keyword tables, first match wins within each category
    static ref WINE_SUBCATEGORIES: Vec<(&'static str, Regex)> = vec![
        ("sparkling", keyword_regex("champagne|prosecco|sparkling|cava|brut")),
        ("red", keyword_regex("cabernet|merlot|pinot noir|malbec|syrah|shiraz|zinfandel|red")),
        ("white", keyword_regex("chardonnay|sauvignon|pinot grigio|pinot gris|riesling|white")),
        ("rose", keyword_regex("rosé|rose|blush")),
    ];
    static ref LIQUOR_SUBCATEGORIES: Vec<(&'static str, Regex)> = vec![
        ("vodka", keyword_regex("vodka")),
        ("gin", keyword_regex("gin")),
        ("rum", keyword_regex("rum")),
        ("tequila", keyword_regex("tequila|mezcal")),
        ("whiskey", keyword_regex("whiskey|whisky|bourbon|scotch")),
        ("vermouth", keyword_regex("vermouth")),
        ("aperitif", keyword_regex("aperol|campari|amaro|aperitif")),
    ];
    static ref BEER_SUBCATEGORIES: Vec<(&'static str, Regex)> = vec![
        ("ipa", keyword_regex("ipa")),
        ("lager", keyword_regex("lager|pilsner")),
        ("stout", keyword_regex("stout|porter")),
    ];
}

const WINE_KEYWORDS: &str =
    "wine|champagne|prosecco|cava|brut|cabernet|merlot|pinot|chardonnay|sauvignon|riesling|malbec|zinfandel|syrah|shiraz|rosé";
const BEER_KEYWORDS: &str = "beer|ipa|lager|pilsner|stout|porter|ale|cider";
const SPIRIT_KEYWORDS: &str =
    "vodka|gin|rum|tequila|mezcal|whiskey|whisky|bourbon|scotch|brandy|cognac|liqueur|vermouth|amaro|aperol|campari|sake";

/// Whether the description names an alcoholic beverage or spirit
pub fn is_beverage(description: &str) -> bool {
    BEVERAGE.is_match(description)
}

/// Classify a description into a category and optional subcategory
///
/// Ordered evaluation: content rules (packaging family, bar consumables,
/// wine, beer, liquor, non-alcoholic beverages), then the vendor-name
/// fallback, then food subfamilies, defaulting to `food`.
///
/// # Examples
///
/// ```rust
/// use invoice_mapper::classifier::classify;
/// use invoice_mapper::types::Category;
///
/// let result = classify("12x750ml Tequila Anejo", Some("Republic National"));
/// assert_eq!(result.category, Category::Liquor);
/// assert_eq!(result.subcategory.as_deref(), Some("tequila"));
/// ```
pub fn classify(description: &str, vendor_name: Option<&str>) -> Classification {
    for (category, pattern) in CONTENT_RULES.iter() {
        if pattern.is_match(description) {
            debug!(category = ?category, "Content rule matched");
            return Classification {
                category: *category,
                subcategory: infer_subcategory(*category, description),
            };
        }
    }

    if let Some(vendor) = vendor_name {
        if BEVERAGE_VENDOR.is_match(vendor) {
            debug!(vendor = %vendor, "Beverage-distributor vendor fallback matched");
            return Classification {
                category: Category::Liquor,
                subcategory: infer_subcategory(Category::Liquor, description),
            };
        }
    }

    for (category, pattern) in FOOD_RULES.iter() {
        if pattern.is_match(description) {
            debug!(category = ?category, "Food subfamily rule matched");
            return Classification {
                category: *category,
                subcategory: None,
            };
        }
    }

    debug!("No classification rule matched, defaulting to food");
    Classification {
        category: Category::Food,
        subcategory: None,
    }
}

/// Infer a subcategory for wine, liquor, or beer
///
/// First match wins. When keywords from more than one subcategory co-occur
/// (e.g. "cabernet" and "champagne" in one name) the ambiguity is flagged
/// with a warning and the first match is returned.
pub fn infer_subcategory(category: Category, description: &str) -> Option<String> {
    let table: &[(&'static str, Regex)] = match category {
        Category::Wine => &WINE_SUBCATEGORIES,
        Category::Liquor => &LIQUOR_SUBCATEGORIES,
        Category::Beer => &BEER_SUBCATEGORIES,
        _ => return None,
    };

    let matched: Vec<&str> = table
        .iter()
        .filter(|(_, pattern)| pattern.is_match(description))
        .map(|(name, _)| *name)
        .collect();

    if matched.len() > 1 {
        warn!(
            description = %description,
            subcategories = ?matched,
            "Multiple subcategory keywords co-occur, taking the first"
        );
    }

    matched.first().map(|name| name.to_string())
}
