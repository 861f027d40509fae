//! CLDR plural categories for stub generation.

use icu_locale::Locale;
use icu_plurals::{
    PluralCategory,
    PluralRuleType,
    PluralRules,
};

/// Suffixes used when a locale's plural rules cannot be determined.
pub const DEFAULT_SUFFIXES: [&str; 2] = ["one", "other"];

/// Representative counts per category, in canonical suffix order.
/// A category applies to a locale when any of its counts selects it.
const CATEGORY_PROBES: [(PluralCategory, &str, &[u32]); 6] = [
    (PluralCategory::Zero, "zero", &[0]),
    (PluralCategory::One, "one", &[1, 21, 31, 41]),
    (PluralCategory::Two, "two", &[2, 22, 32]),
    (PluralCategory::Few, "few", &[3, 4, 23, 24]),
    (PluralCategory::Many, "many", &[5, 6, 11, 101]),
    (PluralCategory::Other, "other", &[7, 8, 9, 10, 25, 100, 1000]),
];

/// Source of the plural suffixes a locale's stub set must cover.
pub trait PluralRegistry: Send + Sync {
    /// Suffix names for `locale`, in canonical order.
    fn plural_suffixes(&self, locale: &str) -> Vec<String>;
}

/// [`PluralRegistry`] backed by ICU's CLDR plural rules.
///
/// `other` is always part of the result: fractional counts select it even
/// in locales where no integer does. Unknown locales fall back to
/// [`DEFAULT_SUFFIXES`] with a warning rather than failing the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct CldrPlurals;

impl PluralRegistry for CldrPlurals {
    fn plural_suffixes(&self, locale: &str) -> Vec<String> {
        let parsed: Locale = match locale.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(locale, "unparseable locale for plural rules: {e}");
                return DEFAULT_SUFFIXES.map(String::from).to_vec();
            }
        };
        let rules = match PluralRules::try_new(parsed.into(), PluralRuleType::Cardinal.into()) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(locale, "no plural rules for locale: {e}");
                return DEFAULT_SUFFIXES.map(String::from).to_vec();
            }
        };

        CATEGORY_PROBES
            .iter()
            .filter(|(category, _, counts)| {
                *category == PluralCategory::Other
                    || counts.iter().any(|&count| rules.category_for(count as usize) == *category)
            })
            .map(|&(_, suffix, _)| suffix.to_string())
            .collect()
    }
}
