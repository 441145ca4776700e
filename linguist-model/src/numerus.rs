//! Language identification and plural ("numerus") forms.
//!
//! Plural rules come from CLDR through ICU. A language without likely-subtag
//! data is treated as unknown and gets a single universal form.

use std::path::Path;

use icu_locale::{LanguageIdentifier, Locale, LocaleExpander, TransformResult};
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};
use tracing::debug;

/// Name used for the only form of a language with unknown plural rules
pub const UNIVERSAL_FORM: &str = "Universal Form";

/// One plural form of a language, with a number that selects it
#[derive(Debug, Clone, PartialEq)]
pub struct NumerusForm {
    pub category: PluralCategory,
    pub test_value: u32,
    /// Whether translations of this form should mention the count (`%n`),
    /// false when the form is only ever selected by a single number
    pub needs_count_reference: bool,
}

impl NumerusForm {
    pub fn name(&self) -> &'static str {
        match self.category {
            PluralCategory::Zero => "Zero",
            PluralCategory::One => "One",
            PluralCategory::Two => "Two",
            PluralCategory::Few => "Few",
            PluralCategory::Many => "Many",
            PluralCategory::Other => "Other",
        }
    }
}

/// Plural forms of a target language
#[derive(Debug, Clone, PartialEq)]
pub struct NumerusInfo {
    pub forms: Vec<NumerusForm>,
    /// False when the rules were unknown and a universal form is assumed
    pub known: bool,
}

impl NumerusInfo {
    pub fn universal() -> Self {
        NumerusInfo {
            forms: vec![NumerusForm {
                category: PluralCategory::Other,
                test_value: 0,
                needs_count_reference: true,
            }],
            known: false,
        }
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        if self.known {
            self.forms.iter().map(NumerusForm::name).collect()
        } else {
            vec![UNIVERSAL_FORM]
        }
    }
}

/// Parses a file language code such as `de`, `pt_BR` or `sr_Latn_RS`.
/// `C`, `POSIX`, `und` and unparsable codes yield `None`. Encoding and
/// modifier suffixes (`de_DE.UTF-8@euro`) are ignored.
pub fn parse_language_code(code: &str) -> Option<LanguageIdentifier> {
    let code = code.split(['.', '@']).next().unwrap_or("").trim();
    if code.is_empty() || code == "C" || code == "POSIX" {
        return None;
    }
    let langid: LanguageIdentifier = code.replace('_', "-").parse().ok()?;
    if langid.language.as_str() == "und" {
        return None;
    }
    Some(langid)
}

/// Formats a language the way translation files store it: `de`, `pt_BR`.
pub fn language_code(langid: &LanguageIdentifier) -> String {
    let mut code = langid.language.as_str().to_string();
    if let Some(script) = langid.script {
        code.push('_');
        code.push_str(script.as_str());
    }
    if let Some(region) = langid.region {
        code.push('_');
        code.push_str(region.as_str());
    }
    code
}

/// Language guessed from a file name following the `name_lang.ext`
/// convention: everything after the first underscore of the base name.
pub fn language_from_file_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let base_name = file_name.split('.').next().unwrap_or(file_name);
    let pos = base_name.find('_')?;
    let lang = &base_name[pos + 1..];
    if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    }
}

/// Language of the running system, if it can be determined
pub fn system_language() -> Option<LanguageIdentifier> {
    sys_locale::get_locale().and_then(|locale| parse_language_code(&locale))
}

/// Human readable label for a language, e.g. `de` or `pt (BR)`.
pub fn language_label(langid: Option<&LanguageIdentifier>) -> String {
    match langid {
        None => "POSIX".to_string(),
        Some(langid) => match langid.region {
            Some(region) => format!("{} ({})", langid.language.as_str(), region.as_str()),
            None => langid.language.as_str().to_string(),
        },
    }
}

fn has_language_data(langid: &LanguageIdentifier) -> bool {
    let mut bare = LanguageIdentifier::from(langid.language);
    let expander = LocaleExpander::new_extended();
    matches!(expander.maximize(&mut bare), TransformResult::Modified)
}

/// Plural forms for a target language. `None` (the C locale) uses the
/// English rules.
pub fn numerus_info(langid: Option<&LanguageIdentifier>) -> NumerusInfo {
    let langid = match langid {
        Some(langid) => langid.clone(),
        None => icu_locale::langid!("en"),
    };
    if !has_language_data(&langid) {
        debug!("No locale data for '{}'", language_code(&langid));
        return NumerusInfo::universal();
    }

    let locale: Locale = langid.clone().into();
    let pr = match PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()) {
        Ok(pr) => pr,
        Err(e) => {
            debug!(
                "Failed to create PluralRules for '{}': {}",
                language_code(&langid),
                e
            );
            return NumerusInfo::universal();
        }
    };

    // Representative numbers for each category; the first one that the
    // language maps to the category is kept.
    let test_values_by_category = [
        (PluralCategory::Zero, vec![0u32]),
        (PluralCategory::One, vec![1u32, 21u32, 31u32, 41u32]),
        (PluralCategory::Two, vec![2u32, 22u32, 32u32]),
        (PluralCategory::Few, vec![3u32, 4u32, 23u32, 24u32]),
        (PluralCategory::Many, vec![5u32, 11u32, 101u32]),
        (
            PluralCategory::Other,
            vec![6u32, 7u32, 8u32, 9u32, 10u32, 25u32, 100u32, 1000u32],
        ),
    ];

    let mut forms = Vec::new();
    for (expected_category, test_values) in test_values_by_category.iter() {
        for &test_value in test_values {
            if pr.category_for(test_value as usize) == *expected_category {
                let hits = (0usize..=1000)
                    .filter(|&n| pr.category_for(n) == *expected_category)
                    .take(2)
                    .count();
                forms.push(NumerusForm {
                    category: *expected_category,
                    test_value,
                    needs_count_reference: hits > 1,
                });
                break;
            }
        }
    }

    if forms.is_empty() {
        return NumerusInfo::universal();
    }
    NumerusInfo { forms, known: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_code() {
        let langid = parse_language_code("pt_BR").unwrap();
        assert_eq!(langid.language.as_str(), "pt");
        assert_eq!(langid.region.map(|r| r.as_str().to_string()), Some("BR".to_string()));
        assert_eq!(language_code(&langid), "pt_BR");

        assert_eq!(
            language_code(&parse_language_code("de_DE.UTF-8").unwrap()),
            "de_DE"
        );
        assert!(parse_language_code("C").is_none());
        assert!(parse_language_code("").is_none());
        assert!(parse_language_code("not a language").is_none());
    }

    #[test]
    fn test_language_from_file_name() {
        assert_eq!(
            language_from_file_name(Path::new("/src/qt_de.ts")),
            Some("de".to_string())
        );
        assert_eq!(
            language_from_file_name(Path::new("app_pt_BR.ts")),
            Some("pt_BR".to_string())
        );
        assert_eq!(language_from_file_name(Path::new("translations.ts")), None);
        assert_eq!(language_from_file_name(Path::new("trailing_.ts")), None);
    }

    #[test]
    fn test_english_plural_forms() {
        let info = numerus_info(parse_language_code("en").as_ref());
        assert!(info.known);
        assert_eq!(info.names(), vec!["One", "Other"]);
        // "one" only matches the number 1
        assert!(!info.forms[0].needs_count_reference);
        assert!(info.forms[1].needs_count_reference);
    }

    #[test]
    fn test_russian_plural_forms() {
        let info = numerus_info(parse_language_code("ru").as_ref());
        assert_eq!(info.len(), 3);
        assert!(info.forms.iter().all(|f| f.needs_count_reference));
    }

    #[test]
    fn test_c_locale_uses_english_rules() {
        assert_eq!(numerus_info(None).len(), 2);
    }

    #[test]
    fn test_unknown_language_gets_universal_form() {
        let info = numerus_info(parse_language_code("qaa").as_ref());
        assert!(!info.known);
        assert_eq!(info.names(), vec![UNIVERSAL_FORM]);
    }

    #[test]
    fn test_language_label() {
        assert_eq!(language_label(parse_language_code("de").as_ref()), "de");
        assert_eq!(language_label(parse_language_code("pt_BR").as_ref()), "pt (BR)");
        assert_eq!(language_label(None), "POSIX");
    }
}
