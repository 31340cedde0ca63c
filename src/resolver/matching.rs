//! The specificity chain: category → product name → channel → language.
//!
//! Identifiers compare ordinally (exact bytes, case-sensitive). Languages
//! compare by `LanguageTag` equality. An absent value on the query side, or
//! an absent record language, matches anything; a required channel has to be
//! present on the record.
//!
//! Category and product name depend only on the provider and the query, so
//! they are split out as `provider_admits` and evaluated once per query.

use crate::dataset::{LanguageTag, SourceRecord};
use crate::resolver::profile::SourceProfile;
use crate::resolver::query::{CategoryDescriptor, ProductDescriptor};

/// Operation A: is this provider visible to `category`?
pub(crate) fn category_visible(
    profile: &dyn SourceProfile,
    category: Option<&CategoryDescriptor>,
) -> bool {
    match category.and_then(|c| c.name.as_deref()) {
        None => true,
        Some(requested) => profile.category_name() == Some(requested),
    }
}

/// Stages 1 and 2 of the product chain.
pub(crate) fn provider_admits(profile: &dyn SourceProfile, product: &ProductDescriptor) -> bool {
    if let (Some(fixed), Some(requested)) = (profile.category_name(), product.category.as_deref())
    {
        if fixed != requested {
            return false;
        }
    }

    match product.name.as_deref() {
        Some(requested) => profile.product_name() == requested,
        None => true,
    }
}

/// Stages 3 and 4 of the product chain.
pub(crate) fn record_admits(
    profile: &dyn SourceProfile,
    record: &SourceRecord,
    product: &ProductDescriptor,
) -> bool {
    if let Some(channel) = profile.channel_for(product) {
        if record.channel.as_deref() != Some(channel.as_str()) {
            return false;
        }
    }

    language_admits(product.language.as_ref(), || profile.language_for(record))
}

fn language_admits(
    requested: Option<&LanguageTag>,
    declared: impl FnOnce() -> Option<LanguageTag>,
) -> bool {
    let Some(requested) = requested else {
        return true;
    };
    match declared() {
        Some(declared) => &declared == requested,
        None => true,
    }
}

/// Full chain for a single record.
pub(crate) fn applies_to(
    profile: &dyn SourceProfile,
    record: &SourceRecord,
    product: &ProductDescriptor,
) -> bool {
    provider_admits(profile, product) && record_admits(profile, record, product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::profile::{ChannelRule, LanguageRule, ProductProfile};
    use serde_json::Map;

    fn record(name: &str, channel: Option<&str>, language: Option<&str>) -> SourceRecord {
        SourceRecord {
            name: name.to_string(),
            channel: channel.map(str::to_string),
            language: language.map(LanguageTag::new),
            extra: Map::new(),
        }
    }

    fn profile() -> ProductProfile {
        ProductProfile::new("chdk")
            .with_category("PS")
            .with_channel(ChannelRule::Requested)
            .with_language(LanguageRule::Declared)
    }

    #[test]
    fn category_query_against_fixed_category() {
        let profile = profile();
        assert!(category_visible(&profile, None));
        assert!(category_visible(&profile, Some(&CategoryDescriptor::any())));
        assert!(category_visible(&profile, Some(&CategoryDescriptor::named("PS"))));
        assert!(!category_visible(&profile, Some(&CategoryDescriptor::named("ps"))));

        let uncategorized = ProductProfile::new("chdk");
        assert!(category_visible(&uncategorized, None));
        assert!(!category_visible(&uncategorized, Some(&CategoryDescriptor::named("PS"))));
    }

    #[test]
    fn category_stage_skipped_without_fixed_category() {
        let uncategorized = ProductProfile::new("chdk");
        let product = ProductDescriptor::named("chdk").with_category("EOS");
        assert!(provider_admits(&uncategorized, &product));
        assert!(!provider_admits(&profile(), &product));
    }

    #[test]
    fn product_name_is_ordinal() {
        let profile = profile();
        assert!(provider_admits(&profile, &ProductDescriptor::new()));
        assert!(provider_admits(&profile, &ProductDescriptor::named("chdk")));
        assert!(!provider_admits(&profile, &ProductDescriptor::named("CHDK")));
    }

    #[test]
    fn required_channel_must_be_present_on_record() {
        let profile = profile();
        let product = ProductDescriptor::named("chdk").with_channel("stable");
        assert!(record_admits(&profile, &record("a", Some("stable"), None), &product));
        assert!(!record_admits(&profile, &record("b", Some("Stable"), None), &product));
        assert!(!record_admits(&profile, &record("c", None, None), &product));

        let any_channel = ProductDescriptor::named("chdk");
        assert!(record_admits(&profile, &record("c", None, None), &any_channel));
    }

    #[test]
    fn language_neutral_records_match_any_language() {
        let profile = profile();
        let product = ProductDescriptor::named("chdk").with_language("en-US");
        assert!(record_admits(&profile, &record("a", None, None), &product));
        assert!(record_admits(&profile, &record("b", None, Some("en_us")), &product));
        assert!(!record_admits(&profile, &record("c", None, Some("en")), &product));

        let ignoring = ProductProfile::new("chdk");
        assert!(record_admits(&ignoring, &record("c", None, Some("de")), &product));
    }

    #[test]
    fn language_checked_even_when_channel_is_not_discriminated() {
        let profile = ProductProfile::new("chdk").with_language(LanguageRule::Declared);
        let product = ProductDescriptor::named("chdk").with_language("de");
        assert!(!applies_to(&profile, &record("a", Some("stable"), Some("en")), &product));
        assert!(applies_to(&profile, &record("b", Some("stable"), Some("de")), &product));
    }
}
