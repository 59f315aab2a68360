/*
 * Responsibility
 * - the catalog + the locale negotiated for the current request
 * - built by the `Lang` extractor (api::v1::extractors::lang), never rejects
 */
use std::sync::Arc;

use super::{Catalog, MessageKey};

#[derive(Clone, Debug)]
pub struct Lang {
    catalog: Arc<Catalog>,
    locale: String,
}

impl Lang {
    pub fn new(catalog: Arc<Catalog>, accept_language: Option<&str>) -> Self {
        let locale = catalog.negotiate(accept_language).to_string();
        Self { catalog, locale }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn t(&self, key: MessageKey) -> String {
        self.catalog.resolve(key, &self.locale).to_string()
    }

    /// Fills `{name}` placeholders in the localized message.
    pub fn format(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.t(key), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}
