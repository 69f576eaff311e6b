//! The `info` section

use crate::translator::Translator;
use jsonapi_openapi_common::openapi::Info;
use jsonapi_openapi_common::ServerSettings;

/// Info of a server's document
///
/// Declared overrides win over translated lines; the version is always the
/// JSON:API version the server implements.
pub fn build_info(settings: &ServerSettings, translator: &Translator<'_>) -> Info {
    let declared = settings.info.clone().unwrap_or_default();

    Info {
        title: declared
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| translator.translate("info.title")),
        description: Some(
            declared
                .description
                .filter(|description| !description.is_empty())
                .unwrap_or_else(|| translator.translate("info.description")),
        ),
        terms_of_service: declared.terms_of_service,
        contact: declared.contact,
        license: declared.license,
        version: settings.jsonapi_version.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_openapi_common::{InfoOverride, TranslationSource};
    use serde_json::{json, Value};

    struct Lines;

    impl TranslationSource for Lines {
        fn line(&self, key: &str) -> Option<Value> {
            match key {
                "jsonapi-openapi::info.title" => Some(json!(":Server JSON:API")),
                "jsonapi-openapi::info.description" => Some(json!("The :server server")),
                _ => None,
            }
        }
    }

    #[test]
    fn test_translated_info() {
        let settings = ServerSettings::new("v1");
        let translator = Translator::new(&Lines, &settings);

        let info = build_info(&settings, &translator);
        assert_eq!(info.title, "V1 JSON:API");
        assert_eq!(info.description.as_deref(), Some("The v1 server"));
        assert_eq!(info.version, "1.0");
    }

    #[test]
    fn test_declared_info_wins() {
        let mut settings = ServerSettings::new("v1");
        settings.jsonapi_version = "1.1".to_string();
        settings.info = Some(InfoOverride {
            title: Some("Blog API".to_string()),
            terms_of_service: Some("https://example.com/terms".to_string()),
            ..Default::default()
        });
        let translator = Translator::new(&Lines, &settings);

        let info = build_info(&settings, &translator);
        assert_eq!(info.title, "Blog API");
        assert_eq!(info.description.as_deref(), Some("The v1 server"));
        assert_eq!(
            info.terms_of_service.as_deref(),
            Some("https://example.com/terms")
        );
        assert_eq!(info.version, "1.1");
    }
}
