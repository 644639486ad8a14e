// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

// Catálogos embutidos no binário (locales/*.json)
const CATALOGS: &[(&str, &str)] = &[
    ("id", include_str!("../../locales/id.json")),
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Idioma usado quando o cliente não envia Accept-Language ou pede um
/// idioma sem catálogo. O site é em indonésio.
pub const DEFAULT_LANG: &str = "id";

#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
    // Em desenvolvimento, os erros 500 levam a mensagem original no campo `error`
    expose_internal_errors: bool,
}

impl I18nStore {
    pub fn load(expose_internal_errors: bool) -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Catálogo '{}' inválido: {}", lang, e))?;
            catalogs.insert(lang.to_string(), messages);
        }

        Ok(Self {
            catalogs: Arc::new(catalogs),
            expose_internal_errors,
        })
    }

    pub fn expose_internal_errors(&self) -> bool {
        self.expose_internal_errors
    }

    /// Busca `key` no idioma pedido, depois no idioma padrão. Se nenhum
    /// catálogo tiver a chave, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.lookup(DEFAULT_LANG).and_then(|messages| messages.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Igual a `translate`, substituindo os marcadores `{nome}`.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        args.iter().fold(self.translate(lang, key), |message, (name, value)| {
            message.replace(&format!("{{{}}}", name), value)
        })
    }

    fn lookup(&self, lang: &str) -> Option<&HashMap<String, String>> {
        self.catalogs.get(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load(false).unwrap();
        let default_keys: Vec<_> = {
            let mut keys: Vec<_> = store.lookup(DEFAULT_LANG).unwrap().keys().cloned().collect();
            keys.sort();
            keys
        };

        for (lang, _) in CATALOGS {
            let mut keys: Vec<_> = store.lookup(lang).unwrap().keys().cloned().collect();
            keys.sort();
            assert_eq!(keys, default_keys, "catálogo '{}' fora de sincronia", lang);
        }
    }

    #[test]
    fn unknown_language_falls_back_to_indonesian() {
        let store = I18nStore::load(false).unwrap();
        assert_eq!(
            store.translate("fr", "invoice.not_found"),
            "Invoice tidak ditemukan"
        );
        assert_eq!(store.translate("en", "invoice.not_found"), "Invoice not found");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::load(false).unwrap();
        assert_eq!(store.translate("en", "nope.nothing"), "nope.nothing");
    }

    #[test]
    fn placeholders_are_substituted() {
        let store = I18nStore::load(false).unwrap();
        assert_eq!(
            store.translate_with("en", "project.migrated", &[("count", "3".to_string())]),
            "Migrated 3 new posts."
        );
    }
}
