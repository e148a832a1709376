// src/common/i18n.rs

use std::{collections::HashMap, sync::LazyLock};

// (chave, português, inglês)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation.failed", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("auth.email_exists", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("auth.invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("auth.invalid_token", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("auth.forbidden", "Você não tem permissão para realizar esta ação.", "You are not allowed to perform this action."),
    ("user.not_found", "Usuário não encontrado.", "User not found."),
    ("studio.not_found", "Estúdio não encontrado.", "Studio not found."),
    ("studio.context_required", "O cabeçalho X-Studio-ID é obrigatório.", "The X-Studio-ID header is required."),
    ("studio.access_denied", "Você não tem acesso a este estúdio.", "You do not have access to this studio."),
    ("material.not_found", "Material não encontrado.", "Material not found."),
    ("material.already_linked", "Este material já está vinculado ao projeto.", "This material is already linked to the project."),
    ("manufacturer.not_found", "Fabricante não encontrado.", "Manufacturer not found."),
    ("manufacturer.name_exists", "Já existe um fabricante chamado '{}'.", "A manufacturer named '{}' already exists."),
    ("project.not_found", "Projeto não encontrado.", "Project not found."),
    ("quota.invalid_preference", "Preferência de cobrança inválida: '{}'.", "Invalid billing preference: '{}'."),
    ("quota.limit_reached", "O limite mensal de materiais foi atingido.", "The monthly material limit has been reached."),
    ("internal", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de mensagens traduzidas. Idiomas suportados: "pt" e "en" (padrão).
pub struct I18nStore {
    messages: HashMap<&'static str, (&'static str, &'static str)>,
}

impl I18nStore {
    pub fn new() -> Self {
        let messages = MESSAGES
            .iter()
            .map(|(key, pt, en)| (*key, (*pt, *en)))
            .collect();
        Self { messages }
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        match self.messages.get(key) {
            Some((pt, _)) if lang == "pt" => pt.to_string(),
            Some((_, en)) => en.to_string(),
            None => key.to_string(),
        }
    }

    /// Igual a `translate`, substituindo o marcador `{}` pelo argumento.
    pub fn translate_with(&self, lang: &str, key: &str, arg: &str) -> String {
        self.translate(lang, key).replacen("{}", arg, 1)
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Usado quando não há AppState à mão (ex: rejeições de middleware).
pub static DEFAULT_STORE: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_portuguese_only_when_asked() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "project.not_found"), "Projeto não encontrado.");
        assert_eq!(store.translate("en", "project.not_found"), "Project not found.");
        assert_eq!(store.translate("fr", "project.not_found"), "Project not found.");
    }

    #[test]
    fn unknown_key_falls_back_to_the_key() {
        assert_eq!(I18nStore::new().translate("pt", "nope"), "nope");
    }

    #[test]
    fn fills_the_placeholder() {
        let msg = I18nStore::new().translate_with("en", "quota.invalid_preference", "free");
        assert_eq!(msg, "Invalid billing preference: 'free'.");
    }

    #[test]
    fn every_key_is_unique() {
        assert_eq!(I18nStore::new().messages.len(), MESSAGES.len());
    }
}
