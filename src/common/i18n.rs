// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Mensagens embutidas no binário. Chaves desconhecidas voltam como estão,
// o que permite aos serviços enviarem textos livres quando necessário.
const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("required", "Campo obrigatório."),
    ("not_negative", "O valor não pode ser negativo."),
    ("must_be_positive", "O valor deve ser maior que zero."),
    ("email_already_exists", "Este e-mail já está em uso."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("document_not_found", "Registro não encontrado ({resource})."),
    ("document_already_exists", "Já existe um registro com este identificador."),
    ("store_misconfigured", "O servidor de dados recusou a conexão. Verifique a configuração; tentar novamente não resolverá."),
    ("store_unavailable", "Servidor de dados indisponível. Tente novamente."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("role_not_assignable", "Seu cargo não permite atribuir este cargo."),
    ("members_management_denied", "Seu cargo não permite gerenciar membros da loja."),
    ("shop_management_denied", "Apenas administradores podem gerenciar lojas."),
    ("shop_switch_denied", "Seu cargo não permite trocar de loja."),
    ("shop_not_available", "Loja não disponível para esta sessão."),
    ("shop_scope_missing", "O cabeçalho X-Shop-ID é obrigatório."),
    ("shop_scope_denied", "Você não tem acesso a esta loja."),
    ("dashboard_denied", "Sua conta ainda não tem acesso ao painel."),
    ("records_management_denied", "Seu cargo não permite alterar estes registros."),
    ("unknown_oauth_provider", "Provedor de login não suportado."),
    ("empty_sale", "A venda precisa de pelo menos um item."),
    ("empty_file", "O arquivo enviado está vazio."),
    ("invalid_redirect", "As URLs de retorno precisam ser absolutas."),
    ("profile_update_denied", "Você só pode editar o seu próprio perfil."),
    ("invalid_multipart", "Envio de formulário inválido."),
];

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("required", "Required field."),
    ("not_negative", "The value cannot be negative."),
    ("must_be_positive", "The value must be greater than zero."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Missing or invalid authentication token."),
    ("document_not_found", "Record not found ({resource})."),
    ("document_already_exists", "A record with this identifier already exists."),
    ("store_misconfigured", "The data server refused the connection. Check the configuration; retrying will not help."),
    ("store_unavailable", "Data server unavailable. Please try again."),
    ("internal_error", "An unexpected error occurred."),
    ("role_not_assignable", "Your role is not allowed to assign this role."),
    ("members_management_denied", "Your role is not allowed to manage shop members."),
    ("shop_management_denied", "Only administrators can manage shops."),
    ("shop_switch_denied", "Your role is not allowed to switch shops."),
    ("shop_not_available", "Shop not available for this session."),
    ("shop_scope_missing", "The X-Shop-ID header is required."),
    ("shop_scope_denied", "You do not have access to this shop."),
    ("dashboard_denied", "Your account has no dashboard access yet."),
    ("records_management_denied", "Your role is not allowed to change these records."),
    ("unknown_oauth_provider", "Unsupported login provider."),
    ("empty_sale", "A sale needs at least one item."),
    ("empty_file", "The uploaded file is empty."),
    ("invalid_redirect", "Redirect URLs must be absolute."),
    ("profile_update_denied", "You can only edit your own profile."),
    ("invalid_multipart", "Invalid form upload."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let mut messages = HashMap::new();
        messages.insert("pt", PT.iter().copied().collect());
        messages.insert("en", EN.iter().copied().collect());
        Self { messages }
    }
}

impl I18nStore {
    /// Traduz uma chave; cai para o português e, por fim, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .map(|m| m.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_portuguese_then_to_key() {
        let store = I18nStore::default();
        assert_eq!(store.translate("en", "required"), "Required field.");
        assert_eq!(store.translate("fr", "required"), "Campo obrigatório.");
        assert_eq!(store.translate("en", "texto livre"), "texto livre");
    }

    #[test]
    fn both_languages_carry_the_same_keys() {
        let pt: Vec<_> = PT.iter().map(|(k, _)| *k).collect();
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(pt, en);
    }
}
