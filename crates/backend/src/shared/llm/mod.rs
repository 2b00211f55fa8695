pub mod anthropic_provider;
pub mod openai_provider;
pub mod types;

pub use types::*;

use std::sync::Arc;

use crate::shared::config::{Config, ProviderKind};

/// Создать провайдер по секции [llm] конфигурации
///
/// Отсутствие ключа не мешает старту: каждый вызов вернёт `AuthError`.
pub fn build_provider(config: &Config) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let llm = &config.llm;
    let api_key = config.api_key();

    if api_key.is_none() {
        tracing::warn!(
            "{} is not set; report requests will fail until it is configured",
            llm.api_key_env
        );
    }

    let provider: Arc<dyn LlmProvider> = match llm.provider {
        ProviderKind::Anthropic => {
            let provider = match &llm.api_base {
                Some(api_base) => anthropic_provider::AnthropicProvider::new_with_endpoint(
                    api_base.clone(),
                    api_key,
                    llm.model.clone(),
                    llm.max_tokens,
                    llm.timeout_secs,
                )?,
                None => anthropic_provider::AnthropicProvider::new(
                    api_key,
                    llm.model.clone(),
                    llm.max_tokens,
                    llm.timeout_secs,
                )?,
            };
            Arc::new(provider)
        }
        ProviderKind::OpenAi => Arc::new(openai_provider::OpenAiProvider::new(
            llm.api_base.clone(),
            api_key,
            llm.model.clone(),
            llm.max_tokens,
        )),
    };

    tracing::info!(
        "LLM provider: {} (model {}, max_tokens {})",
        provider.provider_name(),
        llm.model,
        llm.max_tokens
    );
    Ok(provider)
}
