use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use dossier_core::config::AssistantConfig;

use crate::api::{AssistantApi, AssistantError};
use crate::types::{Assistant, MessageList, MessageRole, Run, Thread, ThreadMessage};

/// Client for the Azure OpenAI Assistants API.
///
/// Authenticates with the `api-key` header and addresses every resource
/// under `{endpoint}/openai/...` with an `api-version` query parameter.
#[derive(Debug)]
pub struct AzureAssistantClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureAssistantClient {
    /// Build a client from config. Fails with [`AssistantError::NotConfigured`]
    /// when the endpoint or key is missing.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            AssistantError::NotConfigured("AZURE_OPENAI_ENDPOINT is not set".into())
        })?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AssistantError::NotConfigured("AZURE_OPENAI_KEY is not set".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/openai/{}?api-version={}",
            self.endpoint, path, self.api_version
        )
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AssistantError> {
        let url = self.url(path);
        debug!("Assistant request: POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AssistantError> {
        let url = self.url(path);
        debug!("Assistant request: GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AssistantError> {
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api { status, body });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AssistantError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AssistantApi for AzureAssistantClient {
    async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
    ) -> Result<Assistant, AssistantError> {
        self.post_json(
            "assistants",
            json!({
                "model": self.deployment,
                "name": name,
                "instructions": instructions,
            }),
        )
        .await
    }

    async fn create_thread(&self) -> Result<Thread, AssistantError> {
        self.post_json("threads", json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError> {
        self.post_json(
            &format!("threads/{thread_id}/messages"),
            json!({ "role": role, "content": content }),
        )
        .await
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<Run, AssistantError> {
        self.post_json(
            &format!("threads/{thread_id}/runs"),
            json!({ "assistant_id": assistant_id }),
        )
        .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.get_json(&format!("threads/{thread_id}/runs/{run_id}"))
            .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.post_json(&format!("threads/{thread_id}/runs/{run_id}/cancel"), json!({}))
            .await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError> {
        let list: MessageList = self
            .get_json(&format!("threads/{thread_id}/messages"))
            .await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: Option<&str>, key: Option<&str>) -> AssistantConfig {
        AssistantConfig {
            endpoint: endpoint.map(String::from),
            api_key: key.map(String::from),
            deployment: "gpt-4o".to_string(),
            api_version: "2024-05-01-preview".to_string(),
        }
    }

    #[test]
    fn from_config_requires_endpoint_and_key() {
        let err = AzureAssistantClient::from_config(&config(None, Some("k"))).unwrap_err();
        assert!(matches!(err, AssistantError::NotConfigured(_)));

        let err = AzureAssistantClient::from_config(&config(Some("https://x"), None)).unwrap_err();
        assert!(matches!(err, AssistantError::NotConfigured(_)));

        assert!(AzureAssistantClient::from_config(&config(Some("https://x"), Some("k"))).is_ok());
    }

    #[test]
    fn urls_carry_api_version_and_strip_trailing_slash() {
        let client = AzureAssistantClient::from_config(&config(
            Some("https://example.openai.azure.com/"),
            Some("k"),
        ))
        .unwrap();

        assert_eq!(
            client.url("threads/t1/runs/r1"),
            "https://example.openai.azure.com/openai/threads/t1/runs/r1?api-version=2024-05-01-preview"
        );
    }
}
