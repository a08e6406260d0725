//! REST client for the Azure Document Intelligence prebuilt models.

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use bookkeep_ingest::{AnalyzedDocuments, DocumentAnalyzer, DocumentKind, ServiceError};

use crate::config::DocumentAiConfig;

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "Operation-Location";

pub struct AzureDocumentClient {
    config: DocumentAiConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    status: String,
    analyze_result: Option<Value>,
    error: Option<Value>,
}

impl AzureDocumentClient {
    pub fn new(config: DocumentAiConfig) -> Result<Self, ServiceError> {
        if config.endpoint.trim().is_empty() {
            return Err(ServiceError::NotConfigured(
                "missing endpoint (set [document_ai].endpoint or AZURE_DOC_ENDPOINT)".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(ServiceError::NotConfigured(
                "missing api key (set [document_ai].api_key or AZURE_DOC_KEY)".to_string(),
            ));
        }
        Ok(Self {
            config,
            http: reqwest::Client::new(),
        })
    }

    fn analyze_url(&self, kind: DocumentKind) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            kind.model_id(),
            self.config.api_version
        )
    }

    async fn analyze_async(
        &self,
        kind: DocumentKind,
        bytes: &[u8],
    ) -> Result<AnalyzedDocuments, ServiceError> {
        let resp = self
            .http
            .post(self.analyze_url(kind))
            .header(KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: txt,
            });
        }

        let location = resp
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Malformed(format!("no {OPERATION_LOCATION} header")))?;

        tracing::debug!("Analyze accepted for {}, polling {}", kind.model_id(), location);
        self.poll(&location).await
    }

    async fn poll(&self, location: &str) -> Result<AnalyzedDocuments, ServiceError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for _ in 0..self.config.max_polls {
            tokio::time::sleep(interval).await;

            let resp = self
                .http
                .get(location)
                .header(KEY_HEADER, &self.config.api_key)
                .send()
                .await
                .map_err(|e| ServiceError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let txt = resp.text().await.unwrap_or_default();
                return Err(ServiceError::Rejected {
                    status: status.as_u16(),
                    message: txt,
                });
            }

            let op: Operation = resp
                .json()
                .await
                .map_err(|e| ServiceError::Malformed(e.to_string()))?;
            if let Some(done) = interpret(op)? {
                return Ok(done);
            }
        }

        Err(ServiceError::TimedOut {
            polls: self.config.max_polls,
        })
    }
}

/// `Some` once the operation succeeded, `None` while still running
fn interpret(op: Operation) -> Result<Option<AnalyzedDocuments>, ServiceError> {
    match op.status.as_str() {
        "succeeded" => {
            let result = op.analyze_result.ok_or_else(|| {
                ServiceError::Malformed("succeeded without analyzeResult".to_string())
            })?;
            Ok(Some(AnalyzedDocuments::from_analyze_result(&result)))
        }
        "failed" | "canceled" => {
            let message = op
                .error
                .as_ref()
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("no error detail")
                .to_string();
            Err(ServiceError::AnalysisFailed(message))
        }
        _ => Ok(None),
    }
}

impl DocumentAnalyzer for AzureDocumentClient {
    fn analyze(&self, kind: DocumentKind, bytes: &[u8]) -> Result<AnalyzedDocuments, ServiceError> {
        // The CLI runs under #[tokio::main]; nesting block_on would panic.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.analyze_async(kind, bytes)))
        } else {
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| ServiceError::Transport(format!("create tokio runtime: {e}")))?;
            rt.block_on(self.analyze_async(kind, bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> DocumentAiConfig {
        DocumentAiConfig {
            endpoint: "https://acct.cognitiveservices.azure.com/".to_string(),
            api_key: "k".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_url() {
        let client = AzureDocumentClient::new(config()).unwrap();
        assert_eq!(
            client.analyze_url(DocumentKind::Receipt),
            "https://acct.cognitiveservices.azure.com/documentintelligence\
             /documentModels/prebuilt-receipt:analyze?api-version=2024-11-30"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let err = AzureDocumentClient::new(DocumentAiConfig::default()).err().unwrap();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
    }

    #[test]
    fn test_interpret_operation_states() {
        let running: Operation = serde_json::from_value(json!({"status": "running"})).unwrap();
        assert!(interpret(running).unwrap().is_none());

        let done: Operation = serde_json::from_value(json!({
            "status": "succeeded",
            "analyzeResult": {"documents": [{"docType": "receipt.retailMeal", "fields": {}}]}
        }))
        .unwrap();
        assert_eq!(interpret(done).unwrap().unwrap().documents.len(), 1);

        let failed: Operation = serde_json::from_value(json!({
            "status": "failed",
            "error": {"code": "InvalidContent", "message": "corrupt file"}
        }))
        .unwrap();
        match interpret(failed) {
            Err(ServiceError::AnalysisFailed(m)) => assert_eq!(m, "corrupt file"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
