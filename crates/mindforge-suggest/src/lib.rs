pub mod branches;
pub mod centrality;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod prompt;
pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use mindforge_core::settings::DEFAULT_TIMEOUT_SECS;
use mindforge_core::{
    AiSettings, ConceptEdge, ConceptNode, FundamentalNodeSummary, GenerationContext, Provenance,
};

pub use engine::{ChatTurn, CompletionClient, CompletionRequest, Role};
pub use error::{FailureClass, RemoteError};
pub use models::{ModelSelection, ModelSnapshot};

/// Used when the caller passes a blank topic.
pub const UNTITLED_TOPIC: &str = "Untitled Concept";

/// Which path produced a generation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationPath {
    Remote,
    Template,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub nodes: Vec<ConceptNode>,
    pub path: GenerationPath,
    /// Why the remote path was abandoned, if it was tried.
    pub failure: Option<FailureClass>,
}

/// Entry point for generation, analysis and expansion. Every operation is
/// infallible: remote failures are logged and answered by a local path.
pub struct ConceptEngine {
    client: Option<Arc<dyn CompletionClient>>,
    models: ModelSelection,
    timeout: Duration,
}

impl ConceptEngine {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            models: ModelSelection::new(model),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// An engine that never calls out and always uses the local paths.
    pub fn offline() -> Self {
        Self {
            client: None,
            models: ModelSelection::new(String::new()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_settings(settings: &AiSettings) -> Self {
        match engine::client_from_settings(settings) {
            Some(client) => Self::new(client, settings.model.clone())
                .with_timeout(Duration::from_secs(settings.timeout_secs())),
            None => Self::offline(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    pub fn models(&self) -> &ModelSelection {
        &self.models
    }

    /// Switch the model for calls issued from now on.
    pub fn select_model(&self, model: impl Into<String>) -> u64 {
        self.models.select(model)
    }

    async fn call_remote(
        &self,
        client: &dyn CompletionClient,
        request: CompletionRequest,
    ) -> Result<String, RemoteError> {
        tracing::info!(model = %request.model, "sending completion request");
        match tokio::time::timeout(self.timeout, client.complete(&request)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Transport(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    /// Generate a concept map for `topic`. Never empty.
    pub async fn generate(
        &self,
        topic: &str,
        existing: &[ConceptNode],
        context: &GenerationContext,
    ) -> Vec<ConceptNode> {
        self.generate_with_report(topic, existing, context).await.nodes
    }

    pub async fn generate_with_report(
        &self,
        topic: &str,
        existing: &[ConceptNode],
        context: &GenerationContext,
    ) -> GenerationReport {
        let topic = match topic.trim() {
            "" => UNTITLED_TOPIC,
            t => t,
        };
        let snapshot = self.models.snapshot();

        let failure = match &self.client {
            Some(client) => {
                let request = prompt::generation_request(&snapshot.model, topic, existing, context);
                let outcome = self
                    .call_remote(client.as_ref(), request)
                    .await
                    .and_then(|raw| {
                        tracing::debug!(raw = %raw, "raw generation output");
                        parse::parse_nodes(&raw)
                    });
                match outcome {
                    Ok(partials) => {
                        let nodes = normalize::normalize(partials, topic, Provenance::RemoteGenerated);
                        tracing::info!(nodes = nodes.len(), version = snapshot.version, "remote generation succeeded");
                        return GenerationReport {
                            nodes,
                            path: GenerationPath::Remote,
                            failure: None,
                        };
                    }
                    Err(e) => {
                        tracing::warn!(failure = %e.class(), error = %e, "remote generation failed, using fallback");
                        Some(e.class())
                    }
                }
            }
            None => None,
        };

        let (nodes, path) = match templates::select_best_template(topic, context) {
            Some(template) => {
                tracing::info!(template = template.id, "generating from template");
                (
                    templates::generate_from_template(template, topic),
                    GenerationPath::Template,
                )
            }
            None => (
                fallback::fallback_generate(topic, context),
                GenerationPath::Fallback,
            ),
        };

        GenerationReport {
            nodes,
            path,
            failure,
        }
    }

    /// Up to five most central nodes, most central first.
    pub async fn identify_fundamental(
        &self,
        nodes: &[ConceptNode],
        edges: &[ConceptEdge],
    ) -> Vec<FundamentalNodeSummary> {
        if nodes.is_empty() {
            return vec![];
        }

        if let Some(client) = &self.client {
            let snapshot = self.models.snapshot();
            let request = prompt::analysis_request(&snapshot.model, nodes, edges);
            let outcome = self
                .call_remote(client.as_ref(), request)
                .await
                .and_then(|raw| parse::parse_summaries(&raw))
                .and_then(|raw| {
                    centrality::merge_remote(raw, nodes, edges).ok_or_else(|| {
                        RemoteError::MalformedResponse("no summary matched a node".to_string())
                    })
                });
            match outcome {
                Ok(summaries) => return summaries,
                Err(e) => {
                    tracing::warn!(failure = %e.class(), error = %e, "remote analysis failed, scoring locally");
                }
            }
        }

        centrality::local_fundamental(nodes, edges)
    }

    /// At most `max_branches` child concepts for `node`.
    pub async fn expand_branches(
        &self,
        node: &FundamentalNodeSummary,
        existing: &[ConceptNode],
        max_branches: usize,
    ) -> Vec<ConceptNode> {
        if max_branches == 0 {
            return vec![];
        }

        if let Some(client) = &self.client {
            let snapshot = self.models.snapshot();
            let request = prompt::branch_request(&snapshot.model, node, existing, max_branches);
            let outcome = self
                .call_remote(client.as_ref(), request)
                .await
                .and_then(|raw| parse::parse_nodes(&raw));
            match outcome {
                Ok(partials) => {
                    return branches::remote_branches(partials, node, existing, max_branches);
                }
                Err(e) => {
                    tracing::warn!(failure = %e.class(), error = %e, "remote expansion failed, using fixed aspects");
                }
            }
        }

        branches::fallback_branches(node, existing, max_branches)
    }
}
