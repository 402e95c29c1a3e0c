use serde::{Deserialize, Serialize};

/// Point in an item's analysis lifecycle. Parsed once at the Analyzer
/// boundary; downstream consumers (UI) only ever see the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Starting,
    Analyzing,
    Summarizing,
    Complete,
    Error,
}

/// One model/step descriptor in an analysis pipeline, e.g. the two stages
/// of a local instruct-then-cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub model: String,
    pub step: String,
}

impl PipelineStep {
    pub fn new(model: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            step: step.into(),
        }
    }
}

/// Per-item LLM output, as tracked by the Analyzer and surfaced to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub content: String,
    pub error: Option<String>,
    pub loading: bool,
    pub provider: String,
    pub stage: AnalysisStage,
    pub pipeline: Vec<PipelineStep>,
}

impl Analysis {
    pub fn starting(provider: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            error: None,
            loading: true,
            provider: provider.into(),
            stage: AnalysisStage::Starting,
            pipeline: Vec::new(),
        }
    }

    pub fn complete(provider: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
            loading: false,
            provider: provider.into(),
            stage: AnalysisStage::Complete,
            pipeline: Vec::new(),
        }
    }

    pub fn failed(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            error: Some(error.into()),
            loading: false,
            provider: provider.into(),
            stage: AnalysisStage::Error,
            pipeline: Vec::new(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Vec<PipelineStep>) -> Self {
        self.pipeline = pipeline;
        self
    }
}
