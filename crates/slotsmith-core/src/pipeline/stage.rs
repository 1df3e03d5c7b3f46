//! Pipeline stages and the attempt-or-advance transition

use serde::{Deserialize, Serialize};

/// Which tier produced a result. Display and logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    /// Remote orchestration backend
    Backend,
    /// Direct compression call; schedule from the local heuristic
    DirectCompression,
    /// Direct compression and generation calls
    DirectGeneration,
    /// Everything remote failed; local approximation and heuristic
    HeuristicFallback,
}

impl PipelineStage {
    /// First stage attempted
    pub const FIRST: PipelineStage = PipelineStage::Backend;

    /// Stage to attempt when this one fails
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Backend => Some(PipelineStage::DirectCompression),
            PipelineStage::DirectCompression | PipelineStage::DirectGeneration => {
                Some(PipelineStage::HeuristicFallback)
            }
            PipelineStage::HeuristicFallback => None,
        }
    }

    /// Direct mode: the backend was skipped but a remote service answered
    pub fn is_direct(&self) -> bool {
        matches!(
            self,
            PipelineStage::DirectCompression | PipelineStage::DirectGeneration
        )
    }

    /// Banner shown above degraded results
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            PipelineStage::Backend => None,
            PipelineStage::DirectCompression | PipelineStage::DirectGeneration => {
                Some("🌐 Running via Direct API Mode (No Backend Required)")
            }
            PipelineStage::HeuristicFallback => {
                Some("⚠️ All APIs Unreachable. Running in Offline Demo Mode.")
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Backend => "backend",
            PipelineStage::DirectCompression => "direct-compression",
            PipelineStage::DirectGeneration => "direct-generation",
            PipelineStage::HeuristicFallback => "heuristic-fallback",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order() {
        let mut chain = vec![PipelineStage::FIRST];
        while let Some(next) = chain.last().and_then(PipelineStage::next) {
            chain.push(next);
        }
        assert_eq!(
            chain,
            vec![
                PipelineStage::Backend,
                PipelineStage::DirectCompression,
                PipelineStage::HeuristicFallback,
            ]
        );
        assert_eq!(
            PipelineStage::DirectGeneration.next(),
            Some(PipelineStage::HeuristicFallback)
        );
    }

    #[test]
    fn test_direct_mode() {
        assert!(PipelineStage::DirectCompression.is_direct());
        assert!(PipelineStage::DirectGeneration.is_direct());
        assert!(!PipelineStage::Backend.is_direct());
        assert!(!PipelineStage::HeuristicFallback.is_direct());
    }

    #[test]
    fn test_banners() {
        assert!(PipelineStage::Backend.banner().is_none());
        assert!(PipelineStage::DirectCompression.banner().unwrap().contains("Direct API Mode"));
        assert!(PipelineStage::HeuristicFallback.banner().unwrap().contains("Offline"));
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&PipelineStage::HeuristicFallback).unwrap(),
            "\"heuristic-fallback\""
        );
        assert_eq!(PipelineStage::DirectGeneration.to_string(), "direct-generation");
    }
}
