//! Requirement extraction: transcript text → structured BRD.
//!
//! The capability is polymorphic: a model-backed extractor and a
//! deterministic fallback implement the same trait, and `FallbackOnError`
//! composes them so call sites never repeat try-then-substitute logic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{GenerativeModel, LlmError};
use crate::models::{
    BrdContent, FunctionalRequirement, NonFunctionalRequirement, Priority, Scope, Stakeholder,
};

use super::prompt;

/// Transcript → structured requirements document.
#[async_trait]
pub trait RequirementExtractor: Send + Sync {
    async fn extract(&self, transcript: &str) -> Result<BrdContent, LlmError>;
}

/// Model-backed extractor. The response must be a JSON object conforming to
/// the `BrdContent` wire shape.
pub struct ModelExtractor {
    model: Arc<dyn GenerativeModel>,
}

impl ModelExtractor {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl RequirementExtractor for ModelExtractor {
    async fn extract(&self, transcript: &str) -> Result<BrdContent, LlmError> {
        let raw = self
            .model
            .generate(&prompt::extraction_prompt(transcript))
            .await?;
        parse_brd_json(&raw)
    }
}

/// Parse and validate a model response against the BRD shape.
pub fn parse_brd_json(raw: &str) -> Result<BrdContent, LlmError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    serde_json::from_str(cleaned).map_err(|e| LlmError::ResponseParsing(e.to_string()))
}

/// Models often wrap JSON in markdown fences despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line and the closing fence.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Deterministic extractor. Keyword-matches the transcript for a title and
/// returns a fixed hand-authored template.
pub struct FallbackExtractor;

#[async_trait]
impl RequirementExtractor for FallbackExtractor {
    async fn extract(&self, transcript: &str) -> Result<BrdContent, LlmError> {
        Ok(fallback_brd(transcript))
    }
}

/// Wrapper that tries the primary extractor and substitutes the
/// deterministic template on any error. Never fails, so a model outage
/// cannot leave a document stuck.
pub struct FallbackOnError<P> {
    primary: P,
}

impl<P: RequirementExtractor> FallbackOnError<P> {
    pub fn new(primary: P) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl<P: RequirementExtractor> RequirementExtractor for FallbackOnError<P> {
    async fn extract(&self, transcript: &str) -> Result<BrdContent, LlmError> {
        match self.primary.extract(transcript).await {
            Ok(brd) => Ok(brd),
            Err(e) => {
                tracing::warn!(error = %e, "extraction failed, using fallback BRD");
                Ok(fallback_brd(transcript))
            }
        }
    }
}

/// Hand-authored BRD template with a keyword-picked title.
pub fn fallback_brd(transcript: &str) -> BrdContent {
    let words = transcript.to_lowercase();
    let title = if words.contains("customer") {
        "Customer Management System"
    } else if words.contains("portal") {
        "User Portal Enhancement"
    } else if words.contains("reporting") {
        "Reporting Dashboard System"
    } else {
        "Business System Enhancement"
    };

    BrdContent {
        title: title.to_string(),
        subtitle: "Business Requirements Document".to_string(),
        project_overview: format!(
            "This project involves the development and implementation of a {} to address \
key business needs identified in stakeholder meetings. The system will streamline \
operations, improve data management, and enhance user experience across the organization.",
            title.to_lowercase()
        ),
        business_objectives: vec![
            "Improve operational efficiency and reduce manual processes".into(),
            "Enhance data accuracy and accessibility for stakeholders".into(),
            "Implement scalable solutions that support business growth".into(),
            "Ensure system security and compliance with industry standards".into(),
        ],
        scope: Scope {
            in_scope: vec![
                "Core system development and implementation".into(),
                "User authentication and access control".into(),
                "Data management and reporting capabilities".into(),
                "Integration with existing systems".into(),
            ],
            out_of_scope: vec![
                "Third-party integrations not explicitly mentioned".into(),
                "Mobile application development".into(),
                "Training and documentation (separate project)".into(),
                "Legacy system migration".into(),
            ],
        },
        functional_requirements: vec![
            FunctionalRequirement {
                id: "FR-001".into(),
                title: "User Authentication".into(),
                description: "System must provide secure user login and authentication mechanisms"
                    .into(),
                priority: Priority::High,
            },
            FunctionalRequirement {
                id: "FR-002".into(),
                title: "Data Management".into(),
                description:
                    "Users must be able to create, read, update, and delete relevant data records"
                        .into(),
                priority: Priority::High,
            },
            FunctionalRequirement {
                id: "FR-003".into(),
                title: "Reporting Capabilities".into(),
                description:
                    "System shall provide reporting and analytics dashboards for business insights"
                        .into(),
                priority: Priority::Medium,
            },
            FunctionalRequirement {
                id: "FR-004".into(),
                title: "System Integration".into(),
                description:
                    "Platform must integrate with existing business systems and workflows".into(),
                priority: Priority::Medium,
            },
        ],
        non_functional_requirements: vec![
            NonFunctionalRequirement {
                id: "NFR-001".into(),
                title: "Performance".into(),
                description: "System response time must be under 3 seconds for standard operations"
                    .into(),
                category: "Performance".into(),
            },
            NonFunctionalRequirement {
                id: "NFR-002".into(),
                title: "Security".into(),
                description:
                    "All data must be encrypted in transit and at rest with industry-standard protocols"
                        .into(),
                category: "Security".into(),
            },
            NonFunctionalRequirement {
                id: "NFR-003".into(),
                title: "Scalability".into(),
                description:
                    "System architecture must support future growth and increased user load".into(),
                category: "Scalability".into(),
            },
            NonFunctionalRequirement {
                id: "NFR-004".into(),
                title: "Availability".into(),
                description: "System uptime must be 99.5% or higher during business hours".into(),
                category: "Reliability".into(),
            },
        ],
        stakeholders: vec![
            Stakeholder {
                name: "Product Management Team".into(),
                role: "Business Stakeholder".into(),
                responsibility: "Define business requirements and acceptance criteria".into(),
            },
            Stakeholder {
                name: "Engineering Team".into(),
                role: "Technical Implementation".into(),
                responsibility: "Design, develop, and deploy the system architecture".into(),
            },
            Stakeholder {
                name: "End Users".into(),
                role: "System Users".into(),
                responsibility: "Provide feedback and validate system functionality".into(),
            },
            Stakeholder {
                name: "Security Team".into(),
                role: "Security Oversight".into(),
                responsibility: "Ensure compliance with security policies and standards".into(),
            },
        ],
        constraints: vec![
            "Development must be completed within agreed timeline and budget".into(),
            "System must be compatible with existing technical infrastructure".into(),
            "All changes must comply with organizational security policies".into(),
            "Solution must be scalable to accommodate future growth".into(),
        ],
        assumptions: vec![
            "Stakeholders will be available for requirements validation and testing".into(),
            "Existing systems provide stable APIs for integration".into(),
            "Technical infrastructure can support new system requirements".into(),
            "Users will receive appropriate training on new system functionality".into(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockModel;

    fn sample_brd_json() -> String {
        serde_json::to_string(&fallback_brd("sample customer meeting")).unwrap()
    }

    #[test]
    fn fallback_has_exactly_four_functional_requirements() {
        let brd = fallback_brd("anything at all");
        let ids: Vec<&str> = brd
            .functional_requirements
            .iter()
            .map(|fr| fr.id.as_str())
            .collect();
        assert_eq!(ids, vec!["FR-001", "FR-002", "FR-003", "FR-004"]);
        assert_eq!(brd.non_functional_requirements.len(), 4);
        assert_eq!(brd.stakeholders.len(), 4);
    }

    #[test]
    fn fallback_title_from_keywords() {
        assert_eq!(
            fallback_brd("our CUSTOMER base is growing").title,
            "Customer Management System"
        );
        assert_eq!(
            fallback_brd("the portal needs work").title,
            "User Portal Enhancement"
        );
        assert_eq!(
            fallback_brd("reporting is slow").title,
            "Reporting Dashboard System"
        );
        assert_eq!(
            fallback_brd("something unrelated").title,
            "Business System Enhancement"
        );
    }

    #[test]
    fn keyword_precedence_customer_first() {
        // "customer" wins even when other keywords are present
        let brd = fallback_brd("customer portal reporting");
        assert_eq!(brd.title, "Customer Management System");
    }

    #[test]
    fn parse_accepts_valid_json() {
        let brd = parse_brd_json(&sample_brd_json()).unwrap();
        assert_eq!(brd.functional_requirements.len(), 4);
    }

    #[test]
    fn parse_strips_markdown_fences() {
        let fenced = format!("```json\n{}\n```", sample_brd_json());
        let brd = parse_brd_json(&fenced).unwrap();
        assert_eq!(brd.subtitle, "Business Requirements Document");
    }

    #[test]
    fn parse_rejects_empty_response() {
        assert!(matches!(parse_brd_json(""), Err(LlmError::EmptyResponse)));
        assert!(matches!(
            parse_brd_json("   \n"),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn parse_rejects_non_conforming_json() {
        let result = parse_brd_json(r#"{"title": "only a title"}"#);
        assert!(matches!(result, Err(LlmError::ResponseParsing(_))));
    }

    #[tokio::test]
    async fn model_extractor_parses_model_output() {
        let extractor = ModelExtractor::new(Arc::new(MockModel::replying(&sample_brd_json())));
        let brd = extractor.extract("transcript").await.unwrap();
        assert_eq!(brd.functional_requirements[0].id, "FR-001");
    }

    #[tokio::test]
    async fn wrapper_substitutes_fallback_on_model_error() {
        let extractor =
            FallbackOnError::new(ModelExtractor::new(Arc::new(MockModel::failing())));
        let brd = extractor.extract("our customer meeting").await.unwrap();
        assert_eq!(brd.title, "Customer Management System");
        assert_eq!(brd.functional_requirements.len(), 4);
    }

    #[tokio::test]
    async fn wrapper_substitutes_fallback_on_garbage_output() {
        let extractor = FallbackOnError::new(ModelExtractor::new(Arc::new(MockModel::replying(
            "I could not find any requirements, sorry!",
        ))));
        let brd = extractor.extract("reporting overhaul").await.unwrap();
        assert_eq!(brd.title, "Reporting Dashboard System");
    }

    #[tokio::test]
    async fn wrapper_passes_through_valid_primary_result() {
        let json = sample_brd_json();
        let extractor = FallbackOnError::new(ModelExtractor::new(Arc::new(MockModel::replying(
            &json,
        ))));
        // Transcript has no keywords; a fallback would pick the generic title.
        // Getting the customer title proves the primary result was used.
        let brd = extractor.extract("nothing relevant here").await.unwrap();
        assert_eq!(brd.title, "Customer Management System");
    }
}
