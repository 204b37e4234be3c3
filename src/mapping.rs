//! # Mapping Orchestrator Module
//!
//! Composes the normalizer, classifier, pack cascade, arbiter, and quantity
//! resolver into one request/response cycle, and drives the per-line mapping
//! state machine through to the terminal `mapped`/`ignored` states.
//!
//! External collaborators (catalog search, historical pack lookup, web
//! search, GL accounts, catalog writes) are trait objects supplied by the
//! caller. Lookups fan out concurrently; a failed or slow collaborator
//! degrades to an absent candidate and never blocks the others.

use crate::arbiter;
use crate::classifier;
use crate::config::MapperConfig;
use crate::errors::error_logging;
use crate::normalizer;
use crate::pack_patterns;
use crate::quantity;
use crate::recipe_uom;
use crate::types::{
    Category, ClassificationResult, Confidence, MappingAction, NewItemSpec, PackConfigCandidate,
    QuantityInterpretation, QuantityUnit,
};
use crate::units::Uom;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// An item already in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
}

/// Search-by-text item catalog
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<CatalogItem>>;
}

/// Historical pack-config lookup
///
/// Implementations return at most one candidate per invocation, already
/// reduced to the majority pack config among prior catalog entries of the
/// matched brand, with `sample_count` set and confidence `high` once the
/// sample count reaches the configured threshold.
#[async_trait]
pub trait PackHistory: Send + Sync {
    async fn learned_candidate(
        &self,
        description: &str,
        vendor_name: Option<&str>,
    ) -> anyhow::Result<Option<PackConfigCandidate>>;
}

/// External web search for pack configurations
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn pack_candidate(
        &self,
        description: &str,
    ) -> anyhow::Result<Option<PackConfigCandidate>>;
}

/// GL-account catalog, suggesting an account per category
#[async_trait]
pub trait GlAccountCatalog: Send + Sync {
    async fn suggest_account(&self, category: Category) -> anyhow::Result<Option<i64>>;
}

/// Catalog write operations: item creation and line mapping
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn create_item(&self, spec: &NewItemSpec) -> anyhow::Result<i64>;
    async fn map_line(
        &self,
        line_id: i64,
        item_id: i64,
        quantity: f64,
        unit: QuantityUnit,
    ) -> anyhow::Result<()>;
}

/// One invoice line handed to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
    pub description: String,
    pub vendor_name: Option<String>,
    pub invoiced_qty: f64,
    pub unit_cost: f64,
}

/// The complete normalization result for one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineClassification {
    pub name: String,
    pub sku: Option<String>,
    pub uom: Uom,
    pub category: Category,
    pub subcategory: Option<String>,
    pub gl_account_id_suggestion: Option<i64>,
    pub pack_config_candidate: Option<PackConfigCandidate>,
    pub quantity_interpretations: Vec<QuantityInterpretation>,
}

impl LineClassification {
    /// Persistable snapshot of the classification fields
    ///
    /// The user may override any field of the snapshot before it is stored;
    /// the pipeline itself never mutates a produced result.
    pub fn to_result(&self) -> ClassificationResult {
        ClassificationResult {
            name: self.name.clone(),
            sku: self.sku.clone(),
            uom: self.uom,
            category: self.category,
            subcategory: self.subcategory.clone(),
            gl_account_id: self.gl_account_id_suggestion,
        }
    }
}

/// What a confirmed mapping points at
#[derive(Debug, Clone, PartialEq)]
pub enum MapTarget {
    Existing(i64),
    New(NewItemSpec),
}

/// Per-line mapping state; `Mapped` and `Ignored` are terminal
#[derive(Debug, Clone, PartialEq)]
pub enum LineState {
    Unmapped,
    CandidateSelected { item_id: i64 },
    Mapped { action: MappingAction },
    Ignored,
}

impl LineState {
    fn name(&self) -> &'static str {
        match self {
            LineState::Unmapped => "unmapped",
            LineState::CandidateSelected { .. } => "candidate-selected",
            LineState::Mapped { .. } => "mapped",
            LineState::Ignored => "ignored",
        }
    }
}

/// Errors from the mapping state machine and the finalize write path
#[derive(Debug)]
pub enum MapError {
    /// Field-level validation failure, rejected before any external write
    Validation(String),
    /// An event that is not legal in the line's current state
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
    /// The item was created but the line-mapping write failed afterwards;
    /// an item now exists in the catalog, unmapped
    CreatedButUnmapped { item_id: i64, cause: String },
    /// A write failed before anything was persisted
    Write(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            MapError::InvalidTransition { from, event } => {
                write!(f, "[TRANSITION] '{}' is not valid in state '{}'", event, from)
            }
            MapError::CreatedButUnmapped { item_id, cause } => write!(
                f,
                "[PARTIAL] item {} was created but the line mapping failed: {}",
                item_id, cause
            ),
            MapError::Write(msg) => write!(f, "[WRITE] {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

/// The mapping orchestrator
///
/// Collaborators are optional; an absent collaborator behaves exactly like a
/// failed one, yielding an absent candidate for its source. Construct with
/// [`MappingOrchestrator::new`] and attach collaborators via the `with_*`
/// builder methods.
pub struct MappingOrchestrator {
    config: MapperConfig,
    catalog_search: Option<Arc<dyn CatalogSearch>>,
    pack_history: Option<Arc<dyn PackHistory>>,
    web_search: Option<Arc<dyn WebSearch>>,
    gl_accounts: Option<Arc<dyn GlAccountCatalog>>,
    catalog_writer: Option<Arc<dyn CatalogWriter>>,
}

impl MappingOrchestrator {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            catalog_search: None,
            pack_history: None,
            web_search: None,
            gl_accounts: None,
            catalog_writer: None,
        }
    }

    pub fn with_catalog_search(mut self, collaborator: Arc<dyn CatalogSearch>) -> Self {
        self.catalog_search = Some(collaborator);
        self
    }

    pub fn with_pack_history(mut self, collaborator: Arc<dyn PackHistory>) -> Self {
        self.pack_history = Some(collaborator);
        self
    }

    pub fn with_web_search(mut self, collaborator: Arc<dyn WebSearch>) -> Self {
        self.web_search = Some(collaborator);
        self
    }

    pub fn with_gl_accounts(mut self, collaborator: Arc<dyn GlAccountCatalog>) -> Self {
        self.gl_accounts = Some(collaborator);
        self
    }

    pub fn with_catalog_writer(mut self, collaborator: Arc<dyn CatalogWriter>) -> Self {
        self.catalog_writer = Some(collaborator);
        self
    }

    /// Run the full normalization pipeline for one invoice line
    ///
    /// The pure stages (normalizer, classifier, recipe-UOM, pack cascade)
    /// run first; the learned, web-search, and GL lookups then fan out
    /// concurrently, each behind the configured timeout. The arbiter merges
    /// the three pack-config sources into at most one candidate with
    /// recorded provenance.
    pub async fn classify_line(&self, request: &LineRequest) -> LineClassification {
        let description = request.description.as_str();
        let vendor = request.vendor_name.as_deref();

        let name = normalizer::truncate_name(
            &normalizer::normalize_item_name(description),
            self.config.max_name_length,
        );
        let classification = classifier::classify(description, vendor);
        let uom = recipe_uom::resolve_recipe_uom(description);
        let parsed = pack_patterns::extract_pack_config(description);

        let timeout = Duration::from_secs(self.config.collaborator_timeout_secs);
        let (learned, web, gl_suggestion) = tokio::join!(
            fetch_candidate("learned", timeout, async {
                match &self.pack_history {
                    Some(history) => history.learned_candidate(description, vendor).await,
                    None => Ok(None),
                }
            }),
            fetch_candidate("web_search", timeout, async {
                match &self.web_search {
                    Some(search) => search.pack_candidate(description).await,
                    None => Ok(None),
                }
            }),
            fetch_candidate("gl_accounts", timeout, async {
                match &self.gl_accounts {
                    Some(accounts) => {
                        accounts.suggest_account(classification.category).await
                    }
                    None => Ok(None),
                }
            }),
        );

        let learned = learned.map(|candidate| {
            apply_learned_confidence(candidate, self.config.high_confidence_sample_count)
        });
        let pack_config_candidate = arbiter::arbitrate(parsed, learned, web);
        let pack_size = pack_config_candidate
            .as_ref()
            .map(|candidate| candidate.config.units_per_pack);
        let quantity_interpretations =
            quantity::quantity_interpretations(request.invoiced_qty, pack_size);

        info!(
            name = %name,
            category = ?classification.category,
            uom = %uom,
            pack_source = ?pack_config_candidate.as_ref().map(|c| c.source),
            "Classified invoice line"
        );

        LineClassification {
            name,
            sku: None,
            uom,
            category: classification.category,
            subcategory: classification.subcategory,
            gl_account_id_suggestion: gl_suggestion,
            pack_config_candidate,
            quantity_interpretations,
        }
    }

    /// Search the catalog for match candidates
    ///
    /// A search failure degrades to an empty candidate list.
    pub async fn search_catalog(&self, query: &str) -> Vec<CatalogItem> {
        let timeout = Duration::from_secs(self.config.collaborator_timeout_secs);
        fetch_candidate("catalog_search", timeout, async {
            match &self.catalog_search {
                Some(search) => search.search(query).await.map(Some),
                None => Ok(None),
            }
        })
        .await
        .unwrap_or_default()
    }

    /// Select a catalog candidate for a line
    pub fn select_candidate(&self, state: &LineState, item_id: i64) -> Result<LineState, MapError> {
        match state {
            LineState::Unmapped | LineState::CandidateSelected { .. } => {
                Ok(LineState::CandidateSelected { item_id })
            }
            _ => Err(MapError::InvalidTransition {
                from: state.name(),
                event: "select-candidate",
            }),
        }
    }

    /// Mark a line ignored (qty-0 lines, header lines)
    pub fn ignore_line(&self, state: &LineState) -> Result<LineState, MapError> {
        match state {
            LineState::Unmapped | LineState::CandidateSelected { .. } => Ok(LineState::Ignored),
            _ => Err(MapError::InvalidTransition {
                from: state.name(),
                event: "ignore",
            }),
        }
    }

    /// Confirm a mapping: validate, write, and move the line to `mapped`
    ///
    /// Creating an item and mapping the line are two sequential external
    /// writes; when the create succeeds but the map fails, the partial
    /// failure is surfaced as [`MapError::CreatedButUnmapped`] rather than
    /// total failure. A re-map of an already-mapped line produces a new
    /// action that supersedes the old one; it never reverts state.
    pub async fn finalize_mapping(
        &self,
        line_id: i64,
        target: MapTarget,
        chosen: QuantityInterpretation,
    ) -> Result<MappingAction, MapError> {
        if chosen.quantity <= 0.0 {
            let err = MapError::Validation(format!(
                "chosen quantity must be positive, got {}",
                chosen.quantity
            ));
            error_logging::log_validation_error(&err, "finalize_mapping", "quantity", None);
            return Err(err);
        }

        let writer = self.catalog_writer.as_ref().ok_or_else(|| {
            MapError::Validation("no catalog writer configured".to_string())
        })?;

        let (item_id, item_created) = match target {
            MapTarget::Existing(item_id) => (item_id, false),
            MapTarget::New(spec) => {
                validate_new_item_spec(&spec)?;
                let item_id = writer
                    .create_item(&spec)
                    .await
                    .map_err(|e| MapError::Write(e.to_string()))?;
                info!(item_id = item_id, name = %spec.name, "Created catalog item");
                (item_id, true)
            }
        };

        if let Err(e) = writer
            .map_line(line_id, item_id, chosen.quantity, chosen.unit)
            .await
        {
            if item_created {
                warn!(
                    line_id = line_id,
                    item_id = item_id,
                    error = %e,
                    "Item created but line mapping failed"
                );
                return Err(MapError::CreatedButUnmapped {
                    item_id,
                    cause: e.to_string(),
                });
            }
            return Err(MapError::Write(e.to_string()));
        }

        let action = MappingAction {
            line_id,
            item_id,
            item_created,
            quantity: chosen.quantity,
            quantity_unit: chosen.unit,
            created_at: Utc::now(),
        };
        info!(
            line_id = line_id,
            item_id = item_id,
            quantity = action.quantity,
            "Mapped invoice line"
        );
        Ok(action)
    }
}

/// Validate a new-item spec before any external write
///
/// Creation requires a GL account id; absence is a validation failure, not a
/// silent default.
fn validate_new_item_spec(spec: &NewItemSpec) -> Result<(), MapError> {
    if spec.name.trim().is_empty() {
        return Err(MapError::Validation("item name cannot be empty".to_string()));
    }
    if spec.gl_account_id.is_none() {
        let err = MapError::Validation(
            "a GL account is required to create an item".to_string(),
        );
        error_logging::log_validation_error(&err, "create_item", "gl_account_id", None);
        return Err(err);
    }
    if let Some(pack_config) = &spec.pack_config {
        pack_config
            .validate()
            .map_err(|e| MapError::Validation(e.to_string()))?;
    }
    Ok(())
}

/// Fill in confidence for a learned candidate whose producer left it unset
///
/// A candidate whose `sample_count` meets the configured threshold is high
/// confidence; below the threshold it is low. A confidence already set by
/// the producer is kept as-is.
fn apply_learned_confidence(
    mut candidate: PackConfigCandidate,
    threshold: u32,
) -> PackConfigCandidate {
    if candidate.confidence.is_none() {
        if let Some(samples) = candidate.sample_count {
            let confidence = if samples >= threshold {
                Confidence::High
            } else {
                Confidence::Low
            };
            debug!(
                samples = samples,
                threshold = threshold,
                confidence = ?confidence,
                "Derived learned-candidate confidence from sample count"
            );
            candidate.confidence = Some(confidence);
        }
    }
    candidate
}

/// Run a collaborator call behind a timeout, degrading to `None` on any
/// error or timeout
///
/// A failed or slow collaborator yields "source absent"; it is never
/// propagated as a pipeline failure and never blocks the other sources.
async fn fetch_candidate<T, F>(source: &str, timeout: Duration, call: F) -> Option<T>
where
    F: Future<Output = anyhow::Result<Option<T>>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(candidate)) => candidate,
        Ok(Err(e)) => {
            error_logging::log_collaborator_error(&e, source, "lookup");
            None
        }
        Err(_) => {
            warn!(source = %source, timeout_secs = timeout.as_secs(), "Collaborator timed out");
            None
        }
    }
}

/// Build a best-effort classification with no collaborators at all
///
/// Used by the CLI and by callers that only need the pure pipeline stages.
/// Names are truncated to the default length limit, matching
/// [`MappingOrchestrator::classify_line`].
pub fn classify_offline(request: &LineRequest) -> LineClassification {
    let description = request.description.as_str();
    let classification = classifier::classify(description, request.vendor_name.as_deref());
    let parsed = pack_patterns::extract_pack_config(description);
    let pack_size = parsed.as_ref().map(|c| c.config.units_per_pack);

    debug!(description = %description, "Offline classification");

    LineClassification {
        name: normalizer::truncate_name(
            &normalizer::normalize_item_name(description),
            MapperConfig::default().max_name_length,
        ),
        sku: None,
        uom: recipe_uom::resolve_recipe_uom(description),
        category: classification.category,
        subcategory: classification.subcategory,
        gl_account_id_suggestion: None,
        pack_config_candidate: parsed,
        quantity_interpretations: quantity::quantity_interpretations(
            request.invoiced_qty,
            pack_size,
        ),
    }
}
