//! Quotation Service - estimation, documents, templates and scripted edits
//!
//! Estimation workflow:
//! 1. Validate the before/after images
//! 2. Load item masters as price references
//! 3. Ask the model for line items (JSON)
//! 4. Return the string-based `QuotationResult` untouched; totals are only
//!    recomputed when the result goes through an edit session

use std::path::Path;

use chrono::Utc;
use mitsumori_domain::repository::{
    ImageRepository, ItemMasterRepository, QuotationDocumentRepository,
    QuotationTemplateRepository,
};
use mitsumori_domain::service::{EditSession, EditorError, QuotationPanel};
use mitsumori_infra::ItemMasterLoader;
use mitsumori_types::{
    Error, ItemMaster, QuotationDocument, QuotationResult, QuotationTemplate, RenovationScope,
};
use mitsumori_vision::{estimate_quotation, InferenceBackend, InferenceConfig, InlineData};
use thiserror::Error;

use crate::scanner::validate_image;

/// Errors specific to the quotation service
#[derive(Debug, Error)]
pub enum QuotationServiceError {
    #[error("Image validation failed: {0}")]
    InvalidImage(String),

    #[error("Estimation failed: {0}")]
    EstimationFailed(String),

    #[error("Quotation not found: {0}")]
    DocumentNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Edit failed: {0}")]
    Edit(#[from] EditorError),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<Error> for QuotationServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::FileNotFound(msg) | Error::InvalidImageFormat(msg) => {
                QuotationServiceError::InvalidImage(msg)
            }
            Error::Image(e) => QuotationServiceError::InvalidImage(e.to_string()),
            Error::Inference(e) => QuotationServiceError::EstimationFailed(e.to_string()),
            Error::MasterImport(msg) => QuotationServiceError::ImportFailed(msg),
            Error::Config(e) => QuotationServiceError::ConfigError(e.to_string()),
            _ => QuotationServiceError::StoreError(err.to_string()),
        }
    }
}

type ServiceResult<T> = std::result::Result<T, QuotationServiceError>;

/// One step of a scripted edit. Amounts are in man-yen (万円).
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    SetName { index: usize, name: String },
    SetCost { index: usize, min_man: f64, max_man: f64 },
    Add { name: String, min_man: f64, max_man: f64 },
    Remove { index: usize },
}

impl EditOp {
    fn apply(&self, session: &mut EditSession) -> Result<(), EditorError> {
        match self {
            EditOp::SetName { index, name } => session.set_name(*index, name.as_str()),
            EditOp::SetCost {
                index,
                min_man,
                max_man,
            } => {
                session.set_cost_min(*index, *min_man)?;
                session.set_cost_max(*index, *max_man)
            }
            EditOp::Add {
                name,
                min_man,
                max_man,
            } => {
                let index = session.add_item();
                session.set_name(index, name.as_str())?;
                session.set_cost_min(index, *min_man)?;
                session.set_cost_max(index, *max_man)
            }
            EditOp::Remove { index } => session.remove_item(*index).map(|_| ()),
        }
    }
}

/// Run `ops` in one edit session over `result` and commit it.
///
/// Nothing is committed if any step fails.
pub fn apply_edits(result: QuotationResult, ops: &[EditOp]) -> ServiceResult<QuotationResult> {
    let mut panel = QuotationPanel::with_result(result);
    let session = panel.start_edit()?;
    for op in ops {
        op.apply(session)?;
    }
    Ok(panel.save_edit()?.clone())
}

/// Blob path of a quotation photo (`before` / `after`)
fn document_image_path(document_id: &str, label: &str, extension: &str) -> String {
    format!("quotations/{}/{}.{}", document_id, label, extension.to_lowercase())
}

pub struct QuotationService<'a> {
    documents: &'a dyn QuotationDocumentRepository,
    templates: &'a dyn QuotationTemplateRepository,
    item_masters: &'a dyn ItemMasterRepository,
    images: &'a dyn ImageRepository,
}

impl<'a> QuotationService<'a> {
    pub fn new(
        documents: &'a dyn QuotationDocumentRepository,
        templates: &'a dyn QuotationTemplateRepository,
        item_masters: &'a dyn ItemMasterRepository,
        images: &'a dyn ImageRepository,
    ) -> Self {
        Self {
            documents,
            templates,
            item_masters,
            images,
        }
    }

    /// Estimate line items from a before photo and its "after" image
    pub fn estimate(
        &self,
        backend: &dyn InferenceBackend,
        config: &InferenceConfig,
        before: &Path,
        after: &Path,
        scope: RenovationScope,
    ) -> ServiceResult<QuotationResult> {
        validate_image(before)?;
        validate_image(after)?;

        let before_data = InlineData::from_file(before)?;
        let after_data = InlineData::from_file(after)?;
        let masters = self.item_masters.find_all()?;

        let result = estimate_quotation(backend, config, &before_data, &after_data, scope, &masters)?;
        tracing::info!(items = result.items.len(), total = %result.total_cost_range, "quotation estimated");
        Ok(result)
    }

    /// Create and store a new document, copying the photos into the blob store
    pub fn create_document(
        &self,
        title: &str,
        customer_name: &str,
        result: QuotationResult,
        before_image: Option<&Path>,
        after_image: Option<&Path>,
    ) -> ServiceResult<QuotationDocument> {
        let mut document = QuotationDocument::new(title, customer_name, result);
        document.before_image = self.store_photo(&document.id, "before", before_image)?;
        document.after_image = self.store_photo(&document.id, "after", after_image)?;
        self.documents.save(&document)?;
        tracing::info!(id = %document.id, title = %document.title, "quotation saved");
        Ok(document)
    }

    fn store_photo(
        &self,
        document_id: &str,
        label: &str,
        path: Option<&Path>,
    ) -> ServiceResult<Option<String>> {
        let Some(path) = path else {
            return Ok(None);
        };
        validate_image(path)?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("jpg");
        let blob_path = document_image_path(document_id, label, extension);
        let bytes = std::fs::read(path).map_err(Error::from)?;
        self.images.upload(&blob_path, &bytes)?;
        Ok(Some(blob_path))
    }

    /// Store an updated document
    pub fn save_document(&self, mut document: QuotationDocument) -> ServiceResult<QuotationDocument> {
        document.updated_at = Utc::now();
        self.documents.save(&document)?;
        Ok(document)
    }

    /// All documents, newest first
    pub fn list_documents(&self) -> ServiceResult<Vec<QuotationDocument>> {
        Ok(self.documents.find_all()?)
    }

    pub fn get_document(&self, id: &str) -> ServiceResult<QuotationDocument> {
        self.documents
            .find_by_id(id)?
            .ok_or_else(|| QuotationServiceError::DocumentNotFound(id.to_string()))
    }

    /// Delete a document and its photos
    pub fn delete_document(&self, id: &str) -> ServiceResult<()> {
        let document = self.get_document(id)?;
        for path in [&document.before_image, &document.after_image].into_iter().flatten() {
            self.images.delete(path)?;
        }
        self.documents.delete(id)?;
        tracing::info!(id = %id, "quotation deleted");
        Ok(())
    }

    /// Apply a scripted edit to a stored document and save it
    pub fn edit_document(
        &self,
        id: &str,
        ops: &[EditOp],
        notes: Option<&str>,
    ) -> ServiceResult<QuotationDocument> {
        let mut document = self.get_document(id)?;
        document.result = apply_edits(document.result, ops)?;
        if let Some(notes) = notes {
            document.result.notes = notes.to_string();
        }
        self.save_document(document)
    }

    /// Build a quotation from a template; the total is computed from its items
    pub fn apply_template(&self, template_id: &str) -> ServiceResult<QuotationResult> {
        let template = self
            .templates
            .find_by_id(template_id)?
            .ok_or_else(|| QuotationServiceError::TemplateNotFound(template_id.to_string()))?;
        let seed = QuotationResult {
            items: template.items,
            total_cost_range: String::new(),
            notes: template.notes.clone(),
        };
        Ok(EditSession::from_result(&seed).to_result(&template.notes))
    }

    /// Save the items and notes of a result as a reusable template
    pub fn save_template(&self, name: &str, result: &QuotationResult) -> ServiceResult<QuotationTemplate> {
        let mut template = QuotationTemplate::new(name, result.items.clone());
        template.notes = result.notes.clone();
        self.templates.save(&template)?;
        Ok(template)
    }

    pub fn list_templates(&self) -> ServiceResult<Vec<QuotationTemplate>> {
        Ok(self.templates.find_all()?)
    }

    /// Import item masters from TOML; entries with an existing name replace it.
    ///
    /// Returns (imported, replaced).
    pub fn import_item_masters(&self, path: &Path) -> ServiceResult<(usize, usize)> {
        let items = ItemMasterLoader::load_from_file(path)?.into_items();
        let mut replaced = 0;
        for mut item in items.iter().cloned() {
            if let Some(existing) = self.item_masters.find_by_name(&item.name)? {
                item.id = existing.id;
                replaced += 1;
            }
            self.item_masters.save(&item)?;
        }
        tracing::info!(count = items.len(), replaced, "item masters imported");
        Ok((items.len(), replaced))
    }

    pub fn list_item_masters(&self) -> ServiceResult<Vec<ItemMaster>> {
        Ok(self.item_masters.find_all()?)
    }
}
