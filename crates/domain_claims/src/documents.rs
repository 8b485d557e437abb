//! Supporting documents attached to a claim (constat, photos, invoices)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ClaimDocumentId;

use crate::error::ClaimError;

/// Metadata for a document being uploaded
///
/// Only metadata is kept; the file itself lives in external storage at `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub document_type: String,
    pub file_name: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: u64,
    pub description: Option<String>,
}

impl NewDocument {
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.document_type.trim().is_empty() {
            return Err(ClaimError::validation("document type is required"));
        }
        if self.file_name.trim().is_empty() {
            return Err(ClaimError::validation("file name is required"));
        }
        Ok(())
    }
}

/// A stored claim document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDocument {
    pub id: ClaimDocumentId,
    pub document_type: String,
    pub file_name: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: u64,
    pub uploaded_date: DateTime<Utc>,
    pub uploaded_by: Option<String>,
    pub description: Option<String>,
}

impl ClaimDocument {
    pub fn from_upload(upload: NewDocument, uploaded_by: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            id: ClaimDocumentId::new_v7(),
            document_type: upload.document_type,
            file_name: upload.file_name,
            file_path: upload.file_path,
            content_type: upload.content_type,
            file_size: upload.file_size,
            uploaded_date: now,
            uploaded_by: uploaded_by.map(str::to_string),
            description: upload.description,
        }
    }
}
