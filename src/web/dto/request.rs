//! Request DTOs for Web API.

use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validation::{description_text, folder_name};
use crate::file::{FileType, FolderUpdate, NewFolder, MAX_DESCRIPTION_LENGTH};
use crate::hierarchy::HierarchyParams;
use crate::web::error::{ApiError, ErrorCode};

/// Create folder request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderRequest {
    /// Folder name, unique among its siblings.
    #[validate(
        length(min = 1, max = 255, message = "Folder name must be 1-255 characters"),
        custom(function = "folder_name")
    )]
    pub name: String,
    /// Description (optional).
    #[serde(default)]
    #[validate(
        length(max = 1000, message = "Description must be at most 1000 characters"),
        custom(function = "description_text")
    )]
    pub description: Option<String>,
    /// Parent folder, omitted for a root folder.
    #[serde(default)]
    #[validate(range(min = 1, message = "Parent folder ID must be a positive integer"))]
    pub parent_id: Option<i64>,
}

impl CreateFolderRequest {
    /// Convert into the domain insert.
    pub fn into_new_folder(self) -> NewFolder {
        let mut folder = NewFolder::new(self.name.trim());
        if let Some(description) = self.description {
            folder = folder.with_description(description.trim());
        }
        if let Some(parent_id) = self.parent_id {
            folder = folder.with_parent(parent_id);
        }
        folder
    }
}

/// Update folder request. Absent fields are left unchanged.
///
/// `description: null` clears the description and `parent_id: null` moves
/// the folder to the root level.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFolderRequest {
    /// New name.
    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "Folder name must be 1-255 characters"),
        custom(function = "folder_name")
    )]
    pub name: Option<String>,
    /// New description.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// New parent folder.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<i64>>,
}

impl UpdateFolderRequest {
    /// Validate the nullable fields the derive cannot reach and convert into
    /// the domain update.
    pub fn into_update(self) -> Result<FolderUpdate, ApiError> {
        let mut update = FolderUpdate::new();
        if let Some(name) = self.name {
            update = update.name(name.trim());
        }

        if let Some(description) = self.description {
            if let Some(ref text) = description {
                if text.chars().count() > MAX_DESCRIPTION_LENGTH {
                    return Err(field_error(
                        "description",
                        "Description must be at most 1000 characters",
                    ));
                }
                if let Err(e) = description_text(text) {
                    return Err(field_error("description", &message_of(&e)));
                }
            }
            update = update.description(description.map(|d| d.trim().to_string()));
        }

        if let Some(parent_id) = self.parent_id {
            if matches!(parent_id, Some(id) if id < 1) {
                return Err(field_error(
                    "parent_id",
                    "Parent folder ID must be a positive integer",
                ));
            }
            update = update.parent_id(parent_id);
        }

        if update.is_empty() {
            return Err(ApiError::new(
                ErrorCode::ValidationError,
                "At least one field must be provided",
            ));
        }
        Ok(update)
    }
}

/// Distinguish an explicit `null` from an absent field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn field_error(field: &str, message: &str) -> ApiError {
    let mut details = std::collections::HashMap::new();
    details.insert(field.to_string(), vec![message.to_string()]);
    ApiError::validation(details)
}

fn message_of(error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Hierarchy listing query parameters.
///
/// `page` and `limit` are taken as text so malformed numbers are reported
/// as pagination errors.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HierarchyQueryParams {
    /// Page number, starting at 1.
    pub page: Option<String>,
    /// Roots per page, 1-100.
    pub limit: Option<String>,
    /// Case-insensitive substring of the root name.
    pub name: Option<String>,
    /// Case-insensitive substring of the root description.
    pub description: Option<String>,
    /// Only roots updated on or after this day (YYYY-MM-DD).
    pub date: Option<String>,
    /// name, created_at or updated_at.
    pub sort_by: Option<String>,
    /// asc or desc.
    pub sort_order: Option<String>,
}

impl HierarchyQueryParams {
    /// Convert into raw hierarchy parameters.
    pub fn into_params(self) -> Result<HierarchyParams, ApiError> {
        Ok(HierarchyParams {
            page: parse_number("page", self.page)?,
            limit: parse_number("limit", self.limit)?,
            name: self.name,
            description: self.description,
            date: self.date,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        })
    }
}

fn parse_number(field: &str, value: Option<String>) -> Result<Option<i64>, ApiError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(|_| {
            ApiError::new(
                ErrorCode::InvalidPagination,
                format!("{} must be a positive integer", field),
            )
        }),
    }
}

/// Multipart fields accepted by the upload endpoint.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// File payload.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Destination folder, root level when omitted.
    pub folder_id: Option<i64>,
    /// Description (optional).
    pub description: Option<String>,
    /// Declared type, derived from the file name when omitted.
    pub file_type: Option<FileType>,
}

/// Upload query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Client-chosen id for polling progress.
    pub upload_id: Option<Uuid>,
}
