use serde::{Deserialize, Serialize};

use crate::validate::{FieldReader, RawInput, ValidationError};

/// Status of a cat that may be fed.
pub const STATUS_HUNGRY: &str = "hungry";
/// Status a cat is left in after feeding.
pub const STATUS_CONTENT: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    pub id: i64,
    pub name: String,
    pub age: Option<u32>,
    pub status: String,
    pub temperment: Option<String>,
    #[serde(rename = "photoUrls")]
    pub photo_urls: Vec<String>,
}

impl Cat {
    pub fn is_hungry(&self) -> bool {
        self.status == STATUS_HUNGRY
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCatInput {
    pub name: String,
    pub age: Option<u32>,
    pub status: String,
    pub temperment: Option<String>,
    pub photo_urls: Vec<String>,
}

impl CreateCatInput {
    pub fn from_input(input: &RawInput) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(input);

        let name = fields.required_string("name")?;
        let age = fields.nullable_uint("age")?.flatten();
        let status = fields.required_string("status")?;
        let temperment = fields.nullable_string("temperment")?.flatten();
        let photo_urls = fields.string_list_or_default("photoUrls")?;
        fields.finish()?;

        Ok(Self {
            name,
            age,
            status,
            temperment,
            photo_urls,
        })
    }
}

/// Field-wise patch applied by an update.
///
/// `None` leaves a column untouched; for nullable columns `Some(None)` clears
/// it. `photo_urls` is always written and falls back to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCatInput {
    pub name: Option<String>,
    pub age: Option<Option<u32>>,
    pub status: Option<String>,
    pub temperment: Option<Option<String>>,
    pub photo_urls: Vec<String>,
}

impl UpdateCatInput {
    pub fn from_input(input: &RawInput) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(input);

        let name = fields.string("name")?;
        let age = fields.nullable_uint("age")?;
        let status = fields.string("status")?;
        let temperment = fields.nullable_string("temperment")?;
        let photo_urls = fields.string_list_or_default("photoUrls")?;
        fields.finish()?;

        Ok(Self {
            name,
            age,
            status,
            temperment,
            photo_urls,
        })
    }
}

/// Optional equality filters for listing cats. Values are lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatFilter {
    pub status: Option<String>,
    pub name: Option<String>,
}

impl CatFilter {
    pub fn from_input(input: &RawInput) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(input);

        let status = fields.string("status")?.map(|s| s.to_lowercase());
        let name = fields.string("name")?.map(|s| s.to_lowercase());
        fields.finish()?;

        Ok(Self { status, name })
    }
}
