use serde::{Deserialize, Serialize};

/// One catalog entry. Describes where a feed lives, not what it contains.
///
/// Field names on the wire and in the persisted list are the capitalised
/// ones (`ID`, `URL`, ...). All six are always written; a missing value is
/// the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "ImageURL", default)]
    pub image_url: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

/// Body of `POST /api/feeds`. A client-supplied `ID` is accepted but never
/// used.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFeedRequest {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "ImageURL", default)]
    pub image_url: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

/// Response for `POST /api/feeds`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedFeedResponse {
    #[serde(rename = "ID")]
    pub id: String,
}

impl From<CreateFeedRequest> for Feed {
    fn from(request: CreateFeedRequest) -> Self {
        Self {
            id: request.id.unwrap_or_default(),
            title: request.title,
            description: request.description,
            url: request.url,
            image_url: request.image_url,
            category: request.category,
        }
    }
}
