//! JSON bodies exchanged with the content server.
//!
//! Field names follow the server's snake_case API.

use serde::{Deserialize, Serialize};

use crate::models::{Page, PageType, Timestamp};

/// Response of the page and default-page listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PagesResponse {
    pub fn ok(pages: Vec<Page>) -> Self {
        Self {
            success: true,
            pages,
            message: None,
        }
    }
}

/// Request body of a page batch upload.
#[derive(Debug, Serialize)]
pub struct UpdatePagesRequest<'a> {
    pub pages: &'a [Page],
}

/// A page the server reports as stored, with its fresh timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedPage {
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub key: String,
    pub updated_at: Timestamp,
}

/// Response of a page batch upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePagesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "updatedpages")]
    pub updated_pages: Vec<UpdatedPage>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub debug: Option<serde_json::Value>,
}

/// One file of an SPA group on the wire.
///
/// `data` holds a component object for component files and a string for
/// raw files; `null` means the file has no content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupItem {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Response of an SPA group fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupResponse {
    #[serde(default)]
    pub items: Vec<GroupItem>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Request body of an SPA group upload.
#[derive(Debug, Serialize)]
pub struct SetGroupRequest<'a> {
    pub items: &'a [GroupItem],
}

/// Response of an SPA group upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetGroupResponse {
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Error body some endpoints return alongside a failure status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_response_missing_success_is_failure() {
        let response: PagesResponse = serde_json::from_str(r#"{"pages":[]}"#).unwrap();
        assert!(!response.success);
    }

    #[test]
    fn test_update_response_field_names() {
        let json = r#"{
            "success": true,
            "updatedpages": [{"type":"template","key":"home_page","updated_at":"2024-01-01T00:00:00Z"}],
            "debug": {"queries": 3}
        }"#;
        let response: UpdatePagesResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.updated_pages.len(), 1);
        assert_eq!(response.updated_pages[0].page_type, PageType::Template);
        assert_eq!(
            response.debug,
            Some(serde_json::json!({"queries": 3}))
        );
    }

    #[test]
    fn test_update_request_body() {
        let pages = vec![Page::new(PageType::Section, "hero", "H")];
        let body = serde_json::to_value(UpdatePagesRequest { pages: &pages }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"pages": [{"type": "section", "key": "hero", "content": "H"}]})
        );
    }

    #[test]
    fn test_group_item_without_type() {
        let item: GroupItem = serde_json::from_str(r#"{"name":"style.css","data":"a{}"}"#).unwrap();
        assert_eq!(item.kind, None);
        assert_eq!(item.data, serde_json::json!("a{}"));

        let empty: GroupItem = serde_json::from_str(r#"{"name":"App.js"}"#).unwrap();
        assert!(empty.data.is_null());
    }
}
