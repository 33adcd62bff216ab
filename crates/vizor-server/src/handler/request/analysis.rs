//! Analysis request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request payload for the object detection stage.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetectObjects {
    /// Publicly reachable http(s) URL of the photo.
    #[validate(url, length(max = 2048))]
    pub image_url: String,
}

/// Request payload for the material detection stage.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetectMaterials {
    /// Identifier returned by the object detection stage.
    pub request_id: Uuid,
    /// Object names the caller confirmed, usually edited from the first stage.
    #[validate(length(max = 64))]
    pub confirmed_objects: Vec<String>,
}

impl DetectMaterials {
    /// Returns the confirmed names trimmed, with blank entries removed.
    pub fn object_names(&self) -> Vec<String> {
        self.confirmed_objects
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_must_be_a_url() {
        let request = DetectObjects {
            image_url: "not a url".to_owned(),
        };
        assert!(request.validate().is_err());

        let request = DetectObjects {
            image_url: "https://example.com/photo.jpg".to_owned(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn image_url_length_is_bounded() {
        let request = DetectObjects {
            image_url: format!("https://example.com/{}.jpg", "a".repeat(2048)),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn confirmed_objects_are_bounded() {
        let request = DetectMaterials {
            request_id: Uuid::new_v4(),
            confirmed_objects: Vec::new(),
        };
        assert!(request.validate().is_ok());

        let request = DetectMaterials {
            request_id: Uuid::new_v4(),
            confirmed_objects: vec!["стол".to_owned(); 65],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn blank_names_are_dropped() {
        let request = DetectMaterials {
            request_id: Uuid::new_v4(),
            confirmed_objects: vec![" стол ".to_owned(), "   ".to_owned(), "стул".to_owned()],
        };
        assert_eq!(request.object_names(), ["стол", "стул"]);
    }
}
