use serde::Deserialize;
use validator::Validate;

use crate::domain::dto::common::validate_object_id;
use crate::utils::string_utils::deserialize_trimmed_string;

/// Body of `PATCH /api/favorites`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFavoriteRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// Book id
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    #[validate(custom(function = "validate_object_id"))]
    pub id: String,
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_favorite_request() {
        let request: UpdateFavoriteRequest = serde_json::from_value(json!({
            "userId": "uid-1",
            "id": "64b7f0c2a1b2c3d4e5f60718",
            "isFavorite": true
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.is_favorite);

        let invalid: UpdateFavoriteRequest =
            serde_json::from_value(json!({ "userId": "uid-1", "id": "nope", "isFavorite": false })).unwrap();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_missing_flag_is_rejected() {
        let result = serde_json::from_value::<UpdateFavoriteRequest>(json!({ "userId": "u", "id": "x" }));
        assert!(result.is_err());
    }
}
