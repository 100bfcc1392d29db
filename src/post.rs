use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A post as served by the API. Every field is optional so a missing field
/// surfaces as a failed presence check, while a field of the wrong type is
/// rejected at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Id,
    UserId,
    Title,
    Body,
}

impl PostField {
    pub const ALL: [PostField; 4] = [
        PostField::UserId,
        PostField::Id,
        PostField::Title,
        PostField::Body,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PostField::Id => "id",
            PostField::UserId => "userId",
            PostField::Title => "title",
            PostField::Body => "body",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for PostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Post {
    /// The field as a JSON value, for comparing against request payloads.
    pub fn field(&self, field: PostField) -> Option<Value> {
        match field {
            PostField::Id => self.id.map(Value::from),
            PostField::UserId => self.user_id.map(Value::from),
            PostField::Title => self.title.clone().map(Value::from),
            PostField::Body => self.body.clone().map(Value::from),
        }
    }

    /// Looks a field up by its wire name.
    pub fn get(&self, name: &str) -> Option<Value> {
        PostField::from_name(name).and_then(|field| self.field(field))
    }

    pub fn missing_fields(&self, fields: &[PostField]) -> Vec<PostField> {
        fields
            .iter()
            .copied()
            .filter(|field| self.field(*field).is_none())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_camel_case_fields() {
        let post: Post = serde_json::from_value(json!({
            "userId": 1,
            "id": 7,
            "title": "a title",
            "body": "a body"
        }))
        .unwrap();

        assert_eq!(post.user_id, Some(1));
        assert_eq!(post.id, Some(7));
        assert!(post.missing_fields(&PostField::ALL).is_empty());
    }

    #[test]
    fn mistyped_field_is_a_decode_error() {
        let error = serde_json::from_value::<Post>(json!({ "id": "1", "title": "t" }))
            .unwrap_err()
            .to_string();

        assert!(error.contains("invalid type"), "{error}");

        let error = serde_json::from_value::<Post>(json!({ "id": 1, "title": 5 }))
            .unwrap_err()
            .to_string();

        assert!(error.contains("invalid type"), "{error}");
    }

    #[test]
    fn absent_fields_are_reported_missing() {
        let post: Post = serde_json::from_value(json!({ "title": "only" })).unwrap();

        assert_eq!(
            post.missing_fields(&PostField::ALL),
            vec![PostField::UserId, PostField::Id, PostField::Body]
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let post: Post = serde_json::from_value(json!({ "id": 1, "extra": true })).unwrap();

        assert_eq!(post.id, Some(1));
    }

    #[test]
    fn field_values_compare_with_payload_values() {
        let post = Post {
            id: Some(1),
            user_id: Some(1),
            title: Some("t".into()),
            body: None,
        };

        assert_eq!(post.field(PostField::UserId), Some(json!(1)));
        assert_eq!(post.field(PostField::Title), Some(json!("t")));
        assert_eq!(post.field(PostField::Body), None);
        assert_eq!(PostField::from_name("userId"), Some(PostField::UserId));
        assert_eq!(PostField::from_name("user_id"), None);
    }
}
