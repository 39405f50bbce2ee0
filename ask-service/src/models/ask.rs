use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Body of `POST /ask`.
///
/// Fields are kept as raw JSON so any truthy value is accepted and rendered
/// into the prompt as text. `null` and absent fields both fail `required`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[validate(required)]
    pub question: Option<Value>,

    #[validate(required)]
    pub page_content: Option<Value>,
}

impl AskRequest {
    /// Rendered `(question, page_content)`, or `None` if either is falsy.
    pub fn prompt_fields(&self) -> Option<(String, String)> {
        let question = self.question.as_ref().and_then(truthy_text)?;
        let page_content = self.page_content.as_ref().and_then(truthy_text)?;
        Some((question, page_content))
    }
}

/// Text form of a truthy JSON value; `None` for `null`, `false`, `0` and `""`.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(render(other)),
    }
}

/// Template-literal rendering: arrays join with `,`, objects are opaque.
fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw: &str) -> AskRequest {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn accepts_both_fields() {
        let req = request(r#"{"question":"What is X?","pageContent":"X is a thing."}"#);
        assert!(req.validate().is_ok());
        assert_eq!(
            req.prompt_fields(),
            Some(("What is X?".to_string(), "X is a thing.".to_string()))
        );
    }

    #[test]
    fn missing_field_fails_validation() {
        assert!(request(r#"{"question":"q"}"#).validate().is_err());
        assert!(request(r#"{"pageContent":"p"}"#).validate().is_err());
        assert!(request(r#"{}"#).validate().is_err());
        assert!(request(r#"{"question":null,"pageContent":"p"}"#).validate().is_err());
    }

    #[test]
    fn falsy_values_have_no_prompt_fields() {
        for raw in [
            r#"{"question":"","pageContent":"abc"}"#,
            r#"{"question":false,"pageContent":"p"}"#,
            r#"{"question":0,"pageContent":"p"}"#,
            r#"{"question":"q","pageContent":0.0}"#,
        ] {
            assert!(request(raw).prompt_fields().is_none(), "body: {raw}");
        }
    }

    #[test]
    fn truthy_non_strings_are_rendered_as_text() {
        let req = request(r#"{"question":42,"pageContent":true}"#);
        assert_eq!(
            req.prompt_fields(),
            Some(("42".to_string(), "true".to_string()))
        );

        let req = request(r#"{"question":["a",1,null],"pageContent":{"k":"v"}}"#);
        assert_eq!(
            req.prompt_fields(),
            Some(("a,1,".to_string(), "[object Object]".to_string()))
        );
    }

    #[test]
    fn whitespace_is_not_empty() {
        let req = request(r#"{"question":" ","pageContent":"p"}"#);
        assert_eq!(req.prompt_fields().map(|(q, _)| q), Some(" ".to_string()));
    }

    #[test]
    fn snake_case_field_name_is_not_accepted() {
        let req = request(r#"{"question":"q","page_content":"p"}"#);
        assert!(req.page_content.is_none());
    }
}
