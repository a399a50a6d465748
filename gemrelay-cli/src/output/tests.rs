//! CLI output formatting tests.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::{KeyOutput, TextFormatter};

    fn key(id: &str) -> KeyOutput {
        KeyOutput {
            id: id.to_string(),
            key: "********1234".to_string(),
        }
    }

    #[test]
    fn test_keys_without_colors() {
        let formatter = TextFormatter::new(false);
        let out = formatter.format_keys(&[key("key-0"), key("key-1")]);

        assert!(out.starts_with("API Keys (2 configured)\n"));
        let first = out.lines().find(|l| l.starts_with("key-0")).unwrap();
        assert!(first.ends_with("********1234"));
        assert!(!out.contains("usable"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_keys_with_colors() {
        let formatter = TextFormatter::new(true);
        let out = formatter.format_keys(&[key("key-0")]);

        assert!(out.starts_with("\x1b[1mAPI Keys\x1b[0m (1 configured)"));
        assert!(out.contains("\x1b[2m********1234\x1b[0m"));
    }

    #[test]
    fn test_no_keys() {
        let formatter = TextFormatter::new(false);
        let out = formatter.format_keys(&[]);

        assert!(out.contains("No keys configured"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::{AnswerOutput, JsonFormatter, KeyOutput};
    use gemrelay_core::Credential;

    #[test]
    fn test_format_text_answer() {
        let formatter = JsonFormatter::new(false);
        let out = formatter
            .format_answer("Say hi", &AnswerOutput::Text("hola".to_string()))
            .unwrap();

        assert_eq!(out, r#"{"prompt":"Say hi","answer":"hola"}"#);
    }

    #[test]
    fn test_format_json_answer() {
        let formatter = JsonFormatter::new(false);
        let answer = AnswerOutput::Json(serde_json::json!({"name": "Aldric"}));
        let out = formatter.format_answer("Describe", &answer).unwrap();

        assert_eq!(out, r#"{"prompt":"Describe","answer":{"name":"Aldric"}}"#);
    }

    #[test]
    fn test_key_output_masks_key() {
        let credential = Credential::new("key-3", "AIzaSySecretValue0042");

        let output = KeyOutput::from(&credential);
        let json = JsonFormatter::new(false).format(&output).unwrap();

        assert!(!json.contains("SecretValue"));
        assert_eq!(json, r#"{"id":"key-3","key":"*****************0042"}"#);
    }

    #[test]
    fn test_pretty_output() {
        let formatter = JsonFormatter::new(true);
        let out = formatter.format(&serde_json::json!({"a": 1})).unwrap();

        assert!(out.contains('\n'));
    }
}
