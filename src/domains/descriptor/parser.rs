//! Curl-style request descriptor parser.
//!
//! The parser understands a small subset of curl's flags. Input is split with
//! POSIX shell-word rules, then scanned left to right with a cursor. Tokens
//! outside the subset are skipped unless strict mode is enabled.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use super::error::DescriptorError;
use super::model::{Attachment, Body, DEFAULT_METHOD, FormValue, Headers, RequestDescriptor};
use crate::core::config::{Config, SecurityConfig};
use crate::core::security::validate_attachment_path;

const COMMAND_MARKER: &str = "curl";

/// Transport framing flags with no effect on the descriptor.
const IGNORED_FLAGS: &[&str] = &["--location", "--include", "--compressed", "--silent"];

const METHOD_FLAGS: &[&str] = &["-X", "--request"];
const URL_FLAGS: &[&str] = &["--url"];
const HEADER_FLAGS: &[&str] = &["-H", "--header"];
const DATA_FLAGS: &[&str] = &["--data", "-d", "--data-raw", "--data-binary"];
const FORM_FLAGS: &[&str] = &["--form", "-F"];

const URL_SCHEME_PREFIX: &str = "http";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Options controlling how descriptors are parsed.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Reject unrecognized tokens instead of skipping them.
    pub strict: bool,

    /// Where `@path` attachments may be read from.
    pub security: SecurityConfig,
}

/// Parser turning descriptor strings into [`RequestDescriptor`]s.
#[derive(Debug, Clone, Default)]
pub struct DescriptorParser {
    options: ParseOptions,
}

impl DescriptorParser {
    /// Create a parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Create a parser from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ParseOptions {
            strict: config.descriptor.strict,
            security: config.security.clone(),
        })
    }

    /// Parse a descriptor string.
    ///
    /// Fails only when the input cannot be tokenized, a flag is missing its
    /// value, a header has no `:` separator, or an attachment cannot be
    /// opened. A missing URL is not an error; it yields an empty `url`.
    #[instrument(skip_all)]
    pub fn parse(&self, input: &str) -> Result<RequestDescriptor, DescriptorError> {
        let tokens = shlex::split(input)
            .ok_or_else(|| DescriptorError::malformed("unbalanced quotes or trailing escape"))?;

        let mut method = DEFAULT_METHOD.to_string();
        let mut url = String::new();
        let mut headers = Headers::new();
        let mut body: Option<Body> = None;

        let mut cursor = 0;
        while cursor < tokens.len() {
            let token = tokens[cursor].as_str();

            // Empty tokens come from line continuations or `''` in flag-free positions.
            if token.is_empty() || token == COMMAND_MARKER || IGNORED_FLAGS.contains(&token) {
                cursor += 1;
            } else if METHOD_FLAGS.contains(&token) {
                method = value_after(&tokens, cursor)?.to_uppercase();
                cursor += 2;
            } else if token.starts_with(URL_SCHEME_PREFIX) {
                url = token.to_string();
                cursor += 1;
            } else if URL_FLAGS.contains(&token) {
                url = value_after(&tokens, cursor)?.to_string();
                cursor += 2;
            } else if HEADER_FLAGS.contains(&token) {
                let (key, value) = split_header(value_after(&tokens, cursor)?)?;
                headers.insert(key, value);
                cursor += 2;
            } else if DATA_FLAGS.contains(&token) {
                body = Some(Body::Text(value_after(&tokens, cursor)?.to_string()));
                cursor += 2;
            } else if FORM_FLAGS.contains(&token) {
                let field = value_after(&tokens, cursor)?;
                self.apply_form_field(&mut body, field)?;
                cursor += 2;
            } else if self.options.strict {
                return Err(DescriptorError::malformed(format!(
                    "unrecognized token '{token}'"
                )));
            } else {
                debug!("Skipping unrecognized token: {}", token);
                cursor += 1;
            }
        }

        let body = normalize_json_body(&headers, body);

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body,
        })
    }

    /// Add one `name=value` form field, turning the body into a form if needed.
    fn apply_form_field(&self, body: &mut Option<Body>, field: &str) -> Result<(), DescriptorError> {
        if !matches!(body, Some(Body::Form(_))) {
            *body = Some(Body::Form(IndexMap::new()));
        }

        let Some((key, value)) = field.split_once('=') else {
            debug!("Ignoring form field without '=': {}", field);
            return Ok(());
        };

        let value = match value.strip_prefix('@') {
            Some(path) => FormValue::File(self.open_attachment(path)?),
            None => FormValue::Text(value.to_string()),
        };

        if let Some(Body::Form(fields)) = body.as_mut() {
            fields.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn open_attachment(&self, path: &str) -> Result<Attachment, DescriptorError> {
        let resolved = validate_attachment_path(path, &self.options.security)
            .map_err(|e| DescriptorError::attachment(path, e))?;
        Attachment::open(resolved).map_err(|e| DescriptorError::attachment(path, e))
    }
}

/// Parse a descriptor with the default lenient options.
pub fn parse_descriptor(input: &str) -> Result<RequestDescriptor, DescriptorError> {
    DescriptorParser::default().parse(input)
}

fn value_after(tokens: &[String], cursor: usize) -> Result<&str, DescriptorError> {
    tokens
        .get(cursor + 1)
        .map(String::as_str)
        .ok_or_else(|| DescriptorError::missing_value(&tokens[cursor]))
}

/// Split a header on its first colon, trimming both sides.
fn split_header(header: &str) -> Result<(String, String), DescriptorError> {
    let (key, value) = header
        .split_once(':')
        .ok_or_else(|| DescriptorError::malformed(format!("header without ':' '{header}'")))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Decode a text body when the descriptor declares a JSON content type.
///
/// Undecodable text is kept as-is; empty text becomes no body.
fn normalize_json_body(headers: &Headers, body: Option<Body>) -> Option<Body> {
    let declares_json = headers
        .get("Content-Type")
        .is_some_and(|ct| ct.starts_with(JSON_CONTENT_TYPE));
    if !declares_json {
        return body;
    }

    match body {
        Some(Body::Text(text)) if text.is_empty() => None,
        Some(Body::Text(text)) => match serde_json::from_str(&text) {
            Ok(value) => Some(Body::Json(value)),
            Err(e) => {
                debug!("Keeping JSON-typed body as text: {}", e);
                Some(Body::Text(text))
            }
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn parse(input: &str) -> RequestDescriptor {
        parse_descriptor(input).expect("descriptor parses")
    }

    #[test]
    fn test_location_and_explicit_get() {
        let d = parse("curl --location --request GET 'https://x.test/posts/1'");
        assert_eq!(d.method, "GET");
        assert_eq!(d.url, "https://x.test/posts/1");
        assert!(d.headers.is_empty());
        assert_eq!(d.body, None);
    }

    #[test]
    fn test_json_body_is_decoded() {
        let d = parse(r#"curl 'https://x.test' -H 'Content-Type: application/json' -d '{"foo": "bar"}'"#);
        assert_eq!(d.method, "GET");
        assert_eq!(d.url, "https://x.test");
        assert_eq!(d.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(d.body, Some(Body::Json(json!({"foo": "bar"}))));
    }

    #[test]
    fn test_bare_url_defaults_to_get() {
        let d = parse("curl 'https://api.example.com/search?q=chatgpt&limit=10'");
        assert_eq!(d.method, "GET");
        assert_eq!(d.url, "https://api.example.com/search?q=chatgpt&limit=10");
        assert_eq!(d.body, None);
    }

    #[test]
    fn test_multiline_plain_text_body() {
        let d = parse(
            "curl --location --request POST 'https://api.example.com/raw' \\\n  --header 'Content-Type: text/plain' \\\n  --data 'Just a plain text body.'\n",
        );
        assert_eq!(d.method, "POST");
        assert_eq!(d.url, "https://api.example.com/raw");
        assert_eq!(d.headers.get("Content-Type").unwrap(), "text/plain");
        assert_eq!(d.body, Some(Body::Text("Just a plain text body.".to_string())));
    }

    #[test]
    fn test_method_is_uppercased_verbatim() {
        assert_eq!(parse("curl -X post https://x.test").method, "POST");
        assert_eq!(parse("curl -X purge https://x.test").method, "PURGE");
    }

    #[test]
    fn test_url_flag() {
        let d = parse("curl --url https://x.test/a -X DELETE");
        assert_eq!(d.url, "https://x.test/a");
        assert_eq!(d.method, "DELETE");
    }

    #[test]
    fn test_missing_url_is_empty_not_error() {
        let d = parse("curl -X POST -d hello");
        assert_eq!(d.url, "");
        assert!(!d.has_url());
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let d = parse("curl https://x.test -H 'X-Key: one' -H 'Other: o' --header 'X-Key: three'");
        assert_eq!(d.headers.len(), 2);
        assert_eq!(d.headers.get("X-Key").unwrap(), "three");
    }

    #[test]
    fn test_header_splits_on_first_colon_only() {
        let d = parse("curl https://x.test -H 'X-When:  12:30:45 '");
        assert_eq!(d.headers.get("X-When").unwrap(), "12:30:45");
    }

    #[test]
    fn test_header_keys_are_case_sensitive() {
        let d = parse("curl https://x.test -H 'x-a: 1' -H 'X-A: 2'");
        assert_eq!(d.headers.len(), 2);
    }

    #[test]
    fn test_quoted_argument_with_spaces_is_one_token() {
        let d = parse(r#"curl https://x.test --data-raw "a b: c d""#);
        assert_eq!(d.body, Some(Body::Text("a b: c d".to_string())));
    }

    #[test]
    fn test_data_synonyms() {
        for flag in ["-d", "--data", "--data-raw", "--data-binary"] {
            let d = parse(&format!("curl https://x.test {flag} payload"));
            assert_eq!(d.body, Some(Body::Text("payload".to_string())), "{flag}");
        }
    }

    #[test]
    fn test_no_body_flag_means_no_body_for_any_method() {
        let d = parse("curl -X POST https://x.test -H 'Content-Type: application/json'");
        assert_eq!(d.body, None);
    }

    #[test]
    fn test_invalid_json_body_stays_text() {
        let d = parse("curl https://x.test -H 'Content-Type: application/json' -d '{broken'");
        assert_eq!(d.body, Some(Body::Text("{broken".to_string())));
    }

    #[test]
    fn test_empty_json_body_becomes_absent() {
        let d = parse("curl https://x.test -H 'Content-Type: application/json; charset=utf-8' -d ''");
        assert_eq!(d.body, None);
    }

    #[test]
    fn test_lowercase_content_type_key_is_not_decoded() {
        let d = parse(r#"curl https://x.test -H 'content-type: application/json' -d '{"a":1}'"#);
        assert_eq!(d.body, Some(Body::Text(r#"{"a":1}"#.to_string())));
    }

    #[test]
    fn test_unknown_tokens_are_skipped() {
        let d = parse("curl -k --max-time https://x.test -v");
        assert_eq!(d.url, "https://x.test");
        assert_eq!(d.method, "GET");
    }

    #[test]
    fn test_strict_mode_rejects_unknown_tokens() {
        let parser = DescriptorParser::new(ParseOptions {
            strict: true,
            ..Default::default()
        });
        let err = parser.parse("curl -k https://x.test").unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
        assert!(parser.parse("curl --silent https://x.test").is_ok());
    }

    #[test]
    fn test_header_without_colon_is_malformed() {
        let err = parse_descriptor("curl https://x.test -H 'NoSeparator'").unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }

    #[test]
    fn test_flag_without_value_is_malformed() {
        let err = parse_descriptor("curl https://x.test -X").unwrap_err();
        assert!(err.to_string().contains("-X"));
    }

    #[test]
    fn test_unbalanced_quotes_are_malformed() {
        let err = parse_descriptor("curl 'https://x.test").unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed(_)));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let input = r#"curl -X PUT https://x.test -H 'A: 1' -H 'Content-Type: application/json' -d '{"k":[1,2]}'"#;
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn test_form_fields() {
        let d = parse("curl https://x.test -F name=alice --form 'note=a=b' -F ignored");
        let Some(Body::Form(fields)) = d.body else {
            panic!("expected form body");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], FormValue::Text("alice".to_string()));
        assert_eq!(fields["note"], FormValue::Text("a=b".to_string()));
    }

    #[test]
    fn test_form_replaces_text_body_and_data_replaces_form() {
        let d = parse("curl https://x.test -d raw -F a=1");
        assert!(matches!(d.body, Some(Body::Form(_))));

        let d = parse("curl https://x.test -F a=1 -d raw");
        assert_eq!(d.body, Some(Body::Text("raw".to_string())));
    }

    #[test]
    fn test_form_file_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        fs::write(&file, "contents").unwrap();

        let input = format!("curl -X POST https://x.test -F 'upload=@{}'", file.display());
        let first = parse(&input);
        let second = parse(&input);
        assert_eq!(first, second);

        let Some(Body::Form(fields)) = &first.body else {
            panic!("expected form body");
        };
        let FormValue::File(attachment) = &fields["upload"] else {
            panic!("expected attachment");
        };
        assert_eq!(attachment.name(), "filename");
        assert_eq!(attachment.read_contents().unwrap(), b"contents");
    }

    #[test]
    fn test_missing_attachment_fails() {
        let err = parse_descriptor("curl https://x.test -F 'f=@/definitely/not/here.bin'").unwrap_err();
        assert!(matches!(err, DescriptorError::Attachment { .. }));
    }

    #[test]
    fn test_attachment_outside_root_rejected() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let file = outside.path().join("secret.txt");
        fs::write(&file, "x").unwrap();

        let parser = DescriptorParser::new(ParseOptions {
            strict: false,
            security: SecurityConfig {
                root_path: Some(root.path().to_path_buf()),
                allow_symlinks: true,
            },
        });
        let err = parser
            .parse(&format!("curl https://x.test -F 'f=@{}'", file.display()))
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Attachment { .. }));
    }
}
