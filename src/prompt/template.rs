use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use super::PromptError;

pub type PromptArgs = HashMap<String, Value>;

/// Build [`PromptArgs`] from `key => value` pairs.
///
/// ```rust,ignore
/// let args = prompt_args! { "input" => "Book me a flight to Lisbon" };
/// ```
#[macro_export]
macro_rules! prompt_args {
    ( $($key:expr => $value:expr),* $(,)? ) => {
        {
            #[allow(unused_mut)]
            let mut args = $crate::prompt::PromptArgs::new();
            $(
                args.insert($key.to_string(), serde_json::json!($value));
            )*
            args
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A string template with `{name}` placeholders.
///
/// `{{` and `}}` render as literal braces. A lone `{` or `}` outside a
/// placeholder is rejected when the template is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new<S: Into<String>>(template: S) -> Result<Self, PromptError> {
        let template = template.into();
        let segments = parse_segments(&template)?;
        Ok(Self { template, segments })
    }

    /// The `{input}` template: renders the input unchanged.
    pub fn input_only() -> Self {
        Self {
            template: "{input}".to_string(),
            segments: vec![Segment::Variable("input".to_string())],
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Names of the placeholders, in order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let Segment::Variable(name) = segment {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            }
        }
        variables
    }

    pub fn format(&self, args: &PromptArgs) -> Result<String, PromptError> {
        let mut rendered = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Variable(name) => {
                    let value = args
                        .get(name)
                        .ok_or_else(|| PromptError::MissingVariable(name.clone()))?;
                    match value {
                        Value::String(s) => rendered.push_str(s),
                        other => rendered.push_str(&other.to_string()),
                    }
                }
            }
        }
        Ok(rendered)
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, PromptError> {
    let re = Regex::new(r"\{\{|\}\}|\{([^{}]*)\}")?;
    let name_re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?;

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut last = 0;

    for caps in re.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut literal, template, last, whole.start())?;
        match whole.as_str() {
            "{{" => literal.push('{'),
            "}}" => literal.push('}'),
            _ => {
                let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                if !name_re.is_match(name) {
                    return Err(PromptError::InvalidPlaceholder(name.to_string()));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
        }
        last = whole.end();
    }
    push_literal(&mut literal, template, last, template.len())?;
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

fn push_literal(
    literal: &mut String,
    template: &str,
    start: usize,
    end: usize,
) -> Result<(), PromptError> {
    let text = &template[start..end];
    if let Some(offset) = text.find('{') {
        return Err(PromptError::UnclosedPlaceholder(start + offset));
    }
    if let Some(offset) = text.find('}') {
        return Err(PromptError::UnopenedPlaceholder(start + offset));
    }
    literal.push_str(text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt_args;

    #[test]
    fn test_format_single_variable() {
        let template = PromptTemplate::new("Customer: {input}").unwrap();
        let rendered = template
            .format(&prompt_args! { "input" => "Find me a hotel in Rome" })
            .unwrap();
        assert_eq!(rendered, "Customer: Find me a hotel in Rome");
    }

    #[test]
    fn test_variables_in_order_without_duplicates() {
        let template = PromptTemplate::new("{city} to {destination}, then back to {city}").unwrap();
        assert_eq!(template.variables(), vec!["city", "destination"]);
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::new("{{\"answer\": \"{input}\"}}").unwrap();
        let rendered = template.format(&prompt_args! { "input" => "yes" }).unwrap();
        assert_eq!(rendered, "{\"answer\": \"yes\"}");
    }

    #[test]
    fn test_missing_variable() {
        let template = PromptTemplate::new("{input}").unwrap();
        let err = template.format(&PromptArgs::new()).unwrap_err();
        assert!(matches!(err, PromptError::MissingVariable(name) if name == "input"));
    }

    #[test]
    fn test_unclosed_placeholder() {
        let err = PromptTemplate::new("Hello {input").unwrap_err();
        assert!(matches!(err, PromptError::UnclosedPlaceholder(6)));
    }

    #[test]
    fn test_lone_closing_brace() {
        let err = PromptTemplate::new("Hello input}").unwrap_err();
        assert!(matches!(err, PromptError::UnopenedPlaceholder(11)));

        let err = PromptTemplate::new("{input}}").unwrap_err();
        assert!(matches!(err, PromptError::UnopenedPlaceholder(7)));
    }

    #[test]
    fn test_invalid_placeholder_name() {
        let err = PromptTemplate::new("Hello {two words}").unwrap_err();
        assert!(matches!(err, PromptError::InvalidPlaceholder(_)));
    }

    #[test]
    fn test_non_string_values() {
        let template = PromptTemplate::new("{nights} nights").unwrap();
        let rendered = template.format(&prompt_args! { "nights" => 3 }).unwrap();
        assert_eq!(rendered, "3 nights");
    }
}
