//! `{{variable}}` substitution for request prompts.

use std::collections::HashMap;
use std::fmt;

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while rendering a template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A required variable was not supplied.
    #[error("missing required variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// The template text has an opening `{{` with no matching `}}`.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the dangling `{{`.
        offset: usize,
    },
}

/// Prompt text with named placeholders.
///
/// Unknown optional placeholders render as empty strings; required ones fail.
///
/// ```
/// use std::collections::HashMap;
/// use spckit_prompts::PromptTemplate;
///
/// let template = PromptTemplate::new("사용자 요청: \"{{request}}\"").require("request");
/// let vars = HashMap::from([("request", "게이밍 PC".to_owned())]);
/// assert_eq!(template.render(&vars).unwrap(), "사용자 요청: \"게이밍 PC\"");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
    required: Vec<String>,
}

impl PromptTemplate {
    /// Creates a template from raw text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            required: Vec::new(),
        }
    }

    /// Marks a placeholder as required at render time.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Renders the template with the supplied values.
    ///
    /// Values are inserted verbatim; a value containing `{{x}}` is not expanded again.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] when a required variable is absent
    /// and [`TemplateError::Unterminated`] for a dangling `{{`.
    pub fn render(&self, vars: &HashMap<&str, String>) -> TemplateResult<String> {
        if let Some(name) = self
            .required
            .iter()
            .find(|name| !vars.contains_key(name.as_str()))
        {
            return Err(TemplateError::MissingVariable { name: name.clone() });
        }

        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        let mut consumed = 0;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                return Err(TemplateError::Unterminated {
                    offset: consumed + start,
                });
            };
            let name = after_open[..end].trim();
            if let Some(value) = vars.get(name) {
                out.push_str(value);
            }
            let advance = start + 2 + end + 2;
            consumed += advance;
            rest = &rest[advance..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Lists the placeholder names in order of appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find("{{") {
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                break;
            };
            names.push(after_open[..end].trim());
            rest = &after_open[end + 2..];
        }
        names
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, (*v).to_owned())).collect()
    }

    #[test]
    fn substitutes_placeholders() {
        let template = PromptTemplate::new("{{greeting}}, {{ name }}!");
        let rendered = template
            .render(&vars(&[("greeting", "안녕하세요"), ("name", "Spckit")]))
            .unwrap();
        assert_eq!(rendered, "안녕하세요, Spckit!");
    }

    #[test]
    fn optional_placeholders_render_empty() {
        let template = PromptTemplate::new("A{{missing}}B");
        assert_eq!(template.render(&HashMap::new()).unwrap(), "AB");
    }

    #[test]
    fn required_placeholders_must_be_supplied() {
        let template = PromptTemplate::new("{{request}}").require("request");
        let err = template.render(&HashMap::new()).expect_err("missing");
        assert_eq!(
            err,
            TemplateError::MissingVariable {
                name: "request".to_owned()
            }
        );
    }

    #[test]
    fn values_are_not_re_expanded() {
        let template = PromptTemplate::new("{{a}}");
        let rendered = template.render(&vars(&[("a", "{{b}}"), ("b", "x")])).unwrap();
        assert_eq!(rendered, "{{b}}");
    }

    #[test]
    fn dangling_open_brace_is_reported() {
        let template = PromptTemplate::new("ok {{broken");
        assert_eq!(
            template.render(&HashMap::new()),
            Err(TemplateError::Unterminated { offset: 3 })
        );
    }

    #[test]
    fn lists_placeholders() {
        let template = PromptTemplate::new("{{request}} / {{category}}");
        assert_eq!(template.placeholders(), vec!["request", "category"]);
    }
}
