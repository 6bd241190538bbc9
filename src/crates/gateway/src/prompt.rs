//! Prompt templates with named slots.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.
//! Slot names are identifiers written without surrounding spaces.
//!
//! ```rust,ignore
//! let template = PromptTemplate::new("Write {count} questions about {topic}.")
//!     .with_system("You are an exam writer. Answer in JSON like {{\"q\": ...}}.");
//!
//! let mut vars = HashMap::new();
//! vars.insert("count".to_string(), "5".to_string());
//! vars.insert("topic".to_string(), "fractions".to_string());
//!
//! let messages = template.render(&vars)?;
//! ```

use crate::error::{GatewayError, Result};
use llm::{ChatRequest, Message};
use std::collections::{BTreeSet, HashMap};

/// Template variables, slot name to value.
pub type Variables = HashMap<String, String>;

/// A prompt made of an optional system instruction and a human message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: Option<String>,
    template: String,
}

impl PromptTemplate {
    /// Create a template whose rendered text becomes the human message.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            system: None,
            template: template.into(),
        }
    }

    /// Add a system instruction, rendered with the same variables.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Names of all slots referenced by the template and system instruction.
    pub fn variables(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for text in self.system.iter().chain(std::iter::once(&self.template)) {
            for segment in parse(text)? {
                if let Segment::Slot(name) = segment {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Render into chat messages.
    ///
    /// Every referenced slot must be present in `variables`; extra entries
    /// are ignored.
    pub fn render(&self, variables: &Variables) -> Result<Vec<Message>> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(Message::system(render_text(system, variables)?));
        }
        messages.push(Message::human(render_text(&self.template, variables)?));
        Ok(messages)
    }
}

/// One `generate` call's input: a template and the values for its slots.
#[derive(Debug, Clone, Copy)]
pub struct InvocationRequest<'a> {
    pub template: &'a PromptTemplate,
    pub variables: &'a Variables,
}

impl<'a> InvocationRequest<'a> {
    pub fn new(template: &'a PromptTemplate, variables: &'a Variables) -> Self {
        Self {
            template,
            variables,
        }
    }

    /// Render into a chat request at the given temperature.
    pub fn to_chat_request(&self, temperature: f32) -> Result<ChatRequest> {
        let messages = self.template.render(self.variables)?;
        Ok(ChatRequest::new(messages).with_temperature(temperature))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'t> {
    Literal(&'t str),
    Brace(char),
    Slot(&'t str),
}

fn parse(text: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' | '}' if chars.peek().map(|&(_, next)| next) == Some(c) => {
                chars.next();
                segments.push(Segment::Literal(&text[literal_start..i]));
                segments.push(Segment::Brace(c));
                literal_start = i + 2;
            }
            '{' => {
                segments.push(Segment::Literal(&text[literal_start..i]));
                let close = text[i + 1..].find('}').ok_or_else(|| {
                    GatewayError::Template(format!("Unclosed '{{' at byte {}", i))
                })?;
                let name = &text[i + 1..i + 1 + close];
                if !is_slot_name(name) {
                    return Err(GatewayError::Template(format!(
                        "Invalid slot name '{}' at byte {}",
                        name, i
                    )));
                }
                segments.push(Segment::Slot(name));
                literal_start = i + close + 2;
                while matches!(chars.peek(), Some(&(j, _)) if j < literal_start) {
                    chars.next();
                }
            }
            '}' => {
                return Err(GatewayError::Template(format!(
                    "Single '}}' at byte {}; use '}}}}' for a literal brace",
                    i
                )));
            }
            _ => {}
        }
    }

    segments.push(Segment::Literal(&text[literal_start..]));
    Ok(segments)
}

fn is_slot_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render_text(text: &str, variables: &Variables) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for segment in parse(text)? {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Brace(c) => out.push(c),
            Segment::Slot(name) => {
                let value = variables.get(name).ok_or_else(|| {
                    GatewayError::Template(format!("Missing variable '{}'", name))
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
