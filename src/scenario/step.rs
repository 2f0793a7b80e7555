//! Step definitions
//!
//! A step is pure data: what to request, which context fields it needs,
//! which checks to run against the response, and which tokens to extract
//! for the steps after it. The engine never special-cases a step - journey
//! variants differ only in their step lists.

use crate::scenario::context::ContextField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// The header profiles the storefront distinguishes between.
///
/// `Page` is a document navigation. `Ajax` and `Transition` both carry the
/// `x-csrf-header` and `x-requested-with: XMLHttpRequest` markers the
/// server's anti-CSRF and AJAX-detection logic requires; `Ajax` adds the
/// hash-navigation marker, `Transition` disables response caching for the
/// checkout widget posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    Page,
    Ajax,
    Transition,
}

/// Where a request body field's value comes from.
#[derive(Debug, Clone)]
pub enum FieldSource {
    Literal(String),
    Context(ContextField),
}

#[derive(Debug, Clone)]
pub struct BodyField {
    pub name: String,
    pub source: FieldSource,
}

impl BodyField {
    pub fn literal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::Literal(value.to_string()),
        }
    }

    pub fn context(name: &str, field: ContextField) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::Context(field),
        }
    }
}

/// Request body encodings the storefront accepts.
#[derive(Debug, Clone, Default)]
pub enum BodySpec {
    #[default]
    None,
    /// application/x-www-form-urlencoded
    Form(Vec<BodyField>),
    /// multipart/form-data; the boundary is freshly generated per submission
    Multipart(Vec<BodyField>),
}

/// A described, pure response predicate. Failures are recorded as data;
/// they never decide whether the journey continues.
#[derive(Debug, Clone)]
pub struct Check {
    pub description: String,
    pub predicate: Predicate,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    StatusIs(u16),
    BodyContains(String),
    TitleContains(String),
}

/// Declarative extraction: response value -> context field.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub field: ContextField,
    pub source: ExtractSource,
}

#[derive(Debug, Clone)]
pub enum ExtractSource {
    /// `value` attribute of `<input name='...'>`
    HiddenInput(String),
    /// JSON pointer into a JSON response body
    JsonPointer(String),
}

/// One request of a journey, defined once at startup.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    /// Metric series name and log label
    pub name: String,
    pub method: Method,
    /// Absolute URL; `{field}` placeholders are substituted from context
    pub url: String,
    /// Context fields that must be non-empty before this step may run
    pub requires: Vec<ContextField>,
    pub header_mode: HeaderMode,
    /// Step-specific headers, applied after the profile (may override it)
    pub extra_headers: Vec<(String, String)>,
    pub body: BodySpec,
    pub checks: Vec<Check>,
    pub extractions: Vec<Extraction>,
    /// Whether think-time pacing follows this step
    pub think_after: bool,
    /// Whether the step's latency series is held to the run thresholds
    pub thresholded: bool,
}

impl StepDefinition {
    pub fn get(name: &str, url: String) -> Self {
        Self::new(name, Method::Get, url)
    }

    pub fn post(name: &str, url: String) -> Self {
        Self::new(name, Method::Post, url)
    }

    fn new(name: &str, method: Method, url: String) -> Self {
        Self {
            name: name.to_string(),
            method,
            url,
            requires: Vec::new(),
            header_mode: HeaderMode::Page,
            extra_headers: Vec::new(),
            body: BodySpec::None,
            checks: Vec::new(),
            extractions: Vec::new(),
            think_after: false,
            thresholded: true,
        }
    }

    pub fn mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    pub fn requires(mut self, fields: &[ContextField]) -> Self {
        self.requires.extend_from_slice(fields);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn form(mut self, fields: Vec<BodyField>) -> Self {
        self.body = BodySpec::Form(fields);
        self
    }

    pub fn multipart(mut self, fields: Vec<BodyField>) -> Self {
        self.body = BodySpec::Multipart(fields);
        self
    }

    pub fn check_status(mut self, code: u16) -> Self {
        self.checks.push(Check {
            description: format!("status code is {}", code),
            predicate: Predicate::StatusIs(code),
        });
        self
    }

    pub fn check_body(mut self, description: &str, needle: &str) -> Self {
        self.checks.push(Check {
            description: description.to_string(),
            predicate: Predicate::BodyContains(needle.to_string()),
        });
        self
    }

    pub fn check_title(mut self, description: &str, needle: &str) -> Self {
        self.checks.push(Check {
            description: description.to_string(),
            predicate: Predicate::TitleContains(needle.to_string()),
        });
        self
    }

    pub fn extract_input(mut self, field: ContextField, input_name: &str) -> Self {
        self.extractions.push(Extraction {
            field,
            source: ExtractSource::HiddenInput(input_name.to_string()),
        });
        self
    }

    pub fn extract_json(mut self, field: ContextField, pointer: &str) -> Self {
        self.extractions.push(Extraction {
            field,
            source: ExtractSource::JsonPointer(pointer.to_string()),
        });
        self
    }

    pub fn think(mut self) -> Self {
        self.think_after = true;
        self
    }

    pub fn unthresholded(mut self) -> Self {
        self.thresholded = false;
        self
    }

    /// Whether the step references a context field anywhere: URL, body,
    /// or precondition list.
    pub fn references(&self, field: ContextField) -> bool {
        if self.requires.contains(&field) {
            return true;
        }
        if self.url.contains(&format!("{{{}}}", field.key())) {
            return true;
        }
        let fields = match &self.body {
            BodySpec::None => return false,
            BodySpec::Form(fields) | BodySpec::Multipart(fields) => fields,
        };
        fields
            .iter()
            .any(|f| matches!(f.source, FieldSource::Context(c) if c == field))
    }
}
