//! Single-step execution
//!
//! Builds one HTTP request from a step definition and the iteration
//! context, measures time-to-first-byte, evaluates the step's checks and
//! runs its extractions. The precondition gate lives here: a step whose
//! required context fields are empty never reaches the network.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::errors::{Result, StorepulseError};
use crate::extract;
use crate::scenario::{
    BodySpec, Check, ContextField, ExtractSource, FieldSource, HeaderMode, Method, Predicate,
    ScenarioContext, StepDefinition,
};

/// Document navigation accept list, as browsers send it.
const DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

/// Accept list the storefront's AJAX endpoints expect.
const AJAX_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

const ACCEPT_LANGUAGE_VALUE: &str = "en,en-US;q=0.9";

// Anti-CSRF and AJAX-detection markers the server checks; domain
// constants, not negotiable.
const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-header");
const REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const HASH_NAVIGATION: HeaderName = HeaderName::from_static("x-oro-hash-navigation");
const UPGRADE_INSECURE: HeaderName = HeaderName::from_static("upgrade-insecure-requests");

static URL_PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[a-z_]+\}").unwrap());

/// Result of one check predicate.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub description: String,
    pub passed: bool,
}

/// Everything one step execution produced.
#[derive(Debug)]
pub struct StepOutcome {
    pub name: String,
    /// `None` when no response was observed (connection failure, timeout)
    pub status: Option<u16>,
    /// Time to first byte when a response was observed
    pub latency: Duration,
    pub checks: Vec<CheckResult>,
    /// Conjunction of all checks; `false` on network failure
    pub checks_passed: bool,
    pub extracted: Vec<(ContextField, String)>,
    /// Extraction diagnostics; the affected fields stay empty
    pub extraction_errors: Vec<String>,
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn response_observed(&self) -> bool {
        self.status.is_some()
    }

    fn network_failure(name: &str, latency: Duration, err: reqwest::Error) -> Self {
        let error = if err.is_timeout() {
            "Timeout".to_string()
        } else if err.is_connect() {
            "Connection failed".to_string()
        } else {
            err.to_string()
        };
        Self {
            name: name.to_string(),
            status: None,
            latency,
            checks: Vec::new(),
            checks_passed: false,
            extracted: Vec::new(),
            extraction_errors: Vec::new(),
            error: Some(error),
        }
    }
}

/// Issues one step's request at a time on behalf of one simulated user.
pub struct StepExecutor {
    client: Client,
}

impl StepExecutor {
    /// Fresh client per iteration: every simulated user gets its own cookie
    /// jar, so server sessions never leak between iterations.
    pub fn for_iteration(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .gzip(true)
            .timeout(timeout)
            .redirect(Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    pub async fn execute(
        &self,
        step: &StepDefinition,
        ctx: &ScenarioContext,
    ) -> Result<StepOutcome> {
        // The primary defensive gate: a broken token chain must not send
        // garbage requests downstream.
        for field in &step.requires {
            if ctx.get(*field).is_none() {
                return Err(StorepulseError::StepPrecondition {
                    step: step.name.clone(),
                    field: *field,
                });
            }
        }

        let url = substitute_url(&step.url, &step.name, ctx)?;
        let mut request = match step.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        request = request.headers(build_headers(step, ctx));

        request = match &step.body {
            BodySpec::None => request,
            BodySpec::Form(fields) => request.form(&resolve_fields(fields, &step.name, ctx)?),
            BodySpec::Multipart(fields) => {
                // reqwest generates a fresh boundary per form
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in resolve_fields(fields, &step.name, ctx)? {
                    form = form.text(name, value);
                }
                request.multipart(form)
            }
        };

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                // A dead request is one data point, not a reason to retry.
                return Ok(StepOutcome::network_failure(&step.name, start.elapsed(), err));
            }
        };
        // send() resolves when response headers arrive: time to first byte.
        let latency = start.elapsed();
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(_) => String::new(),
        };

        let checks = run_checks(&step.checks, status, &body);
        let checks_passed = checks.iter().all(|c| c.passed);

        let mut extracted = Vec::new();
        let mut extraction_errors = Vec::new();
        for extraction in &step.extractions {
            let value = match &extraction.source {
                ExtractSource::HiddenInput(input_name) => extract::input_value(&body, input_name),
                ExtractSource::JsonPointer(pointer) => extract::json_pointer(&body, pointer),
            };
            match value {
                Ok(Some(value)) => extracted.push((extraction.field, value)),
                // Absent is not an error; the field simply stays empty.
                Ok(None) => {}
                Err(err) => extraction_errors.push(err.to_string()),
            }
        }

        Ok(StepOutcome {
            name: step.name.clone(),
            status: Some(status),
            latency,
            checks,
            checks_passed,
            extracted,
            extraction_errors,
            error: None,
        })
    }
}

/// Substitute `{field}` placeholders from the context. A placeholder whose
/// field is empty is a precondition violation, the same as a missing
/// required field.
fn substitute_url(template: &str, step_name: &str, ctx: &ScenarioContext) -> Result<String> {
    let mut url = String::with_capacity(template.len());
    let mut last = 0;
    for matched in URL_PLACEHOLDER_RE.find_iter(template) {
        let key = &template[matched.start() + 1..matched.end() - 1];
        let field = ContextField::from_key(key).ok_or_else(|| {
            StorepulseError::Argument(format!(
                "unknown URL placeholder `{{{key}}}` in step `{step_name}`"
            ))
        })?;
        let value = ctx.get(field).ok_or_else(|| StorepulseError::StepPrecondition {
            step: step_name.to_string(),
            field,
        })?;
        url.push_str(&template[last..matched.start()]);
        url.push_str(value);
        last = matched.end();
    }
    url.push_str(&template[last..]);
    Ok(url)
}

fn resolve_fields(
    fields: &[crate::scenario::BodyField],
    step_name: &str,
    ctx: &ScenarioContext,
) -> Result<Vec<(String, String)>> {
    fields
        .iter()
        .map(|field| {
            let value = match &field.source {
                FieldSource::Literal(value) => value.clone(),
                FieldSource::Context(context_field) => ctx
                    .get(*context_field)
                    .ok_or_else(|| StorepulseError::StepPrecondition {
                        step: step_name.to_string(),
                        field: *context_field,
                    })?
                    .to_string(),
            };
            Ok((field.name.clone(), value))
        })
        .collect()
}

fn build_headers(step: &StepDefinition, ctx: &ScenarioContext) -> HeaderMap {
    let mut headers = HeaderMap::new();

    match step.header_mode {
        HeaderMode::Page => {
            headers.insert(UPGRADE_INSECURE, HeaderValue::from_static("1"));
            headers.insert(ACCEPT, HeaderValue::from_static(DOCUMENT_ACCEPT));
        }
        HeaderMode::Ajax => {
            headers.insert(ACCEPT, HeaderValue::from_static(AJAX_ACCEPT));
            headers.insert(HASH_NAVIGATION, HeaderValue::from_static("true"));
            insert_ajax_markers(&mut headers, ctx);
        }
        HeaderMode::Transition => {
            headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
            insert_ajax_markers(&mut headers, ctx);
        }
    }
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );

    // Step headers go last so a step can override its profile.
    for (name, value) in &step.extra_headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    headers
}

fn insert_ajax_markers(headers: &mut HeaderMap, ctx: &ScenarioContext) {
    headers.insert(REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
    if let Some(token) = ctx.get(ContextField::CsrfToken) {
        if let Ok(value) = HeaderValue::from_str(token) {
            headers.insert(CSRF_HEADER, value);
        }
    }
}

fn run_checks(checks: &[Check], status: u16, body: &str) -> Vec<CheckResult> {
    // Page title is shared by every title predicate; compute it once.
    let title = if checks
        .iter()
        .any(|c| matches!(c.predicate, Predicate::TitleContains(_)))
    {
        extract::page_title(body)
    } else {
        None
    };

    checks
        .iter()
        .map(|check| {
            let passed = match &check.predicate {
                Predicate::StatusIs(expected) => status == *expected,
                Predicate::BodyContains(needle) => body.contains(needle),
                Predicate::TitleContains(needle) => {
                    title.as_deref().is_some_and(|t| t.contains(needle))
                }
            };
            CheckResult {
                description: check.description.clone(),
                passed,
            }
        })
        .collect()
}
