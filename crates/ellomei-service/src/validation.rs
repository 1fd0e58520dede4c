//! Validator registry.
//!
//! Rules are named pure predicates. The data-entry path lists the checks it
//! needs (`field`, `rule`, `value`) and runs them explicitly through
//! [`ValidatorRegistry::check`], which reports every failing field at once.
//!
//! Built-in rules check shape only: CPF/CNPJ check digits and email
//! deliverability are not verified.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use ellomei_core::account::digits_only;

/// Outcome of a single rule: `Err` carries the user-facing message.
pub type ValidationResult = std::result::Result<(), String>;

type Validator = Arc<dyn Fn(&str) -> ValidationResult + Send + Sync>;

/// Longest email address accepted.
const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex compiles")
});

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The field that failed.
    pub field: String,
    /// The rule that rejected it.
    pub rule: String,
    /// Why.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// A check to run: `rule` applied to `value`, reported under `field`.
#[derive(Debug, Clone, Copy)]
pub struct FieldCheck<'a> {
    /// Field name used in error reports.
    pub field: &'a str,
    /// Registered rule name.
    pub rule: &'a str,
    /// The raw input.
    pub value: &'a str,
}

impl<'a> FieldCheck<'a> {
    /// Create a check.
    #[must_use]
    pub const fn new(field: &'a str, rule: &'a str, value: &'a str) -> Self {
        Self { field, rule, value }
    }
}

/// Mapping from rule name to predicate.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    rules: HashMap<String, Validator>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in rules: `required`, `email`,
    /// `password`, `cpf` and `cnpj`.
    #[must_use]
    pub fn with_builtins(min_password_length: usize) -> Self {
        let mut registry = Self::new();
        registry.register("required", required);
        registry.register("email", email);
        registry.register("password", move |value| password(value, min_password_length));
        registry.register("cpf", |value| document(value, 11, "CPF"));
        registry.register("cnpj", |value| document(value, 14, "CNPJ"));
        registry
    }

    /// Register (or replace) a rule.
    pub fn register<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(&str) -> ValidationResult + Send + Sync + 'static,
    {
        self.rules.insert(name.into(), Arc::new(rule));
    }

    /// Whether a rule is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Apply one rule to a value.
    ///
    /// # Errors
    ///
    /// Returns the rule's message, or an "unknown rule" message if `rule` is not
    /// registered.
    pub fn validate(&self, rule: &str, value: &str) -> ValidationResult {
        match self.rules.get(rule) {
            Some(validator) => validator(value),
            None => Err(format!("unknown validation rule `{rule}`")),
        }
    }

    /// Run every check and collect all failures.
    ///
    /// # Errors
    ///
    /// Returns one `FieldError` per failed check, in input order.
    pub fn check(&self, checks: &[FieldCheck<'_>]) -> std::result::Result<(), Vec<FieldError>> {
        let errors: Vec<_> = checks
            .iter()
            .filter_map(|check| {
                self.validate(check.rule, check.value)
                    .err()
                    .map(|message| FieldError::new(check.field, check.rule, message))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("rules", &names)
            .finish()
    }
}

// ============================================================================
// Built-in rules
// ============================================================================

fn required(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        Err("campo obrigatório".into())
    } else {
        Ok(())
    }
}

fn email(value: &str) -> ValidationResult {
    let value = value.trim();
    if value.len() > MAX_EMAIL_LENGTH || !EMAIL_RE.is_match(value) {
        return Err("email inválido".into());
    }
    Ok(())
}

fn password(value: &str, min_length: usize) -> ValidationResult {
    if value.chars().count() < min_length {
        return Err(format!("a senha deve ter pelo menos {min_length} caracteres"));
    }
    let has_letter = value.chars().any(char::is_alphabetic);
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err("a senha deve conter letras e números".into());
    }
    Ok(())
}

fn document(value: &str, len: usize, label: &str) -> ValidationResult {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '/' | ' ');
    if !value.chars().all(allowed) {
        return Err(format!("{label} contém caracteres inválidos"));
    }
    let digits = digits_only(value);
    if digits.len() != len {
        return Err(format!("{label} deve ter {len} dígitos"));
    }
    // Repeated-digit sequences pass the length check but are never issued.
    if digits.bytes().all(|b| b == digits.as_bytes()[0]) {
        return Err(format!("{label} inválido"));
    }
    Ok(())
}
