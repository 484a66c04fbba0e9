// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and signup form validation.
//!
//! Each field reports at most one error: the first rule it fails, in the
//! order the rules are listed.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Characters a password may consist of.
static PASSWORD_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@$!%*?&]{8,}$").expect("password pattern is valid"));

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Validation failures of one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Error message for `field`, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    fn check(&mut self, field: &'static str, rules: &[(bool, &'static str)]) {
        if let Some(&(_, message)) = rules.iter().find(|(failed, _)| *failed) {
            self.0.push(FieldError { field, message });
        }
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}


#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &self.email);
        errors.check(
            "password",
            &[(self.password.is_empty(), "Password is required")],
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check("name", &[(self.name.is_empty(), "Name is required")]);
        check_email(&mut errors, &self.email);
        errors.check(
            "password",
            &[
                (self.password.is_empty(), "Password is required"),
                (
                    self.password.chars().count() < PASSWORD_MIN_LEN,
                    "Password must be at least 8 characters",
                ),
                (
                    !is_strong_password(&self.password),
                    "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character",
                ),
            ],
        );
        errors.check(
            "confirm_password",
            &[
                (self.confirm_password.is_empty(), "Confirm Password is required"),
                (self.confirm_password != self.password, "Passwords must match"),
            ],
        );
        errors.into_result()
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    errors.check(
        "email",
        &[
            (email.is_empty(), "Email is required"),
            (!EMAIL.is_match(email), "Invalid email"),
        ],
    );
}

fn is_strong_password(password: &str) -> bool {
    PASSWORD_CHARSET.is_match(password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}
