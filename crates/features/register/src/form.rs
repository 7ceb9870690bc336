use doorstep_domain::submission::{Gender, Submission};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Demo allow-set for the password rule. This is the documented contract of the
/// form, not an authentication policy.
pub const ALLOWED_PASSWORDS: &[&str] = &["secret", "123"];

/// Minimum username length.
pub const USERNAME_MIN_LENGTH: usize = 6;

/// Raw form input, exactly as posted. Absent fields deserialize to empty
/// strings so the presence rules can speak for themselves.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub password: String,
    pub gender: String,
    pub csrf_token: Option<String>,
}

impl RegisterForm {
    /// Evaluates the field rules and produces a [`Submission`] on success.
    ///
    /// Per field, rules run in declaration order and the first failure wins;
    /// a failed presence rule short-circuits the rest of its field. The
    /// resulting map still carries a message *list* per field, so callers and
    /// templates never depend on the single-message policy.
    ///
    /// # Errors
    /// Returns the field-to-messages map when any rule fails.
    pub fn validate(&self) -> Result<Submission, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.name.trim().is_empty() {
            errors.push("name", "Name is required!");
        }

        if self.username.trim().is_empty() {
            errors.push("username", "Username is required!");
        } else if self.username.chars().count() < USERNAME_MIN_LENGTH {
            errors.push("username", "Minimum is 6 characters.");
        }

        if self.password.is_empty() {
            errors.push("password", "Password is required!");
        } else if !ALLOWED_PASSWORDS.contains(&self.password.as_str()) {
            errors.push("password", "Invalid value, must be one of: secret, 123.");
        }

        // No rule on gender: unknown codes fold to Unspecified.
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Submission {
            name: self.name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            gender: Gender::from_form_code(&self.gender),
        })
    }
}

/// Validation failures, as a mapping from field name to human-readable messages.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegisterForm {
        RegisterForm {
            name: "Jane".to_owned(),
            username: "janedoe".to_owned(),
            password: "secret".to_owned(),
            gender: "2".to_owned(),
            csrf_token: None,
        }
    }

    #[test]
    fn valid_form_produces_a_submission() {
        let submission = valid_form().validate().expect("form is valid");
        assert_eq!(submission.name, "Jane");
        assert_eq!(submission.username, "janedoe");
        assert_eq!(submission.gender, Gender::Female);
    }

    #[test]
    fn short_username_fails_with_length_error() {
        let form = RegisterForm { username: "abc".to_owned(), ..valid_form() };
        let errors = form.validate().expect_err("username too short");
        assert_eq!(errors.get("username"), ["Minimum is 6 characters."]);
        assert!(errors.get("password").is_empty());
    }

    #[test]
    fn password_outside_allow_set_fails() {
        for bad in ["hunter2", "Secret", "1234"] {
            let form = RegisterForm { password: bad.to_owned(), ..valid_form() };
            let errors = form.validate().expect_err("password not allowed");
            assert_eq!(errors.get("password"), ["Invalid value, must be one of: secret, 123."]);
        }

        for good in ALLOWED_PASSWORDS {
            let form = RegisterForm { password: (*good).to_owned(), ..valid_form() };
            assert!(form.validate().is_ok(), "'{good}' belongs to the allow-set");
        }
    }

    #[test]
    fn presence_failure_short_circuits_its_field() {
        let form = RegisterForm { username: String::new(), password: String::new(), ..valid_form() };
        let errors = form.validate().expect_err("missing fields");

        // The presence message wins; the length rule never runs.
        assert_eq!(errors.get("username"), ["Username is required!"]);
        assert_eq!(errors.get("password"), ["Password is required!"]);
    }

    #[test]
    fn every_failing_field_is_reported() {
        let form = RegisterForm::default();
        let errors = form.validate().expect_err("everything missing");

        assert_eq!(errors.get("name"), ["Name is required!"]);
        assert!(!errors.get("username").is_empty());
        assert!(!errors.get("password").is_empty());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let form = RegisterForm { name: "   ".to_owned(), ..valid_form() };
        let errors = form.validate().expect_err("blank name");
        assert_eq!(errors.get("name"), ["Name is required!"]);
    }

    #[test]
    fn gender_is_always_valid() {
        let form = RegisterForm { gender: "junk".to_owned(), ..valid_form() };
        let submission = form.validate().expect("gender carries no rule");
        assert_eq!(submission.gender, Gender::Unspecified);
    }
}
