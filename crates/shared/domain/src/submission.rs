use serde::{Deserialize, Serialize};

/// A validated registration, produced from a single form post.
///
/// Ephemeral: lives for the duration of one request and the session write it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub username: String,
    pub password: String,
    pub gender: Gender,
}

/// Gender select on the register form.
///
/// The form submits the option codes `"0"`/`"1"`/`"2"`; anything else folds to
/// [`Gender::Unspecified`] since the field carries no validation rule.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Unspecified,
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn from_form_code(code: &str) -> Self {
        match code {
            "1" => Self::Male,
            "2" => Self::Female,
            _ => Self::Unspecified,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unspecified => "--Choose--",
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}
