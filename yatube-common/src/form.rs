use crate::model::{
    Id,
    auth::PASSWORD_MIN_LEN,
    group::{Group, GroupMarker},
    post::PostContent,
    user::UserHandle,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum TextError {
    #[error("This field is required.")]
    Required,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum GroupChoiceError {
    #[error("Select a valid choice. That choice is not one of the available choices.")]
    InvalidChoice,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum HandleError {
    #[error("This field is required.")]
    Required,
    #[error("Ensure this value has at most 150 characters.")]
    TooLong,
    #[error(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    )]
    InvalidCharacters,
    #[error("A user with that username already exists.")]
    Taken,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum PasswordError {
    #[error("This password is too short. It must contain at least 8 characters.")]
    TooShort,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum PasswordConfirmationError {
    #[error("The two password fields didn't match.")]
    Mismatch,
}

/// Post form exactly as submitted by the browser.
///
/// An empty `group` means the post is not in any group.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub text: String,
    pub group: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFormErrors {
    pub text: Option<TextError>,
    pub group: Option<GroupChoiceError>,
}

impl PostFormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.group.is_none()
    }
}

impl PostForm {
    /// Prefills the form from an existing post's content.
    #[must_use]
    pub fn from_content(content: &PostContent) -> Self {
        Self {
            text: content.text.clone(),
            group: content
                .group
                .map(|group| group.to_string())
                .unwrap_or_default(),
        }
    }

    /// Selected group id if the field holds one, whether or not it exists.
    #[must_use]
    pub fn selected_group(&self) -> Option<Id<GroupMarker>> {
        self.group.trim().parse().ok()
    }

    /// Checks the form against the groups a post may be assigned to.
    pub fn validate(&self, groups: &[Group]) -> Result<PostContent, PostFormErrors> {
        let mut errors = PostFormErrors::default();

        let text = self.text.trim();
        if text.is_empty() {
            errors.text = Some(TextError::Required);
        }

        let group_field = self.group.trim();
        let group = if group_field.is_empty() {
            None
        } else {
            let selected = self
                .selected_group()
                .filter(|id| groups.iter().any(|group| group.id == *id));
            if selected.is_none() {
                errors.group = Some(GroupChoiceError::InvalidChoice);
            }
            selected
        };

        if errors.is_empty() {
            Ok(PostContent {
                text: text.to_owned(),
                group,
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub handle: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SignupErrors {
    pub handle: Option<HandleError>,
    pub password: Option<PasswordError>,
    pub password_confirmation: Option<PasswordConfirmationError>,
}

impl SignupErrors {
    /// Errors for a handle that another user already holds.
    #[must_use]
    pub fn handle_taken() -> Self {
        Self {
            handle: Some(HandleError::Taken),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handle.is_none() && self.password.is_none() && self.password_confirmation.is_none()
    }
}

impl SignupForm {
    /// Validates the form, yielding the chosen handle.
    ///
    /// Whether the handle is still free is only known to the database.
    pub fn validate(&self) -> Result<UserHandle, SignupErrors> {
        let mut errors = SignupErrors::default();

        let handle = self.handle.trim();
        let handle = if handle.is_empty() {
            errors.handle = Some(HandleError::Required);
            None
        } else {
            match UserHandle::new(handle.to_owned()) {
                Ok(handle) if handle.is_signup_safe() => Some(handle),
                Ok(_) => {
                    errors.handle = Some(HandleError::InvalidCharacters);
                    None
                }
                Err(_) => {
                    errors.handle = Some(HandleError::TooLong);
                    None
                }
            }
        };

        if self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.password = Some(PasswordError::TooShort);
        }
        if self.password != self.password_confirmation {
            errors.password_confirmation = Some(PasswordConfirmationError::Mismatch);
        }

        match handle {
            Some(handle) if errors.is_empty() => Ok(handle),
            _ => Err(errors),
        }
    }
}
