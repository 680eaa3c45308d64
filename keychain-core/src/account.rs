//! The account profile and the form the presentation layer submits.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The single user profile kept in secure storage.
///
/// The password is held in plaintext at this layer; confidentiality is left
/// entirely to the secure storage facility.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct Account {
    /// Opaque identifier, also the secure storage entry id.
    pub id: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Account {
    /// Returns a fresh identifier: an uppercase hyphenated UUID v4.
    #[must_use]
    pub fn generate_id() -> String {
        Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }

    /// Returns a copy of this account with the edits from `form` applied.
    ///
    /// The name is replaced whenever the form carries one. A blank name is
    /// stored as no name (`None`), never as an empty string. Email and
    /// password are only replaced by non-empty values. The id never changes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found by
    /// [`AccountForm::validate_edit`].
    pub fn apply_edits(&self, form: AccountForm) -> Result<Self, ValidationError> {
        form.validate_edit()?;
        let AccountForm {
            name,
            email,
            password,
            ..
        } = form;

        let mut edited = self.clone();
        if let Some(name) = name {
            edited.name = normalize_name(name);
        }
        if !email.is_empty() && email != self.email {
            edited.email = email;
        }
        if !password.is_empty() && password != self.password {
            edited.password = password;
        }
        Ok(edited)
    }
}

/// Values entered on the create and edit screens.
#[derive(Clone, PartialEq, Eq, uniffi::Record)]
pub struct AccountForm {
    /// Optional display name.
    pub name: Option<String>,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub password_confirmation: String,
}

impl fmt::Debug for AccountForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AccountForm {
    /// Checks the form for account creation.
    ///
    /// # Errors
    ///
    /// In order: missing email, mismatched passwords, empty password.
    pub fn validate_new(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        Ok(())
    }

    /// Checks the form for editing an existing account.
    ///
    /// # Errors
    ///
    /// In order: mismatched passwords, missing email.
    pub fn validate_edit(&self) -> Result<(), ValidationError> {
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        Ok(())
    }

    /// Builds a new account with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found by [`Self::validate_new`].
    pub fn into_account(self) -> Result<Account, ValidationError> {
        self.validate_new()?;
        Ok(Account {
            id: Account::generate_id(),
            name: self.name.and_then(normalize_name),
            email: self.email,
            password: self.password,
        })
    }
}

fn normalize_name(name: String) -> Option<String> {
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Reasons a submitted [`AccountForm`] is rejected. The messages are meant to
/// be shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The email field is empty.
    #[error("You must enter an email address.")]
    MissingEmail,
    /// Password and confirmation differ.
    #[error("Passwords do not match. Please make sure they match and try again.")]
    PasswordMismatch,
    /// The password field is empty.
    #[error("Please choose a password.")]
    MissingPassword,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn form(name: Option<&str>, email: &str, password: &str, confirmation: &str) -> AccountForm {
        AccountForm {
            name: name.map(str::to_string),
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    fn account() -> Account {
        Account {
            id: "ID-1".to_string(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test_case(form(None, "", "pw", "other"), ValidationError::MissingEmail ; "email checked first")]
    #[test_case(form(None, "a@b.c", "pw", "other"), ValidationError::PasswordMismatch ; "mismatch")]
    #[test_case(form(None, "a@b.c", "", ""), ValidationError::MissingPassword ; "empty password")]
    fn test_validate_new_rejects(form: AccountForm, expected: ValidationError) {
        assert_eq!(form.validate_new(), Err(expected));
    }

    #[test_case(form(None, "", "pw", "other"), ValidationError::PasswordMismatch ; "mismatch checked first")]
    #[test_case(form(None, "", "pw", "pw"), ValidationError::MissingEmail ; "missing email")]
    fn test_validate_edit_rejects(form: AccountForm, expected: ValidationError) {
        assert_eq!(form.validate_edit(), Err(expected));
    }

    #[test]
    fn test_into_account_assigns_uppercase_uuid() {
        let account = form(Some("  "), "a@b.c", "pw", "pw")
            .into_account()
            .expect("valid");
        assert_eq!(account.id.len(), 36);
        assert_eq!(account.id, account.id.to_uppercase());
        assert!(Uuid::parse_str(&account.id).is_ok());
        assert_eq!(account.name, None);
        assert_eq!(account.email, "a@b.c");
    }

    #[test]
    fn test_apply_edits_keeps_id_and_ignores_empty_password() {
        let edited = account()
            .apply_edits(form(Some("Grace"), "grace@example.com", "", ""))
            .expect("valid");
        assert_eq!(edited.id, "ID-1");
        assert_eq!(edited.name.as_deref(), Some("Grace"));
        assert_eq!(edited.email, "grace@example.com");
        assert_eq!(edited.password, "hunter2");
    }

    #[test]
    fn test_apply_edits_name_handling() {
        let kept = account()
            .apply_edits(form(None, "ada@example.com", "new", "new"))
            .expect("valid");
        assert_eq!(kept.name.as_deref(), Some("Ada"));
        assert_eq!(kept.password, "new");

        let cleared = account()
            .apply_edits(form(Some(""), "ada@example.com", "", ""))
            .expect("valid");
        assert_eq!(cleared.name, None);
    }

    #[test]
    fn test_serialized_shape_omits_missing_name() {
        let mut account = account();
        account.name = None;
        let json = serde_json::to_value(&account).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "ID-1",
                "email": "ada@example.com",
                "password": "hunter2",
            })
        );
        let back: Account = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, account);
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", account());
        assert!(!rendered.contains("hunter2"));
        let rendered = format!("{:?}", form(None, "a@b.c", "secret", "secret"));
        assert!(!rendered.contains("secret"));
    }
}
