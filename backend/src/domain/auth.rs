//! Login and registration form validation.
//!
//! Both forms are checked by pure functions that either produce a validated
//! value or every field error at once; handlers decide how to present them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::non_blank;
use super::{
    Email, FieldError, FieldErrorKind, FieldErrors, Password, Role, UserValidationError, Username,
};

/// A password counts as present when it has a non-whitespace character.
///
/// The raw value, surrounding whitespace included, is what gets hashed.
fn present_password(raw: Option<&str>) -> Option<&str> {
    raw.filter(|raw| !raw.trim().is_empty())
}

/// Raw `POST /login` submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Credentials that passed shape validation.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    username: String,
    password: Password,
}

impl LoginCredentials {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

impl LoginForm {
    /// Require both fields to be non-blank.
    ///
    /// The password keeps its surrounding whitespace; only the blank check
    /// trims it.
    pub fn validate(&self) -> Result<LoginCredentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = non_blank(self.username.as_deref());
        if username.is_none() {
            errors.push(FieldError::required("username"));
        }
        let password = present_password(self.password.as_deref());
        if password.is_none() {
            errors.push(FieldError::required("password"));
        }
        errors.finish(|| LoginCredentials {
            username: username.unwrap_or_default().to_owned(),
            password: Password::new(password.unwrap_or_default()),
        })
    }
}

/// Raw `POST /register` submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RegistrationForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password2: Option<String>,
    pub role: Option<String>,
}

/// Registration request that passed every field check.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub password: Password,
    pub role: Role,
}

impl RegistrationForm {
    /// Validate every field.
    ///
    /// # Examples
    /// ```
    /// use carelog::domain::{RegistrationForm, Role};
    ///
    /// let form = RegistrationForm {
    ///     username: Some("alice".into()),
    ///     email: Some("a@x.com".into()),
    ///     password: Some("pw".into()),
    ///     password2: Some("pw".into()),
    ///     role: Some("caregiver".into()),
    /// };
    /// let registration = form.validate().expect("valid form");
    /// assert_eq!(registration.role, Role::Caregiver);
    /// ```
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = match Username::new(self.username.as_deref().unwrap_or_default()) {
            Ok(username) => Some(username),
            Err(UserValidationError::EmptyUsername) => {
                errors.push(FieldError::required("username"));
                None
            }
            Err(err) => {
                errors.push(FieldError::new("username", FieldErrorKind::Invalid, err.to_string()));
                None
            }
        };

        let email = match Email::new(self.email.as_deref().unwrap_or_default()) {
            Ok(email) => Some(email),
            Err(UserValidationError::EmptyEmail) => {
                errors.push(FieldError::required("email"));
                None
            }
            Err(err) => {
                errors.push(FieldError::new("email", FieldErrorKind::Invalid, err.to_string()));
                None
            }
        };

        let password = present_password(self.password.as_deref());
        if password.is_none() {
            errors.push(FieldError::required("password"));
        }
        match present_password(self.password2.as_deref()) {
            None => errors.push(FieldError::required("password2")),
            Some(repeat) if password.is_some_and(|first| first != repeat) => {
                errors.push(FieldError::new(
                    "password2",
                    FieldErrorKind::Mismatch,
                    "passwords must match",
                ));
            }
            Some(_) => {}
        }

        let role = match non_blank(self.role.as_deref()) {
            None => {
                errors.push(FieldError::required("role"));
                None
            }
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(err) => {
                    errors.push(FieldError::new("role", FieldErrorKind::Invalid, err.to_string()));
                    None
                }
            },
        };

        match (username, email, password, role) {
            (Some(username), Some(email), Some(password), Some(role)) if errors.is_empty() => {
                Ok(Registration {
                    username,
                    email,
                    password: Password::new(password),
                    role,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid() -> RegistrationForm {
        RegistrationForm {
            username: Some("alice".to_owned()),
            email: Some("a@x.com".to_owned()),
            password: Some("secret".to_owned()),
            password2: Some("secret".to_owned()),
            role: Some("caregiver".to_owned()),
        }
    }

    #[rstest]
    fn valid_registration_passes(valid: RegistrationForm) {
        let registration = valid.validate().expect("valid");
        assert_eq!(registration.username.as_ref(), "alice");
        assert_eq!(registration.email.as_ref(), "a@x.com");
        assert_eq!(registration.password.expose(), "secret");
        assert_eq!(registration.role, Role::Caregiver);
    }

    #[rstest]
    fn mismatched_passwords_are_reported(mut valid: RegistrationForm) {
        valid.password2 = Some("other".to_owned());
        let errors = valid.validate().expect_err("mismatch");
        let only = errors.as_slice().first().expect("one error");
        assert_eq!(only.field(), "password2");
        assert_eq!(only.kind(), FieldErrorKind::Mismatch);
    }

    #[rstest]
    #[case("role", Some("superuser"))]
    #[case("role", None)]
    #[case("email", Some("not-an-email"))]
    #[case("username", Some("   "))]
    #[case("password", Some("   "))]
    fn bad_fields_are_named(
        mut valid: RegistrationForm,
        #[case] field: &str,
        #[case] value: Option<&str>,
    ) {
        let value = value.map(str::to_owned);
        match field {
            "role" => valid.role = value,
            "email" => valid.email = value,
            "password" => {
                valid.password.clone_from(&value);
                valid.password2 = value;
            }
            _ => valid.username = value,
        }
        let errors = valid.validate().expect_err("invalid");
        assert!(errors.contains(field), "expected error for {field}");
    }

    #[rstest]
    fn password_whitespace_is_kept_for_hashing(mut valid: RegistrationForm) {
        valid.password = Some(" pw ".to_owned());
        valid.password2 = Some(" pw ".to_owned());
        let registration = valid.validate().expect("valid");
        assert_eq!(registration.password.expose(), " pw ");
    }

    #[rstest]
    fn empty_form_reports_every_field() {
        let errors = RegistrationForm::default().validate().expect_err("empty");
        for field in ["username", "email", "password", "password2", "role"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[rstest]
    #[case(Some("alice"), Some("pw"), &[])]
    #[case(Some(" "), Some("pw"), &["username"])]
    #[case(Some("alice"), Some("  "), &["password"])]
    #[case(None, None, &["username", "password"])]
    fn login_requires_both_fields(
        #[case] username: Option<&str>,
        #[case] password: Option<&str>,
        #[case] failing: &[&str],
    ) {
        let form = LoginForm {
            username: username.map(str::to_owned),
            password: password.map(str::to_owned),
        };
        match form.validate() {
            Ok(credentials) => {
                assert!(failing.is_empty());
                assert_eq!(credentials.username(), "alice");
            }
            Err(errors) => {
                assert_eq!(errors.as_slice().len(), failing.len());
                for field in failing {
                    assert!(errors.contains(field));
                }
            }
        }
    }
}
