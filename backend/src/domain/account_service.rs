//! Account registration and login.
//!
//! Implements the [`AccountService`] driving port over a [`UserRepository`]
//! and the [`CredentialStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{AccountService, UserRepository};
use crate::domain::{
    CredentialStore, CurrentUser, Error, LoginCredentials, NewUser, Registration, Role, UserId,
    Username,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Account service backed by a user repository.
#[derive(Clone)]
pub struct AccountServiceImpl {
    users: Arc<dyn UserRepository>,
    credentials: Arc<CredentialStore>,
}

impl AccountServiceImpl {
    pub fn new(users: Arc<dyn UserRepository>, credentials: Arc<CredentialStore>) -> Self {
        Self { users, credentials }
    }

    async fn ensure_role_allowed(&self, role: Role) -> Result<(), Error> {
        if !role.is_admin() {
            return Ok(());
        }
        let admins = self.users.count_admins().await?;
        if admins > 0 {
            return Err(Error::forbidden(
                "Administrator accounts can only be granted by an existing administrator.",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(&self, registration: Registration) -> Result<UserId, Error> {
        let Registration {
            username,
            email,
            password,
            role,
        } = registration;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(Error::duplicate_username("Please use a different username."));
        }
        if self.users.email_exists(email.as_ref()).await? {
            return Err(Error::duplicate_email("Please use a different email address."));
        }
        self.ensure_role_allowed(role).await?;

        let mut pending = NewUser::new(username, email, role);
        self.credentials
            .set_password(&mut pending, &password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = self.users.insert(&pending).await?;
        info!(user_id = %user.id(), role = %user.role(), "user registered");
        Ok(user.id())
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<CurrentUser, Error> {
        let found = match Username::new(credentials.username()) {
            Ok(username) => self.users.find_by_username(&username).await?,
            Err(_) => None,
        };
        let Some(user) = found else {
            self.credentials.burn_verification(credentials.password());
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        };
        if !self.credentials.check_password(&user, credentials.password()) {
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id(), "user logged in");
        Ok(CurrentUser::from(&user))
    }

    async fn current_user(&self, user_id: UserId) -> Result<Option<CurrentUser>, Error> {
        let user = self.users.find_by_id(user_id).await?;
        Ok(user.as_ref().map(CurrentUser::from))
    }
}

#[cfg(test)]
mod tests {
    //! Registration and login rules against a mocked repository.
    use super::*;
    use crate::domain::ports::{MockUserRepository, UserPersistenceError};
    use crate::domain::{Email, ErrorCode, LoginForm, Password, RegistrationForm, User};
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> Arc<CredentialStore> {
        Arc::new(CredentialStore::low_cost())
    }

    fn registration(role: &str) -> Registration {
        RegistrationForm {
            username: Some("alice".to_owned()),
            email: Some("a@x.com".to_owned()),
            password: Some("pw".to_owned()),
            password2: Some("pw".to_owned()),
            role: Some(role.to_owned()),
        }
        .validate()
        .expect("valid registration")
    }

    fn stored_user(store: &CredentialStore, role: Role, password: &str) -> User {
        let mut pending = NewUser::new(
            Username::new("alice").expect("username"),
            Email::new("a@x.com").expect("email"),
            role,
        );
        store
            .set_password(&mut pending, &Password::new(password))
            .expect("hash");
        pending.into_user(UserId::new(1))
    }

    fn login_as(username: &str, password: &str) -> LoginCredentials {
        LoginForm {
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
        }
        .validate()
        .expect("credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_password_and_inserts(credentials: Arc<CredentialStore>) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_count_admins().never();
        let verifier = credentials.clone();
        repo.expect_insert().times(1).returning(move |pending| {
            let hash = pending.password_hash().expect("hash set before insert");
            assert!(hash.as_phc().starts_with("$argon2id$"));
            let user = pending.clone().into_user(UserId::new(42));
            assert!(verifier.check_password(&user, &Password::new("pw")));
            Ok(user)
        });

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        let id = service.register(registration("caregiver")).await.expect("registered");
        assert_eq!(id, UserId::new(42));
    }

    #[rstest]
    #[tokio::test]
    async fn register_rejects_taken_username(credentials: Arc<CredentialStore>) {
        let existing = stored_user(&credentials, Role::Caregiver, "pw");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_insert().never();

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        let err = service
            .register(registration("caregiver"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::DuplicateUsername);
    }

    #[rstest]
    #[tokio::test]
    async fn register_rejects_taken_email(credentials: Arc<CredentialStore>) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_email_exists()
            .with(eq("a@x.com"))
            .returning(|_| Ok(true));
        repo.expect_insert().never();

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        let err = service
            .register(registration("caregiver"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::DuplicateEmail);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_race_surfaces_as_duplicate(credentials: Arc<CredentialStore>) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_insert()
            .returning(|_| Err(UserPersistenceError::duplicate_email("a@x.com")));

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        let err = service
            .register(registration("caregiver"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::DuplicateEmail);
    }

    #[rstest]
    #[case(0, None)]
    #[case(1, Some(ErrorCode::Forbidden))]
    #[tokio::test]
    async fn admin_self_registration_only_bootstraps(
        credentials: Arc<CredentialStore>,
        #[case] existing_admins: u64,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_count_admins()
            .returning(move || Ok(existing_admins));
        repo.expect_insert()
            .returning(|pending| Ok(pending.clone().into_user(UserId::new(1))));

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        let outcome = service.register(registration("admin")).await;
        assert_eq!(outcome.err().map(|err| err.code()), expected);
    }

    #[rstest]
    #[case("alice", "pw", true)]
    #[case("alice", "wrong", false)]
    #[case("nobody", "pw", false)]
    #[tokio::test]
    async fn login_succeeds_only_for_matching_credentials(
        credentials: Arc<CredentialStore>,
        #[case] username: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let user = stored_user(&credentials, Role::Caregiver, "pw");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(move |name| {
            Ok((name.as_ref() == "alice").then(|| user.clone()))
        });

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        match (should_succeed, service.login(&login_as(username, password)).await) {
            (true, Ok(current)) => {
                assert_eq!(current.id(), UserId::new(1));
                assert_eq!(current.role(), Role::Caregiver);
            }
            (false, Err(err)) => {
                assert_eq!(err.code(), ErrorCode::InvalidCredentials);
                assert_eq!(err.message(), INVALID_CREDENTIALS);
            }
            (true, Err(err)) => panic!("expected success, got {err:?}"),
            (false, Ok(current)) => panic!("expected failure, got {current:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn current_user_is_none_after_deletion(credentials: Arc<CredentialStore>) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(UserId::new(9)))
            .returning(|_| Ok(None));

        let service = AccountServiceImpl::new(Arc::new(repo), credentials);
        assert!(service.current_user(UserId::new(9)).await.expect("lookup").is_none());
    }
}
