use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{validate_registration, NewUser, User};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let email = normalize_email(email);
        validate_registration(username, &email, password)?;

        let hashed_password = hash_password(password)?;
        let user = self.repo.create(NewUser {
            username: username.trim().to_string(),
            email,
            hashed_password,
        })?;
        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Unknown email, wrong password and inactive accounts all fail the same way.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .repo
            .find_by_email(&normalize_email(email))?
            .ok_or(DomainError::Unauthorized)?;

        if !user.is_active || !verify_password(password, &user.hashed_password) {
            return Err(DomainError::Unauthorized);
        }
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryUserRepository;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::default()))
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("s3cret-pass").expect("hash");
        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong-pass", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn register_then_authenticate() {
        let service = service();
        let user = service
            .register("boris", "Boris@Example.com ", "password123")
            .expect("register");
        assert_eq!(user.email, "boris@example.com");

        let authenticated = service
            .authenticate("boris@example.com", "password123")
            .expect("login");
        assert_eq!(authenticated.id, user.id);
    }

    #[test]
    fn authenticate_rejects_wrong_password_and_unknown_email() {
        let service = service();
        service
            .register("boris", "boris@example.com", "password123")
            .expect("register");

        assert!(matches!(
            service.authenticate("boris@example.com", "wrongpassword"),
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            service.authenticate("nobody@example.com", "password123"),
            Err(DomainError::Unauthorized)
        ));
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let service = service();
        service
            .register("boris", "boris@example.com", "password123")
            .expect("register");
        let err = service
            .register("boris2", "BORIS@example.com", "password123")
            .expect_err("duplicate email");
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn register_validates_input() {
        let service = service();
        assert!(matches!(
            service.register("boris", "not-an-email", "password123"),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            service.register("boris", "boris@example.com", "short"),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
