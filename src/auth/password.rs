// region:    --- Imports
use crate::error::ApiError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
// endregion: --- Imports

// region:    --- Password

/// 비밀번호 해시 생성 (Argon2id, 솔트는 OsRng로 생성)
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("비밀번호 해시 실패: {e}")))
}

/// 비밀번호 검증
/// 저장된 해시가 손상된 경우에도 로그인 실패로만 취급함
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// endregion: --- Password

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("secret-password").unwrap();
        assert!(verify_password("secret-password", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn same_password_different_salt() {
        let a = hash_password("secret-password").unwrap();
        let b = hash_password("secret-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupted_hash_never_verifies() {
        assert!(!verify_password("secret-password", "not-a-phc-string"));
    }
}
// endregion: --- Tests
