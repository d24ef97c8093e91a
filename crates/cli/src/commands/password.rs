//! Hash an administrator password for `ADMIN_PASSWORD_HASH`.
//!
//! # Usage
//!
//! ```bash
//! read -rs PW && echo -n "$PW" | vs-cli hash-password
//! ```

use std::io::Read;

use secrecy::SecretString;
use thiserror::Error;
use video_streaming_seeder::password::{PasswordError, hash_password};

/// Errors that can occur while hashing from stdin.
#[derive(Debug, Error)]
pub enum HashPasswordError {
    #[error("no password on stdin")]
    Empty,

    #[error("failed to read stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Strip one trailing line ending left by `echo` or an interactive prompt.
fn normalize(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}

/// Read a password from stdin and print its Argon2id hash.
///
/// # Errors
///
/// Returns an error if stdin is empty or unreadable, or the password is too
/// short to hash.
#[allow(clippy::print_stdout)]
pub fn hash_from_stdin() -> Result<(), HashPasswordError> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let password = normalize(&input);
    if password.is_empty() {
        return Err(HashPasswordError::Empty);
    }

    let hash = hash_password(&SecretString::from(password))?;
    println!("{}", hash.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_one_line_ending() {
        assert_eq!(normalize("secret\n"), "secret");
        assert_eq!(normalize("secret\r\n"), "secret");
        assert_eq!(normalize("secret\n\n"), "secret\n");
        assert_eq!(normalize("  secret "), "  secret ");
    }
}
