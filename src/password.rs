use rand::seq::SliceRandom;
use std::fmt::{Display, Formatter};

pub const MIN_LENGTH: usize = 16;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const PUNCTUATION: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    TooShort,
    NoLowercase,
    NoUppercase,
    NoDigit,
    NoSpecial,
}

impl Display for PasswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::TooShort => write!(f, "must be at least {} characters", MIN_LENGTH),
            PasswordError::NoLowercase => write!(f, "must contain a lowercase letter"),
            PasswordError::NoUppercase => write!(f, "must contain an uppercase letter"),
            PasswordError::NoDigit => write!(f, "must contain a digit"),
            PasswordError::NoSpecial => write!(f, "must contain a special character"),
        }
    }
}

impl std::error::Error for PasswordError {}

pub fn validate(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(PasswordError::NoLowercase);
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(PasswordError::NoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::NoDigit);
    }
    if !password.chars().any(|c| c.is_ascii_punctuation()) {
        return Err(PasswordError::NoSpecial);
    }
    Ok(())
}

/// A random password of `length` characters (at least [`MIN_LENGTH`]) that
/// passes [`validate`].
pub fn generate(length: usize) -> String {
    let length = length.max(MIN_LENGTH);
    let mut rng = rand::thread_rng();

    let mut chars: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, PUNCTUATION]
        .iter()
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();

    let all: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, PUNCTUATION].concat();
    while chars.len() < length {
        if let Some(&c) = all.choose(&mut rng) {
            chars.push(c);
        }
    }

    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}
