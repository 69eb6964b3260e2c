//! Registration tokens

/// Number of random bytes behind a token
const TOKEN_BYTES: usize = 16;

/// Generates an opaque registration token: 32 lowercase hex characters.
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }
}
