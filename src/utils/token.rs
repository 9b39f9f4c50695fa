use rand::{distributions::Alphanumeric, thread_rng, Rng};
use subtle::ConstantTimeEq;

/// Random value for the OAuth `state` parameter.
pub fn generate_oauth_state(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn states_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}
