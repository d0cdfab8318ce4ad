//! Timing-safe equality for tokens.

/// Compare two byte strings without short-circuiting on content.
///
/// Differing lengths return `false` immediately, so the length of the
/// expected value may leak. Equal-length inputs are always scanned to the
/// end; the running time does not depend on where they first differ.
pub fn constant_time_eq(expected: &[u8], candidate: &[u8]) -> bool {
    if expected.len() != candidate.len() {
        return false;
    }

    let mut diff = 0u8;
    for (a, b) in expected.iter().zip(candidate.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}
