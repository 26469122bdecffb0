use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated document identifiers.
pub const AUTO_ID_LEN: usize = 20;

/// Generate a random 20-character alphanumeric document identifier.
pub fn generate_auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_ids_are_alphanumeric() {
        let id = generate_auto_id();
        assert_eq!(id.len(), AUTO_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn auto_ids_differ() {
        assert_ne!(generate_auto_id(), generate_auto_id());
    }
}
