//! Game and list codes: generation, normalisation and delete confirmation.

use futures::future::BoxFuture;
use rand::Rng;

use crate::{dao::storage::StorageResult, error::ServiceError};

const MAX_CODE_ATTEMPTS: u32 = 16;

/// Fresh `XXXX-XXXX` code made of two random 16-bit uppercase hex groups.
pub fn random_code() -> String {
    let mut rng = rand::rng();
    format!("{:04X}-{:04X}", rng.random::<u16>(), rng.random::<u16>())
}

/// Codes are compared trimmed and uppercased.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Whether `confirm` repeats `code`.
pub fn confirm_matches(code: &str, confirm: &str) -> bool {
    normalize_code(code) == normalize_code(confirm)
}

/// Draw codes until `find` reports one as unused.
pub(crate) async fn unused_code<T, F>(mut find: F) -> Result<String, ServiceError>
where
    F: FnMut(&str) -> BoxFuture<'static, StorageResult<Option<T>>>,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = random_code();
        if find(&code).await?.is_none() {
            return Ok(code);
        }
    }
    Err(ServiceError::Conflict(format!(
        "no unused code found after {MAX_CODE_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use futures::FutureExt;

    use super::*;

    #[test]
    fn random_codes_are_two_uppercase_hex_groups() {
        for _ in 0..100 {
            let code = random_code();
            let (left, right) = code.split_once('-').unwrap();
            assert_eq!(left.len(), 4);
            assert_eq!(right.len(), 4);
            assert!(
                left.chars()
                    .chain(right.chars())
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
            );
        }
    }

    #[test]
    fn confirmation_ignores_case_and_whitespace() {
        assert!(confirm_matches("AB12-CD34", " ab12-cd34 "));
        assert!(!confirm_matches("AB12-CD34", "AB12-CD35"));
        assert_eq!(normalize_code(" code1 "), "CODE1");
    }

    #[tokio::test]
    async fn retries_while_codes_are_taken() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let code = unused_code(move |_| {
            let taken = counter.fetch_add(1, Ordering::SeqCst) < 2;
            async move { Ok(taken.then_some(())) }.boxed()
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(code.len(), 9);
    }

    #[tokio::test]
    async fn gives_up_when_every_code_is_taken() {
        let result = unused_code(|_| async { Ok(Some(())) }.boxed()).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
