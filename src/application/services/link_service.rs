//! Link creation, redirect accounting, lookup and deletion.

use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{
    DEFAULT_CODE_LENGTH, generate_code, is_reserved_code, validate_custom_code,
};
use crate::utils::url_validator::validate_url;
use serde_json::json;
use tracing::{debug, info, warn};

/// Default number of candidates tried before falling back.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Parameters for generated short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    /// Generated code length, 6 to 8.
    pub length: usize,
    /// Candidates checked against the store before giving up.
    pub max_attempts: usize,
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Service for creating, resolving and deleting short links.
///
/// Holds no mutable state of its own; every mutation goes through the
/// repository, which serialises conflicting writes.
pub struct LinkService<L: LinkRepository + ?Sized = dyn LinkRepository> {
    link_repository: Arc<L>,
    code_policy: CodePolicy,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service with the default [`CodePolicy`].
    pub fn new(link_repository: Arc<L>) -> Self {
        Self {
            link_repository,
            code_policy: CodePolicy::default(),
        }
    }

    /// Overrides the code generation policy.
    pub fn with_code_policy(mut self, code_policy: CodePolicy) -> Self {
        self.code_policy = code_policy;
        self
    }

    /// Returns the active code generation policy.
    pub fn code_policy(&self) -> CodePolicy {
        self.code_policy
    }

    /// Creates a short link.
    ///
    /// # Arguments
    ///
    /// - `url` - Destination, must be an absolute HTTP(S) URL
    /// - `desired_code` - Optional caller-chosen code; blank counts as absent
    ///
    /// # Conflict detection
    ///
    /// A caller-chosen code is checked for existence first, but that check is
    /// advisory: the insert itself is the authoritative uniqueness check and
    /// the repository reports a violation as [`AppError::Conflict`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL or code format,
    /// before touching the store.
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken.
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn create_link(&self, url: &str, desired_code: Option<&str>) -> Result<Link, AppError> {
        validate_url(url).map_err(|e| {
            AppError::bad_request("invalid url", json!({ "url": url, "reason": e.to_string() }))
        })?;

        let desired_code = desired_code.map(str::trim).filter(|c| !c.is_empty());

        let code = match desired_code {
            Some(custom) => {
                validate_custom_code(custom)?;

                if self.link_repository.exists(custom).await? {
                    return Err(AppError::conflict(
                        "code already exists",
                        json!({ "code": custom }),
                    ));
                }

                custom.to_string()
            }
            None => self.resolve_unique_code().await?,
        };

        let link = self
            .link_repository
            .create(NewLink {
                code,
                url: url.to_string(),
            })
            .await?;

        metrics::counter!("tinylink_links_created_total").increment(1);
        info!(code = %link.code, "Link created");

        Ok(link)
    }

    /// Picks a generated code that is very likely free.
    ///
    /// Tries up to `max_attempts` candidates and returns the first one the
    /// store reports as absent. A failing existence query is logged and the
    /// next candidate is tried. When every attempt is used up the last
    /// candidate is returned anyway and the insert decides.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] only if random generation fails.
    pub async fn resolve_unique_code(&self) -> Result<String, AppError> {
        let CodePolicy {
            length,
            max_attempts,
        } = self.code_policy;

        let mut candidate = generate_code(length)?;

        for attempt in 1..=max_attempts.max(1) {
            if attempt > 1 {
                candidate = generate_code(length)?;
            }

            match self.link_repository.exists(&candidate).await {
                Ok(false) => return Ok(candidate),
                Ok(true) => {
                    metrics::counter!("tinylink_code_collisions_total").increment(1);
                    debug!(attempt, code = %candidate, "Generated code already taken");
                }
                Err(e) => {
                    warn!(attempt, code = %candidate, error = %e, "Code existence check failed");
                }
            }
        }

        warn!(
            max_attempts,
            code = %candidate,
            "No free code confirmed, deferring to store uniqueness"
        );

        Ok(candidate)
    }

    /// Resolves a code to its destination and counts the click.
    ///
    /// The increment and lookup are one atomic store operation, so concurrent
    /// redirects on the same code each add exactly one click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for reserved or unknown codes; nothing
    /// is mutated in that case.
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn resolve_and_count(&self, code: &str) -> Result<String, AppError> {
        if is_reserved_code(code) {
            return Err(AppError::not_found("not found", json!({ "code": code })));
        }

        let url = self
            .link_repository
            .record_click(code)
            .await?
            .ok_or_else(|| AppError::not_found("not found", json!({ "code": code })))?;

        metrics::counter!("tinylink_redirects_total").increment(1);
        debug!(code, "Click recorded");

        Ok(url)
    }

    /// Lists every link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.link_repository.list().await
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("not found", json!({ "code": code })))
    }

    /// Deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches, including a repeated
    /// delete of the same code.
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        if !self.link_repository.delete(code).await? {
            return Err(AppError::not_found("not found", json!({ "code": code })));
        }

        info!(code, "Link deleted");
        Ok(())
    }

    /// Checks that the store answers queries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::code_generator::is_valid_code;
    use chrono::Utc;
    use mockall::Sequence;

    fn create_test_link(code: &str, url: &str) -> Link {
        Link::new(code.to_string(), url.to_string(), 0, None, Utc::now())
    }

    fn service(mock: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_create_link_generated_code() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .withf(|code| is_valid_code(code) && code.len() == 6)
            .times(1)
            .returning(|_| Ok(false));

        mock_link_repo
            .expect_create()
            .withf(|new_link| new_link.url == "https://example.com" && new_link.code.len() == 6)
            .times(1)
            .returning(|new_link| Ok(create_test_link(&new_link.code, &new_link.url)));

        let link = service(mock_link_repo)
            .create_link("https://example.com", None)
            .await
            .unwrap();

        assert!(is_valid_code(&link.code));
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn test_create_link_respects_code_length() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo.expect_exists().returning(|_| Ok(false));
        mock_link_repo
            .expect_create()
            .returning(|new_link| Ok(create_test_link(&new_link.code, &new_link.url)));

        let service = service(mock_link_repo).with_code_policy(CodePolicy {
            length: 8,
            max_attempts: 5,
        });

        let link = service.create_link("https://example.com", None).await.unwrap();
        assert_eq!(link.code.len(), 8);
    }

    #[tokio::test]
    async fn test_create_link_invalid_url_skips_store() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_exists().times(0);
        mock_link_repo.expect_create().times(0);

        let service = service(mock_link_repo);

        for url in ["not-a-url", "ftp://x", ""] {
            let err = service.create_link(url, None).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
            assert_eq!(err.to_string(), "invalid url");
        }
    }

    #[tokio::test]
    async fn test_create_link_invalid_code_skips_store() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_exists().times(0);
        mock_link_repo.expect_create().times(0);

        let service = service(mock_link_repo);

        for code in ["abc", "abcdefghi", "bad-cd", "api"] {
            let err = service
                .create_link("https://example.com", Some(code))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
            assert_eq!(err.to_string(), "invalid code format");
        }
    }

    #[tokio::test]
    async fn test_create_link_with_custom_code() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .withf(|code| code == "testA1")
            .times(1)
            .returning(|_| Ok(false));

        mock_link_repo
            .expect_create()
            .withf(|new_link| new_link.code == "testA1")
            .times(1)
            .returning(|new_link| Ok(create_test_link(&new_link.code, &new_link.url)));

        let link = service(mock_link_repo)
            .create_link("https://example.com/x", Some("  testA1 "))
            .await
            .unwrap();

        assert_eq!(link.code, "testA1");
    }

    #[tokio::test]
    async fn test_create_link_blank_code_generates() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .withf(|code| is_valid_code(code))
            .times(1)
            .returning(|_| Ok(false));
        mock_link_repo
            .expect_create()
            .times(1)
            .returning(|new_link| Ok(create_test_link(&new_link.code, &new_link.url)));

        let link = service(mock_link_repo)
            .create_link("https://example.com", Some("   "))
            .await
            .unwrap();

        assert!(is_valid_code(&link.code));
    }

    #[tokio::test]
    async fn test_create_link_custom_code_conflict_precheck() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .withf(|code| code == "taken1")
            .times(1)
            .returning(|_| Ok(true));
        mock_link_repo.expect_create().times(0);

        let err = service(mock_link_repo)
            .create_link("https://example.com", Some("taken1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_link_insert_race_is_conflict() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo.expect_exists().times(1).returning(|_| Ok(false));
        mock_link_repo.expect_create().times(1).returning(|new_link| {
            Err(AppError::conflict(
                "code already exists",
                json!({ "code": new_link.code }),
            ))
        });

        let err = service(mock_link_repo)
            .create_link("https://example.com", Some("racer1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_link_store_failure_on_insert() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo.expect_exists().returning(|_| Ok(false));
        mock_link_repo
            .expect_create()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let err = service(mock_link_repo)
            .create_link("https://example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_resolve_unique_code_retries_on_collision() {
        let mut mock_link_repo = MockLinkRepository::new();
        let mut seq = Sequence::new();

        mock_link_repo
            .expect_exists()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock_link_repo
            .expect_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let code = service(mock_link_repo).resolve_unique_code().await.unwrap();
        assert!(is_valid_code(&code));
    }

    #[tokio::test]
    async fn test_resolve_unique_code_swallows_store_errors() {
        let mut mock_link_repo = MockLinkRepository::new();
        let mut seq = Sequence::new();

        mock_link_repo
            .expect_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        mock_link_repo
            .expect_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let code = service(mock_link_repo).resolve_unique_code().await.unwrap();
        assert!(is_valid_code(&code));
    }

    #[tokio::test]
    async fn test_resolve_unique_code_falls_back_after_exhaustion() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .times(DEFAULT_MAX_ATTEMPTS)
            .returning(|_| Ok(true));

        let code = service(mock_link_repo).resolve_unique_code().await.unwrap();
        assert!(is_valid_code(&code));
    }

    #[tokio::test]
    async fn test_resolve_unique_code_honours_max_attempts() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .times(2)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = service(mock_link_repo).with_code_policy(CodePolicy {
            length: 7,
            max_attempts: 2,
        });

        let code = service.resolve_unique_code().await.unwrap();
        assert_eq!(code.len(), 7);
    }

    #[tokio::test]
    async fn test_exhausted_fallback_surfaces_insert_conflict() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo.expect_exists().returning(|_| Ok(true));
        mock_link_repo.expect_create().times(1).returning(|new_link| {
            Err(AppError::conflict(
                "code already exists",
                json!({ "code": new_link.code }),
            ))
        });

        let err = service(mock_link_repo)
            .create_link("https://example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_resolve_and_count_success() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_record_click()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let url = service(mock_link_repo)
            .resolve_and_count("abc123")
            .await
            .unwrap();

        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_and_count_not_found() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_record_click()
            .times(1)
            .returning(|_| Ok(None));

        let err = service(mock_link_repo)
            .resolve_and_count("nope00")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_and_count_reserved_skips_store() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_record_click().times(0);

        let service = service(mock_link_repo);

        for code in ["api", "healthz"] {
            let err = service.resolve_and_count(code).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }));
        }
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_find_by_code().returning(|_| Ok(None));

        let err = service(mock_link_repo).get_link("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_link() {
        let mut mock_link_repo = MockLinkRepository::new();
        let mut seq = Sequence::new();

        mock_link_repo
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock_link_repo
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let service = service(mock_link_repo);

        assert!(service.delete_link("abc123").await.is_ok());
        let err = service.delete_link("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_check_store_propagates_failure() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_ping()
            .returning(|| Err(AppError::internal("Database unreachable", json!({}))));

        let result = service(mock_link_repo).check_store().await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }
}
