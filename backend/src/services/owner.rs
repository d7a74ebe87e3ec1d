use crate::api::{ServiceId, Username};
use crate::db::repository::{BookingRepository, RepositoryResult};

/// Display name of the account that owns `service_id`.
///
/// Unknown services and owners without a name resolve to the `"—"` placeholder.
pub async fn resolve_owner<R: BookingRepository + ?Sized>(
    repo: &R,
    service_id: ServiceId,
) -> RepositoryResult<Username> {
    let name = repo.owner_username(service_id).await?;
    Ok(Username::from_display_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{UserId, USERNAME_PLACEHOLDER};
    use crate::db::repositories::LocalRepository;

    #[tokio::test]
    async fn test_resolve_known_owner() {
        let repo = LocalRepository::new();
        repo.add_user(UserId(1), Some("alice"));
        repo.add_service(ServiceId(10), UserId(1));

        let owner = resolve_owner(&repo, ServiceId(10)).await.unwrap();
        assert_eq!(owner.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_resolve_unknown_service() {
        let repo = LocalRepository::new();
        let owner = resolve_owner(&repo, ServiceId(404)).await.unwrap();
        assert_eq!(owner.as_str(), USERNAME_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_resolve_empty_username() {
        let repo = LocalRepository::new();
        repo.add_user(UserId(2), Some(""));
        repo.add_service(ServiceId(20), UserId(2));

        let owner = resolve_owner(&repo, ServiceId(20)).await.unwrap();
        assert!(owner.is_placeholder());
    }

    #[tokio::test]
    async fn test_resolve_null_username() {
        let repo = LocalRepository::new();
        repo.add_user(UserId(3), None);
        repo.add_service(ServiceId(30), UserId(3));

        assert!(resolve_owner(&repo, ServiceId(30)).await.unwrap().is_placeholder());
    }

    #[tokio::test]
    async fn test_resolve_propagates_connection_error() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let result = resolve_owner(&repo, ServiceId(1)).await;
        assert!(result.is_err());
    }
}
