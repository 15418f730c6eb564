use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod aws;
pub mod mock;

/// One page of a paginated listing: the records it carried plus the
/// continuation token for the next page, if any remains.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Drain a paged listing into a single ordered sequence.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's continuation token afterwards, until a page comes back without
/// one. Records are concatenated in page order; the first failed page
/// request aborts the drain and propagates the error.
pub async fn drain_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(items)
}

/// A member account of the organization, as returned by the hierarchy
/// listing. Fetched once per run and never mutated.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub joined_method: String,
    pub joined_at: DateTime<Utc>,
}

/// The id/name projection of an account from the flat organization-wide
/// listing.
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
}

/// A node of the organizational-unit tree.
#[derive(Debug, Clone)]
pub struct OrgUnit {
    pub id: String,
    pub name: String,
}

/// An Identity Store user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub display_name: String,
}

/// An Identity Store group.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: String,
    pub display_name: String,
}

/// A described permission set. Identity is the ARN.
#[derive(Debug, Clone)]
pub struct PermissionSet {
    pub arn: String,
    pub name: String,
    pub description: Option<String>,
}

/// One account-assignment record as it comes off the wire. The principal
/// type is kept as the raw string so values outside USER/GROUP survive
/// into the report.
#[derive(Debug, Clone)]
pub struct AssignmentRecord {
    pub principal_type: String,
    pub principal_id: String,
}

/// An IAM Identity Center instance and the Identity Store backing it.
#[derive(Debug, Clone)]
pub struct InstanceInfo {
    pub instance_arn: String,
    pub identity_store_id: String,
}

/// The remote directory the inventory pass reads from.
///
/// Paginated operations return a single [`Page`] so that page draining is
/// owned by [`drain_pages`]; the hierarchy listings return complete result
/// sets. Implementations must not reorder records within a page.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Account id of the caller identity executing the run.
    async fn caller_account_id(&self) -> Result<String>;

    /// IAM Identity Center instances visible to the caller.
    async fn identity_center_instances(&self) -> Result<Vec<InstanceInfo>>;

    /// Id of the organization's root unit.
    async fn root_unit_id(&self) -> Result<String>;

    /// Organizational units directly under `parent_id`.
    async fn units_under_parent(&self, parent_id: &str) -> Result<Vec<OrgUnit>>;

    /// Accounts directly under the unit `parent_id`.
    async fn accounts_under_parent(&self, parent_id: &str) -> Result<Vec<Account>>;

    /// One page of the organization-wide account listing.
    async fn list_accounts(&self, page_token: Option<String>) -> Result<Page<AccountSummary>>;

    /// One page of the user listing for an Identity Store.
    async fn list_users(
        &self,
        identity_store_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<User>>;

    /// One page of the group listing for an Identity Store.
    async fn list_groups(
        &self,
        identity_store_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<Group>>;

    /// One page of permission-set ARNs for an instance.
    async fn list_permission_sets(
        &self,
        instance_arn: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>>;

    /// Full description of a single permission set.
    async fn describe_permission_set(
        &self,
        instance_arn: &str,
        permission_set_arn: &str,
    ) -> Result<PermissionSet>;

    /// One page of member user ids for a group.
    async fn list_group_memberships(
        &self,
        identity_store_id: &str,
        group_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>>;

    /// One page of assignments scoped to an (account, permission set) pair.
    async fn list_account_assignments(
        &self,
        instance_arn: &str,
        account_id: &str,
        permission_set_arn: &str,
        page_token: Option<String>,
    ) -> Result<Page<AssignmentRecord>>;
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    fn page(items: &[&str], next: Option<&str>) -> Page<String> {
        Page {
            items: items.iter().map(|s| s.to_string()).collect(),
            next_token: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn drain_pages_concatenates_in_page_order() -> Result<()> {
        let mut served = Vec::new();
        let items = drain_pages(|token| {
            served.push(token.clone());
            let result = match token.as_deref() {
                None => page(&["a", "b"], Some("1")),
                Some("1") => page(&[], Some("2")),
                Some("2") => page(&["c"], None),
                other => panic!("unexpected token {other:?}"),
            };
            async move { Ok(result) }
        })
        .await?;

        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(served, vec![None, Some("1".to_string()), Some("2".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn drain_pages_single_page_without_token() -> Result<()> {
        let items = drain_pages(|token| {
            assert!(token.is_none());
            async { Ok(page(&["only"], None)) }
        })
        .await?;

        assert_eq!(items, vec!["only"]);
        Ok(())
    }

    #[tokio::test]
    async fn drain_pages_propagates_page_failure() {
        let result: Result<Vec<String>> = drain_pages(|token| async move {
            match token {
                None => Ok(page(&["a"], Some("1"))),
                Some(_) => bail!("listing throttled"),
            }
        })
        .await;

        let err = result.expect_err("second page should fail the drain");
        assert!(err.to_string().contains("throttled"));
    }
}
