use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_identitystore::types::MemberId;
use aws_sdk_identitystore::Client as IdentityStoreClient;
use aws_sdk_organizations::primitives::DateTime as SmithyDateTime;
use aws_sdk_organizations::Client as OrganizationsClient;
use aws_sdk_ssoadmin::Client as SsoAdminClient;
use aws_sdk_sts::Client as StsClient;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{
    drain_pages, Account, AccountSummary, AssignmentRecord, Group, InstanceInfo, OrgDirectory,
    OrgUnit, Page, PermissionSet, User,
};

/// The real directory: AWS Organizations, Identity Store, SSO Admin, and
/// STS clients sharing one resolved `SdkConfig`.
pub struct AwsDirectory {
    organizations: OrganizationsClient,
    identity_store: IdentityStoreClient,
    sso_admin: SsoAdminClient,
    sts: StsClient,
}

impl AwsDirectory {
    /// Build the client set from the default credential/region chain.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            organizations: OrganizationsClient::new(config),
            identity_store: IdentityStoreClient::new(config),
            sso_admin: SsoAdminClient::new(config),
            sts: StsClient::new(config),
        }
    }
}

fn to_chrono(timestamp: Option<&SmithyDateTime>) -> DateTime<Utc> {
    timestamp
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[async_trait]
impl OrgDirectory for AwsDirectory {
    async fn caller_account_id(&self) -> Result<String> {
        let caller = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .context("Failed to call sts:GetCallerIdentity")?;
        Ok(caller.account().unwrap_or_default().to_string())
    }

    async fn identity_center_instances(&self) -> Result<Vec<InstanceInfo>> {
        let resp = self
            .sso_admin
            .list_instances()
            .send()
            .await
            .context("Failed to list IAM Identity Center instances")?;

        Ok(resp
            .instances()
            .iter()
            .map(|instance| InstanceInfo {
                instance_arn: instance.instance_arn().unwrap_or_default().to_string(),
                identity_store_id: instance.identity_store_id().unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn root_unit_id(&self) -> Result<String> {
        let resp =
            self.organizations.list_roots().send().await.context("Failed to list organization roots")?;
        Ok(resp.roots().first().and_then(|root| root.id()).unwrap_or_default().to_string())
    }

    async fn units_under_parent(&self, parent_id: &str) -> Result<Vec<OrgUnit>> {
        drain_pages(|token| async move {
            let mut req =
                self.organizations.list_organizational_units_for_parent().parent_id(parent_id);
            if let Some(token) = token {
                req = req.next_token(token);
            }
            let resp = req.send().await.with_context(|| {
                format!("Failed to list organizational units under {parent_id}")
            })?;

            let items = resp
                .organizational_units()
                .iter()
                .map(|unit| OrgUnit {
                    id: unit.id().unwrap_or_default().to_string(),
                    name: unit.name().unwrap_or_default().to_string(),
                })
                .collect();
            Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
        })
        .await
    }

    async fn accounts_under_parent(&self, parent_id: &str) -> Result<Vec<Account>> {
        drain_pages(|token| async move {
            let mut req = self.organizations.list_accounts_for_parent().parent_id(parent_id);
            if let Some(token) = token {
                req = req.next_token(token);
            }
            let resp = req
                .send()
                .await
                .with_context(|| format!("Failed to list accounts under {parent_id}"))?;

            let items = resp
                .accounts()
                .iter()
                .map(|account| Account {
                    id: account.id().unwrap_or_default().to_string(),
                    name: account.name().unwrap_or_default().to_string(),
                    email: account.email().unwrap_or_default().to_string(),
                    status: account.status().map(|s| s.as_str()).unwrap_or_default().to_string(),
                    joined_method: account
                        .joined_method()
                        .map(|m| m.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    joined_at: to_chrono(account.joined_timestamp()),
                })
                .collect();
            Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
        })
        .await
    }

    async fn list_accounts(&self, page_token: Option<String>) -> Result<Page<AccountSummary>> {
        let mut req = self.organizations.list_accounts();
        if let Some(token) = page_token {
            req = req.next_token(token);
        }
        let resp = req.send().await.context("Failed to list organization accounts")?;

        let items = resp
            .accounts()
            .iter()
            .map(|account| AccountSummary {
                id: account.id().unwrap_or_default().to_string(),
                name: account.name().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
    }

    async fn list_users(
        &self,
        identity_store_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<User>> {
        let mut req = self.identity_store.list_users().identity_store_id(identity_store_id);
        if let Some(token) = page_token {
            req = req.next_token(token);
        }
        let resp = req.send().await.context("Failed to list Identity Store users")?;

        let items = resp
            .users()
            .iter()
            .map(|user| User {
                id: user.user_id().to_string(),
                display_name: user.display_name().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
    }

    async fn list_groups(
        &self,
        identity_store_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<Group>> {
        let mut req = self.identity_store.list_groups().identity_store_id(identity_store_id);
        if let Some(token) = page_token {
            req = req.next_token(token);
        }
        let resp = req.send().await.context("Failed to list Identity Store groups")?;

        let items = resp
            .groups()
            .iter()
            .map(|group| Group {
                id: group.group_id().to_string(),
                display_name: group.display_name().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
    }

    async fn list_permission_sets(
        &self,
        instance_arn: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>> {
        let mut req = self.sso_admin.list_permission_sets().instance_arn(instance_arn);
        if let Some(token) = page_token {
            req = req.next_token(token);
        }
        let resp = req.send().await.context("Failed to list permission sets")?;

        Ok(Page {
            items: resp.permission_sets().to_vec(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_permission_set(
        &self,
        instance_arn: &str,
        permission_set_arn: &str,
    ) -> Result<PermissionSet> {
        let resp = self
            .sso_admin
            .describe_permission_set()
            .instance_arn(instance_arn)
            .permission_set_arn(permission_set_arn)
            .send()
            .await
            .with_context(|| format!("Failed to describe permission set {permission_set_arn}"))?;

        let described = resp.permission_set();
        Ok(PermissionSet {
            arn: described
                .and_then(|ps| ps.permission_set_arn())
                .unwrap_or(permission_set_arn)
                .to_string(),
            name: described.and_then(|ps| ps.name()).unwrap_or_default().to_string(),
            description: described.and_then(|ps| ps.description()).map(str::to_string),
        })
    }

    async fn list_group_memberships(
        &self,
        identity_store_id: &str,
        group_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>> {
        let mut req = self
            .identity_store
            .list_group_memberships()
            .identity_store_id(identity_store_id)
            .group_id(group_id);
        if let Some(token) = page_token {
            req = req.next_token(token);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to list memberships of group {group_id}"))?;

        let mut items = Vec::new();
        for membership in resp.group_memberships() {
            match membership.member_id() {
                Some(MemberId::UserId(user_id)) => items.push(user_id.clone()),
                other => {
                    warn!("Skipping membership in group {group_id} with member id {other:?}");
                }
            }
        }
        Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
    }

    async fn list_account_assignments(
        &self,
        instance_arn: &str,
        account_id: &str,
        permission_set_arn: &str,
        page_token: Option<String>,
    ) -> Result<Page<AssignmentRecord>> {
        let mut req = self
            .sso_admin
            .list_account_assignments()
            .instance_arn(instance_arn)
            .account_id(account_id)
            .permission_set_arn(permission_set_arn);
        if let Some(token) = page_token {
            req = req.next_token(token);
        }
        let resp = req.send().await.with_context(|| {
            format!("Failed to list assignments for account {account_id} and {permission_set_arn}")
        })?;

        let items = resp
            .account_assignments()
            .iter()
            .map(|assignment| AssignmentRecord {
                principal_type: assignment
                    .principal_type()
                    .map(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
                principal_id: assignment.principal_id().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(Page { items, next_token: resp.next_token().map(str::to_string) })
    }
}
