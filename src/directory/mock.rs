//! In-memory directory for tests.
//!
//! Serves fixture data through the same paginated surface as the real
//! directory and records how many pagination sequences each relation
//! listing started, so tests can assert call-count properties.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{
    Account, AccountSummary, AssignmentRecord, Group, InstanceInfo, OrgDirectory, OrgUnit, Page,
    PermissionSet, User,
};

/// Counters describing the remote traffic a run generated.
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    /// Pagination sequences started against the membership listing.
    pub membership_sequences: usize,
    /// Pagination sequences started against the assignment listing.
    pub assignment_sequences: usize,
    /// Every (account id, permission set ARN) pair that was queried.
    pub assignment_pairs: Vec<(String, String)>,
    /// Total pages served across all listings.
    pub pages_served: usize,
}

/// Configurable in-memory [`OrgDirectory`].
pub struct MockDirectory {
    pub caller_account: String,
    pub instances: Vec<InstanceInfo>,
    pub root_id: String,
    /// parent unit id → child units, in listing order.
    pub units: BTreeMap<String, Vec<OrgUnit>>,
    /// parent unit id → accounts directly under it.
    pub accounts_by_parent: BTreeMap<String, Vec<Account>>,
    pub accounts: Vec<AccountSummary>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub permission_sets: Vec<PermissionSet>,
    /// group id → member user ids.
    pub memberships: BTreeMap<String, Vec<String>>,
    /// (account id, permission set ARN) → assignment records.
    pub assignments: BTreeMap<(String, String), Vec<AssignmentRecord>>,
    /// Records per page; 0 serves each listing in a single page.
    pub page_size: usize,
    healthy: bool,
    calls: Mutex<CallLog>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self {
            caller_account: String::new(),
            instances: Vec::new(),
            root_id: "r-root".to_string(),
            units: BTreeMap::new(),
            accounts_by_parent: BTreeMap::new(),
            accounts: Vec::new(),
            users: Vec::new(),
            groups: Vec::new(),
            permission_sets: Vec::new(),
            memberships: BTreeMap::new(),
            assignments: BTreeMap::new(),
            page_size: 0,
            healthy: true,
            calls: Mutex::new(CallLog::default()),
        }
    }
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve every listing in pages of `size` records.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// When unhealthy, every operation fails, as a throttled or
    /// unreachable endpoint would.
    pub fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    /// Snapshot of the traffic counters.
    pub fn calls(&self) -> CallLog {
        self.calls.lock().expect("call log lock").clone()
    }

    fn ensure_healthy(&self) -> Result<()> {
        if !self.healthy {
            bail!("directory unavailable");
        }
        Ok(())
    }

    fn page_of<T: Clone>(&self, items: &[T], token: Option<String>) -> Page<T> {
        let start: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let size = if self.page_size == 0 { items.len().max(1) } else { self.page_size };
        let end = (start + size).min(items.len());

        self.calls.lock().expect("call log lock").pages_served += 1;

        Page {
            items: items[start.min(end)..end].to_vec(),
            next_token: (end < items.len()).then(|| end.to_string()),
        }
    }
}

#[async_trait]
impl OrgDirectory for MockDirectory {
    async fn caller_account_id(&self) -> Result<String> {
        self.ensure_healthy()?;
        Ok(self.caller_account.clone())
    }

    async fn identity_center_instances(&self) -> Result<Vec<InstanceInfo>> {
        self.ensure_healthy()?;
        Ok(self.instances.clone())
    }

    async fn root_unit_id(&self) -> Result<String> {
        self.ensure_healthy()?;
        Ok(self.root_id.clone())
    }

    async fn units_under_parent(&self, parent_id: &str) -> Result<Vec<OrgUnit>> {
        self.ensure_healthy()?;
        Ok(self.units.get(parent_id).cloned().unwrap_or_default())
    }

    async fn accounts_under_parent(&self, parent_id: &str) -> Result<Vec<Account>> {
        self.ensure_healthy()?;
        Ok(self.accounts_by_parent.get(parent_id).cloned().unwrap_or_default())
    }

    async fn list_accounts(&self, page_token: Option<String>) -> Result<Page<AccountSummary>> {
        self.ensure_healthy()?;
        Ok(self.page_of(&self.accounts, page_token))
    }

    async fn list_users(
        &self,
        _identity_store_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<User>> {
        self.ensure_healthy()?;
        Ok(self.page_of(&self.users, page_token))
    }

    async fn list_groups(
        &self,
        _identity_store_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<Group>> {
        self.ensure_healthy()?;
        Ok(self.page_of(&self.groups, page_token))
    }

    async fn list_permission_sets(
        &self,
        _instance_arn: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>> {
        self.ensure_healthy()?;
        let arns: Vec<String> = self.permission_sets.iter().map(|ps| ps.arn.clone()).collect();
        Ok(self.page_of(&arns, page_token))
    }

    async fn describe_permission_set(
        &self,
        _instance_arn: &str,
        permission_set_arn: &str,
    ) -> Result<PermissionSet> {
        self.ensure_healthy()?;
        match self.permission_sets.iter().find(|ps| ps.arn == permission_set_arn) {
            Some(ps) => Ok(ps.clone()),
            None => bail!("unknown permission set {permission_set_arn}"),
        }
    }

    async fn list_group_memberships(
        &self,
        _identity_store_id: &str,
        group_id: &str,
        page_token: Option<String>,
    ) -> Result<Page<String>> {
        self.ensure_healthy()?;
        if page_token.is_none() {
            self.calls.lock().expect("call log lock").membership_sequences += 1;
        }
        let members = self.memberships.get(group_id).cloned().unwrap_or_default();
        Ok(self.page_of(&members, page_token))
    }

    async fn list_account_assignments(
        &self,
        _instance_arn: &str,
        account_id: &str,
        permission_set_arn: &str,
        page_token: Option<String>,
    ) -> Result<Page<AssignmentRecord>> {
        self.ensure_healthy()?;
        if page_token.is_none() {
            let mut calls = self.calls.lock().expect("call log lock");
            calls.assignment_sequences += 1;
            calls.assignment_pairs.push((account_id.to_string(), permission_set_arn.to_string()));
        }
        let records = self
            .assignments
            .get(&(account_id.to_string(), permission_set_arn.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(self.page_of(&records, page_token))
    }
}
