use anyhow::{bail, Result};
use itertools::Itertools;
use tracing::info;

use crate::{
    directory::{drain_pages, Account, InstanceInfo, OrgDirectory, PermissionSet},
    hierarchy,
    index::{resolve_principal, NameIndex},
};

/// Name under which the organization root appears in every OU path.
pub const ROOT_NAME: &str = "root";

/// Fallback label when the executing account is not part of the listing.
const UNKNOWN_ACCOUNT: &str = "Unknown";

/// A group → user membership edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub group_name: String,
    pub user_name: String,
}

/// An account × permission-set assignment edge, resolved to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub account_name: String,
    pub principal_type: String,
    pub principal_name: String,
    pub permission_set_name: String,
}

/// An account placed under its organizational unit.
#[derive(Debug, Clone)]
pub struct AccountPlacement {
    pub account: Account,
    pub ou_path: String,
    pub ou_id: String,
}

/// Everything one Identity Center inventory pass collects. All fields are
/// plain values; nothing here goes back to the directory.
pub struct Inventory {
    pub caller_account_id: String,
    pub caller_account_name: String,
    pub instance: InstanceInfo,
    pub accounts: NameIndex,
    pub users: NameIndex,
    pub groups: NameIndex,
    pub permission_sets: Vec<PermissionSet>,
    pub memberships: Vec<Membership>,
    pub assignments: Vec<Assignment>,
}

/// Run the full Identity Center inventory pass: drain the primary
/// collections, build the name indices, then enumerate membership and
/// assignment edges. Halts with an error before producing anything when
/// no Identity Center instance exists.
pub async fn collect<D>(directory: &D) -> Result<Inventory>
where
    D: OrgDirectory + ?Sized,
{
    info!("Fetching AWS accounts...");
    let account_records = drain_pages(|token| directory.list_accounts(token)).await?;
    let accounts = NameIndex::build(&account_records, |a| &a.id, |a| &a.name);
    info!("Number of accounts: {}", accounts.len());

    let caller_account_id = directory.caller_account_id().await?;
    let caller_account_name =
        accounts.get(&caller_account_id).unwrap_or(UNKNOWN_ACCOUNT).to_string();

    let instances = directory.identity_center_instances().await?;
    let Some(instance) = instances.into_iter().next() else {
        bail!("No IAM Identity Center instance found");
    };

    info!("Fetching users...");
    let user_records =
        drain_pages(|token| directory.list_users(&instance.identity_store_id, token)).await?;
    let users = NameIndex::build(&user_records, |u| &u.id, |u| &u.display_name);
    info!("Number of users: {}", users.len());

    info!("Fetching groups...");
    let group_records =
        drain_pages(|token| directory.list_groups(&instance.identity_store_id, token)).await?;
    let groups = NameIndex::build(&group_records, |g| &g.id, |g| &g.display_name);
    info!("Number of groups: {}", groups.len());

    info!("Fetching permission sets...");
    let arns =
        drain_pages(|token| directory.list_permission_sets(&instance.instance_arn, token)).await?;
    let mut permission_sets = Vec::with_capacity(arns.len());
    for arn in &arns {
        permission_sets.push(directory.describe_permission_set(&instance.instance_arn, arn).await?);
    }
    let permission_set_names = NameIndex::build(&permission_sets, |ps| &ps.arn, |ps| &ps.name);
    info!("Number of permission sets: {}", permission_set_names.len());

    let memberships =
        enumerate_memberships(directory, &instance.identity_store_id, &groups, &users).await?;
    let assignments = enumerate_assignments(
        directory,
        &instance.instance_arn,
        &accounts,
        &permission_set_names,
        &users,
        &groups,
    )
    .await?;

    Ok(Inventory {
        caller_account_id,
        caller_account_name,
        instance,
        accounts,
        users,
        groups,
        permission_sets,
        memberships,
        assignments,
    })
}

/// One paginated membership listing per group, each member resolved
/// through the user index.
async fn enumerate_memberships<D>(
    directory: &D,
    identity_store_id: &str,
    groups: &NameIndex,
    users: &NameIndex,
) -> Result<Vec<Membership>>
where
    D: OrgDirectory + ?Sized,
{
    info!("Fetching group memberships...");
    let mut edges = Vec::new();

    for (group_id, group_name) in groups.iter() {
        let member_ids = drain_pages(|token| {
            directory.list_group_memberships(identity_store_id, group_id, token)
        })
        .await?;
        for member_id in member_ids {
            edges.push(Membership {
                group_name: group_name.to_string(),
                user_name: users.resolve(&member_id),
            });
        }
    }

    info!("Number of group memberships: {}", edges.len());
    Ok(edges)
}

/// One paginated assignment listing per (account, permission set) pair.
///
/// Every pair of the full cross-product is queried, whether or not any
/// assignment exists for it; pairs are never batched or skipped. Costly
/// for large organizations, but the run is a periodic inventory, not an
/// interactive query.
async fn enumerate_assignments<D>(
    directory: &D,
    instance_arn: &str,
    accounts: &NameIndex,
    permission_sets: &NameIndex,
    users: &NameIndex,
    groups: &NameIndex,
) -> Result<Vec<Assignment>>
where
    D: OrgDirectory + ?Sized,
{
    info!("Fetching account assignments...");
    let mut edges = Vec::new();

    for ((account_id, account_name), (ps_arn, ps_name)) in
        accounts.iter().cartesian_product(permission_sets.iter())
    {
        info!("Fetching assignments for {account_name}, {ps_name}...");
        let records = drain_pages(|token| {
            directory.list_account_assignments(instance_arn, account_id, ps_arn, token)
        })
        .await?;
        for record in records {
            let principal_name =
                resolve_principal(users, groups, &record.principal_type, &record.principal_id);
            edges.push(Assignment {
                account_name: account_name.to_string(),
                principal_type: record.principal_type,
                principal_name,
                permission_set_name: ps_name.to_string(),
            });
        }
    }

    info!("Number of assignments: {}", edges.len());
    Ok(edges)
}

/// Walk the OU tree and gather every account under its unit's path. This
/// is the accounts-with-OU-path relation behind the CSV export.
pub async fn account_placements<D>(directory: &D) -> Result<Vec<AccountPlacement>>
where
    D: OrgDirectory + ?Sized,
{
    info!("Building organizational unit paths...");
    let root_id = directory.root_unit_id().await?;
    let paths = hierarchy::ou_paths(directory, &root_id, ROOT_NAME).await?;
    info!("Number of organizational units: {}", paths.len());

    let mut placements = Vec::new();
    for (ou_id, ou_path) in &paths {
        info!("Searching accounts in {ou_path}...");
        for account in directory.accounts_under_parent(ou_id).await? {
            placements.push(AccountPlacement {
                account,
                ou_path: ou_path.clone(),
                ou_id: ou_id.clone(),
            });
        }
    }

    Ok(placements)
}
