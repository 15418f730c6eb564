use std::fmt::Write;

use crate::inventory::Inventory;

const TEMPLATE: &str = "\
# AWS IAM Identity Center Inventory

- Retrieved at: {datetime}
- Executed Account: {account_name} ({account_id})

## IAM Identity Center Information

- Instance ARN: {instance_arn}
- Identity Store ID: {identity_store_id}

## AWS Accounts

{accounts}

## Users

{users}

## Groups

{groups}

## Group Memberships

{group_memberships}

## Permission Sets

{permission_sets}

## Assignments

{assignments}
";

/// Render the whole inventory into the fixed report template. Every
/// relation is sorted by its composite key before tabulation, so the
/// report is byte-identical across runs over the same directory state.
pub fn render(inventory: &Inventory, stamp: &str) -> String {
    let mut accounts: Vec<Vec<String>> = inventory
        .accounts
        .iter()
        .map(|(id, name)| vec![name.to_string(), id.to_string()])
        .collect();
    accounts.sort();

    let mut users: Vec<Vec<String>> = inventory
        .users
        .iter()
        .map(|(id, name)| vec![name.to_string(), id.to_string()])
        .collect();
    users.sort();

    let mut groups: Vec<Vec<String>> = inventory
        .groups
        .iter()
        .map(|(id, name)| vec![name.to_string(), id.to_string()])
        .collect();
    groups.sort();

    let mut memberships: Vec<Vec<String>> = inventory
        .memberships
        .iter()
        .map(|m| vec![m.group_name.clone(), m.user_name.clone()])
        .collect();
    memberships.sort();

    let mut permission_sets: Vec<Vec<String>> = inventory
        .permission_sets
        .iter()
        .map(|ps| vec![ps.name.clone(), ps.description.clone().unwrap_or_default(), ps.arn.clone()])
        .collect();
    permission_sets.sort();

    let mut assignments: Vec<Vec<String>> = inventory
        .assignments
        .iter()
        .map(|a| {
            vec![
                a.account_name.clone(),
                a.principal_type.clone(),
                a.principal_name.clone(),
                a.permission_set_name.clone(),
            ]
        })
        .collect();
    assignments.sort();

    TEMPLATE
        .replace("{datetime}", stamp)
        .replace("{account_name}", &inventory.caller_account_name)
        .replace("{account_id}", &inventory.caller_account_id)
        .replace("{instance_arn}", &inventory.instance.instance_arn)
        .replace("{identity_store_id}", &inventory.instance.identity_store_id)
        .replace("{accounts}", &table(&["Account Name", "Account ID"], &accounts))
        .replace("{users}", &table(&["Display Name", "User ID"], &users))
        .replace("{groups}", &table(&["Display Name", "Group ID"], &groups))
        .replace("{group_memberships}", &table(&["Group Name", "User Name"], &memberships))
        .replace(
            "{permission_sets}",
            &table(&["Permission Set Name", "Description", "Permission Set ARN"], &permission_sets),
        )
        .replace(
            "{assignments}",
            &table(
                &["Account Name", "Principal Type", "Principal Name", "Permission Set Name"],
                &assignments,
            ),
        )
}

/// GitHub-style pipe table with cells padded to the widest entry of each
/// column.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    out.push('|');
    for (header, width) in headers.iter().zip(&widths) {
        let _ = write!(out, " {:<width$} |", header, width = *width);
    }

    out.push_str("\n|");
    for width in &widths {
        let _ = write!(out, "{:-<width$}|", "", width = *width + 2);
    }

    for row in rows {
        out.push_str("\n|");
        for (cell, width) in row.iter().zip(&widths) {
            let _ = write!(out, " {:<width$} |", cell, width = *width);
        }
    }

    out
}
