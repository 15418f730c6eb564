use anyhow::Result;
use chrono::{TimeZone, Utc};
use orgatlas::directory::{mock::MockDirectory, Account, OrgUnit};
use orgatlas::{inventory, reporter};
use tempfile::tempdir;

fn account(id: &str, name: &str, email: &str) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        status: "ACTIVE".to_string(),
        joined_method: "CREATED".to_string(),
        joined_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn fixture() -> MockDirectory {
    let mut directory = MockDirectory::new();
    directory.root_id = "r-1".to_string();
    directory.units.insert(
        "r-1".to_string(),
        vec![OrgUnit { id: "ou-1".to_string(), name: "Security".to_string() }],
    );
    directory
        .accounts_by_parent
        .insert("ou-1".to_string(), vec![account("111", "audit-acct", "a@x.com")]);
    directory
}

/// Split one CSV line of unconditionally quoted fields.
fn fields(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                out.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    out.push(current);
    out
}

#[tokio::test]
async fn writes_the_expected_row_for_a_nested_account() -> Result<()> {
    let directory = fixture();
    let output_dir = tempdir()?;

    let placements = inventory::account_placements(&directory).await?;
    let path = reporter::write_accounts_csv(&placements, output_dir.path(), "2024-06-01_12-00-00")?;

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("accounts_2024-06-01_12-00-00.csv")
    );

    let csv = std::fs::read_to_string(&path)?;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(r#""Name","Id","OU Path","OU ID","Email","Status","JoinedMethod","JoinedTimestamp""#)
    );
    assert_eq!(
        lines.next(),
        Some(
            r#""audit-acct","111","root/Security","ou-1","a@x.com","ACTIVE","CREATED","2023/01/01 00:00:00""#
        )
    );
    assert_eq!(lines.next(), None);
    Ok(())
}

#[tokio::test]
async fn rows_round_trip_sorted_with_no_blank_fields() -> Result<()> {
    let mut directory = fixture();
    directory.units.insert(
        "ou-1".to_string(),
        vec![OrgUnit { id: "ou-2".to_string(), name: "Prod".to_string() }],
    );
    directory
        .accounts_by_parent
        .insert("r-1".to_string(), vec![account("999", "zulu", "z@x.com")]);
    directory
        .accounts_by_parent
        .insert("ou-2".to_string(), vec![account("555", "audit-acct", "b@x.com")]);
    let output_dir = tempdir()?;

    let placements = inventory::account_placements(&directory).await?;
    let path = reporter::write_accounts_csv(&placements, output_dir.path(), "2024-06-01_12-00-01")?;

    let csv = std::fs::read_to_string(&path)?;
    let rows: Vec<Vec<String>> = csv.lines().skip(1).map(fields).collect();
    assert_eq!(rows.len(), 3);

    let keys: Vec<(String, String)> =
        rows.iter().map(|row| (row[0].clone(), row[2].clone())).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "rows should be ordered by (Name, OU Path)");

    for row in &rows {
        assert_eq!(row.len(), 8);
        for field in row {
            assert!(!field.is_empty(), "no field should be blank: {row:?}");
        }
    }

    // Same account name in two units: the OU path breaks the tie.
    assert_eq!(rows[0][0], "audit-acct");
    assert_eq!(rows[0][2], "root/Security");
    assert_eq!(rows[1][0], "audit-acct");
    assert_eq!(rows[1][2], "root/Security/Prod");
    assert_eq!(rows[2][0], "zulu");
    assert_eq!(rows[2][2], "root");
    Ok(())
}

#[tokio::test]
async fn walk_failure_produces_no_csv() -> Result<()> {
    let mut directory = fixture();
    directory.set_healthy(false);

    assert!(inventory::account_placements(&directory).await.is_err());
    Ok(())
}
