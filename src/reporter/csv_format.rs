use crate::inventory::AccountPlacement;

const HEADER: [&str; 8] =
    ["Name", "Id", "OU Path", "OU ID", "Email", "Status", "JoinedMethod", "JoinedTimestamp"];

const JOINED_AT_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Render the accounts-with-OU-path relation as CSV, rows sorted by
/// (Name, OU Path). Every field is quoted unconditionally so consumers
/// never have to guess at embedded commas.
pub fn render(placements: &[AccountPlacement]) -> String {
    let mut rows: Vec<[String; 8]> = placements
        .iter()
        .map(|p| {
            [
                p.account.name.clone(),
                p.account.id.clone(),
                p.ou_path.clone(),
                p.ou_id.clone(),
                p.account.email.clone(),
                p.account.status.clone(),
                p.account.joined_method.clone(),
                p.account.joined_at.format(JOINED_AT_FORMAT).to_string(),
            ]
        })
        .collect();
    rows.sort_by(|a, b| (&a[0], &a[2]).cmp(&(&b[0], &b[2])));

    let mut out = line(HEADER.iter().copied());
    for row in &rows {
        out.push_str(&line(row.iter().map(String::as_str)));
    }
    out
}

fn line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut out =
        fields.map(quote).collect::<Vec<_>>().join(",");
    out.push('\n');
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::directory::Account;

    use super::*;

    fn placement(name: &str, id: &str, ou_path: &str, ou_id: &str) -> AccountPlacement {
        AccountPlacement {
            account: Account {
                id: id.to_string(),
                name: name.to_string(),
                email: format!("{id}@example.com"),
                status: "ACTIVE".to_string(),
                joined_method: "CREATED".to_string(),
                joined_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            },
            ou_path: ou_path.to_string(),
            ou_id: ou_id.to_string(),
        }
    }

    #[test]
    fn quote_always_wraps_and_doubles_interior_quotes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("with,comma"), "\"with,comma\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn header_row_comes_first() {
        let csv = render(&[]);
        assert_eq!(
            csv,
            "\"Name\",\"Id\",\"OU Path\",\"OU ID\",\"Email\",\"Status\",\"JoinedMethod\",\"JoinedTimestamp\"\n"
        );
    }

    #[test]
    fn rows_are_sorted_by_name_then_ou_path() {
        let csv = render(&[
            placement("beta", "222", "root", "r-1"),
            placement("alpha", "111", "root/Z", "ou-z"),
            placement("alpha", "333", "root/A", "ou-a"),
        ]);

        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert!(rows[0].starts_with("\"alpha\",\"333\",\"root/A\""));
        assert!(rows[1].starts_with("\"alpha\",\"111\",\"root/Z\""));
        assert!(rows[2].starts_with("\"beta\",\"222\",\"root\""));
    }

    #[test]
    fn joined_timestamp_uses_slash_date_format() {
        let csv = render(&[placement("audit-acct", "111", "root/Security", "ou-1")]);
        assert!(csv.contains("\"2023/01/01 00:00:00\""));
    }
}
