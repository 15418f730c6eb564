use std::collections::BTreeMap;

/// Placeholder for an id referenced by a relation but absent from its
/// owning collection: the principal was removed from the directory after
/// the reference was created.
fn deleted(id: &str) -> String {
    format!("#DELETED({id})")
}

/// An id → display-name lookup built in one pass over a primary
/// collection. Ids are unique by construction of the source collection,
/// so no insert ever overwrites. Iteration order is id order, which keeps
/// downstream enumeration deterministic.
#[derive(Debug, Default, Clone)]
pub struct NameIndex(BTreeMap<String, String>);

impl NameIndex {
    pub fn build<T>(
        items: &[T],
        id: impl Fn(&T) -> &str,
        name: impl Fn(&T) -> &str,
    ) -> Self {
        Self(items.iter().map(|item| (id(item).to_string(), name(item).to_string())).collect())
    }

    /// Display name for `id`, or the `#DELETED(<id>)` placeholder when the
    /// id is dangling. Never fails: directory drift is surfaced in the
    /// report instead of aborting the run.
    pub fn resolve(&self, id: &str) -> String {
        match self.0.get(id) {
            Some(name) => name.clone(),
            None => deleted(id),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + Clone {
        self.0.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }
}

/// Resolve an assignment principal by its declared type: USER and GROUP
/// dispatch to the matching index; any other type is an unknown principal
/// regardless of what the indices contain.
pub fn resolve_principal(
    users: &NameIndex,
    groups: &NameIndex,
    principal_type: &str,
    principal_id: &str,
) -> String {
    match principal_type {
        "USER" => users.resolve(principal_id),
        "GROUP" => groups.resolve(principal_id),
        _ => format!("#UNKNOWN({principal_id})"),
    }
}

#[cfg(test)]
mod tests {
    use crate::directory::User;

    use super::*;

    fn user(id: &str, name: &str) -> User {
        User { id: id.to_string(), display_name: name.to_string() }
    }

    fn user_index() -> NameIndex {
        NameIndex::build(
            &[user("u-1", "Alice Doe"), user("u-2", "Bob Roe")],
            |u| &u.id,
            |u| &u.display_name,
        )
    }

    #[test]
    fn build_maps_every_record() {
        let index = user_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("u-1"), Some("Alice Doe"));
        assert_eq!(index.get("u-2"), Some("Bob Roe"));
    }

    #[test]
    fn resolve_known_id_returns_display_name() {
        assert_eq!(user_index().resolve("u-1"), "Alice Doe");
    }

    #[test]
    fn resolve_dangling_id_returns_placeholder() {
        assert_eq!(user_index().resolve("u-999"), "#DELETED(u-999)");
        assert_eq!(NameIndex::default().resolve("anything"), "#DELETED(anything)");
    }

    #[test]
    fn principal_dispatch_picks_the_matching_index() {
        let users = user_index();
        let groups = NameIndex::build(
            &[user("g-1", "Admins")],
            |g| &g.id,
            |g| &g.display_name,
        );

        assert_eq!(resolve_principal(&users, &groups, "USER", "u-1"), "Alice Doe");
        assert_eq!(resolve_principal(&users, &groups, "GROUP", "g-1"), "Admins");
        assert_eq!(resolve_principal(&users, &groups, "USER", "g-1"), "#DELETED(g-1)");
    }

    #[test]
    fn unrecognized_principal_type_is_unknown_even_when_indexed() {
        let users = user_index();
        let groups = NameIndex::default();

        // u-1 exists in the user index, but the type says otherwise.
        assert_eq!(resolve_principal(&users, &groups, "APPLICATION", "u-1"), "#UNKNOWN(u-1)");
        assert_eq!(resolve_principal(&users, &groups, "", "u-1"), "#UNKNOWN(u-1)");
    }
}
