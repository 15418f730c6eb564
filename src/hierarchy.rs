use std::collections::BTreeMap;

use anyhow::Result;
use tracing::debug;

use crate::directory::OrgDirectory;

/// Expand the organizational-unit tree under `root_id` into a flat map
/// from unit id to its `/`-joined path.
///
/// The walk keeps an explicit frontier instead of recursing, so tree depth
/// never translates into stack depth. Each popped unit contributes exactly
/// one entry (unit ids are globally unique); its children are listed and
/// pushed with the parent's path as their prefix. The root's path is its
/// own name, with no leading separator.
pub async fn ou_paths<D>(
    directory: &D,
    root_id: &str,
    root_name: &str,
) -> Result<BTreeMap<String, String>>
where
    D: OrgDirectory + ?Sized,
{
    let mut paths = BTreeMap::new();
    let mut frontier = vec![(root_id.to_string(), root_name.to_string())];

    while let Some((unit_id, path)) = frontier.pop() {
        for child in directory.units_under_parent(&unit_id).await? {
            frontier.push((child.id, format!("{path}/{}", child.name)));
        }
        debug!("discovered organizational unit {unit_id} at {path}");
        paths.insert(unit_id, path);
    }

    Ok(paths)
}
