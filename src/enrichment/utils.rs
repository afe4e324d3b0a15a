/// Members of neighborhood `node` stored in flattened connectivity form, or `None` if the
/// layout points outside `connectivity`.
pub(crate) fn neighborhood<'a>(
    connectivity: &'a [usize],
    starts: &[usize],
    offsets: &[usize],
    node: usize,
) -> Option<&'a [usize]> {
    let start = *starts.get(node)?;
    let end = start.checked_add(*offsets.get(node)?)?;
    connectivity.get(start..end)
}

pub(crate) fn unique_members(members: &[usize]) -> Vec<usize> {
    let mut unique = members.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique
}
