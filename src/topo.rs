//! Declaration order for record types (Kahn's algorithm).
use std::collections::{BTreeSet, VecDeque};

use indexmap::IndexMap;

use crate::error::{GenError, Result};
use crate::inference::Registry;

/// Order `registry` so every type follows the types its fields reference.
///
/// Self-references count as edges, so a type that contains itself (possible
/// after a name collision) is reported instead of silently dropped.
pub fn order(registry: &Registry) -> Result<Vec<String>> {
    let mut deps: IndexMap<&str, BTreeSet<&str>> = registry
        .iter()
        .map(|(name, fields)| {
            let refs = fields
                .values()
                .filter_map(|ty| ty.record_name())
                .filter(|r| registry.contains(r))
                .collect();
            (name, refs)
        })
        .collect();

    let mut queue: VecDeque<&str> = deps
        .iter()
        .filter(|(_, d)| d.is_empty())
        .map(|(name, _)| *name)
        .collect();
    let mut out = Vec::with_capacity(deps.len());

    while let Some(done) = queue.pop_front() {
        out.push(done.to_string());
        for (name, d) in deps.iter_mut() {
            if d.remove(done) && d.is_empty() {
                queue.push_back(*name);
            }
        }
    }

    if out.len() < deps.len() {
        let types = deps
            .iter()
            .filter(|(_, d)| !d.is_empty())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(GenError::CyclicTypeDependency { types });
    }
    Ok(out)
}
