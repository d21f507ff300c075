// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::{ErrorKind, MergedInterfaces, NetrecError, NetrecInterface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done(u32),
}

/// Interface depending on parent(VLAN/VxLAN base interface) or controller
/// gets rank of its dependency plus 1. Interface without dependency has rank
/// 0. Both current and target relationships are considered, so detaching
/// ports and removing children are also ordered.
pub(crate) fn gen_dependency_ranks(
    merged_ifaces: &MergedInterfaces,
) -> Result<HashMap<String, u32>, NetrecError> {
    let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for iface in merged_ifaces.iter() {
        let mut iface_deps: Vec<&str> = Vec::new();
        for state in [iface.current.as_ref(), Some(&iface.merged)]
            .into_iter()
            .flatten()
        {
            if let Some(parent) = state.parent() {
                iface_deps.push(parent);
            }
            if let Some(ctrl) = state.base_iface().controller.as_deref() {
                iface_deps.push(ctrl);
            }
        }
        iface_deps.sort_unstable();
        iface_deps.dedup();
        deps.insert(iface.name(), iface_deps);
    }

    let mut states: HashMap<&str, VisitState> = HashMap::new();
    let mut names: Vec<&str> = deps.keys().copied().collect();
    names.sort_unstable();
    for name in names {
        let mut stack: Vec<&str> = Vec::new();
        visit(name, &deps, &mut states, &mut stack)?;
    }

    let mut ret = HashMap::new();
    for (name, state) in states {
        if let VisitState::Done(rank) = state {
            ret.insert(name.to_string(), rank);
        }
    }
    log::debug!("Interface dependency ranks {ret:?}");
    Ok(ret)
}

fn visit<'a>(
    name: &'a str,
    deps: &HashMap<&'a str, Vec<&'a str>>,
    states: &mut HashMap<&'a str, VisitState>,
    stack: &mut Vec<&'a str>,
) -> Result<u32, NetrecError> {
    match states.get(name) {
        Some(VisitState::Done(rank)) => return Ok(*rank),
        Some(VisitState::Visiting) => {
            stack.push(name);
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "interfaces[{name}]: Dependency loop detected: {}",
                    stack.join(" -> ")
                ),
            ));
        }
        None => (),
    }
    states.insert(name, VisitState::Visiting);
    stack.push(name);
    let mut rank = 0;
    for dep in deps
        .get(name)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .copied()
    {
        // Dependency not managed here, e.g. a parent removed in both states.
        if !deps.contains_key(dep) {
            continue;
        }
        rank = rank.max(visit(dep, deps, states, stack)? + 1);
    }
    stack.pop();
    states.insert(name, VisitState::Done(rank));
    Ok(rank)
}
