// SPDX-License-Identifier: Apache-2.0

mod graph;
mod operation;

use std::cmp::Reverse;

pub(crate) use self::graph::gen_dependency_ranks;
pub use self::operation::{
    AddressOperation, DnsOperation, InterfaceOperation, Operation,
    RouteOperation,
};

use crate::{
    state::value::gen_diff_json_value, MergedInterface, MergedInterfaces,
    MergedNetworkState, NetrecError, NetrecInterface, RouteEntry,
};

/// Generate ordered operations transforming current state into the target
/// state of `merged`:
///  1. Delete routes.
///  2. Set addresses of interfaces going down.
///  3. Modify interfaces going down or detached from controller, children
///     first.
///  4. Delete interfaces, children first.
///  5. Create interfaces, parents first.
///  6. Modify interfaces, parents first.
///  7. Set addresses.
///  8. Add routes.
///  9. Set DNS.
///
/// Interfaces holding the same rank are ordered by name.
pub(crate) fn gen_operations(
    merged: &MergedNetworkState,
) -> Result<Vec<Operation>, NetrecError> {
    let ifaces = &merged.ifaces;
    let recreate = gen_recreate_list(ifaces);

    let mut early_addrs: Vec<Operation> = Vec::new();
    let mut early_modifies: Vec<Operation> = Vec::new();
    let mut deletes: Vec<Operation> = Vec::new();
    let mut creates: Vec<Operation> = Vec::new();
    let mut late_modifies: Vec<Operation> = Vec::new();
    let mut late_addrs: Vec<Operation> = Vec::new();

    for iface in ifaces.iter() {
        let rank = ifaces.rank(iface.name());
        let is_recreate = recreate.contains(&iface.name());
        if let Some(cur_iface) = iface.current.as_ref() {
            if iface.is_deleted() || is_recreate {
                deletes.push(Operation::DeleteInterface(InterfaceOperation {
                    iface: cur_iface.clone_link_only(),
                    rank,
                }));
            }
        }
        if iface.is_deleted() {
            continue;
        }
        if iface.is_new() || is_recreate {
            creates.push(Operation::CreateInterface(InterfaceOperation {
                iface: iface.merged.clone_link_only(),
                rank,
            }));
            if let Some(op) = gen_address_operation(iface, true, rank) {
                late_addrs.push(op);
            }
            continue;
        }

        let ctrl_recreated = iface
            .current
            .as_ref()
            .and_then(|c| c.base_iface().controller.as_deref())
            .map(|c| recreate.contains(&c))
            .unwrap_or_default();
        if let Some(op) = gen_modify_operation(iface, ctrl_recreated, rank)? {
            if iface.is_deactivating() || is_port_detaching(iface) {
                early_modifies.push(op);
            } else {
                late_modifies.push(op);
            }
        }
        if let Some(op) = gen_address_operation(iface, false, rank) {
            if iface.is_deactivating() {
                early_addrs.push(op);
            } else {
                late_addrs.push(op);
            }
        }
    }

    let (route_dels, route_adds) = gen_route_operations(merged, &recreate);

    sort_by_rank(&mut early_addrs, true);
    sort_by_rank(&mut early_modifies, true);
    sort_by_rank(&mut deletes, true);
    sort_by_rank(&mut creates, false);
    sort_by_rank(&mut late_modifies, false);
    sort_by_rank(&mut late_addrs, false);

    let mut ret = Vec::new();
    ret.extend(route_dels);
    ret.extend(early_addrs);
    ret.extend(early_modifies);
    ret.extend(deletes);
    ret.extend(creates);
    ret.extend(late_modifies);
    ret.extend(late_addrs);
    ret.extend(route_adds);

    if merged.dns.is_changed() {
        ret.push(Operation::SetDns(DnsOperation {
            config: merged.dns.merged.config.clone().unwrap_or_default(),
            rank: 0,
        }));
    }

    for op in ret.iter() {
        log::debug!("Planned operation: {op}");
    }
    Ok(ret)
}

/// Interfaces cannot be changed in place along with their children
/// referring them as parent.
fn gen_recreate_list(ifaces: &MergedInterfaces) -> Vec<&str> {
    let mut ret: Vec<&str> = ifaces
        .iter()
        .filter(|i| {
            !i.is_deleted()
                && i.current
                    .as_ref()
                    .map(|c| i.merged.need_delete_before_change(c))
                    .unwrap_or_default()
        })
        .map(|i| i.name())
        .collect();

    loop {
        let children: Vec<&str> = ifaces
            .iter()
            .filter(|i| !i.is_deleted() && !ret.contains(&i.name()))
            .filter(|i| {
                i.current
                    .as_ref()
                    .and_then(|c| c.parent())
                    .map(|p| ret.contains(&p))
                    .unwrap_or_default()
            })
            .map(|i| i.name())
            .collect();
        if children.is_empty() {
            break;
        }
        ret.extend(children);
    }
    for name in ret.iter() {
        log::info!("Interface {name} will be deleted and created again");
    }
    ret
}

fn is_port_detaching(iface: &MergedInterface) -> bool {
    iface
        .current
        .as_ref()
        .and_then(|c| c.base_iface().controller.as_ref())
        .is_some()
        && iface.merged.base_iface().controller.is_none()
}

fn gen_modify_operation(
    iface: &MergedInterface,
    force: bool,
    rank: u32,
) -> Result<Option<Operation>, NetrecError> {
    let Some(cur_iface) = iface.current.as_ref() else {
        return Ok(None);
    };
    let des_link = iface.merged.clone_link_only();
    let cur_link = cur_iface.clone_link_only();
    if des_link == cur_link && !force {
        return Ok(None);
    }
    match gen_diff_json_value(
        &serde_json::to_value(&des_link)?,
        &serde_json::to_value(&cur_link)?,
    ) {
        Some(diff) => {
            log::debug!("Interface {} link changes: {diff}", iface.name())
        }
        None => log::debug!(
            "Interface {} link changes: properties removed or controller \
             recreated",
            iface.name()
        ),
    }
    Ok(Some(Operation::ModifyInterface(InterfaceOperation {
        iface: des_link,
        rank,
    })))
}

/// For new interface, IP configuration is set when defined in target.
fn gen_address_operation(
    iface: &MergedInterface,
    is_new: bool,
    rank: u32,
) -> Option<Operation> {
    let des_base = iface.merged.base_iface();
    let cur_base = if is_new {
        None
    } else {
        iface.current.as_ref().map(|c| c.base_iface())
    };
    let ipv4 = if cur_base.map(|c| &c.ipv4) != Some(&des_base.ipv4) {
        des_base.ipv4.clone()
    } else {
        None
    };
    let ipv6 = if cur_base.map(|c| &c.ipv6) != Some(&des_base.ipv6) {
        des_base.ipv6.clone()
    } else {
        None
    };
    if ipv4.is_none() && ipv6.is_none() {
        None
    } else {
        Some(Operation::SetAddresses(AddressOperation {
            iface_name: iface.name().to_string(),
            ipv4,
            ipv6,
            rank,
        }))
    }
}

fn gen_route_operations(
    merged: &MergedNetworkState,
    recreate: &[&str],
) -> (Vec<Operation>, Vec<Operation>) {
    let is_via_recreated = |rt: &RouteEntry| {
        rt.next_hop_iface
            .as_deref()
            .map(|n| recreate.contains(&n))
            .unwrap_or_default()
    };
    let route_rank = |rt: &RouteEntry| {
        rt.next_hop_iface
            .as_deref()
            .map(|n| merged.ifaces.rank(n))
            .unwrap_or_default()
    };

    let mut del_rts: Vec<&RouteEntry> = merged.routes.removed_routes();
    let mut add_rts: Vec<&RouteEntry> = merged.routes.added_routes();
    for rt in merged
        .routes
        .current
        .config
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|rt| {
            is_via_recreated(*rt) && merged.routes.merged.contains(*rt)
        })
    {
        del_rts.push(rt);
        add_rts.push(rt);
    }
    del_rts.sort_unstable();
    del_rts.dedup();
    add_rts.sort_unstable();
    add_rts.dedup();

    let gen_op = |rt: &RouteEntry| RouteOperation {
        route: rt.clone(),
        rank: route_rank(rt),
    };
    (
        del_rts
            .into_iter()
            .map(|rt| Operation::DeleteRoute(gen_op(rt)))
            .collect(),
        add_rts
            .into_iter()
            .map(|rt| Operation::AddRoute(gen_op(rt)))
            .collect(),
    )
}

fn sort_by_rank(ops: &mut [Operation], children_first: bool) {
    if children_first {
        ops.sort_by(|a, b| {
            (Reverse(a.rank()), a.iface_name())
                .cmp(&(Reverse(b.rank()), b.iface_name()))
        });
    } else {
        ops.sort_by(|a, b| {
            (a.rank(), a.iface_name()).cmp(&(b.rank(), b.iface_name()))
        });
    }
}
