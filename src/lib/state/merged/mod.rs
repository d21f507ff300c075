// SPDX-License-Identifier: Apache-2.0

mod dns;
mod iface;
mod inter_iface;
mod net_state;
mod route;

pub use self::dns::MergedDnsState;
pub use self::iface::MergedInterface;
pub use self::inter_iface::MergedInterfaces;
pub use self::net_state::MergedNetworkState;
pub use self::route::MergedRoutes;
