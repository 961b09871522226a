//! Network configuration commands: ifconfig, arp, route, dhclient.

use std::net::Ipv4Addr;
use std::sync::Arc;

use console_platform::{ArpEntry, InterfaceInfo, MacAddr, NetworkService, Route};
use console_types::error::{ConsoleError, Result};

use crate::commands::missing_service;
use crate::context::{Context, Output};
use crate::optparse::{self, OptionSpec};
use crate::registry::{Command, Registry};

pub fn register_network_commands(reg: &mut Registry) {
    reg.register(Box::new(IfconfigCmd));
    reg.register(Box::new(ArpCmd));
    reg.register(Box::new(RouteCmd));
    reg.register(Box::new(DhclientCmd));
}

fn network(ctx: &Context) -> Result<Arc<dyn NetworkService>> {
    ctx.network
        .as_ref()
        .map(Arc::clone)
        .ok_or_else(|| missing_service("network"))
}

fn parse_addr(text: &str) -> Result<Ipv4Addr> {
    text.parse()
        .map_err(|_| ConsoleError::Command(format!("bad address: {text}")))
}

fn interface_names(ctx: &Context) -> Vec<String> {
    ctx.network
        .as_ref()
        .and_then(|net| net.interfaces().ok())
        .map(|ifaces| ifaces.into_iter().map(|i| i.name).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// ifconfig
// ---------------------------------------------------------------------------

const IFCONFIG_OPTS: &[OptionSpec] = &[
    OptionSpec::store("netmask", Some("mask"), "network mask for the address"),
    OptionSpec::flag("up", "bring the interface up"),
];

fn print_interface(out: &Output, iface: &InterfaceInfo) -> Result<()> {
    let state = if iface.up { "UP" } else { "DOWN" };
    out.println(&format!("{}: flags=<{state}>", iface.name))?;
    if let (Some(addr), Some(mask)) = (iface.addr, iface.netmask) {
        out.println(&format!("        inet {addr}  netmask {mask}"))?;
    }
    out.println(&format!("        ether {}", iface.mac))
}

struct IfconfigCmd;
impl Command for IfconfigCmd {
    fn name(&self) -> &str {
        "ifconfig"
    }
    fn description(&self) -> &str {
        "Show or configure network interfaces"
    }
    fn usage(&self) -> &str {
        "ifconfig [<iface> [<addr> netmask <mask>] [up]]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let net = network(ctx)?;
        let Some(name) = args.get(1) else {
            for iface in net.interfaces()? {
                print_interface(&ctx.out, &iface)?;
            }
            return Ok(0);
        };

        let rest = &args[2..];
        if rest.is_empty() {
            let iface = net
                .interfaces()?
                .into_iter()
                .find(|i| i.name == *name)
                .ok_or_else(|| ConsoleError::Command(format!("no such interface: {name}")))?;
            print_interface(&ctx.out, &iface)?;
            return Ok(0);
        }

        let opts = optparse::parse(IFCONFIG_OPTS, rest);
        if let Some(err) = &opts.err {
            ctx.out.println(&format!("ifconfig: {err}"))?;
            self.help(&ctx.out)?;
            return Ok(1);
        }
        if let Some(addr) = optparse::positionals(IFCONFIG_OPTS, rest).first() {
            let addr = parse_addr(addr)?;
            let Some(mask) = opts.value("netmask") else {
                ctx.out.println("ifconfig: netmask required with an address")?;
                return Ok(1);
            };
            net.set_address(name, addr, parse_addr(mask)?)?;
        }
        if opts.flag("up") {
            net.bring_up(name)?;
        }
        Ok(0)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        match args.len() {
            2 => Some(interface_names(ctx)),
            _ => Some(vec!["netmask".to_string(), "up".to_string()]),
        }
    }
    fn help(&self, out: &Output) -> Result<()> {
        out.println(&format!("usage: {}", self.usage()))?;
        optparse::print_usage(IFCONFIG_OPTS, out)
    }
}

// ---------------------------------------------------------------------------
// arp
// ---------------------------------------------------------------------------

struct ArpCmd;
impl Command for ArpCmd {
    fn name(&self) -> &str {
        "arp"
    }
    fn description(&self) -> &str {
        "Show or add static ARP entries"
    }
    fn usage(&self) -> &str {
        "arp [-s <ip> <mac>]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let net = network(ctx)?;
        match args.get(1).map(String::as_str) {
            None => {
                ctx.out.println(&format!("{:<16} {}", "Address", "HWaddress"))?;
                for entry in net.arp_entries()? {
                    ctx.out
                        .println(&format!("{:<16} {}", entry.ip.to_string(), entry.mac))?;
                }
                Ok(0)
            },
            Some("-s") => {
                let (Some(ip), Some(mac)) = (args.get(2), args.get(3)) else {
                    return Err(ConsoleError::Usage(self.usage().to_string()));
                };
                net.arp_add(ArpEntry {
                    ip: parse_addr(ip)?,
                    mac: MacAddr::parse(mac)?,
                })?;
                Ok(0)
            },
            Some(other) => Err(ConsoleError::Command(format!("unknown option: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// route
// ---------------------------------------------------------------------------

const ROUTE_OPTS: &[OptionSpec] = &[
    OptionSpec::store("-net", Some("network"), "destination network"),
    OptionSpec::store("netmask", Some("mask"), "destination netmask"),
    OptionSpec::store("gw", Some("gateway"), "next hop"),
    OptionSpec::store("dev", Some("iface"), "outgoing interface"),
];

fn print_routes(out: &Output, routes: &[Route]) -> Result<()> {
    out.println(&format!(
        "{:<16}{:<16}{:<16}{}",
        "Destination", "Gateway", "Genmask", "Iface"
    ))?;
    for r in routes {
        let dest = if r.is_default() {
            "default".to_string()
        } else {
            r.destination.to_string()
        };
        let gw = r.gateway.map_or_else(|| "*".to_string(), |g| g.to_string());
        let iface = r.interface.as_deref().unwrap_or("*");
        out.println(&format!("{dest:<16}{gw:<16}{:<16}{iface}", r.netmask.to_string()))?;
    }
    Ok(())
}

struct RouteCmd;
impl Command for RouteCmd {
    fn name(&self) -> &str {
        "route"
    }
    fn description(&self) -> &str {
        "Show or add routes"
    }
    fn usage(&self) -> &str {
        "route [add [-net <network> netmask <mask>] [gw <gateway>] [dev <iface>]]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let net = network(ctx)?;
        match args.get(1).map(String::as_str) {
            None => {
                print_routes(&ctx.out, &net.routes()?)?;
                Ok(0)
            },
            Some("add") => {
                let opts = optparse::parse(ROUTE_OPTS, &args[2..]);
                if let Some(err) = &opts.err {
                    ctx.out.println(&format!("route: {err}"))?;
                    self.help(&ctx.out)?;
                    return Ok(1);
                }
                let (destination, netmask) = match opts.value("net") {
                    Some(dest) => {
                        let Some(mask) = opts.value("netmask") else {
                            ctx.out.println("route: netmask required with -net")?;
                            return Ok(1);
                        };
                        (parse_addr(dest)?, parse_addr(mask)?)
                    },
                    None => (Ipv4Addr::UNSPECIFIED, Ipv4Addr::UNSPECIFIED),
                };
                let gateway = opts.value("gw").map(parse_addr).transpose()?;
                let interface = opts.value("dev").map(String::from);
                if gateway.is_none() && interface.is_none() {
                    ctx.out.println("route: need a gateway or an interface")?;
                    return Ok(1);
                }
                net.route_add(Route {
                    destination,
                    netmask,
                    gateway,
                    interface,
                })?;
                Ok(0)
            },
            Some(_) => {
                self.help(&ctx.out)?;
                Ok(1)
            },
        }
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        if args.len() == 2 {
            return Some(vec!["add".to_string()]);
        }
        // The word before the one being completed decides what fits.
        match args[args.len() - 2].as_str() {
            "dev" => Some(interface_names(ctx)),
            _ => Some(ROUTE_OPTS.iter().map(|o| o.opt.to_string()).collect()),
        }
    }
    fn help(&self, out: &Output) -> Result<()> {
        out.println(&format!("usage: {}", self.usage()))?;
        optparse::print_usage(ROUTE_OPTS, out)
    }
}

// ---------------------------------------------------------------------------
// dhclient
// ---------------------------------------------------------------------------

struct DhclientCmd;
impl Command for DhclientCmd {
    fn name(&self) -> &str {
        "dhclient"
    }
    fn description(&self) -> &str {
        "Obtain an address by dynamic discovery"
    }
    fn usage(&self) -> &str {
        "dhclient [iface]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let net = network(ctx)?;
        let iface = args.get(1).map(String::as_str);
        net.start_discovery(iface)?;
        ctx.out.println(&format!(
            "dhclient: discovery started on {}",
            iface.unwrap_or("default interface")
        ))?;
        Ok(0)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        match args.len() {
            2 => Some(interface_names(ctx)),
            _ => Some(Vec::new()),
        }
    }
}
