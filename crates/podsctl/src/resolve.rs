//! Chain-producing commands: resolve, plan, env

use crate::ui;
use crate::Ctx;
use anyhow::Result;
use pods_common::services::DEMO_SERVICES;
use pods_common::{
    ComposeFileResolver, OrchestrationEnv, ResolvedChain, ServiceCatalog, ServiceDiscovery,
};
use serde_json::{Map, Value};
use tracing::debug;

fn catalog(ctx: &Ctx) -> ServiceCatalog {
    ServiceDiscovery::new(&ctx.cfg, &ctx.fs).catalog()
}

pub fn run_resolve(ctx: &Ctx, service: &str, dev: bool) -> Result<()> {
    catalog(ctx).validate(service)?;
    let chain = ComposeFileResolver::new(&ctx.cfg, &ctx.fs).resolve_chain(service, dev)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&chain)?);
    } else {
        println!("{}", render_chain(&ctx.style, &chain));
    }
    Ok(())
}

/// Requests in start order: plain services first, then dev-mode services
fn plan_requests(
    catalog: &ServiceCatalog,
    services: &[String],
    dev: &[String],
    demo: bool,
) -> Result<Vec<(String, bool)>> {
    if demo {
        return Ok(DEMO_SERVICES.iter().map(|s| (s.to_string(), false)).collect());
    }
    if services.is_empty() && dev.is_empty() {
        return Ok(catalog.all().into_iter().map(|s| (s, false)).collect());
    }
    let mut requests = Vec::with_capacity(services.len() + dev.len());
    for (names, dev_mode) in [(services, false), (dev, true)] {
        for name in names {
            catalog.validate(name)?;
            requests.push((name.clone(), dev_mode));
        }
    }
    Ok(requests)
}

pub fn run_plan(ctx: &Ctx, services: &[String], dev: &[String], demo: bool) -> Result<()> {
    let requests = plan_requests(&catalog(ctx), services, dev, demo)?;
    debug!("planning {} service(s)", requests.len());

    let resolver = ComposeFileResolver::new(&ctx.cfg, &ctx.fs);
    let mut chains = Vec::with_capacity(requests.len());
    for (service, dev_mode) in &requests {
        let chain = resolver.resolve_chain(service, *dev_mode)?;
        if !ctx.json {
            println!("{}", render_chain(&ctx.style, &chain));
        }
        chains.push(chain);
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&chains)?);
    } else if chains.is_empty() {
        println!("{}", ui::warn(&ctx.style, "No services to plan"));
    }
    Ok(())
}

pub fn run_env(ctx: &Ctx, service: &str, dev: bool) -> Result<()> {
    catalog(ctx).validate(service)?;
    let resolver = ComposeFileResolver::new(&ctx.cfg, &ctx.fs);
    let chain = resolver.resolve_chain(service, dev)?;
    let env = OrchestrationEnv::for_chain(&ctx.cfg, resolver.roots(), &chain);

    if ctx.json {
        let map: Map<String, Value> = env
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        println!("{}", env.render_shell());
    }
    Ok(())
}

fn render_chain(style: &ui::Style, chain: &ResolvedChain) -> String {
    let mode = if chain.dev_mode { " (dev mode)" } else { "" };
    let mut out = ui::ok(style, &format!("{}{}", chain.service, mode));
    if let Some(protocol) = &chain.display_protocol {
        out.push('\n');
        out.push_str(&ui::kv(style, "  Display protocol", protocol.as_str()));
    }
    out.push_str("\n  Using compose files:");
    for entry in &chain.entries {
        out.push('\n');
        out.push_str(&ui::bullet(
            style,
            &format!(
                "  {} ({}, {})",
                entry.path.display(),
                entry.layer.label(),
                entry.root.label()
            ),
        ));
    }
    out
}
