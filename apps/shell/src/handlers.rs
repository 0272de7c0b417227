use anyhow::{Context, Result};
use sreg::ScriptHost;
use sreg::registry::RenderContext;
use std::io::Write;
use std::path::Path;

/// Reads a render context from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or does not hold a JSON object.
pub(crate) fn read_context(path: Option<&Path>) -> Result<Option<RenderContext>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Context file {} is not valid JSON", path.display()))?;

    Ok(Some(RenderContext::try_from(value)?))
}

pub(crate) fn list(host: &ScriptHost, out: &mut impl Write) -> Result<()> {
    let declarations = host.registry().declarations();
    if declarations.is_empty() {
        writeln!(out, "No scripts registered.")?;
        return Ok(());
    }

    writeln!(out, "{:<32} {:<24} {:<7} {}", "ID", "EXPRESSION", "INLINE", "ENABLED")?;
    for d in declarations {
        let expression = if d.expression.is_empty() { "-" } else { d.expression.as_str() };
        writeln!(out, "{:<32} {:<24} {:<7} {}", d.id, expression, d.inline, d.enabled)?;
    }
    Ok(())
}

pub(crate) fn groups(host: &ScriptHost, out: &mut impl Write) -> Result<()> {
    let cooked = host.registry().cooked();
    for (group, members) in cooked.composition() {
        writeln!(out, "{}: {}", group.id, members.join(", "))?;
    }
    Ok(())
}

pub(crate) fn ordered(
    host: &ScriptHost,
    context: Option<&RenderContext>,
    out: &mut impl Write,
) -> Result<()> {
    for group in host.resolver().resolve_ordered(context)? {
        let mode = if group.inline { "inline" } else { "link" };
        writeln!(out, "{} ({mode})", group.id)?;
    }
    Ok(())
}

pub(crate) fn render(
    host: &ScriptHost,
    id: &str,
    context: Option<&RenderContext>,
    out: &mut impl Write,
) -> Result<()> {
    let text = host.resolver().resolve(id, context)?;
    writeln!(out, "{text}")?;
    Ok(())
}

pub(crate) fn deliver(
    host: &ScriptHost,
    id: &str,
    context: Option<&RenderContext>,
    out: &mut impl Write,
) -> Result<()> {
    let delivery = host.resolver().deliver(id, context)?;
    writeln!(out, "Content-Type: {}", delivery.content_type)?;
    writeln!(out, "Expires: {}", delivery.expires_header())?;
    writeln!(out)?;
    writeln!(out, "{}", delivery.body)?;
    Ok(())
}
