use anyhow::{Context, Result};
use serde_json::Value as Json;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy)]
pub enum Runner { Terraform, Tofu }

pub fn pick_runner(prefer: Option<Runner>) -> Result<Runner> {
    if let Some(p) = prefer { return Ok(p); }
    if which::which("tofu").is_ok() { Ok(Runner::Tofu) }
    else if which::which("terraform").is_ok() { Ok(Runner::Terraform) }
    else { anyhow::bail!("Neither 'tofu' nor 'terraform' found in PATH") }
}

fn bin(r: Runner) -> &'static str { match r { Runner::Terraform => "terraform", Runner::Tofu => "tofu" } }

/// Render a binary plan file to its JSON form via `show -json`.
pub fn show_json(r: Runner, plan_file: &Path) -> Result<Json> {
    let dir = plan_file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = plan_file.file_name().and_then(|n| n.to_str())
        .context("plan path has no usable file name")?;
    let out = Command::new(bin(r))
        .arg(format!("-chdir={}", dir.to_str().context("non-utf8 plan path")?))
        .args(["show", "-json", name])
        .output()
        .context("spawn show -json")?;
    if !out.status.success() {
        anyhow::bail!("show -json failed: {}", String::from_utf8_lossy(&out.stderr));
    }
    serde_json::from_slice(&out.stdout).context("parse show -json output")
}
