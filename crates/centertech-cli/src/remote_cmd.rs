//! Remote service subcommands: admin users listing and downloads.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use centertech_core::config::ApiConfig;
use centertech_core::remote::{UsersApiClient, load_users_table};
use centertech_core::{GuardDecision, Services};

use crate::session_cmd::describe_decision;

/// Location of the admin users table, used for the guard check.
pub const ADMIN_USERS_LOCATION: &str = "/admin/usuarios";

/// Admin subcommand actions.
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// List users from the remote service (requires the ADMIN role)
    Users,
}

/// Execute an admin subcommand.
pub async fn run_admin(
    services: &Services,
    api: &ApiConfig,
    action: AdminAction,
) -> anyhow::Result<()> {
    match action {
        AdminAction::Users => admin_users(services, api).await,
    }
}

async fn admin_users(services: &Services, api: &ApiConfig) -> anyhow::Result<()> {
    let decision = services
        .guard
        .check_admin(ADMIN_USERS_LOCATION, &services.session);
    if decision != GuardDecision::Allow {
        anyhow::bail!("Access denied: {}", describe_decision(&decision));
    }

    let token = services.session.token();
    let client = UsersApiClient::new(api, token.as_deref())?;
    let users = load_users_table(&client).await.map_err(|msg| anyhow::anyhow!(msg))?;

    let mut out = io::stdout();
    if users.is_empty() {
        writeln!(out, "No users found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<12}  {:<24}  {:<28}  {:<16}  {:<14}",
        "ID", "NOME", "EMAIL", "TELEFONE", "CPF"
    )?;
    for user in &users {
        writeln!(
            out,
            "{:<12}  {:<24}  {:<28}  {:<16}  {:<14}",
            user.id,
            user.name,
            user.email,
            user.phone.as_deref().unwrap_or("-"),
            user.tax_id.as_deref().unwrap_or("-"),
        )?;
    }
    writeln!(out, "\n{} user(s)", users.len())?;
    Ok(())
}

/// Final path for a downloaded file. Only the last component of the server
/// supplied name is used.
pub fn output_path(dir: &Path, filename: Option<&str>, request_path: &str) -> PathBuf {
    let name = filename
        .and_then(|f| Path::new(f).file_name())
        .or_else(|| Path::new(request_path.trim_end_matches('/')).file_name())
        .map_or_else(|| "download".into(), |n| n.to_string_lossy().into_owned());
    dir.join(name)
}

/// Download `path` from the remote service into `out_dir`.
pub async fn download(
    services: &Services,
    api: &ApiConfig,
    path: &str,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let token = services.session.token();
    let client = UsersApiClient::new(api, token.as_deref())?;
    let file = client.download(path).await?;

    let target = output_path(out_dir, file.filename.as_deref(), path);
    std::fs::write(&target, &file.bytes)?;
    writeln!(
        io::stdout(),
        "Saved {} ({} bytes)",
        target.display(),
        file.bytes.len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_prefers_header_name() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            output_path(dir, Some("ganhadores.csv"), "/exports/1"),
            dir.join("ganhadores.csv")
        );
    }

    #[test]
    fn output_path_strips_directories_from_header_name() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            output_path(dir, Some("../../etc/passwd"), "/exports/1"),
            dir.join("passwd")
        );
    }

    #[test]
    fn output_path_falls_back_to_request_path() {
        let dir = Path::new("/tmp/out");
        assert_eq!(output_path(dir, None, "/exports/regulamento.pdf/"), dir.join("regulamento.pdf"));
        assert_eq!(output_path(dir, None, "/"), dir.join("download"));
    }
}
