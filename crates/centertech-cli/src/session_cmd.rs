//! Session subcommands: role, login, logout, guard.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use clap::Subcommand;

use centertech_core::{GuardDecision, Role, Services};

/// Role subcommand actions.
#[derive(Subcommand, Debug)]
pub enum RoleAction {
    /// Show the stored role
    Get,
    /// Store a role (ADMIN or CLIENTE)
    Set {
        role: Role,
    },
    /// Remove the stored role
    Clear,
}

/// Execute a role subcommand.
pub fn run_role(services: &Services, action: RoleAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        RoleAction::Get => match services.session.role() {
            Some(role) => writeln!(out, "{role}")?,
            None => writeln!(out, "No role stored.")?,
        },
        RoleAction::Set { role } => {
            services.session.set_role(Some(role));
            writeln!(out, "Role set to {role}.")?;
        }
        RoleAction::Clear => {
            services.session.clear_role();
            writeln!(out, "Role cleared.")?;
        }
    }
    Ok(())
}

/// Start a new session. Signing in without a role clears any role left
/// from the previous session.
pub fn login(services: &Services, token: &str, role: Option<Role>) -> anyhow::Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Token must not be empty");
    }
    services.session.set_token(Some(token));
    services.session.set_role(role);
    let mut out = io::stdout();
    match services.session.role() {
        Some(role) => writeln!(out, "Signed in as {role}.")?,
        None => writeln!(out, "Signed in.")?,
    }
    Ok(())
}

pub fn logout(services: &Services) -> anyhow::Result<()> {
    services.session.sign_out();
    writeln!(io::stdout(), "Signed out.")?;
    Ok(())
}

/// Describe a guard decision for humans.
pub fn describe_decision(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Allow => "allow".to_string(),
        GuardDecision::Redirect(redirect) => format!("redirect {}", redirect.location()),
        GuardDecision::Forbidden { role: Some(role) } => format!("forbidden (role {role})"),
        GuardDecision::Forbidden { role: None } => "forbidden (no role)".to_string(),
    }
}

/// Print what the guard decides for `location`.
pub fn run_guard(services: &Services, location: &str, admin: bool) -> anyhow::Result<()> {
    let decision = if admin {
        services.guard.check_admin(location, &services.session)
    } else {
        services.guard.check(location)
    };
    writeln!(io::stdout(), "{}", describe_decision(&decision))?;
    Ok(())
}
