//! Local user store subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use clap::Subcommand;
use serde_json::{Map, Value};

use centertech_core::sanitize::SanitizeKind;
use centertech_core::{Services, UserRecord};

/// Users subcommand actions.
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List stored users
    List {
        /// Print the raw JSON records
        #[arg(long)]
        json: bool,
    },
    /// Create a user from `name=value` fields (e.g. `--field nome=Ana`)
    Create {
        #[arg(short, long = "field", value_parser = parse_field, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Delete a user by ID
    Delete {
        id: String,
    },
    /// Remove every stored user
    Clear,
}

/// Parse a `name=value` pair.
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid field '{s}': expected name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid field '{s}': empty name"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Sanitizer applied to a form field, picked by its name.
pub fn sanitizer_for(field: &str) -> SanitizeKind {
    match field.to_ascii_lowercase().as_str() {
        "email" => SanitizeKind::Email,
        "telefone" | "phone" | "celular" => SanitizeKind::Phone,
        "cpf" | "cnpj" | "cep" => SanitizeKind::Numeric,
        "codigo" | "code" | "cupom" => SanitizeKind::Code,
        "site" | "url" => SanitizeKind::Url,
        "descricao" | "observacoes" | "mensagem" => SanitizeKind::Multiline,
        _ => SanitizeKind::Text,
    }
}

/// Build the record fields, sanitizing every value.
pub fn build_fields(pairs: Vec<(String, String)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| {
            let clean = sanitizer_for(&name).apply(&value);
            (name, Value::String(clean.trim_end().to_string()))
        })
        .collect()
}

/// Execute a users subcommand.
pub fn run(services: &Services, action: UsersAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        UsersAction::List { json } => {
            let users = services.users.list();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&users)?)?;
            } else if users.is_empty() {
                writeln!(out, "No users stored.")?;
            } else {
                write_table(&mut out, &users)?;
            }
        }
        UsersAction::Create { fields } => {
            let record = services.users.create(build_fields(fields));
            writeln!(out, "Created user {} at {}", record.id, record.created_at)?;
        }
        UsersAction::Delete { id } => {
            if services.users.delete(&id) {
                writeln!(out, "User {id} deleted.")?;
            } else {
                writeln!(out, "User {id} not found.")?;
            }
        }
        UsersAction::Clear => {
            services.users.clear();
            writeln!(out, "All users removed.")?;
        }
    }
    Ok(())
}

fn write_table(out: &mut impl Write, users: &[UserRecord]) -> io::Result<()> {
    writeln!(out, "{:<36}  {:<24}  {:<20}  {:<28}", "ID", "CREATED", "NOME", "EMAIL")?;
    for user in users {
        writeln!(
            out,
            "{:<36}  {:<24}  {:<20}  {:<28}",
            user.id,
            user.created_at,
            user.field_str("nome").unwrap_or("-"),
            user.field_str("email").unwrap_or("-"),
        )?;
    }
    writeln!(out, "\n{} user(s)", users.len())
}
