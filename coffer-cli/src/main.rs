//! `coffer` — developer/admin CLI for the encrypted document store.
//!
//! The encryption key is read from `COFFER_KEY` (64 hex characters). A
//! missing key is a startup error; the store never falls back to a
//! generated key, because data written under one would be unreadable by
//! the application.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coffer_models::{Admin, Comment, Game, Review};
use coffer_store::{Collection, Document, Predicate, StoragePaths, StoreKey, StoreResult};
use eyre::{eyre, Result, WrapErr};
use serde_json::{Map, Value};

/// Environment variable holding the 64-hex-character store key.
const KEY_VAR: &str = "COFFER_KEY";

#[derive(Parser)]
#[command(name = "coffer", about = "Admin tooling for the Coffer encrypted document store")]
struct Cli {
    /// Storage root directory holding the collection files.
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an admin account, or reset its password if the email exists.
    CreateAdmin {
        /// Login email of the account.
        #[arg(long)]
        email: String,
        /// Plaintext password; stored as a bcrypt hash.
        #[arg(long, env = "COFFER_ADMIN_PASSWORD")]
        password: String,
        /// Display name.
        #[arg(long, default_value = "Administrator")]
        name: String,
        /// Role label.
        #[arg(long, default_value = "super_admin")]
        role: String,
    },
    /// Print a per-record summary of a collection.
    List {
        /// Collection name (reviews, comments, admins, games).
        collection: String,
    },
    /// Print the decrypted JSON array of a collection to stdout.
    Export {
        /// Collection name (reviews, comments, admins, games).
        collection: String,
    },
    /// Re-encrypt a collection, upgrading a legacy plaintext file to the
    /// canonical encrypted format.
    Encrypt {
        /// Collection name (reviews, comments, admins, games).
        collection: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = StoragePaths::new(&cli.data_dir);
    let key = StoreKey::from_env(KEY_VAR)
        .wrap_err_with(|| format!("set {KEY_VAR} to a 64-hex-character key"))?;

    match cli.command {
        Command::CreateAdmin {
            email,
            password,
            name,
            role,
        } => create_admin(&paths, key, &email, &password, &name, &role),
        Command::List { collection } => list(&paths, key, &collection),
        Command::Export { collection } => export(&paths, key, &collection),
        Command::Encrypt { collection } => encrypt(&paths, key, &collection),
    }
}

fn create_admin(
    paths: &StoragePaths,
    key: StoreKey,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> Result<()> {
    let admins = Admin::collection(paths, key);
    let existing = admins.find_one(&Predicate::new().field("email", email));

    let mut admin = if let Some(admin) = existing {
        println!("account {email} already exists, resetting its password");
        admin
    } else {
        let mut admin = Admin::new(email, name);
        admin.role = role.to_string();
        admin
    };
    admin.set_password(password)?;
    admins.save(&mut admin)?;

    println!("admin {email} saved (role: {})", admin.role);
    Ok(())
}

fn list(paths: &StoragePaths, key: StoreKey, collection: &str) -> Result<()> {
    let records = read_collection(paths, key, collection)?;
    println!("{collection}: {} record(s)", records.len());
    for record in &records {
        let id = field_str(record, "id").unwrap_or("<no id>");
        let updated = field_str(record, "updatedAt").unwrap_or("<never>");
        println!("  {id}  updated {updated}");
    }
    Ok(())
}

fn export(paths: &StoragePaths, key: StoreKey, collection: &str) -> Result<()> {
    let records = read_collection(paths, key, collection)?;
    let json = serde_json::to_string_pretty(&records)?;
    println!("{json}");
    Ok(())
}

fn encrypt(paths: &StoragePaths, key: StoreKey, collection: &str) -> Result<()> {
    let count = match collection {
        Review::COLLECTION => reencrypt(&Review::collection(paths, key)),
        Comment::COLLECTION => reencrypt(&Comment::collection(paths, key)),
        Admin::COLLECTION => reencrypt(&Admin::collection(paths, key)),
        Game::COLLECTION => reencrypt(&Game::collection(paths, key)),
        other => return Err(unknown_collection(other)),
    }
    .wrap_err_with(|| format!("re-encrypting {collection}"))?;

    println!("{collection}: {count} record(s) written to the encrypted format");
    Ok(())
}

/// Reads back whatever the collection currently holds (encrypted file or
/// legacy plaintext fallback) and writes it out encrypted.
fn reencrypt<T: Document>(collection: &Collection<T>) -> StoreResult<usize> {
    let records = collection.read_all();
    collection.write_all(&records)?;
    Ok(records.len())
}

fn read_collection(
    paths: &StoragePaths,
    key: StoreKey,
    collection: &str,
) -> Result<Vec<Map<String, Value>>> {
    Ok(match collection {
        Review::COLLECTION => Review::collection(paths, key).read_all(),
        Comment::COLLECTION => Comment::collection(paths, key).read_all(),
        Admin::COLLECTION => Admin::collection(paths, key).read_all(),
        Game::COLLECTION => Game::collection(paths, key).read_all(),
        other => return Err(unknown_collection(other)),
    })
}

fn unknown_collection(name: &str) -> eyre::Report {
    eyre!("unknown collection '{name}' (expected reviews, comments, admins, or games)")
}

fn field_str<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}
