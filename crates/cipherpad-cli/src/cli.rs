use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use cipherpad_core::VERSION;

/// Cipherpad - a password-gated notepad that encrypts every note body
#[derive(Parser)]
#[command(name = "cipherpad")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the note database
    #[arg(long, global = true, env = "CIPHERPAD_DB", value_name = "PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the first password and create the note key
    Init(InitArgs),

    /// Change the password
    Passwd,

    /// Add a new note
    Add(AddArgs),

    /// List notes, newest first
    List(ListArgs),

    /// Show a single note
    Show(ShowArgs),

    /// Change the title or body of a note
    Edit(EditArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// Re-encrypt every note under a fresh key
    Rekey,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where the note key is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeystoreArg {
    /// Raw key file readable only by the current user
    Keyfile,
    /// Operating system keychain
    Keychain,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Where to keep the note key
    #[arg(long, value_enum, default_value_t = KeystoreArg::Keyfile)]
    pub keystore: KeystoreArg,

    /// Keyfile path override (keyfile mode only)
    #[arg(long, value_name = "PATH")]
    pub keyfile: Option<String>,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Note title (stored unencrypted)
    #[arg(short, long)]
    pub title: String,

    /// Note body (read from stdin when omitted)
    #[arg(long)]
    pub body: Option<String>,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: i64,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New body
    #[arg(long)]
    pub body: Option<String>,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: i64,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
