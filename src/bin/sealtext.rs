//! Sealtext CLI - secret-based text encryption
//!
//! Command-line front end for encrypting and decrypting text with
//! AES-256-GCM, keys derived from a user secret.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

use sealtext::secret::{ReaderSecretReader, SecretReader, TerminalSecretReader};
use sealtext::{ErrorCategory, KeyDerivation, Result, ScryptCost, SealtextError, text_ops};

#[derive(Parser)]
#[command(name = "sealtext")]
#[command(version)]
#[command(about = "Secret-based text encryption.", long_about = None)]
struct Cli {
    /// Read the secret from stdin instead of from terminal
    #[arg(long, global = true)]
    secret_stdin: bool,

    /// Key derivation scheme; both sides must use the same one
    #[arg(long, global = true, value_enum, default_value_t = KdfChoice::Scrypt)]
    kdf: KdfChoice,

    /// scrypt cost as log2(N)
    #[arg(long, global = true, default_value_t = 15)]
    scrypt_log_n: u8,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KdfChoice {
    /// scrypt (r = 8, p = 1)
    Scrypt,
    /// single SHA-256 pass, for compatibility with unstretched deployments
    Sha256,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text
    #[command(alias = "e")]
    Encrypt {
        /// File holding the text to encrypt (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// File to write the transport text to (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decrypt a transport text
    #[command(alias = "d")]
    Decrypt {
        /// File holding the transport text (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// File to write the plaintext to (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print a freshly generated secret
    #[command(alias = "g")]
    GenerateSecret,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e.display_chain());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let kdf = match cli.kdf {
        KdfChoice::Scrypt => KeyDerivation::Scrypt(ScryptCost::new(cli.scrypt_log_n, 8, 1)?),
        KdfChoice::Sha256 => KeyDerivation::Sha256,
    };

    match cli.command {
        Commands::Encrypt { input, output } => {
            check_stdin_use(cli.secret_stdin, input.is_none())?;
            let mut reader = get_secret_reader(cli.secret_stdin);
            text_ops::encrypt_text(input.as_deref(), output.as_deref(), &kdf, &mut *reader)
        }
        Commands::Decrypt { input, output } => {
            check_stdin_use(cli.secret_stdin, input.is_none())?;
            let mut reader = get_secret_reader(cli.secret_stdin);
            text_ops::decrypt_text(input.as_deref(), output.as_deref(), &kdf, &mut *reader)
        }
        Commands::GenerateSecret => {
            println!("{}", sealtext::generate_secret()?);
            Ok(())
        }
    }
}

fn check_stdin_use(secret_stdin: bool, input_stdin: bool) -> Result<()> {
    if secret_stdin && input_stdin {
        return Err(SealtextError::new(
            ErrorCategory::User,
            "--secret-stdin takes stdin; pass the text with --input",
        ));
    }
    Ok(())
}

fn get_secret_reader(use_stdin: bool) -> Box<dyn SecretReader> {
    if use_stdin {
        Box::new(ReaderSecretReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalSecretReader)
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries results only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
