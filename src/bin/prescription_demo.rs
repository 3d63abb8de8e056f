use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mirath_rx::{ParamSet, Prescription, SignedPrescription};

const LOG_TARGET: &str = "bin::prescription_demo";
const DEFAULT_PARAMS_TAG: u8 = 0x01;

#[derive(Debug, Parser)]
#[command(name = "prescription_demo")]
#[command(about = "Keygen, sign and verify prescriptions with the Mirath-family scheme", long_about = None)]
struct Args {
    /// Parameter-set tag (only 0x01 ships today)
    #[arg(long, env = "MIRATH_RX_PARAMS", default_value_t = DEFAULT_PARAMS_TAG)]
    params_tag: u8,

    /// Seed the demo RNG to make keys and salts reproducible
    #[arg(long)]
    rng_seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a key pair and write <name>.pk / <name>.sk as hex
    Keygen {
        /// Basename for the key files
        #[arg(long, default_value = "physician")]
        name: String,
        /// Directory for the key files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Sign a prescription JSON file into a signed-envelope JSON file
    Sign {
        /// Prescription JSON ({"patient_name": "...", ...})
        prescription: PathBuf,
        /// Secret key file written by keygen
        #[arg(long)]
        secret_key: PathBuf,
        /// Output envelope path
        #[arg(long, default_value = "prescription.signed.json")]
        out: PathBuf,
    },
    /// Verify a signed envelope; exit status reports the verdict
    Verify {
        /// Envelope JSON written by sign
        envelope: PathBuf,
        /// Optional expected public key file; rejects a substituted key
        #[arg(long)]
        public_key: Option<PathBuf>,
    },
    /// Print parameter and envelope details
    Inspect {
        /// Envelope JSON written by sign
        envelope: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let params = ParamSet::from_tag(args.params_tag)
        .with_context(|| format!("parameter tag {:#04x}", args.params_tag))?;
    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    debug!(target: LOG_TARGET, tag = params.tag, "parameter set resolved");

    match args.command {
        Command::Keygen { name, out_dir } => {
            let (pk_bytes, sk_bytes) = mirath_rx::keygen(params, &mut rng);
            let pk_path = out_dir.join(format!("{name}.pk"));
            let sk_path = out_dir.join(format!("{name}.sk"));
            fs::write(&pk_path, hex::encode(&pk_bytes)).context("writing public key")?;
            fs::write(&sk_path, hex::encode(&sk_bytes)).context("writing secret key")?;
            info!(
                target: LOG_TARGET,
                pk = %pk_path.display(),
                sk = %sk_path.display(),
                "key pair written"
            );
            println!("public key:  {}", pk_path.display());
            println!("secret key:  {} (keep offline)", sk_path.display());
        }
        Command::Sign {
            prescription,
            secret_key,
            out,
        } => {
            let prescription: Prescription = serde_json::from_str(
                &fs::read_to_string(&prescription).context("reading prescription")?,
            )
            .context("parsing prescription JSON")?;
            let sk_bytes = read_hex_file(&secret_key).context("reading secret key")?;
            let envelope = SignedPrescription::create(params, prescription, &sk_bytes, &mut rng)
                .context("signing prescription")?;
            fs::write(&out, serde_json::to_string_pretty(&envelope)?).context("writing envelope")?;
            info!(
                target: LOG_TARGET,
                out = %out.display(),
                signature_len = envelope.signature().len(),
                "prescription signed"
            );
            println!("signed envelope: {}", out.display());
        }
        Command::Verify {
            envelope,
            public_key,
        } => {
            let envelope: SignedPrescription =
                serde_json::from_str(&fs::read_to_string(&envelope).context("reading envelope")?)
                    .context("parsing envelope JSON")?;
            if let Some(path) = public_key {
                let expected = read_hex_file(&path).context("reading expected public key")?;
                if expected != envelope.public_key() {
                    bail!("envelope public key does not match {}", path.display());
                }
            }
            if envelope.verify(params) {
                println!("VALID: signature verifies under the embedded public key");
            } else {
                println!("INVALID: signature rejected");
                std::process::exit(1);
            }
        }
        Command::Inspect { envelope } => {
            let envelope: SignedPrescription =
                serde_json::from_str(&fs::read_to_string(&envelope).context("reading envelope")?)
                    .context("parsing envelope JSON")?;
            println!(
                "parameter set 0x{:02x}: GF(2^{}), n={}, k={}, r={}, N={}, tau={}",
                params.tag, params.m, params.n, params.k, params.r, params.n_parties, params.tau
            );
            println!("public key:      {} bytes", envelope.public_key().len());
            println!("signature blob:  {} bytes", envelope.signature().len());
            println!("canonical form:  {} bytes", envelope.canonical_bytes().len());
            println!("prescription:");
            let json = serde_json::to_string_pretty(&envelope.prescription)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn read_hex_file(path: &PathBuf) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path)?;
    Ok(hex::decode(text.trim())?)
}
