//! `phasmadb new-user`: provision an RSA identity for a username (spec §6,
//! grounded in `original_source/server/new_user.py`'s `generate_user`).

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NewUserArgs {
	/// Username to register - letters, digits and underscores only.
	pub username: String,

	/// Where to write the user's private key (JSON; keep this secret).
	pub private_key_file: PathBuf,

	/// Directory the server reads `<username>.pem` public keys from.
	#[arg(long, default_value = "public_keys")]
	pub keys_dir: PathBuf,

	/// RSA modulus size in bits.
	#[arg(long, default_value_t = 4096)]
	pub bits: usize,
}

#[derive(serde::Serialize)]
struct PrivateKeyFile<'a> {
	username: &'a str,
	private_key: String,
}

pub fn run(args: NewUserArgs) -> anyhow::Result<()> {
	if !phasmadb_protocol::is_valid_username(&args.username) {
		anyhow::bail!("invalid username: must match [0-9A-Za-z_]+");
	}

	let (private_key, public_key) = phasmadb_crypto::auth::generate_keypair(args.bits)?;

	std::fs::create_dir_all(&args.keys_dir)?;
	let public_pem = phasmadb_crypto::auth::public_key_to_pem(&public_key)?;
	std::fs::write(args.keys_dir.join(format!("{}.pem", args.username)), public_pem)?;

	let private_pem = phasmadb_crypto::auth::private_key_to_pem(&private_key)?;
	let file = PrivateKeyFile { username: &args.username, private_key: private_pem };
	std::fs::write(&args.private_key_file, serde_json::to_string_pretty(&file)?)?;

	println!(
		"created user {:?}: public key in {}, private key in {}",
		args.username,
		args.keys_dir.join(format!("{}.pem", args.username)).display(),
		args.private_key_file.display(),
	);
	Ok(())
}
