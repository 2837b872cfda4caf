//! `phasmadb`: process entry points for running a server, provisioning
//! users, and exercising the session client (spec §6).

mod client_demo;
mod directory;
mod new_user;
mod serve;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "phasmadb", about = "PhasmaDB server and client tooling")]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Run the PhasmaDB server over TCP.
	Serve(serve::ServeArgs),
	/// Provision a new user's RSA identity.
	NewUser(new_user::NewUserArgs),
	/// Run a scriptable demonstration of the session client.
	Client(client_demo::ClientArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	match Cli::parse().command {
		Command::Serve(args) => serve::run(args).await,
		Command::NewUser(args) => new_user::run(args),
		Command::Client(args) => client_demo::run(args).await,
	}
}
