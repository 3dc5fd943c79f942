use clap::{Args, Parser, Subcommand};
use user_directory::{
    cli::{
        auth,
        db::{db_migrate, db_revert},
    },
    core::db::init_pool,
    settings::get_config,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create a new account that can log in
    CreateAccount {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::Migrate => {
                println!("run all pending migration");
                let _ = dotenvy::dotenv();
                let config = get_config();
                println!("run migration on {}", config.database_url);
                db_migrate(&config).await;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                let _ = dotenvy::dotenv();
                let config = get_config();
                db_revert(&config).await;
            }
        },
        Commands::Auth(auth_args) => match &auth_args.command {
            AuthCommands::CreateAccount {
                first_name,
                last_name,
                email,
                password,
            } => {
                println!("create account: {email:?}");
                let _ = dotenvy::dotenv();
                let config = get_config();
                let pool = init_pool(&config).await;
                auth::create_account(&pool, first_name, last_name, email, password)
                    .await
                    .unwrap();
            }
        },
    }
}
