use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use email_address::EmailAddress;

use ledger_rs::{
    PasswordHash, ValidatedPassword, count_users, create_user, fund, initialize_db, open_database,
};

/// A utility for creating a test database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The starting balance of each test user, in minor currency units.
const STARTING_BALANCE: i64 = 10_000;

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = open_database(output_path)?;

    initialize_db(&conn)?;

    for email in ["test@test.com", "test2@test.com"] {
        println!("Creating test user {email} with password 'test'...");

        let password_hash = PasswordHash::new(
            ValidatedPassword::new_unchecked("test"),
            PasswordHash::DEFAULT_COST,
        )?;
        let user = create_user(EmailAddress::from_str(email)?, password_hash, &conn)?;

        fund(user.id, STARTING_BALANCE, &conn)?;
    }

    println!("Success! Created {} funded users.", count_users(&conn)?);

    Ok(())
}
