//! Password hashing utility
//!
//! Produces the value to store in `users.password_hash` when seeding
//! accounts by hand, using the same `PASSWORD_SALT` and `PASSWORD_SCHEME`
//! as the server.
//!
//! Usage:
//!   cargo run --bin hash-password
//!   cargo run --bin hash-password "MySecurePassword123!"

use std::env;
use std::io::{self, Write};

use anyhow::{bail, Context};
use projects_api::auth::{PasswordHasher, PasswordScheme};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let salt = env::var("PASSWORD_SALT").context("PASSWORD_SALT must be set")?;
    let scheme: PasswordScheme = match env::var("PASSWORD_SCHEME") {
        Ok(value) => value.parse()?,
        Err(_) => PasswordScheme::SaltedSha256,
    };

    let password = if let Some(pwd) = env::args().nth(1) {
        pwd
    } else {
        // Read from stdin so the password stays out of the process list
        print!("Enter password to hash: ");
        io::stdout().flush()?;

        let mut password = String::new();
        io::stdin().read_line(&mut password)?;
        password.trim().to_string()
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    if password.chars().count() < 8 {
        eprintln!("Warning: sign-up requires at least 8 characters.");
    }

    let password_hash = PasswordHasher::new(scheme, salt).hash(&password)?;

    println!("\n===========================================");
    println!("Password Hash ({scheme:?}):");
    println!("===========================================");
    println!("{password_hash}");
    println!("===========================================\n");

    println!("Example SQL:");
    println!("UPDATE users SET password_hash = '{password_hash}' WHERE username = 'admin';");

    Ok(())
}
