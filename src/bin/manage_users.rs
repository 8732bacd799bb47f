//! CLI tool to manage user roles, e.g. to promote the first admin.
//!
//! Usage:
//!   cargo run --bin manage-users -- list
//!   cargo run --bin manage-users -- set-role --email <email> --role <role>

use std::env;

use video_feedback_lib::config::Config;
use video_feedback_lib::db::{DbPool, UserStore};
use video_feedback_lib::services::accounts;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    match command.as_str() {
        "list" | "ls" => list_users(&pool).await,
        "set-role" => {
            let email = flag_value(&args, "--email", "-e");
            let role = flag_value(&args, "--role", "-r");
            set_role(&pool, &email, &role).await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn flag_value(args: &[String], long: &str, short: &str) -> String {
    let mut i = 2;
    while i < args.len() {
        if (args[i] == long || args[i] == short) && i + 1 < args.len() {
            return args[i + 1].clone();
        }
        i += 1;
    }
    eprintln!("Error: {} is required", long);
    std::process::exit(1);
}

async fn list_users(pool: &DbPool) {
    let users = match pool.list_users().await {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error listing users: {}", e);
            std::process::exit(1);
        }
    };

    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!();
    println!("{:<36} {:<32} {:<20} {:<10}", "ID", "EMAIL", "NAME", "ROLE");
    println!("{}", "-".repeat(100));

    for user in users {
        let name: String = if user.name.chars().count() > 18 {
            format!("{}...", user.name.chars().take(15).collect::<String>())
        } else {
            user.name.clone()
        };
        println!(
            "{:<36} {:<32} {:<20} {:<10}",
            user.id, user.email, name, user.role
        );
    }
    println!();
}

async fn set_role(pool: &DbPool, email: &str, role: &str) {
    let user = match pool.find_user_by_email(email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            eprintln!("No user with email {}.", email);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error looking up user: {}", e);
            std::process::exit(1);
        }
    };

    match accounts::change_role(pool, user.id, Some(role)).await {
        Ok(updated) => println!("{} is now {}.", updated.email, updated.role),
        Err(e) => {
            eprintln!("Error changing role: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: manage-users <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list, ls                                List all users");
    eprintln!("  set-role --email <email> --role <role>  Change a user's role");
    eprintln!("  help                                    Show this help");
    eprintln!();
    eprintln!("Roles: student, supervisor, admin");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  manage-users list");
    eprintln!("  manage-users set-role --email ada@example.com --role admin");
    eprintln!();
}
