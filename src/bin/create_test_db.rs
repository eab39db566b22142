use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use finanzas_rs::{
    Kind, SeedCategory, SeedData, SeedSubcategory, SeedUser, Transaction,
    count_transactions, create_transaction, get_all_users, get_subcategories, import_seed,
    initialize_db, load_seed_file,
};

/// A utility for creating a test database for the finanzas_rs web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// A seed file to populate the database with. Sample data is used if not given.
    #[arg(long, short)]
    seed_path: Option<PathBuf>,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let seed = match &args.seed_path {
        Some(seed_path) => {
            let load = load_seed_file(seed_path)?;
            if let Some(warning) = load.warning {
                eprintln!("{warning}");
            }
            load.data
        }
        None => sample_seed(),
    };

    println!("Importing categories, subcategories and users...");
    let summary = import_seed(&seed, &conn)?;
    println!(
        "Added {} categories, {} subcategories and {} users.",
        summary.categories, summary.subcategories, summary.users
    );

    let subcategory = get_subcategories(None, &conn)?.into_iter().next();
    let user = get_all_users(&conn)?.into_iter().next();

    if let (Some(subcategory), Some(user)) = (subcategory, user) {
        println!("Creating test transaction...");
        let today = OffsetDateTime::now_utc().date();
        create_transaction(
            Transaction::build(today, Kind::Income, 100.0, subcategory.id, user.id)
                .description(Some("Test transaction")),
            &conn,
        )?;
        println!("Database has {} transactions.", count_transactions(&conn)?);
    }

    println!("Success!");

    Ok(())
}

fn sample_seed() -> SeedData {
    SeedData {
        categories: vec![
            SeedCategory {
                id: 1,
                name: "Salary".to_owned(),
                kind: Kind::Income,
                subcategories: vec![SeedSubcategory {
                    id: 1,
                    name: "Payroll".to_owned(),
                }],
            },
            SeedCategory {
                id: 2,
                name: "Food".to_owned(),
                kind: Kind::Expense,
                subcategories: vec![
                    SeedSubcategory {
                        id: 2,
                        name: "Groceries".to_owned(),
                    },
                    SeedSubcategory {
                        id: 3,
                        name: "Dining out".to_owned(),
                    },
                ],
            },
        ],
        users: vec![SeedUser {
            id: 1,
            name: "Test".to_owned(),
        }],
    }
}
