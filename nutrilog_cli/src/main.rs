use clap::{Parser, Subcommand};
use nutrilog_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nutrilog")]
#[command(about = "Terminal nutrition tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the meal journal to CSV
    Export {
        /// Output file (defaults to meals.csv inside the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    nutrilog_core::logging::init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Export { output }) => cmd_export(data_dir, output),
        None => cmd_menu(data_dir, &config),
    }
}

/// Which menu the terminal is showing. One screen is handled per loop
/// iteration; every handler returns the next screen.
enum Screen {
    MainMenu,
    UserMenu,
    LoggedIn(Session),
    AdminMenu,
    Quit,
}

fn cmd_menu(data_dir: PathBuf, config: &Config) -> Result<()> {
    let mut store = Store::open(&data_dir)?;
    let verifier = PlaintextVerifier;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let mut screen = Screen::MainMenu;
    loop {
        screen = match screen {
            Screen::MainMenu => main_menu(&mut input, config, &verifier)?,
            Screen::UserMenu => user_menu(&mut input, &mut store, &verifier)?,
            Screen::LoggedIn(session) => logged_in_menu(&mut input, &mut store, session)?,
            Screen::AdminMenu => admin_menu(&mut input, &mut store)?,
            Screen::Quit => break,
        };
    }

    println!("Goodbye!");
    Ok(())
}

fn cmd_export(data_dir: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let store = Store::open(&data_dir)?;
    let csv_path = output.unwrap_or_else(|| data_dir.join("meals.csv"));

    let count = export_meals_csv(&store, &csv_path)?;
    if count == 0 {
        println!("Meal journal is empty - nothing to export.");
    } else {
        println!("✓ Exported {} meals to {}", count, csv_path.display());
    }

    Ok(())
}

fn main_menu(
    input: &mut impl BufRead,
    config: &Config,
    verifier: &PlaintextVerifier,
) -> Result<Screen> {
    println!();
    println!("╭─────────────────────────────────╮");
    println!("│  NUTRILOG                       │");
    println!("╰─────────────────────────────────╯");
    println!("  1) User area");
    println!("  2) Administrator");
    println!("  3) Quit");

    let Some(choice) = prompt(input, "> ")? else {
        return Ok(Screen::Quit);
    };
    match choice.as_str() {
        "1" => Ok(Screen::UserMenu),
        "2" => {
            let Some(secret) = prompt(input, "Administrator secret: ")? else {
                return Ok(Screen::Quit);
            };
            match Session::unlock_admin(verifier, &config.admin.secret, &secret) {
                Some(_) => Ok(Screen::AdminMenu),
                None => {
                    println!("✗ Wrong administrator secret.");
                    Ok(Screen::MainMenu)
                }
            }
        }
        "3" => Ok(Screen::Quit),
        _ => {
            println!("✗ Unknown option.");
            Ok(Screen::MainMenu)
        }
    }
}

fn user_menu(
    input: &mut impl BufRead,
    store: &mut Store,
    verifier: &PlaintextVerifier,
) -> Result<Screen> {
    println!();
    println!("── User area ──");
    println!("  1) Register");
    println!("  2) Log in");
    println!("  3) Back");

    let Some(choice) = prompt(input, "> ")? else {
        return Ok(Screen::Quit);
    };
    match choice.as_str() {
        "1" => {
            run_register(input, store)?;
            Ok(Screen::UserMenu)
        }
        "2" => run_login(input, store, verifier),
        "3" => Ok(Screen::MainMenu),
        _ => {
            println!("✗ Unknown option.");
            Ok(Screen::UserMenu)
        }
    }
}

/// Collect registration fields, re-prompting per field so one typo does not
/// throw away everything entered so far. Bad measurements still surface
/// through the registration service's own check.
fn run_register(input: &mut impl BufRead, store: &mut Store) -> Result<()> {
    println!();
    println!("── Create account ──");

    let email = loop {
        let Some(email) = prompt(input, "E-mail: ")? else {
            return Ok(());
        };
        if !validate::is_valid_email(&email) {
            println!("✗ That does not look like an e-mail address.");
            continue;
        }
        if store.find_account(&email)?.is_some() {
            println!("✗ That e-mail is already registered.");
            continue;
        }
        break email;
    };

    let password = loop {
        let Some(password) = prompt(input, "Password: ")? else {
            return Ok(());
        };
        if password.is_empty() {
            println!("✗ Password cannot be empty.");
            continue;
        }
        break password;
    };

    let Some(weight_kg) = prompt_f64(input, "Weight (kg): ")? else {
        return Ok(());
    };
    let Some(height_m) = prompt_f64(input, "Height (m): ")? else {
        return Ok(());
    };

    let sex = loop {
        let Some(sex) = prompt(input, "Sex (M/F): ")? else {
            return Ok(());
        };
        if Sex::parse(&sex).is_some() {
            break sex;
        }
        println!("✗ Enter M or F.");
    };

    let Some(diet) = choose_diet(input)? else {
        return Ok(());
    };

    let registration = Registration {
        email,
        password,
        weight_kg,
        height_m,
        sex,
        diet,
    };
    match register(store, &registration) {
        Ok(account) => println!("✓ Registered! Your BMI is {:.2}.", account.bmi),
        Err(e) => println!("✗ {e}"),
    }

    Ok(())
}

fn choose_diet(input: &mut impl BufRead) -> Result<Option<String>> {
    println!("Diet plan:");
    for (i, plan) in DietPlan::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, plan.name());
    }

    loop {
        let Some(choice) = prompt(input, "> ")? else {
            return Ok(None);
        };
        let picked = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| DietPlan::ALL.get(n.wrapping_sub(1)));
        match picked {
            Some(plan) => return Ok(Some(plan.name().to_string())),
            None => println!("✗ Pick a number between 1 and {}.", DietPlan::ALL.len()),
        }
    }
}

fn run_login(
    input: &mut impl BufRead,
    store: &mut Store,
    verifier: &PlaintextVerifier,
) -> Result<Screen> {
    println!();
    println!("── Log in ──");

    loop {
        let Some(email) = prompt(input, "E-mail: ")? else {
            return Ok(Screen::Quit);
        };
        let Some(password) = prompt(input, "Password: ")? else {
            return Ok(Screen::Quit);
        };
        match Session::login(store, verifier, &email, &password) {
            Ok(session) => {
                println!("✓ Welcome, {email}.");
                return Ok(Screen::LoggedIn(session));
            }
            Err(e @ (Error::UnknownEmail | Error::WrongPassword)) => println!("✗ {e}"),
            Err(e) => return Err(e),
        }
    }
}

fn logged_in_menu(input: &mut impl BufRead, store: &mut Store, session: Session) -> Result<Screen> {
    // Only user sessions belong on this screen
    let Some(email) = session.user_email().map(String::from) else {
        return Ok(Screen::MainMenu);
    };

    println!();
    println!("── Signed in: {email} ──");
    println!("  1) My data");
    println!("  2) Log a meal");
    println!("  3) Recent meals");
    println!("  4) Log out");

    let Some(choice) = prompt(input, "> ")? else {
        return Ok(Screen::Quit);
    };
    match choice.as_str() {
        "1" => {
            show_profile(store, &email)?;
            Ok(Screen::LoggedIn(session))
        }
        "2" => {
            run_log_meal(input, store, &email)?;
            Ok(Screen::LoggedIn(session))
        }
        "3" => {
            show_recent_meals(store, &email)?;
            Ok(Screen::LoggedIn(session))
        }
        "4" => {
            println!("✓ Logged out.");
            Ok(Screen::MainMenu)
        }
        _ => {
            println!("✗ Unknown option.");
            Ok(Screen::LoggedIn(session))
        }
    }
}

fn show_profile(store: &Store, email: &str) -> Result<()> {
    let Some(account) = store.find_account(email)? else {
        println!("✗ Account not found.");
        return Ok(());
    };

    println!();
    println!("  E-mail: {}", account.email);
    println!("  Weight: {} kg", account.weight_kg);
    println!("  Height: {} m", account.height_m);
    println!("  Sex:    {}", account.sex);
    println!("  Diet:   {}", account.diet);
    println!("  BMI:    {:.2}", account.bmi);
    Ok(())
}

fn run_log_meal(input: &mut impl BufRead, store: &mut Store, email: &str) -> Result<()> {
    let Some(food) = prompt(input, "Food: ")? else {
        return Ok(());
    };
    let Some(grams) = prompt_f64(input, "Quantity (g): ")? else {
        return Ok(());
    };

    match log_meal(store, email, &food, grams) {
        Ok(entry) => println!(
            "✓ Meal #{} logged at {}.",
            entry.id,
            entry
                .logged_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        Err(Error::UnknownFood(name)) => {
            println!("✗ '{name}' is not in the catalog. Ask the administrator to add it.")
        }
        Err(e @ Error::InvalidQuantity) => println!("✗ {e}"),
        Err(e) => return Err(e),
    }

    Ok(())
}

fn show_recent_meals(store: &Store, email: &str) -> Result<()> {
    const WINDOW_DAYS: i64 = 7;

    let entries = recent_meals(store, email, WINDOW_DAYS)?;
    if entries.is_empty() {
        println!("No meals logged in the last {WINDOW_DAYS} days.");
        return Ok(());
    }

    println!();
    println!("  Last {WINDOW_DAYS} days:");
    for entry in &entries {
        println!(
            "  #{:<4} {}  {:>7.1} g  {}",
            entry.id,
            entry
                .logged_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            entry.grams,
            entry.food
        );
    }
    Ok(())
}

fn admin_menu(input: &mut impl BufRead, store: &mut Store) -> Result<Screen> {
    println!();
    println!("── Administrator ──");
    println!("  1) Add food to catalog");
    println!("  2) List users");
    println!("  3) Leave");

    let Some(choice) = prompt(input, "> ")? else {
        return Ok(Screen::Quit);
    };
    match choice.as_str() {
        "1" => {
            let Some(name) = prompt(input, "Food name: ")? else {
                return Ok(Screen::Quit);
            };
            if name.is_empty() {
                println!("✗ Food name cannot be empty.");
                return Ok(Screen::AdminMenu);
            }
            match add_food(store, &name)? {
                AddFoodOutcome::Created => println!("✓ Food added to the catalog."),
                AddFoodOutcome::AlreadyExists => println!("Food is already in the catalog."),
            }
            Ok(Screen::AdminMenu)
        }
        "2" => {
            list_users(store)?;
            Ok(Screen::AdminMenu)
        }
        "3" => {
            println!("Leaving administrator mode.");
            Ok(Screen::MainMenu)
        }
        _ => {
            println!("✗ Unknown option.");
            Ok(Screen::AdminMenu)
        }
    }
}

fn list_users(store: &Store) -> Result<()> {
    let accounts = store.list_accounts()?;
    if accounts.is_empty() {
        println!("No users registered yet.");
        return Ok(());
    }

    println!();
    for account in &accounts {
        println!(
            "  - {} | Diet: {} | BMI: {:.2}",
            account.email, account.diet, account.bmi
        );
    }
    Ok(())
}

/// Print `label`, flush, and read one trimmed line. `None` means the input
/// stream ended.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Like `prompt`, but re-asks until the line parses as a finite number
/// ("nan" and "inf" parse, yet no measurement can use them).
fn prompt_f64(input: &mut impl BufRead, label: &str) -> Result<Option<f64>> {
    loop {
        let Some(raw) = prompt(input, label)? else {
            return Ok(None);
        };
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(Some(value)),
            _ => println!("✗ Enter a number."),
        }
    }
}
