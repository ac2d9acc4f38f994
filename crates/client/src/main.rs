//! `shopctl`: command-line front end for the ordering API.
//!
//! ```bash
//! shopctl auth login -e me@example.com -p secret
//! shopctl catalog products --page 2
//! shopctl cart add package 64f1c0a2
//! shopctl order place --phone 0911000000 --to "Bole, Addis Ababa"
//! ```

use clap::{Args, Parser, Subcommand};
use client::{App, CatalogPage, ClientError, Config};
use domain::{
    DeliveryDetails, ItemId, LineKind, LoginForm, Money, OrderRecord, PackageForm, ProductForm,
    SignupForm,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "shopctl")]
#[command(author, version, about = "Browse the catalog, fill a cart and place orders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products and packages
    Catalog {
        #[command(subcommand)]
        listing: Listing,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place orders and read history
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Log in, sign up and verify
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Manage the catalog and review orders (admins only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Args)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Page size (defaults to `PAGE_SIZE`)
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Subcommand)]
enum Listing {
    /// List products
    Products(PageArgs),
    /// List packages
    Packages(PageArgs),
}

#[derive(Subcommand)]
enum EntityRef {
    /// Add a product
    Product { id: String },
    /// Add a package
    Package { id: String },
}

impl EntityRef {
    fn resolve(self) -> (LineKind, ItemId) {
        match self {
            EntityRef::Product { id } => (LineKind::Product, ItemId::new(id)),
            EntityRef::Package { id } => (LineKind::Package, ItemId::new(id)),
        }
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product or package
    Add {
        #[command(subcommand)]
        target: EntityRef,
    },
    /// Remove a line
    Remove { id: String },
    /// Increase a line's quantity by one
    Inc { id: String },
    /// Decrease a line's quantity by one, removing it at zero
    Dec { id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Order the cart contents
    Place {
        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Delivery address
        #[arg(long = "to")]
        to: String,
    },
    /// Show past orders
    History,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        confirm_password: String,
    },
    /// Verify the emailed code
    Verify { code: String },
    /// Send a new code
    Resend,
    /// Log out
    Logout,
    /// Show who is logged in
    Status,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAdmin,
    },
    /// Manage packages
    Packages {
        #[command(subcommand)]
        action: PackageAdmin,
    },
    /// List every customer's orders
    Orders(OrderPageArgs),
}

#[derive(Args)]
struct OrderPageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = client::api::DEFAULT_ORDERS_LIMIT)]
    limit: u32,
}

#[derive(Subcommand)]
enum ProductAdmin {
    /// Add a product
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,

        /// Unit price, e.g. `12.50`
        #[arg(short, long, value_parser = parse_price)]
        price: Money,
    },
}

#[derive(Subcommand)]
enum PackageAdmin {
    /// Add a package bundling existing products
    Add {
        #[arg(short, long)]
        name: String,

        /// Product ids to include, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        include: Vec<String>,

        /// Package price, e.g. `40`
        #[arg(short, long, value_parser = parse_price)]
        price: Money,
    },
}

fn parse_price(raw: &str) -> Result<Money, String> {
    let amount: f64 = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    match Money::from_major_units(amount) {
        Some(price) if !price.is_negative() => Ok(price),
        _ => Err(format!("`{raw}` is not a valid price")),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, config).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<(), ClientError> {
    let mut app = App::from_config(config)?;

    match cli.command {
        Commands::Catalog { listing } => {
            let default_limit = app.config().page_size;
            let page = match listing {
                Listing::Products(args) => {
                    app.products(args.page, args.limit.unwrap_or(default_limit))
                        .await?
                }
                Listing::Packages(args) => {
                    app.packages(args.page, args.limit.unwrap_or(default_limit))
                        .await?
                }
            };
            print_catalog(&page);
        }
        Commands::Cart { action } => {
            app.require_auth()?;
            match action {
                CartAction::Show => {}
                CartAction::Add { target } => {
                    let (kind, id) = target.resolve();
                    if !app.add_to_cart(kind, &id).await? {
                        println!("{id} is already in the cart.");
                    }
                }
                CartAction::Remove { id } => {
                    app.cart_mut().remove_item(&ItemId::new(id))?;
                }
                CartAction::Inc { id } => {
                    app.cart_mut().increase_quantity(&ItemId::new(id))?;
                }
                CartAction::Dec { id } => {
                    app.cart_mut().decrease_quantity(&ItemId::new(id))?;
                }
                CartAction::Clear => {
                    app.cart_mut().clear_cart()?;
                }
            }
            print_cart(&app);
        }
        Commands::Order { action } => match action {
            OrderAction::Place { phone, to } => {
                let confirmation = app.place_order(&DeliveryDetails::new(phone, to)).await?;
                match confirmation.id {
                    Some(id) => println!("Order {id} placed ({})", confirmation.progress),
                    None => println!("Order placed ({})", confirmation.progress),
                }
            }
            OrderAction::History => {
                let history = app.order_history().await?;
                print_orders(&history);
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Products {
                action:
                    ProductAdmin::Add {
                        name,
                        description,
                        price,
                    },
            } => {
                let form = ProductForm {
                    name,
                    description,
                    price,
                };
                let entity = app.create_product(&form).await?;
                println!("Product {} added: {} {}", entity.id, entity.name, entity.price);
            }
            AdminAction::Packages {
                action:
                    PackageAdmin::Add {
                        name,
                        include,
                        price,
                    },
            } => {
                let form = PackageForm {
                    name,
                    include: include.into_iter().map(ItemId::new).collect(),
                    price,
                };
                let entity = app.create_package(&form).await?;
                println!("Package {} added: {} {}", entity.id, entity.name, entity.price);
            }
            AdminAction::Orders(args) => {
                let page = app.all_orders(args.page, args.limit).await?;
                print_orders(&page.items);
                println!("page {} of {}", args.page, page.total_pages());
            }
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                let profile = app.login(&LoginForm::new(email, password)).await?;
                println!("Logged in as {}", profile.email);
            }
            AuthAction::Signup {
                username,
                email,
                password,
                confirm_password,
            } => {
                let form = SignupForm {
                    username,
                    email,
                    password,
                    confirm_password,
                };
                app.signup(&form).await?;
                println!("Signed up. Check your email for the verification code.");
            }
            AuthAction::Verify { code } => {
                app.verify_otp(&code).await?;
                println!("Email verified. You can log in now.");
            }
            AuthAction::Resend => {
                app.resend_otp().await?;
                println!("Verification code sent.");
            }
            AuthAction::Logout => {
                app.logout()?;
                println!("Logged out.");
            }
            AuthAction::Status => match app.session().user_data() {
                Some(profile) if app.session().is_authenticated() => {
                    println!("Logged in as {}", profile.email);
                }
                _ => println!("Not logged in."),
            },
        },
    }

    Ok(())
}

fn print_orders(orders: &[OrderRecord]) {
    if orders.is_empty() {
        println!("There is no order.");
    }
    for order in orders {
        println!(
            "{}  {}  {} / {}",
            order.id, order.progress, order.phone_number, order.where_to_send
        );
        for line in &order.items {
            let name = line.entity().map_or("?", |e| e.name.as_str());
            println!("    {name} x {}", line.quantity);
        }
        if let Some(total) = order.total_amount {
            println!("    total {total}");
        }
    }
}

fn print_catalog(page: &CatalogPage) {
    if page.items.is_empty() {
        println!("No items found.");
        return;
    }
    for entity in &page.items {
        println!("{}  {}  {}", entity.id, entity.name, entity.price);
        for included in entity.include.iter().flatten() {
            println!("    - {}", included.name);
        }
    }
    println!("page {} of {}", page.table.page.unwrap_or(1), page.total_pages());
}

fn print_cart<S: storage::StateStorage + Clone>(app: &App<S>) {
    let cart = app.cart();
    if cart.items().is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in cart.items() {
        println!(
            "{}  {} [{}]  {} x {} = {}",
            line.id,
            line.name,
            line.kind.line_kind(),
            line.quantity,
            line.price,
            line.total_price()
        );
    }
    println!("Total: {}", cart.total_amount());
}
