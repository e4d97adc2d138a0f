use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "food-cli")]
#[command(about = "Command-line client for the food delivery gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "GATEWAY_URL")]
    url: String,

    /// Bearer token from `login`
    #[arg(short, long, env = "FOOD_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and print a token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List restaurants
    Restaurants,
    /// Show a restaurant's menu
    Menu { restaurant_id: String },
    /// Place an order; items are `price:quantity[:name]`
    CreateOrder {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        restaurant_id: String,
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },
    /// Fetch an order by id
    GetOrder { order_id: String },
    /// List a user's orders
    History { user_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let res = match cli.command {
        Commands::Register { name, email, password } => {
            client
                .post(format!("{}/api/auth/register", cli.url))
                .json(&json!({ "name": name, "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Login { email, password } => {
            client
                .post(format!("{}/api/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Restaurants => {
            client
                .get(format!("{}/api/restaurants", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Menu { restaurant_id } => {
            client
                .get(format!("{}/api/restaurants/{}/menu", cli.url, restaurant_id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::CreateOrder { user_id, restaurant_id, items } => {
            let items = items
                .iter()
                .map(|raw| parse_item(raw))
                .collect::<Result<Vec<_>, _>>()?;
            client
                .post(format!("{}/api/orders", cli.url))
                .headers(headers)
                .json(&json!({ "userId": user_id, "restaurantId": restaurant_id, "items": items }))
                .send()
                .await?
        }
        Commands::GetOrder { order_id } => {
            client
                .get(format!("{}/api/orders/{}", cli.url, order_id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::History { user_id } => {
            client
                .get(format!("{}/api/orders/user/{}", cli.url, user_id))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// Parse `price:quantity[:name]`.
fn parse_item(raw: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let mut parts = raw.splitn(3, ':');
    let price: f64 = parts.next().unwrap_or_default().parse()?;
    let quantity: u32 = parts
        .next()
        .ok_or_else(|| format!("item '{}' is missing a quantity", raw))?
        .parse()?;
    let mut item = json!({ "price": price, "quantity": quantity });
    if let Some(name) = parts.next() {
        item["name"] = json!(name);
    }
    Ok(item)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = serde_json::from_str::<Value>(&text)
        .and_then(|json| serde_json::to_string_pretty(&json))
        .unwrap_or(text);

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("Response: {}", body);
        return Ok(());
    }

    println!("{}", body);
    Ok(())
}
