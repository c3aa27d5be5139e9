//! Maglo CLI
//!
//! Command-line client for a running Maglo API server:
//! - Sign up, log in and out
//! - List, create, edit, toggle and delete invoices
//! - Show the dashboard overview and chart
//! - Export invoices as CSV

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;

use maglo::api::dto::{
    AuthResponse, ChartResponse, HealthResponse, InvoiceListResponse, MeResponse,
    OverviewResponse, RecentResponse,
};
use maglo::api::error::ErrorResponse;
use maglo::dashboard::{format_currency, format_due_date};
use maglo::invoice::{Invoice, InvoiceInput, InvoiceStatus};

#[derive(Parser)]
#[command(name = "maglo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Invoices and dashboard from the command line")]
#[command(long_about = "Maglo keeps track of your invoices, VAT and payments.\nThis client talks to a running Maglo API server.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Currency symbol for table output
    #[arg(long, default_value = "₦", global = true)]
    pub currency: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List invoices
    List {
        /// Status filter (all, paid, unpaid, pending)
        #[arg(short, long)]
        status: Option<String>,
        /// Match on client name or email
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Show one invoice
    Show { id: String },

    /// Create an invoice
    Create {
        #[arg(long)]
        client_name: String,
        #[arg(long)]
        client_email: String,
        #[arg(long)]
        amount: f64,
        /// VAT percentage (0-100)
        #[arg(long, default_value = "0")]
        vat: f64,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        /// paid, unpaid or pending
        #[arg(long, default_value = "unpaid")]
        status: InvoiceStatus,
    },

    /// Edit an invoice; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        client_name: Option<String>,
        #[arg(long)]
        client_email: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        vat: Option<f64>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        status: Option<InvoiceStatus>,
    },

    /// Mark an invoice as paid / unpaid
    Toggle { id: String },

    /// Delete an invoice
    Delete { id: String },

    /// Dashboard overview
    Overview {
        /// Also list the most recent invoices
        #[arg(long)]
        recent: bool,
    },

    /// Daily income and expense
    Chart {
        /// Only the last N days
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Export invoices as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Not logged in. Run `maglo login` first.")]
    NotLoggedIn,

    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("Cannot reach the Maglo API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Thin HTTP client carrying the stored session token
struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: load_token(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request that needs a session
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, CliError> {
        if self.token.is_none() {
            return Err(CliError::NotLoggedIn);
        }
        Ok(self.request(method, path))
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response, CliError> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);
        Err(CliError::Api { status, message })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, CliError> {
        Ok(Self::send(builder).await?.json().await?)
    }
}

fn session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("maglo").join("session"))
}

fn load_token() -> Option<String> {
    let path = session_path()?;
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn save_token(token: &str) -> Result<(), CliError> {
    let path = session_path()
        .ok_or_else(|| CliError::Invalid("No config directory for the session file".to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, token)?;
    Ok(())
}

fn clear_token() {
    if let Some(path) = session_path() {
        let _ = std::fs::remove_file(path);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = ApiClient::new(&cli.api_url);
    let json_output = cli.format.eq_ignore_ascii_case("json");
    let symbol = cli.currency.as_str();

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
        } => {
            let body = serde_json::json!({ "name": name, "email": email, "password": password });
            let auth: AuthResponse =
                ApiClient::json(client.request(Method::POST, "/api/v1/auth/signup").json(&body))
                    .await?;
            save_token(&auth.token)?;
            println!("Welcome, {}!", auth.display_name);
        }

        Commands::Login { email, password } => {
            let body = serde_json::json!({ "email": email, "password": password });
            let auth: AuthResponse =
                ApiClient::json(client.request(Method::POST, "/api/v1/auth/login").json(&body))
                    .await?;
            save_token(&auth.token)?;
            println!("Logged in as {}", auth.display_name);
        }

        Commands::Logout => {
            let result =
                ApiClient::send(client.authed(Method::POST, "/api/v1/auth/logout")?).await;
            clear_token();
            match result {
                Ok(_) | Err(CliError::Api { status: 401, .. }) => println!("Logged out"),
                Err(e) => return Err(e),
            }
        }

        Commands::Whoami => {
            let me: MeResponse =
                ApiClient::json(client.authed(Method::GET, "/api/v1/auth/me")?).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&me)?);
            } else {
                println!("{} <{}>", me.display_name, me.user.email);
                println!("User ID: {}", me.user.id);
            }
        }

        Commands::List { status, search } => {
            let mut query = Vec::new();
            if let Some(status) = status {
                query.push(("status", status));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            let list: InvoiceListResponse = ApiClient::json(
                client.authed(Method::GET, "/api/v1/invoices")?.query(&query),
            )
            .await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_invoice_table(&list.invoices, symbol);
                println!();
                println!(
                    "All: {}  Paid: {}  Unpaid: {}  Pending: {}",
                    list.counts.all, list.counts.paid, list.counts.unpaid, list.counts.pending
                );
            }
        }

        Commands::Show { id } => {
            let invoice = fetch_invoice(&client, &id).await?;
            print_invoice(&invoice, symbol, json_output)?;
        }

        Commands::Create {
            client_name,
            client_email,
            amount,
            vat,
            due,
            status,
        } => {
            let input = InvoiceInput {
                client_name,
                client_email,
                amount,
                vat_percentage: vat,
                due_date: due,
                status,
            };
            input
                .validate()
                .map_err(|e| CliError::Invalid(e.to_string()))?;

            let invoice: Invoice = ApiClient::json(
                client.authed(Method::POST, "/api/v1/invoices")?.json(&input),
            )
            .await?;
            print_invoice(&invoice, symbol, json_output)?;
        }

        Commands::Edit {
            id,
            client_name,
            client_email,
            amount,
            vat,
            due,
            status,
        } => {
            let mut input = fetch_invoice(&client, &id).await?.to_input();
            if let Some(name) = client_name {
                input.client_name = name;
            }
            if let Some(email) = client_email {
                input.client_email = email;
            }
            if let Some(amount) = amount {
                input.amount = amount;
            }
            if let Some(vat) = vat {
                input.vat_percentage = vat;
            }
            if let Some(due) = due {
                input.due_date = due;
            }
            if let Some(status) = status {
                input.status = status;
            }
            input
                .validate()
                .map_err(|e| CliError::Invalid(e.to_string()))?;

            let invoice: Invoice = ApiClient::json(
                client
                    .authed(Method::PUT, &invoice_path(&id))?
                    .json(&input),
            )
            .await?;
            print_invoice(&invoice, symbol, json_output)?;
        }

        Commands::Toggle { id } => {
            let path = format!("{}/toggle-status", invoice_path(&id));
            let invoice: Invoice = ApiClient::json(client.authed(Method::POST, &path)?).await?;
            println!("Invoice {} is now {}", invoice.id, invoice.status.label());
        }

        Commands::Delete { id } => {
            ApiClient::send(client.authed(Method::DELETE, &invoice_path(&id))?).await?;
            println!("Deleted invoice {}", id);
        }

        Commands::Overview { recent } => {
            let overview: OverviewResponse =
                ApiClient::json(client.authed(Method::GET, "/api/v1/dashboard/overview")?)
                    .await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                for card in &overview.cards {
                    println!("{:<18} {}", card.title, card.value);
                }
                let o = &overview.overview;
                println!(
                    "{:<18} {}",
                    "Total VAT",
                    format_currency(&overview.currency_symbol, o.total_vat)
                );
                println!("{:<18} {}", "Invoices", o.total_invoices);

                if !o.upcoming_due.is_empty() {
                    println!();
                    println!("Due soon:");
                    print_invoice_table(&o.upcoming_due, &overview.currency_symbol);
                }
                if !o.overdue.is_empty() {
                    println!();
                    println!("Overdue:");
                    print_invoice_table(&o.overdue, &overview.currency_symbol);
                }
            }

            if recent {
                let recent: RecentResponse =
                    ApiClient::json(client.authed(Method::GET, "/api/v1/dashboard/recent")?)
                        .await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&recent)?);
                } else {
                    println!();
                    println!("Recent invoices:");
                    print_invoice_table(&recent.invoices, &overview.currency_symbol);
                }
            }
        }

        Commands::Chart { days } => {
            let mut builder = client.authed(Method::GET, "/api/v1/dashboard/chart")?;
            if let Some(days) = days {
                builder = builder.query(&[("days", days)]);
            }
            let chart: ChartResponse = ApiClient::json(builder).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&chart)?);
            } else if chart.buckets.is_empty() {
                println!("No data for the selected range");
            } else {
                println!("{:<10} | {:>16} | {:>16}", "Day", "Income", "Expense");
                println!("{}", "-".repeat(48));
                for bucket in &chart.buckets {
                    println!(
                        "{:<10} | {:>16} | {:>16}",
                        bucket.label,
                        format_currency(symbol, bucket.income),
                        format_currency(symbol, bucket.expense)
                    );
                }
            }
        }

        Commands::Export { output } => {
            let data = ApiClient::send(client.authed(Method::GET, "/api/v1/invoices/export")?)
                .await?
                .text()
                .await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    print!("{}", data);
                }
            }
        }

        Commands::Status => {
            let response = client
                .request(Method::GET, "/health")
                .send()
                .await
                .map_err(|e| {
                    CliError::Invalid(format!(
                        "Cannot connect to Maglo API at {} ({}). Start it with: cargo run --bin maglo",
                        client.base_url, e
                    ))
                })?;
            let health: HealthResponse = response.json().await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Maglo v{}", health.version);
                println!();
                println!("API Status: {}", health.status);
                println!("Backend:    {} ({})", health.backend, health.backend_status);
                println!("Live connections: {}", health.websocket_connections);
                println!();
                println!("Uptime: {}", format_duration(health.uptime_seconds));
            }
        }

        Commands::Config { output } => {
            let config = maglo::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn invoice_path(id: &str) -> String {
    format!("/api/v1/invoices/{}", urlencoding::encode(id))
}

async fn fetch_invoice(client: &ApiClient, id: &str) -> Result<Invoice, CliError> {
    ApiClient::json(client.authed(Method::GET, &invoice_path(id))?).await
}

fn print_invoice(invoice: &Invoice, symbol: &str, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(invoice)?);
        return Ok(());
    }

    println!("Invoice {}", invoice.id);
    println!("  Client:   {} <{}>", invoice.client_name, invoice.client_email);
    println!("  Amount:   {}", format_currency(symbol, invoice.amount));
    println!(
        "  VAT:      {} ({}%)",
        format_currency(symbol, invoice.vat_amount),
        invoice.vat_percentage
    );
    println!("  Total:    {}", format_currency(symbol, invoice.total));
    println!("  Due:      {}", format_due_date(invoice.due_date));
    println!("  Status:   {}", invoice.status.label());
    Ok(())
}

fn print_invoice_table(invoices: &[Invoice], symbol: &str) {
    if invoices.is_empty() {
        println!("No invoices found");
        return;
    }

    println!(
        "{:<22} {:<24} {:>16} {:<14} {}",
        "ID", "Client", "Total", "Due", "Status"
    );
    println!("{}", "-".repeat(86));

    for invoice in invoices {
        println!(
            "{:<22} {:<24} {:>16} {:<14} {}",
            truncate(&invoice.id, 22),
            truncate(&invoice.client_name, 24),
            format_currency(symbol, invoice.total),
            format_due_date(invoice.due_date),
            invoice.status.label()
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
