//! Command-line interface for ebookvault.
//!
//! Provides commands for browsing and searching the catalog, signing in
//! and out, and buying downloads.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::catalog::{CatalogItem, ItemId, ALL_CATEGORIES};
use crate::config;
use crate::payment::{CardDetails, PaymentError};
use crate::store::FileStore;
use crate::storefront::{Storefront, StorefrontError};

/// ebookvault - Ebook storefront
#[derive(Parser, Debug)]
#[command(name = "ebookvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse the catalog, optionally filtered
    Browse {
        /// Match against title, author or tags (case-insensitive)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Exact category name, or "all"
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,
    },

    /// Search all categories
    Search {
        /// Search query
        query: String,
    },

    /// List category selectors
    Categories,

    /// Show featured ebooks with list prices
    Featured,

    /// Show details of an ebook
    Show {
        /// Ebook ID
        id: ItemId,
    },

    /// Sign in and pay for the monthly subscription
    Login {
        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        #[command(flatten)]
        card: CardArgs,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Buy and download a single ebook
    Buy {
        /// Ebook ID
        id: ItemId,

        #[command(flatten)]
        card: CardArgs,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Checkout form fields
#[derive(Args, Debug, Clone)]
pub struct CardArgs {
    /// Cardholder name (defaults to --name when signing in)
    #[arg(long)]
    pub cardholder: Option<String>,

    /// Card number
    #[arg(long, env = "EBOOKVAULT_CARD_NUMBER", hide_env_values = true)]
    pub card_number: String,

    /// Expiry as MM/YY
    #[arg(long)]
    pub expiry: String,

    /// Card verification value
    #[arg(long, env = "EBOOKVAULT_CARD_CVV", hide_env_values = true)]
    pub cvv: String,
}

impl CardArgs {
    fn into_details(self, fallback_holder: Option<&str>) -> CardDetails {
        let holder = self
            .cardholder
            .or_else(|| fallback_holder.map(str::to_string))
            .unwrap_or_default();
        CardDetails::new(holder, self.card_number, self.expiry, self.cvv)
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config => show_config(),
            command => {
                let cfg = config::config()?;
                let shop = Storefront::from_config(cfg).await?;
                run(&shop, command).await
            }
        }
    }
}

async fn run(shop: &Storefront<FileStore>, command: Commands) -> Result<()> {
    match command {
        Commands::Browse { query, category } => browse(shop, &query, &category),
        Commands::Search { query } => browse(shop, &query, ALL_CATEGORIES),
        Commands::Categories => {
            for selector in shop.catalog().categories() {
                println!("{}", selector);
            }
            Ok(())
        }
        Commands::Featured => show_featured(shop),
        Commands::Show { id } => show_item(shop, id),
        Commands::Login { name, email, card } => login(shop, &name, &email, card).await,
        Commands::Logout => logout(shop),
        Commands::Whoami => whoami(shop),
        Commands::Buy { id, card } => buy(shop, id, card).await,
        Commands::Config => show_config(),
    }
}

/// Format a count with thousands separators
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn print_table(items: &[&CatalogItem]) {
    println!(
        "{:<4} {:<34} {:<18} {:<11} {:>6} {:>10}",
        "ID", "TITLE", "AUTHOR", "CATEGORY", "RATING", "DOWNLOADS"
    );
    println!("{}", "-".repeat(88));

    for item in items {
        println!(
            "{:<4} {:<34} {:<18} {:<11} {:>6.1} {:>10}",
            item.id,
            truncate(&item.title, 34),
            truncate(&item.author, 18),
            item.category,
            item.rating,
            format_count(item.downloads)
        );
    }
}

fn browse(shop: &Storefront<FileStore>, query: &str, category: &str) -> Result<()> {
    let results = shop.browse(query, category);

    if results.is_empty() {
        println!("No ebooks found");
        println!("Try adjusting your search or filter criteria");
        return Ok(());
    }

    print_table(&results);
    println!("\n{} of {} ebooks", results.len(), shop.catalog().len());

    Ok(())
}

fn show_featured(shop: &Storefront<FileStore>) -> Result<()> {
    let featured = shop.catalog().featured();

    if featured.is_empty() {
        println!("No featured ebooks");
        return Ok(());
    }

    for (item, price) in featured {
        println!(
            "{:<4} {:<34} by {:<18} {:>7}  ★ {:.1}  {} downloads",
            item.id,
            truncate(&item.title, 34),
            item.author,
            price.to_string(),
            item.rating,
            format_count(item.downloads)
        );
    }

    Ok(())
}

fn show_item(shop: &Storefront<FileStore>, id: ItemId) -> Result<()> {
    let item = shop
        .catalog()
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Ebook not found: {}", id))?;

    println!("  ID: {}", item.id);
    println!("  Title: {}", item.title);
    println!("  Author: {}", item.author);
    println!("  Category: {}", item.category);
    println!("  Rating: {:.1}", item.rating);
    println!("  Downloads: {}", format_count(item.downloads));
    if !item.tags.is_empty() {
        println!("  Tags: {}", item.tags.join(", "));
    }
    println!("\n{}", item.description);
    println!("\nDownload price: {}", shop.pricing().download);

    Ok(())
}

async fn login(shop: &Storefront<FileStore>, name: &str, email: &str, card: CardArgs) -> Result<()> {
    let state = shop.state()?;
    let pricing = shop.pricing();

    eprintln!(
        "Processing {} ({})...",
        pricing.subscription,
        crate::payment::PaymentKind::Subscription.description()
    );

    let (state, receipt) = shop
        .sign_in(&state, name, email, card.into_details(Some(name)), Utc::now())
        .await
        .map_err(|e| checkout_failed("Sign-in", e))?;

    let user = state
        .user
        .as_ref()
        .context("Session missing after sign-in")?;

    println!("Payment Successful!");
    println!("{}", receipt.confirmation());
    println!("   Signed in as: {} <{}>", user.name, user.email);
    println!("   Transaction: {}", receipt.transaction_id);
    println!("   Card: **** {}", receipt.card_last4);

    Ok(())
}

/// What the reader can do about a failed checkout
fn checkout_hint(err: &StorefrontError) -> Option<&'static str> {
    match err {
        StorefrontError::Payment(e) if e.is_input_error() => {
            Some("Check the card details and try again.")
        }
        StorefrontError::Payment(PaymentError::Declined { .. }) => {
            Some("Your card was declined. Try a different card.")
        }
        StorefrontError::Payment(PaymentError::TimedOut(_)) => {
            Some("The payment did not complete. You have not been charged; try again later.")
        }
        StorefrontError::NotSignedIn => Some("Use 'ebookvault login' to sign in first."),
        _ => None,
    }
}

fn checkout_failed(action: &str, err: StorefrontError) -> anyhow::Error {
    if let Some(hint) = checkout_hint(&err) {
        eprintln!("{}", hint);
    }
    anyhow::Error::new(err).context(format!("{} failed", action))
}

fn logout(shop: &Storefront<FileStore>) -> Result<()> {
    let state = shop.state()?;
    if !state.is_logged_in() {
        println!("Not signed in");
        return Ok(());
    }

    shop.sign_out(&state, Utc::now())?;
    println!("Signed out");
    Ok(())
}

fn whoami(shop: &Storefront<FileStore>) -> Result<()> {
    match shop.state()?.user {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            println!("Signed in: {}", user.signed_in_at);
        }
        None => println!("Not signed in. Use 'ebookvault login' to get started."),
    }
    Ok(())
}

async fn buy(shop: &Storefront<FileStore>, id: ItemId, card: CardArgs) -> Result<()> {
    let state = shop.state()?;
    let holder = state.user.as_ref().map(|u| u.name.clone());

    eprintln!("Processing {} (Single ebook download)...", shop.pricing().download);

    let (item, receipt) = shop
        .purchase(&state, id, card.into_details(holder.as_deref()))
        .await
        .map_err(|e| checkout_failed("Purchase", e))?;

    println!("Payment Successful!");
    println!("{}", receipt.confirmation());
    println!("   Ebook: {} by {}", item.title, item.author);
    println!("   Transaction: {}", receipt.transaction_id);

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Config file: {}", cfg.config_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none - using defaults)".to_string()));
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  Storage: {}", cfg.storage_path().display());
    println!();
    println!("Catalog:");
    match (&cfg.catalog_url, &cfg.catalog_path) {
        (Some(url), _) => println!("  URL:  {} (timeout {:?})", url, cfg.catalog_timeout),
        (None, Some(path)) => println!("  File: {}", path.display()),
        (None, None) => println!("  (built-in)"),
    }
    println!();
    println!("Pricing:");
    println!("  Subscription: {}", cfg.pricing.subscription);
    println!("  Download:     {}", cfg.pricing.download);
    println!();
    println!("Payment:");
    println!("  Processing delay: {:?}", cfg.payment.processing_delay);
    println!("  Timeout:          {:?}", cfg.payment.timeout);
    println!("  Decline cards:    {}", cfg.payment.decline_cards.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(987), "987");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
    }

    #[test]
    fn test_checkout_hints() {
        let hint = |e: StorefrontError| checkout_hint(&e);

        assert_eq!(
            hint(StorefrontError::Payment(PaymentError::InvalidCvv)),
            Some("Check the card details and try again.")
        );
        assert_eq!(
            hint(StorefrontError::Payment(PaymentError::CardExpired("01/20".to_string()))),
            Some("Check the card details and try again.")
        );
        assert!(hint(StorefrontError::Payment(PaymentError::Declined {
            reason: "no".to_string()
        }))
        .unwrap()
        .contains("declined"));
        assert!(hint(StorefrontError::NotSignedIn).unwrap().contains("login"));
        assert_eq!(hint(StorefrontError::UnknownItem(ItemId(9))), None);
    }

    #[test]
    fn test_checkout_failed_keeps_cause() {
        let err = checkout_failed("Purchase", StorefrontError::UnknownItem(ItemId(9)));
        assert_eq!(err.to_string(), "Purchase failed");
        assert!(format!("{:#}", err).contains("No ebook with id 9"));
    }

    #[test]
    fn test_parse_browse_defaults() {
        let cli = Cli::try_parse_from(["ebookvault", "browse"]).unwrap();
        match cli.command {
            Commands::Browse { query, category } => {
                assert_eq!(query, "");
                assert_eq!(category, "all");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_buy() {
        let cli = Cli::try_parse_from([
            "ebookvault",
            "buy",
            "2",
            "--card-number",
            "4242424242424242",
            "--expiry",
            "12/30",
            "--cvv",
            "123",
        ])
        .unwrap();

        match cli.command {
            Commands::Buy { id, card } => {
                assert_eq!(id, ItemId(2));
                let details = card.into_details(Some("Jane"));
                assert_eq!(details.cardholder, "Jane");
                assert_eq!(details.last4(), "4242");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
