use clap::Parser;

#[derive(Parser, Clone)]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, default_value = "3000")]
    pub port: u16,

    #[clap(env, long, default_value = "http://localhost:3000")]
    pub origin_urls: String,

    /// SMTP account notifications are sent from. Leave unset to run without email.
    #[clap(env, long)]
    pub email_user: Option<String>,

    #[clap(env, long)]
    pub email_pass: Option<String>,

    #[clap(env, long, default_value = "smtp.gmail.com")]
    pub smtp_relay: String,

    /// Where restaurant-facing notifications go, defaults to the SMTP account itself.
    #[clap(env, long)]
    pub restaurant_email: Option<String>,

    #[clap(env, long, default_value = "(555) 284-7316")]
    pub restaurant_phone: String,

    #[clap(env, long, default_value = "reservations")]
    pub reservations_dir: String,
}
