use mailchimp_signup::{config::get_or_init_config, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        mailchimp_signup::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        mailchimp_signup::init_dbg_tracing();
    }

    // Panics if the configuration is incomplete, e.g. a missing MAIL_CHIMP_* variable.
    let config = get_or_init_config().clone();
    let app = App::build_from_config(config).await?;

    mailchimp_signup::serve(app).await?;

    Ok(())
}
