//! Log in against a Pettact API and print notifications until Ctrl-C.
//!
//! ```text
//! cargo run -p core-service --example session_demo -- https://api.pettact.com kim@pettact.com secret
//! ```

use anyhow::{bail, Context};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{bootstrap_desktop, CoreEvent, Credentials, SessionReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))
        .context("failed to initialize logging")?;

    let mut args = std::env::args().skip(1);
    let (Some(base_url), Some(email), Some(password)) = (args.next(), args.next(), args.next())
    else {
        bail!("usage: session_demo <api-base-url> <email> <password>");
    };

    let core = bootstrap_desktop(base_url).await?;
    let session = core.session();
    let mut events = core.events().subscribe();

    if !session.is_authenticated().await {
        let state = session.login(&Credentials::new(email, password)).await?;
        println!("login finished: {}", state);
    }

    if let Some(user) = session.current_user().await {
        println!("current user: {}", user.as_value());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(CoreEvent::Notification(notification)) => println!("{:?}", notification),
                Ok(other) => println!("{}", other.description()),
                Err(_) => break,
            },
        }
    }

    session.logout().await;
    Ok(())
}
