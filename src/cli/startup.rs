//! Startup checks and the interactive selection prompt
//!
//! Before any listing is fetched the session must be present and accepted by
//! the server. When no selection was given on the command line the user picks
//! one from a menu of the saved collections.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::models::{Collection, ProfileInfo};
use crate::app::{CatalogApi, CatalogClient, ClientConfig, Selection};
use crate::auth::Session;
use crate::constants::selection;
use crate::errors::{AppError, Result};

/// An authenticated catalog connection
#[derive(Debug, Clone)]
pub struct Connection {
    /// Catalog client bound to the session
    pub client: Arc<CatalogClient>,
    /// Account the session belongs to
    pub profile: ProfileInfo,
}

/// Load the session, build the catalog client and check the profile
///
/// # Errors
///
/// Returns `AuthError::MissingToken` when no usable session is configured and
/// `AuthError::SessionRejected` when the server refuses it.
pub async fn connect(client_config: &ClientConfig) -> Result<Connection> {
    let session = Session::from_env()?;
    debug!("Session cookies: {}", session.cookie_names().join(", "));

    let client = CatalogClient::new(client_config.clone(), &session)?;
    let profile = client.check_profile().await?;
    info!("Profile check passed for {}", profile.name);

    Ok(Connection {
        client: Arc::new(client),
        profile,
    })
}

/// List the saved playlists, falling back to none when the listing fails
///
/// Favorites and playlists picked by id stay reachable without the listing;
/// `all` then covers favorites only.
pub async fn load_collections<C: CatalogApi + ?Sized>(catalog: &C) -> Vec<Collection> {
    match catalog.list_collections().await {
        Ok(collections) => {
            info!("Account has {} saved playlists", collections.len());
            collections
        }
        Err(e) => {
            warn!("Could not list playlists: {}", e);
            println!("Could not list playlists ({}); continuing without them", e);
            Vec::new()
        }
    }
}

/// Menu of everything that can be selected
pub fn render_menu(collections: &[Collection]) -> String {
    let mut menu = String::new();
    menu.push_str(&format!(
        "  [{}] everything: favorites and every playlist\n",
        selection::ALL
    ));
    menu.push_str(&format!(
        "  [{}] {}\n",
        selection::FAVORITES,
        selection::FAVORITES_TITLE
    ));
    for collection in collections {
        menu.push_str(&format!("  [{}] {}\n", collection.id, collection.title));
    }
    menu
}

/// Show the menu on stdout and read one selection from stdin
///
/// The read runs on the blocking pool so an interrupt can end the command
/// while it waits for input.
pub async fn prompt_selection(collections: &[Collection]) -> Result<Selection> {
    prompt_from(io::BufReader::new(io::stdin()), io::stdout(), collections).await
}

/// Blocking-pool variant of [`read_selection`]
pub async fn prompt_from<R, W>(
    mut input: R,
    mut output: W,
    collections: &[Collection],
) -> Result<Selection>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    let collections = collections.to_vec();
    tokio::task::spawn_blocking(move || read_selection(&mut input, &mut output, &collections))
        .await
        .map_err(|e| AppError::generic(format!("Selection prompt failed: {}", e)))?
}

/// Show the menu on `output` and read one line from `input`
///
/// # Errors
///
/// Returns `AppError::InvalidSelection` on an empty line or end of input.
pub fn read_selection<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    collections: &[Collection],
) -> Result<Selection> {
    writeln!(output)?;
    writeln!(output, "Available collections:")?;
    write!(output, "{}", render_menu(collections))?;
    writeln!(output)?;
    write!(output, "Enter your choice: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).map_err(AppError::Io)? == 0 {
        return Err(AppError::InvalidSelection {
            input: String::new(),
        });
    }

    let choice: Selection = line.parse()?;
    debug!("Selected {}", choice);
    Ok(choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::time::Duration;

    use crate::app::orchestrator::{create_shutdown_channel, run_until_shutdown, ShutdownSignal};

    /// Input that answers only after a long wait
    struct SlowInput;

    impl Read for SlowInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(Duration::from_millis(300));
            let answer = b"0\n";
            let len = answer.len().min(buf.len());
            buf[..len].copy_from_slice(&answer[..len]);
            Ok(len)
        }
    }

    fn listed() -> Vec<Collection> {
        vec![
            Collection::new("101", "Road trip"),
            Collection::new("202", "Focus"),
        ]
    }

    #[test]
    fn test_menu_lists_sentinels_first() {
        let menu = render_menu(&listed());
        let lines: Vec<&str> = menu.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("  [all]"));
        assert_eq!(lines[1], "  [0] My Favorites");
        assert_eq!(lines[2], "  [101] Road trip");
        assert_eq!(lines[3], "  [202] Focus");
    }

    #[test]
    fn test_read_selection() {
        let mut output = Vec::new();
        let choice = read_selection(&mut Cursor::new("202\n"), &mut output, &listed()).unwrap();

        assert_eq!(choice, Selection::Collection("202".to_string()));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("[101] Road trip"));
        assert!(shown.ends_with("Enter your choice: "));
    }

    #[test]
    fn test_read_selection_rejects_empty_input() {
        let mut output = Vec::new();
        let blank = read_selection(&mut Cursor::new("\n"), &mut output, &listed());
        assert!(matches!(blank, Err(AppError::InvalidSelection { .. })));

        let eof = read_selection(&mut Cursor::new(""), &mut output, &listed());
        assert!(matches!(eof, Err(AppError::InvalidSelection { .. })));
    }

    #[tokio::test]
    async fn test_prompt_from_reads_on_blocking_pool() {
        let choice = prompt_from(Cursor::new("all\n"), Vec::new(), &listed())
            .await
            .unwrap();
        assert_eq!(choice, Selection::All);
    }

    #[tokio::test]
    async fn test_interrupt_ends_waiting_prompt() {
        let (tx, rx) = create_shutdown_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(ShutdownSignal::Interrupt);
        });

        let started = std::time::Instant::now();
        let listed = listed();
        let prompt = prompt_from(io::BufReader::new(SlowInput), Vec::new(), &listed);
        let result = run_until_shutdown(prompt, rx).await;

        assert!(matches!(result, Err(AppError::Interrupted)));
        assert!(started.elapsed() < Duration::from_millis(250));
    }
}
