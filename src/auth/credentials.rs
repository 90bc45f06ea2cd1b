//! Session credential management
//!
//! The captured cookie header lives in a `.env` file next to the working
//! directory, readable by the owner only. These helpers back the `auth`
//! subcommands: setup, status, verify and clear.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info};

use super::session::Session;
use crate::app::client::{CatalogApi, CatalogClient, ClientConfig};
use crate::constants::env as env_constants;
#[cfg(unix)]
use crate::constants::auth;
use crate::errors::{AuthError, AuthResult};

/// Default credential file
pub const DOTENV_PATH: &str = ".env";

/// Authentication status information
#[derive(Debug, Clone)]
pub struct AuthStatus {
    /// Whether the cookie variable is set
    pub cookies_set: bool,
    /// Names of the cookies that parsed, if any
    pub cookie_names: Vec<String>,
    /// Whether the cookie header contains the required auth token
    pub has_auth_token: bool,
    /// Whether .env file exists in current directory
    pub dotenv_file_exists: bool,
    /// Whether the server accepted the session (None = not tested)
    pub session_valid: Option<bool>,
}

impl AuthStatus {
    /// Whether a usable session is configured
    pub fn has_credentials(&self) -> bool {
        self.cookies_set && self.has_auth_token
    }

    /// Get descriptive status message for display
    pub fn status_message(&self) -> String {
        match (self.cookies_set, self.has_auth_token, self.session_valid) {
            (false, _, _) => "Missing session cookies - run 'auth setup' to configure".to_string(),
            (true, false, _) => "Cookies configured but the 'auth' cookie is missing".to_string(),
            (true, true, None) => "Session configured but not verified".to_string(),
            (true, true, Some(true)) => "Session configured and verified".to_string(),
            (true, true, Some(false)) => "Session configured but rejected by server".to_string(),
        }
    }
}

/// Check current authentication status
pub fn get_auth_status() -> AuthStatus {
    let header = env::var(env_constants::COOKIES).ok();
    let session = header.as_deref().and_then(|h| h.parse::<Session>().ok());

    AuthStatus {
        cookies_set: header.is_some(),
        cookie_names: session
            .as_ref()
            .map(|s| s.cookie_names().into_iter().map(String::from).collect())
            .unwrap_or_default(),
        has_auth_token: session.is_some(),
        dotenv_file_exists: Path::new(DOTENV_PATH).exists(),
        session_valid: None,
    }
}

/// Check if a usable session is present in the environment
pub fn check_credentials() -> bool {
    Session::from_env().is_ok()
}

/// Prompt for the cookie header without echoing it
pub fn prompt_cookie_header() -> AuthResult<String> {
    println!("Open zvuk.com in a logged-in browser, open the developer tools (F12),");
    println!("select any request to zvuk.com under Network and copy its Cookie header.");
    println!();

    let header = rpassword::prompt_password("Cookie header: ")
        .map_err(AuthError::CredentialStorage)?;
    let header = header.trim().to_string();

    // Validate before anything is written
    let session: Session = header.parse()?;
    let missing = session.missing_known_cookies();
    if !missing.is_empty() {
        println!(
            "Note: the header has no {} cookie(s); requests may be refused.",
            missing.join(", ")
        );
    }

    Ok(header)
}

/// Save the cookie header to `.env` in the current directory
pub fn save_credentials(header: &str) -> AuthResult<()> {
    save_credentials_to(Path::new(DOTENV_PATH), header)?;

    // Update current environment (unsafe but necessary for credential management)
    unsafe {
        env::set_var(env_constants::COOKIES, header);
    }

    println!("Session saved to {}", DOTENV_PATH);

    #[cfg(unix)]
    println!("File permissions set to owner-only (600)");

    #[cfg(not(unix))]
    println!(
        "Warning: File permissions not set (non-Unix system). Please ensure the .env file is protected."
    );

    Ok(())
}

/// Write the cookie header into a dotenv file, keeping its other lines
pub fn save_credentials_to(env_path: &Path, header: &str) -> AuthResult<()> {
    let entry = format!("{}='{}'", env_constants::COOKIES, header.replace('\'', ""));
    let mut lines = read_other_lines(env_path)?;
    lines.push(entry);
    write_lines(env_path, &lines)?;
    debug!("Wrote session cookies to {}", env_path.display());
    Ok(())
}

/// Remove the cookie header from `.env` in the current directory
pub fn clear_credentials() -> AuthResult<()> {
    clear_credentials_in(Path::new(DOTENV_PATH))?;

    unsafe {
        env::remove_var(env_constants::COOKIES);
    }

    println!("Session removed from {}", DOTENV_PATH);
    Ok(())
}

/// Remove the cookie line from a dotenv file; a missing file is fine
pub fn clear_credentials_in(env_path: &Path) -> AuthResult<()> {
    if !env_path.exists() {
        return Ok(());
    }
    let lines = read_other_lines(env_path)?;
    write_lines(env_path, &lines)
}

/// Lines of an existing dotenv file, minus the cookie entry
fn read_other_lines(env_path: &Path) -> AuthResult<Vec<String>> {
    if !env_path.exists() {
        return Ok(Vec::new());
    }

    let prefix = format!("{}=", env_constants::COOKIES);
    let reader = BufReader::new(File::open(env_path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().starts_with(&prefix) {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn write_lines(env_path: &Path, lines: &[String]) -> AuthResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(env_path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => AuthError::PermissionDenied {
                path: env_path.to_path_buf(),
            },
            _ => AuthError::CredentialStorage(e),
        })?;

    for line in lines {
        writeln!(file, "{}", line)?;
    }

    // Set restrictive permissions (Unix-like systems only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(auth::ENV_FILE_PERMISSIONS);
        file.set_permissions(perms)?;
    }

    Ok(())
}

/// Verify the session by asking the server for the profile
///
/// Returns the account name on success, `None` if the server refused the
/// session.
pub async fn verify_credentials(config: &ClientConfig) -> AuthResult<Option<String>> {
    let session = Session::from_env()?;
    let client = CatalogClient::new(config.clone(), &session)?;

    match client.check_profile().await {
        Ok(profile) => {
            info!("Session verified for {}", profile.name);
            Ok(Some(profile.name))
        }
        Err(AuthError::SessionRejected) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Interactive credential setup workflow
pub async fn setup_credentials(config: &ClientConfig) -> AuthResult<()> {
    println!("Zvuk Session Setup");
    println!("==================");
    println!();
    println!("The downloader reuses the cookies of a browser session you are logged into.");
    println!("They will be stored in a .env file in the current directory.");
    println!();

    if check_credentials() {
        println!("Warning: A session is already configured.");
        print!("Do you want to replace it? [y/N]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().to_lowercase().starts_with('y') {
            println!("Setup cancelled.");
            return Ok(());
        }
        println!();
    }

    let header = prompt_cookie_header()?;

    println!();
    save_credentials(&header)?;

    println!();
    println!("Verifying session...");
    match verify_credentials(config).await? {
        Some(name) => {
            println!("Setup complete! Authorized as {}.", name);
        }
        None => {
            println!("The server did not accept these cookies.");
            println!("   Log in again in the browser and rerun 'auth setup'.");
        }
    }

    Ok(())
}

/// Show current authentication status
pub async fn show_auth_status(config: &ClientConfig) -> AuthResult<()> {
    let mut status = get_auth_status();

    println!("Zvuk Session Status");
    println!("===================");
    println!();
    println!(
        "{}: {}",
        env_constants::COOKIES,
        if status.cookies_set { "Set" } else { "Not set" }
    );
    if !status.cookie_names.is_empty() {
        println!("Cookies: {}", status.cookie_names.join(", "));
    }
    println!(
        ".env file: {}",
        if status.dotenv_file_exists {
            "Exists"
        } else {
            "Not found"
        }
    );
    println!();

    if status.has_credentials() {
        println!("Testing session...");
        match verify_credentials(config).await {
            Ok(name) => status.session_valid = Some(name.is_some()),
            Err(e) => println!("Could not reach the server: {}", e),
        }
        println!();
    }

    println!("Status: {}", status.status_message());

    if !status.has_credentials() || status.session_valid == Some(false) {
        println!();
        println!("To configure the session, run: zvuk_fetcher auth setup");
    }

    Ok(())
}
