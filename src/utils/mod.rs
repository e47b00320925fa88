use once_cell::sync::OnceCell;
use std::env;

/// Environment variable naming the dotenv file when no path is passed explicitly.
pub const ENV_FILE_VAR: &str = "PAYMENT_GATEWAY_ENV_FILE";

static INIT_DOTENV: OnceCell<String> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is loaded at most once per process. The first caller decides which
/// file that is: the given `path`, else the file named by
/// `PAYMENT_GATEWAY_ENV_FILE`, else `.env`. A missing file is not an error,
/// values already present in the environment win either way.
///
/// # Return
///
/// The path of the dotenv file that was (or would have been) loaded.
pub fn ensure_dotenv_loaded(path: Option<&str>) -> &'static str {
    INIT_DOTENV.get_or_init(|| {
        let dotenv_path = path
            .map(str::to_owned)
            .or_else(|| env::var(ENV_FILE_VAR).ok())
            .unwrap_or_else(|| ".env".to_string());
        if let Err(e) = dotenv::from_filename(&dotenv_path) {
            tracing::debug!(path = %dotenv_path, error = %e, "dotenv file not loaded");
        }
        dotenv_path
    })
}
