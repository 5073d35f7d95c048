// Application state module
// Shared, read-only state handed to every connection

use std::time::Duration;

use super::types::Config;
use crate::fileserver::FileServer;
use crate::vfs::OsFs;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub file_server: FileServer<OsFs>,
}

impl AppState {
    /// Build the state and the file server rooted at `files.root`
    pub fn new(config: &Config) -> Self {
        let files = &config.files;
        let file_server = FileServer::new(OsFs::new(&files.root), &files.hide)
            .with_index_pages(files.index_files.clone())
            .with_retry_after(Duration::from_secs(files.retry_after));

        Self {
            config: config.clone(),
            file_server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_config() {
        let config = Config::from_toml(
            "[files]\nroot = \"/srv/www\"\nhide = [\"secret.txt\"]\nindex_files = [\"home.html\"]",
        )
        .unwrap();
        let state = AppState::new(&config);

        assert_eq!(state.file_server.root().root(), std::path::Path::new("/srv/www"));
        assert_eq!(state.file_server.hide_list(), ["/secret.txt"]);
        assert_eq!(state.file_server.index_pages(), ["home.html"]);
    }
}
