//! Shared system context kept as one text file on disk

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use log::{debug, error};
use tokio::fs;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct ContextStore
{   path: PathBuf
}

impl ContextStore
{   pub fn new(path: impl Into<PathBuf>) -> Self
    {   ContextStore { path: path.into() }
    }

    pub fn path(&self) -> &Path
    {   &self.path
    }

    /// Current context; a missing file reads as empty
    pub async fn load(&self) -> Result<String, Error>
    {   match fs::read_to_string(&self.path).await
        {   Ok(content) => {
              debug!(
                "Read {} bytes of context from {}",
                content.len(), self.path.display()
              );
              Ok(content)
            }
          , Err(e) if e.kind() == ErrorKind::NotFound => {
              debug!("No context file at {}", self.path.display());
              Ok(String::new())
            }
          , Err(e) => {
              error!("Error reading context file: {}", e);
              Err(e.into())
            }
        }
    }

    /// Replace the stored context
    pub async fn save(&self, content: &str) -> Result<(), Error>
    {   fs::write(&self.path, content).await.map_err(|e| {
          error!("Error saving context file: {}", e);
          Error::from(e)
        })?;
        debug!(
          "Saved {} bytes of context to {}",
          content.len(), self.path.display()
        );
        Ok(())
    }
}
