//! The `ContainerEngine` capability: consumed as two opaque operations.
//! Image build, `docker cp` plumbing, and lifecycle management live
//! entirely on the other side of this trait.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Start a container for `project_path`, returning its id.
    async fn create_container(&self, project_path: &str, image: &str) -> Result<String>;

    /// Write `contents` to `dest_path` inside `container_id`.
    async fn inject_file(&self, container_id: &str, dest_path: &str, contents: &[u8]) -> Result<()>;
}
