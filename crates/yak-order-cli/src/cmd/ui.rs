use crate::cmd::load_settings;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    // Fail before binding when the project is not initialized.
    let settings = load_settings(root)?;
    if settings.taxonomies.is_empty() && settings.post_types.is_empty() {
        tracing::warn!("no taxonomy or post type has ordering enabled");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "yak-order API for {} at http://localhost:{actual_port}/api",
            root_buf.display()
        );

        tokio::select! {
            res = yak_order_server::serve_on(root_buf, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
