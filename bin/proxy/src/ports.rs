//! Ports file advertising the bound listener, so tooling can find a proxy
//! started on port 0.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::info;

pub const PORTS_FILE: &str = "signer-proxy.ports";

/// Write `http-jsonrpc=<port>` to the ports file in `data_path`.
pub fn write_ports_file(data_path: &Path, port: u16) -> io::Result<PathBuf> {
    fs::create_dir_all(data_path)?;

    let path = data_path.join(PORTS_FILE);
    fs::write(&path, format!("http-jsonrpc={port}\n"))?;

    info!(path = %path.display(), port, "Wrote ports file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_ports_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("data");

        let path = write_ports_file(&data_path, 8545).unwrap();

        assert_eq!(path, data_path.join(PORTS_FILE));
        assert_eq!(fs::read_to_string(path).unwrap(), "http-jsonrpc=8545\n");
    }
}
