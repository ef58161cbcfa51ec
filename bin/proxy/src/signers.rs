use config::SignerConfig;
use signer::{LocalSigner, MultiSignerProvider, SignerError, TransactionSigner};
use std::sync::Arc;
use tracing::info;

/// Load every configured key into a signer provider.
pub fn load_signers(configs: &[SignerConfig]) -> Result<MultiSignerProvider, SignerError> {
    let signers = configs
        .iter()
        .map(|config| {
            let signer = match config {
                SignerConfig::KeyFile(path) => LocalSigner::from_key_file(path)?,
                SignerConfig::PrivateKey(key) => LocalSigner::from_hex(key)?,
            };
            info!(address = %signer.address(), "Loaded signer");
            Ok(Arc::new(signer) as Arc<dyn TransactionSigner>)
        })
        .collect::<Result<Vec<_>, SignerError>>()?;

    Ok(MultiSignerProvider::new(signers))
}
