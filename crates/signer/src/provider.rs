use crate::{SignerProvider, TransactionSigner};
use alloy_primitives::Address;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

/// Serves a fixed set of signers loaded at startup.
#[derive(Default, Clone)]
pub struct MultiSignerProvider {
    signers: HashMap<Address, Arc<dyn TransactionSigner>>,
}

impl MultiSignerProvider {
    pub fn new(signers: impl IntoIterator<Item = Arc<dyn TransactionSigner>>) -> Self {
        let signers = signers
            .into_iter()
            .map(|signer| (signer.address(), signer))
            .collect();

        Self { signers }
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl SignerProvider for MultiSignerProvider {
    fn get_signer(&self, address: &Address) -> Option<Arc<dyn TransactionSigner>> {
        self.signers.get(address).cloned()
    }

    fn available_addresses(&self) -> BTreeSet<Address> {
        self.signers.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalSigner;
    use alloy_primitives::address;

    fn signer(key: &str) -> Arc<dyn TransactionSigner> {
        Arc::new(LocalSigner::from_hex(key).unwrap())
    }

    #[test]
    fn test_lookup_and_sorted_addresses() {
        let provider = MultiSignerProvider::new([
            signer("0xae6ae8e5ccbfb04590405997ee2d52d2b330726137b875053c36d94e974d162f"),
            signer("0x8f2a55949038a9610f50fb23b5883af3b4ecb3c3bb792cbcefbd1542c692be63"),
            signer("0xc87509a1c067bbde78beb793e6fa76530b6382a4c0241e5e4a9ec0a0f44dc0d3"),
        ]);

        assert_eq!(provider.len(), 3);

        let addresses: Vec<_> = provider.available_addresses().into_iter().collect();
        assert_eq!(
            addresses,
            vec![
                address!("627306090abab3a6e1400e9345bc60c78a8bef57"),
                address!("f17f52151ebef6c7334fad080c5704d77216b732"),
                address!("fe3b557e8fb62b89f4916b721be55ceb828dbd73"),
            ]
        );

        let found = provider
            .get_signer(&address!("fe3b557e8fb62b89f4916b721be55ceb828dbd73"))
            .unwrap();
        assert_eq!(
            found.address(),
            address!("fe3b557e8fb62b89f4916b721be55ceb828dbd73")
        );

        assert!(provider
            .get_signer(&address!("1b00ba00ca00bb00aa00bc00be00ac00ca00da00"))
            .is_none());
    }
}
