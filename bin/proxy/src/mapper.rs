use crate::handler::JsonRpcHandler;
use std::{collections::HashMap, fmt, sync::Arc};

/// Routes JSON-RPC methods to handlers. Methods without a registered handler
/// go to the default one.
#[derive(Clone)]
pub struct RequestMapper {
    default_handler: Arc<dyn JsonRpcHandler>,
    handlers: HashMap<String, Arc<dyn JsonRpcHandler>>,
}

impl RequestMapper {
    pub fn new(default_handler: Arc<dyn JsonRpcHandler>) -> Self {
        Self {
            default_handler,
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `method`, replacing any previous one.
    pub fn add_handler(&mut self, method: impl Into<String>, handler: Arc<dyn JsonRpcHandler>) {
        self.handlers.insert(method.into(), handler);
    }

    pub fn get_matching_handler(&self, method: &str) -> Arc<dyn JsonRpcHandler> {
        self.handlers
            .get(method)
            .unwrap_or(&self.default_handler)
            .clone()
    }

    /// Methods with a registered handler, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }
}

impl fmt::Debug for RequestMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestMapper")
            .field("methods", &self.methods())
            .finish()
    }
}
