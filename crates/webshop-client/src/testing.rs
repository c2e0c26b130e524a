//! Scripted in-process transport for client tests.

use std::sync::Mutex;

use serde_json::Value;

use crate::error::ShopError;
use crate::session::{Args, Transport};

type Responder = Box<dyn Fn(&str, &Args) -> Result<Value, ShopError> + Send + Sync>;

/// Answers each invocation from a closure and records every call in order.
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<(String, Args)>>,
    responder: Responder,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Args) -> Value + Send + Sync + 'static,
    {
        Self::fallible(move |procedure, args| Ok(responder(procedure, args)))
    }

    pub(crate) fn fallible<F>(responder: F) -> Self
    where
        F: Fn(&str, &Args) -> Result<Value, ShopError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Args)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn procedures(&self) -> Vec<String> {
        self.calls().into_iter().map(|(p, _)| p).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn invoke(&self, procedure: &str, args: Args) -> Result<Value, ShopError> {
        let reply = (self.responder)(procedure, &args);
        self.calls.lock().unwrap().push((procedure.to_owned(), args));
        reply
    }
}
