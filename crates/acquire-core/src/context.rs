use serde_json::Value;

/// Per-call data handed to callback generator rules.
///
/// The mock core never inspects it; request-mocking code fills it with the
/// triggering call's arguments and payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationContext {
    call_args: Option<Value>,
    data: Option<Value>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_args(mut self, call_args: Value) -> Self {
        self.call_args = Some(call_args);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn call_args(&self) -> Option<&Value> {
        self.call_args.as_ref()
    }

    /// Single named call argument, if the arguments are an object.
    pub fn call_arg(&self, key: &str) -> Option<&Value> {
        self.call_args.as_ref().and_then(|args| args.get(key))
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}
