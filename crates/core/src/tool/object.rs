use std::future::ready;
use std::pin::Pin;

use serde_json::Value;
use tracing::Instrument;

use super::{Error, Tool, ToolResult};

pub(crate) type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Object-safe view of a [`Tool`], taking raw JSON arguments.
pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    fn execute(&self, arguments: Value) -> ToolFuture;
}

pub(crate) struct ToolObjectImpl<T: Tool>(pub T);

impl<T: Tool> ToolObject for ToolObjectImpl<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    fn execute(&self, arguments: Value) -> ToolFuture {
        match serde_json::from_value::<T::Input>(arguments) {
            Ok(input) => {
                let span = debug_span!("tool", name = self.0.name());
                Box::pin(self.0.execute(input).instrument(span))
            }
            Err(err) => {
                debug!("rejected arguments for `{}`: {err}", self.0.name());
                Box::pin(ready(Err(Error::from(err))))
            }
        }
    }
}
