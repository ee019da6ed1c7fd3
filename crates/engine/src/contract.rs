//! Contract trait: the method dispatch surface of a deployed unit

use tessera_core::{CallArgs, Result};
use tessera_primitives::SchemaRegistry;

use crate::context::CallContext;

/// A deployable contract
///
/// Implementations hold their table and singleton handles and route
/// `invoke` to the matching method body. The dispatcher only calls `invoke`
/// with a method listed by `methods`.
///
/// ```rust,ignore
/// impl Contract for Hello {
///     fn methods(&self) -> &[&'static str] {
///         &["hi", "add"]
///     }
///
///     fn schema(&self) -> Result<SchemaRegistry> {
///         SchemaRegistry::builder()
///             .table(&self.greetings)
///             .singleton(&self.counter)
///             .build()
///     }
///
///     fn invoke(&self, ctx: &mut CallContext<'_>, method: &str, args: &CallArgs) -> Result<()> {
///         match method {
///             "hi" => self.hi(ctx, args.decode()?),
///             "add" => self.add(ctx, args.decode()?),
///             other => Err(Error::MethodNotFound {
///                 contract: ctx.contract_name().clone(),
///                 method: other.to_string(),
///             }),
///         }
///     }
/// }
/// ```
pub trait Contract: Send + Sync {
    /// Names of the callable methods
    fn methods(&self) -> &[&'static str];

    /// Tables and singletons owned by the contract
    fn schema(&self) -> Result<SchemaRegistry> {
        Ok(SchemaRegistry::empty())
    }

    /// Run `method` with `args` inside the current frame
    fn invoke(&self, ctx: &mut CallContext<'_>, method: &str, args: &CallArgs) -> Result<()>;

    /// Whether `method` is callable
    fn has_method(&self, method: &str) -> bool {
        self.methods().iter().any(|m| *m == method)
    }
}
